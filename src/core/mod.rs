pub mod action;
pub mod command;

pub use action::{ItemAction, ItemBody, ItemRequest};
pub use command::{parse_command, Command};
