//! Domain types shared by the controller, the HTTP client and the UI

pub mod order;
pub mod stock;

pub use order::{Order, OrderFilter};
pub use stock::{decode_stock, FormField, ItemDraft, ItemForm, StockItem};
