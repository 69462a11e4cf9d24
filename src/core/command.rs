//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation
    Tab(String),
    Orders(String),

    // Stock
    Reload,
    Add,
    Edit,
    Delete,

    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim().to_string());

    match cmd.to_lowercase().as_str() {
        "tab" => {
            if let Some(name) = args {
                Command::Tab(name)
            } else {
                Command::Unknown(input.to_string())
            }
        }
        "stock" => Command::Tab("stock".to_string()),
        "orders" | "order" => match args {
            Some(filter) => Command::Orders(filter),
            None => Command::Tab("orders".to_string()),
        },
        "reload" | "refresh" => Command::Reload,
        "add" | "new" => Command::Add,
        "edit" => Command::Edit,
        "delete" | "del" | "rm" => Command::Delete,
        "help" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown(input.to_string()),
    }
}
