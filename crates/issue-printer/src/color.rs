use std::io::IsTerminal;

/// Decide whether terminal output is colorized
pub fn init() {
    // Respect NO_COLOR standard (https://no-color.org/)
    let should_color = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    colored::control::set_override(should_color);
}
