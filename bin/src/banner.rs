use homerow::{BindingTable, KeyToken};
use std::fmt::Write;

/// One line per action: the action name followed by its keys.
pub fn bindings(table: &BindingTable) -> String {
    let mut out = String::new();
    for (action, tokens) in table.iter() {
        let keys: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  {:<16}{}", action.to_string(), keys.join(", "));
    }
    out
}

/// Startup text shown on stdout regardless of the log level.
pub fn render(backend: &str, table: &BindingTable, quit: KeyToken) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "homerow running with the {backend} backend");
    out.push('\n');
    out.push_str("Bindings:\n");
    out.push_str(&bindings(table));
    out.push('\n');
    out.push_str("Controls:\n");
    out.push_str("  alt             toggle mouse mode\n");
    out.push_str("  ctrl (held)     leap instead of step\n");
    let _ = writeln!(out, "  {:<16}quit", format!("ctrl+{quit}"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_action() {
        let text = bindings(&BindingTable::defaults());
        assert_eq!(text.lines().count(), 9);
        assert!(text.contains("navigate:left   left, j"));
        assert!(text.contains("click:right     semicolon"));
        assert!(text.contains("hold:left       space"));
    }

    #[test]
    fn banner_names_backend_and_quit_key() {
        let text = render("uinput", &BindingTable::defaults(), KeyToken::Char('q'));
        assert!(text.starts_with("homerow running with the uinput backend"));
        assert!(text.contains("ctrl+q          quit"));
    }
}
