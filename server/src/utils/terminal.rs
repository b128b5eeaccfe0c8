//! Terminal utility functions
//!
//! Everything human-facing goes to stderr; stdout may be carrying MCP frames.

/// Format a URL as a clickable hyperlink when stderr is a terminal that
/// understands OSC 8, plain cyan text otherwise.
pub fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stderr) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_link_contains_url_and_color() {
        let url = "http://localhost:8000/mcp";
        let result = terminal_link(url);
        assert!(result.contains(url));
        assert!(result.contains("\x1b[36m"));
        assert!(result.ends_with("\x1b[0m") || result.ends_with("\x1b]8;;\x07"));
    }

    #[test]
    fn test_terminal_link_plain_format() {
        let url = "http://localhost:8000/health";
        let result = terminal_link(url);
        if !result.contains("\x1b]8;;") {
            assert_eq!(result, format!("\x1b[36m{}\x1b[0m", url));
        } else {
            assert!(result.starts_with(&format!("\x1b]8;;{}\x07", url)));
        }
    }
}
