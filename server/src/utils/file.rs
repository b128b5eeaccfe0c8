//! File utility functions

use std::path::PathBuf;

/// Expand a user-supplied path (such as `--config`) to an absolute path.
///
/// `~` and `~/rest` resolve against the home directory; anything relative is
/// joined onto the current directory; absolute paths pass through.
///
/// ```text
/// expand_path("~/.tempo-mcp/tempo-mcp.json") // -> /home/user/.tempo-mcp/tempo-mcp.json
/// expand_path("tempo-mcp.json")              // -> /current/dir/tempo-mcp.json
/// expand_path("/etc/tempo-mcp.json")         // -> /etc/tempo-mcp.json
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path {
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        },
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        assert_eq!(
            expand_path("/etc/tempo-mcp.json"),
            PathBuf::from("/etc/tempo-mcp.json")
        );
    }

    #[test]
    fn test_expand_path_relative_becomes_absolute() {
        let result = expand_path("./tempo-mcp.json");
        assert!(result.is_absolute());
        assert!(result.ends_with("tempo-mcp.json"));

        let result = expand_path("tempo-mcp.json");
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(result, cwd.join("tempo-mcp.json"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.tempo-mcp/tempo-mcp.json");
        assert!(result.is_absolute());
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".tempo-mcp/tempo-mcp.json"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(
            expand_path("  /path/to/config.json  "),
            PathBuf::from("/path/to/config.json")
        );
    }

    #[test]
    fn test_expand_path_empty_is_current_dir() {
        let result = expand_path("");
        assert!(result.is_absolute());
    }
}
