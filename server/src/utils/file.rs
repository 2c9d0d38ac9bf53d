//! Path helpers for config and request files

use std::path::PathBuf;

/// Expand a user-supplied path to an absolute path.
///
/// `~` and `~/...` resolve against the home directory, relative paths
/// against the current directory. Paths are not canonicalized.
///
/// ```text
/// expand_path("~/.sieve/sieve.json") // -> /home/user/.sieve/sieve.json
/// expand_path("sieve.json")          // -> /current/dir/sieve.json
/// expand_path("/etc/sieve.json")     // -> /etc/sieve.json
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let expanded = match path {
        "" => return cwd(),
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        },
    };

    if expanded.is_relative() {
        cwd().join(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(
            expand_path("/etc/sieve.json"),
            PathBuf::from("/etc/sieve.json")
        );
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(
            expand_path("  /etc/sieve.json  "),
            PathBuf::from("/etc/sieve.json")
        );
    }

    #[test]
    fn test_expand_path_relative() {
        let result = expand_path("config/sieve.json");
        assert!(result.is_absolute());
        assert_eq!(
            result,
            std::env::current_dir().unwrap().join("config/sieve.json")
        );
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.sieve/sieve.json");
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".sieve/sieve.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_expand_path_empty_is_cwd() {
        assert_eq!(expand_path("   "), std::env::current_dir().unwrap());
    }
}
