//! Utility helpers - data paths and string manipulation.

use std::path::PathBuf;

/// Get the Sandcoder data directory (e.g. `~/.sandcoder/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".sandcoder")
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Keep the first `max_chars` characters of `s`.
///
/// Returns the kept prefix and how many characters were dropped.
/// Unicode-safe.
pub fn split_at_chars(s: &str, max_chars: usize) -> (&str, usize) {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let dropped = s[byte_idx..].chars().count();
            (&s[..byte_idx], dropped)
        }
        None => (s, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_string() {
        assert_eq!(split_at_chars("hello", 10), ("hello", 0));
    }

    #[test]
    fn test_split_exact_length() {
        assert_eq!(split_at_chars("hello", 5), ("hello", 0));
    }

    #[test]
    fn test_split_long_string() {
        assert_eq!(split_at_chars("hello world", 5), ("hello", 6));
    }

    #[test]
    fn test_split_unicode() {
        assert_eq!(split_at_chars("こんにちは世界", 2), ("こん", 5));
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/test/path");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.to_str().unwrap().ends_with("test/path"));
    }

    #[test]
    fn test_expand_home_absolute() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_home_relative() {
        assert_eq!(expand_home("."), PathBuf::from("."));
    }

    #[test]
    fn test_data_path_ends_with_sandcoder() {
        assert!(get_data_path().ends_with(".sandcoder"));
    }
}
