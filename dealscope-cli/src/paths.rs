//! XDG Base Directory paths for dealscope.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths.

use std::path::PathBuf;

/// Get the dealscope data directory.
///
/// Returns `$XDG_DATA_HOME/dealscope` if set, otherwise `~/.local/share/dealscope`.
/// Analysis records are stored here unless `[storage] data_dir` says otherwise.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("dealscope")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/dealscope")
    } else {
        PathBuf::from(".local/share/dealscope")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_data_dir_ends_with_dealscope() {
        let path = data_dir();
        assert!(
            path.ends_with("dealscope"),
            "data_dir should end with 'dealscope'"
        );
    }

    #[test]
    #[serial]
    fn test_data_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_DATA_HOME", "/tmp/test-data");
        }
        let path = data_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-data/dealscope"));
        unsafe {
            std::env::remove_var("XDG_DATA_HOME");
        }
    }
}
