use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/colourmatch`, or the platform data dir without HOME
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("colourmatch"),
            )
        } else {
            ProjectDirs::from("", "", "colourmatch")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Where saved click logs land unless the config names a directory
    pub fn click_log_dir() -> PathBuf {
        Self::state_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn trace_path() -> PathBuf {
        Self::state_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("colourmatch.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_logs_and_trace_live_under_state_dir() {
        if let Some(state) = AppDirs::state_dir() {
            assert!(AppDirs::click_log_dir().starts_with(&state));
            assert!(AppDirs::trace_path().starts_with(&state));
        }
        assert!(AppDirs::trace_path().ends_with("colourmatch.log"));
    }
}
