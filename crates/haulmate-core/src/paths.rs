use std::env;
use std::path::PathBuf;

/// Return the default per-install data directory.
///
/// Resolves to `~/.config/haulmate`, using HOME on Unix-like systems and
/// USERPROFILE on Windows.
pub fn default_data_dir() -> Result<PathBuf, String> {
    Ok(home_dir()?.join(".config").join("haulmate"))
}

fn home_dir() -> Result<PathBuf, String> {
    if let Ok(home) = env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Ok(PathBuf::from(profile));
        }
    }

    Err("Home directory not set".to_string())
}
