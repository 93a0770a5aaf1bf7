use std::path::PathBuf;

const APP_DIR: &str = "studypath";

/// Platform-specific application data directory, if one can be determined.
pub fn app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_DIR);
            return Some(dir);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_DIR);
            return Some(dir);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_DIR);
            return Some(dir);
        }
    }

    None
}

/// Default location of the persisted study document.
pub fn default_document_path() -> PathBuf {
    match app_data_dir() {
        Some(mut dir) => {
            dir.push("data");
            dir.push("studypath.json");
            dir
        }
        // Fallback
        None => PathBuf::from("data/studypath.json"),
    }
}

/// Default location of the optional TOML config file.
pub fn default_config_path() -> PathBuf {
    match app_data_dir() {
        Some(mut dir) => {
            dir.push("studypath.toml");
            dir
        }
        None => PathBuf::from("studypath.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_path_ends_in_data_file() {
        let path = default_document_path();
        assert!(path.ends_with("data/studypath.json"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
    }
}
