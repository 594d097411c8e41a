//! Where the cleanup targets live on each platform.

use std::path::PathBuf;

/// Default target roots for the running platform. Entries are `None`
/// (or the list is empty) when the location cannot be determined.
#[derive(Debug, Clone, Default)]
pub struct PlatformPaths {
    pub browser_cache: Option<PathBuf>,
    pub folders: Vec<PathBuf>,
    pub logs: Option<PathBuf>,
    pub recycle_bin: Option<PathBuf>,
}

impl PlatformPaths {
    #[cfg(windows)]
    pub fn detect() -> Self {
        let windows = std::env::var_os("SystemRoot")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        let system_drive = std::env::var_os("SystemDrive")
            .map(|d| PathBuf::from(format!("{}\\", d.to_string_lossy())))
            .unwrap_or_else(|| PathBuf::from(r"C:\"));

        PlatformPaths {
            browser_cache: dirs::data_local_dir()
                .map(|d| d.join("Yandex/YandexBrowser/User Data/Default")),
            folders: vec![
                std::env::temp_dir(),
                windows.join("Temp"),
                windows.join(r"SoftwareDistribution\Download"),
            ],
            logs: Some(windows.join("Logs")),
            recycle_bin: Some(system_drive.join("$Recycle.Bin")),
        }
    }

    #[cfg(target_os = "macos")]
    pub fn detect() -> Self {
        let home = dirs::home_dir();
        let mut folders = vec![std::env::temp_dir()];
        if let Some(home) = &home {
            folders.push(home.join("Library/Caches/com.apple.SoftwareUpdate"));
        }

        PlatformPaths {
            browser_cache: dirs::data_dir().map(|d| d.join("Yandex/YandexBrowser/Default")),
            folders,
            logs: home.as_ref().map(|h| h.join("Library/Logs")),
            recycle_bin: home.as_ref().map(|h| h.join(".Trash")),
        }
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    pub fn detect() -> Self {
        PlatformPaths {
            browser_cache: dirs::config_dir().map(|d| d.join("yandex-browser/Default")),
            folders: vec![std::env::temp_dir()],
            logs: dirs::state_dir().map(|d| d.join("log")),
            recycle_bin: dirs::data_local_dir().map(|d| d.join("Trash")),
        }
    }
}
