use std::path::{Path, PathBuf};

use ycm_core::settings::SETTINGS_FILE_NAME;

/// Resolve the settings file.
///
/// Priority:
/// 1. `--settings` flag / `YCM_BRIDGE_SETTINGS` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `ycm-bridge.yaml`
/// 3. Fall back to `cwd/ycm-bridge.yaml` (which may not exist)
pub fn resolve_settings_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or_else(|| cwd.join(SETTINGS_FILE_NAME))
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(SETTINGS_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
