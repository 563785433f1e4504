use std::path::Path;

use crate::output::print_json;
use anyhow::Context;
use ycm_core::Settings;

pub fn run(settings_path: &Path, json: bool) -> anyhow::Result<()> {
    let settings = Settings::load(settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "file": settings_path,
            "exists": settings_path.is_file(),
            "settings": settings,
        }));
    }

    let source = if settings_path.is_file() {
        settings_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", settings_path.display())
    };
    println!("# {source}");
    print!("{}", serde_yaml::to_string(&settings)?);
    Ok(())
}
