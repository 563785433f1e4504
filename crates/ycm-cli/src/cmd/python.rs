use std::path::Path;

use crate::output::print_json;
use anyhow::Context;
use ycm_core::Settings;

pub fn run(settings_path: &Path, json: bool) -> anyhow::Result<()> {
    let settings = Settings::load(settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    let python = ycm_core::path_to_python(&settings)?;
    if json {
        print_json(&serde_json::json!({
            "path": python,
            "configured": settings.path_to_python_27.is_some(),
        }))?;
    } else {
        println!("{}", python.display());
    }
    Ok(())
}
