use crate::output::print_json;
use anyhow::bail;

pub fn run(names: &[String], json: bool) -> anyhow::Result<()> {
    let Some(path) = ycm_core::path_to_first_existing_executable(names, None) else {
        bail!("none of [{}] found on PATH", names.join(", "));
    };
    if json {
        print_json(&serde_json::json!({ "path": path }))?;
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
