use crate::output::print_json;
use anyhow::Context;

pub fn run(json: bool) -> anyhow::Result<()> {
    let port = ycm_core::get_unused_localhost_port().context("failed to allocate a loopback port")?;
    if json {
        print_json(&serde_json::json!({ "port": port }))?;
    } else {
        println!("{port}");
    }
    Ok(())
}
