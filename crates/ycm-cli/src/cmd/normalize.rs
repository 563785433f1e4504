use std::io::Read;
use std::path::Path;

use anyhow::Context;
use ycm_core::{to_utf8_json, Data};

pub fn run(file: Option<&Path>) -> anyhow::Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let value: serde_json::Value =
        serde_json::from_str(&input).context("input is not valid JSON")?;
    let json = to_utf8_json(&Data::from(value))?;
    println!("{json}");
    Ok(())
}
