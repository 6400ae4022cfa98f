//! `get` command

use std::path::Path;

use anyhow::Result;
use fwmeta_core::json_path;

/// Print the value at each dotted key path, one per line.
pub fn get(json_file: &Path, keys: &[String]) -> Result<()> {
    let doc = json_path::load_json(json_file)?;
    for value in json_path::extract_keys(&doc, keys)? {
        println!("{value}");
    }
    Ok(())
}
