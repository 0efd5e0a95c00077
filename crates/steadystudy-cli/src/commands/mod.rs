pub mod breakdown;
pub mod config;
pub mod free;
pub mod parse_time;
pub mod plan;

use std::io::Read;

/// Read a JSON document from a file, or from stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}").into())
    }
}
