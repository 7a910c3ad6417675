use super::types::ProbeResults;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const RESULTS_FILE: &str = "results.json";

/// Generate JSON report, to a file or stdout
pub fn generate(results: &ProbeResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Write results.json into the output directory, returning its path
pub fn write_report(results: &ProbeResults, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(RESULTS_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(results)?)?;
    Ok(path)
}
