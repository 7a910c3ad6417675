pub mod json;
pub mod junit;
pub mod types;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Generate a report from a saved results.json
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let results = tokio::fs::read_to_string(results_path)
        .await
        .with_context(|| format!("Failed to read results: {}", results_path.display()))?;
    let probe_results: types::ProbeResults = serde_json::from_str(&results)?;

    match format {
        "json" => json::generate(&probe_results, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&probe_results)?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)?;
                    println!("JUnit report saved to: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Write every report format into `output_dir`, returning the files written
pub fn write_reports(results: &types::ProbeResults, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    Ok(vec![
        json::write_report(results, output_dir)?,
        junit::write_report(results, output_dir)?,
    ])
}
