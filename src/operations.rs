//! Report export.
//!
//! Writes a batch of descriptors to a directory so validation results can be
//! archived or diffed between runs:
//! - one pretty-printed JSON file per plugin, named after the MD5 digest of
//!   its URI so arbitrary URIs map to safe file names
//! - a `report_manifest.json` summarizing the run

use crate::plugin::PluginDescriptor;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the run summary written next to the descriptor files.
pub const MANIFEST_FILE: &str = "report_manifest.json";

/// File name used for the descriptor of `uri`.
pub fn report_file_name(uri: &str) -> String {
    format!("{:x}.json", md5::compute(uri.as_bytes()))
}

/// Export descriptors to `dir`, creating it if needed.
/// Returns the path of the written manifest.
pub fn export_reports(descriptors: &[PluginDescriptor], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .context(format!("Failed to create report directory: {:?}", dir))?;

    for descriptor in descriptors {
        let path = dir.join(report_file_name(&descriptor.uri));
        let content = serde_json::to_string_pretty(descriptor)
            .context(format!("Failed to serialize descriptor of {}", descriptor.uri))?;
        fs::write(&path, content)
            .context(format!("Failed to write report: {:?}", path))?;
    }

    let manifest_path = create_report_manifest(descriptors, dir)?;
    info!(
        plugins = descriptors.len(),
        directory = %dir.display(),
        "exported reports"
    );
    Ok(manifest_path)
}

/// Create the run manifest with totals and per-plugin summaries.
fn create_report_manifest(descriptors: &[PluginDescriptor], dir: &Path) -> Result<PathBuf> {
    let manifest_path = dir.join(MANIFEST_FILE);

    let plugins: serde_json::Map<String, serde_json::Value> = descriptors
        .iter()
        .map(|descriptor| {
            let entry = serde_json::json!({
                "file": report_file_name(&descriptor.uri),
                "stability": descriptor.stability,
                "compliant": descriptor.is_compliant(),
                "errors": descriptor.diagnostics.errors.len(),
                "warnings": descriptor.diagnostics.warnings.len(),
            });
            (descriptor.uri.clone(), entry)
        })
        .collect();

    let manifest = serde_json::json!({
        "generated": chrono::Local::now().to_rfc3339(),
        "plugin_count": descriptors.len(),
        "compliant_count": descriptors.iter().filter(|d| d.is_compliant()).count(),
        "error_count": descriptors.iter().map(|d| d.diagnostics.errors.len()).sum::<usize>(),
        "warning_count": descriptors.iter().map(|d| d.diagnostics.warnings.len()).sum::<usize>(),
        "plugins": plugins,
    });

    let content = serde_json::to_string_pretty(&manifest)?;
    fs::write(&manifest_path, content)
        .context(format!("Failed to write manifest: {:?}", manifest_path))?;

    Ok(manifest_path)
}
