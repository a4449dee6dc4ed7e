use anyhow::{Context, Result};
use quality_core::TableSpec;
use quality_engine::{basic_metric_specs, quality_metric_specs};
use quality_parser::{load_table_spec, load_tolerance_spec};
use std::path::Path;
use tracing::{info, warn};

use crate::output;

pub async fn execute(tolerance_path: &str, metadata_path: Option<&str>, format: &str) -> Result<()> {
    info!("Checking tolerance spec: {}", tolerance_path);

    let spec = load_tolerance_spec(Path::new(tolerance_path))
        .with_context(|| format!("Failed to load tolerance spec: {}", tolerance_path))?;

    let table = match metadata_path {
        Some(path) => load_table_spec(Path::new(path))
            .with_context(|| format!("Failed to load table metadata: {}", path))?,
        None => {
            warn!("No table metadata given, every field is treated as non-numeric");
            TableSpec::default()
        }
    };

    let basic = basic_metric_specs(&spec.urn, &table, &spec.tolerances)
        .with_context(|| format!("Failed to derive basic metric specs of {}", spec.urn))?;
    let quality = quality_metric_specs(&spec.urn, &spec.tolerances);

    output::print_check_report(&spec, &basic, &quality, format)
}
