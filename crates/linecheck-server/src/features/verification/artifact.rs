//! Result-artifact rendering
//!
//! A run's verified numbers are serialized into a CSV with a fixed column
//! set: one header row, one data row per valid result. The bytes go
//! straight to object storage; nothing is written to disk.

use thiserror::Error;

use crate::providers::ValidationResult;

/// Column set of the downloadable result file, in order.
pub const ARTIFACT_COLUMNS: [&str; 9] = [
    "number",
    "valid",
    "local_format",
    "international_format",
    "country_code",
    "country_name",
    "location",
    "carrier",
    "line_type",
];

/// Content type the artifact is uploaded with.
pub const ARTIFACT_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to render result CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush result CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Render verified results into CSV bytes.
///
/// The header row is always present, even for a run with zero results.
pub fn render_csv(results: &[ValidationResult]) -> Result<Vec<u8>, ArtifactError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(ARTIFACT_COLUMNS)?;
    for result in results {
        writer.serialize(result)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}
