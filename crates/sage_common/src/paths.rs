//! Data directory discovery.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Directory holding the selection slot and the usage log.
///
/// $CODESAGE_DATA_DIR overrides the XDG data dir.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CODESAGE_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().context("Cannot determine data directory")?;
    Ok(base.join("codesage"))
}
