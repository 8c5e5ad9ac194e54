// Licensed under the Apache-2.0 license

use anyhow::{Context, Result};
use fru_common::{FruDecoder, FruDocument};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EepromError {
    #[error("{name} is incorrect: {pattern}")]
    NotFound { name: &'static str, pattern: String },
}

/// Resolves the glob `pattern` to the first existing path in lexical order.
/// An invalid pattern resolves to nothing.
pub fn resolve(pattern: &Path) -> Option<PathBuf> {
    let paths = glob::glob(pattern.to_str()?).ok()?;
    paths.filter_map(|entry| entry.ok()).next()
}

/// Resolves `pattern` for the EEPROM called `name` ("sompath", "ccpath").
pub fn locate(name: &'static str, pattern: &Path) -> Result<PathBuf, EepromError> {
    resolve(pattern).ok_or_else(|| EepromError::NotFound {
        name,
        pattern: pattern.display().to_string(),
    })
}

/// Reads and decodes the EEPROM image at `path`.
pub fn load(path: &Path, decoder: &FruDecoder) -> Result<FruDocument> {
    let image = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!("read {} bytes from {}", image.len(), path.display());
    decoder
        .decode(&image)
        .with_context(|| format!("failed to decode FRU data in {}", path.display()))
}
