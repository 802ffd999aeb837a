use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::error::PriorReportError;

/// Text of the previously rendered report.
///
/// Only used for substring lookups: an identifier counts as already
/// reported if it appears anywhere in the text.
#[derive(Debug, Clone, Default)]
pub struct PriorReport {
    text: String,
}

impl PriorReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read the report at `path`. A missing file yields an empty report.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PriorReportError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!("Loaded prior report {} ({} bytes)", path.display(), text.len());
                Ok(Self { text })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No prior report at {}, every item is new", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(PriorReportError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        !self.text.is_empty() && self.text.contains(identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
