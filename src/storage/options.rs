use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::{PageError, Result};

/// Smallest page size accepted by [`PageOptions::validate`].
pub const MIN_PAGE_SIZE: usize = 512;
/// Largest page size accepted by [`PageOptions::validate`].
pub const MAX_PAGE_SIZE: usize = 1 << 20;
/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Layout configuration shared by the page views and encoders.
///
/// Read from TOML:
///
/// ```toml
/// page_size = 8192
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PageOptions {
    /// Size of one page in bytes.
    pub page_size: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageOptions {
    /// Options with the given page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Parses options from TOML text and validates them.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let options: Self =
            toml::from_str(raw).map_err(|err| PageError::Config(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Checks that the page size is a power of two in the supported range.
    pub fn validate(&self) -> Result<()> {
        if !self.page_size.is_power_of_two() {
            return Err(PageError::Invalid("page size must be a power of two"));
        }
        if self.page_size < MIN_PAGE_SIZE {
            return Err(PageError::Invalid("page size below minimum"));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(PageError::Invalid("page size above maximum"));
        }
        Ok(())
    }
}
