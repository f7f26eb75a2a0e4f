//! Display summary of a page for diagnostics and the inspect tool.

use serde::Serialize;

use super::header::PageHeader;

/// Display summary of a page, built on demand and never persisted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageInfo {
    /// Page id.
    #[serde(rename = "ID")]
    pub id: u64,
    /// Type name, `unknown<xx>` for unrecognized flags.
    #[serde(rename = "Type")]
    pub page_type: String,
    /// Element or record count.
    pub count: usize,
    /// Number of overflow pages.
    pub overflow_count: usize,
}

impl From<&PageHeader> for PageInfo {
    fn from(header: &PageHeader) -> Self {
        Self {
            id: header.id.0,
            page_type: header.type_name().into_owned(),
            count: usize::from(header.count),
            overflow_count: header.overflow as usize,
        }
    }
}
