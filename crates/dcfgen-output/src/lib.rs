#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcfgen/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod sheets;
pub mod sink;
pub mod workbook;

pub use export::{ExportError, ExportFormat, Exporter, sheet_path};
pub use sheets::{
    DCF_SHEET, DcfSheetInput, PEERS_SHEET, PROFILES_SHEET, dcf_sheet, peers_sheet,
    profiles_sheet, statement_sheet,
};
pub use sink::WorkbookSink;
pub use workbook::{Cell, Sheet, Workbook, absolute_ref, cell_ref, column_name};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
