//! Destination of the assembled valuation.

use crate::export::ExportError;
use crate::sheets::{DcfSheetInput, dcf_sheet, peers_sheet, profiles_sheet, statement_sheet};
use crate::workbook::Workbook;
use dcfgen_data::{CompanyProfile, FinancialStatement};
use dcfgen_model::PeerMetrics;
use tracing::debug;

/// Receives the structured content of each sheet.
pub trait WorkbookSink {
    /// Write one financial statement.
    fn write_statement(&mut self, statement: &FinancialStatement) -> Result<(), ExportError>;

    /// Write the peer table, subject first.
    fn write_peers(
        &mut self,
        tax_rate: f64,
        subject: &PeerMetrics,
        peers: &[PeerMetrics],
    ) -> Result<(), ExportError>;

    /// Write the company profiles, subject first.
    fn write_profiles(&mut self, profiles: &[CompanyProfile]) -> Result<(), ExportError>;

    /// Write the DCF model.
    fn write_dcf(&mut self, dcf: &DcfSheetInput<'_>) -> Result<(), ExportError>;
}

impl WorkbookSink for Workbook {
    fn write_statement(&mut self, statement: &FinancialStatement) -> Result<(), ExportError> {
        debug!(
            kind = %statement.kind(),
            items = statement.items().len(),
            "writing statement sheet"
        );
        self.add_sheet(statement_sheet(statement));
        Ok(())
    }

    fn write_peers(
        &mut self,
        tax_rate: f64,
        subject: &PeerMetrics,
        peers: &[PeerMetrics],
    ) -> Result<(), ExportError> {
        debug!(peers = peers.len(), "writing peer sheet");
        self.add_sheet(peers_sheet(tax_rate, subject, peers));
        Ok(())
    }

    fn write_profiles(&mut self, profiles: &[CompanyProfile]) -> Result<(), ExportError> {
        self.add_sheet(profiles_sheet(profiles));
        Ok(())
    }

    fn write_dcf(&mut self, dcf: &DcfSheetInput<'_>) -> Result<(), ExportError> {
        debug!(
            ticker = dcf.ticker,
            degenerate = dcf.outcome.is_degenerate(),
            "writing DCF sheet"
        );
        self.add_sheet(dcf_sheet(dcf));
        Ok(())
    }
}
