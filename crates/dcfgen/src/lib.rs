#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcfgen/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod peers;
pub mod pipeline;

pub use dcfgen_data as data;
pub use dcfgen_model as model;
pub use dcfgen_output as output;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use peers::{QuotePageRelations, RelatedTickers, generate_peers};
pub use pipeline::{DegradedPage, Pipeline, Progress, Report, RunRequest};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
