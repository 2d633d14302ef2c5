//! Render a pallet storage size report as a pie chart next to a text breakdown.
//!
//! ```no_run
//! use palletviz::{Figure, Report, SizeMetric};
//!
//! let report = Report::load("polkadot_storage.json").unwrap();
//! let figure = Figure::from_report(&report, SizeMetric::Raw).unwrap();
//! figure.to_svg_file("polkadot.svg", None).unwrap();
//! ```
pub mod figure;
pub mod report;
pub mod style;
pub mod viewer;

pub use figure::Figure;
pub use report::{Report, SizeMetric};
