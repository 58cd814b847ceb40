//! Report model, rendering collaborators and the stateless transport codec.
//!
//! ```text
//! view:    Batch ─► records ─► ReportModel::build ─► codec::encode ─► TransportMap
//! export:  TransportMap ─► codec::decode ─► ReportModel ─► DocumentRenderer
//! ```

pub mod chart;
pub mod codec;
pub mod document;
pub mod error;
pub mod model;

pub use chart::{ChartImage, ChartOptions, ChartRenderer, GapPolicy, SvgChartRenderer};
pub use codec::{decode, encode, TransportMap};
pub use document::{DocumentRenderer, HtmlDocumentRenderer, RenderedDocument};
pub use error::{ChartError, DocumentError, ReportError, ReportResult, TransportError};
pub use model::ReportModel;
