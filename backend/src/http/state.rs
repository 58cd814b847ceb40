//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::ReportConfig;
use crate::ingest::IngestionStore;
use crate::report::{ChartRenderer, DocumentRenderer, HtmlDocumentRenderer, SvgChartRenderer};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Latest device batch
    pub store: IngestionStore,
    pub config: Arc<ReportConfig>,
    pub charts: Arc<dyn ChartRenderer>,
    pub documents: Arc<dyn DocumentRenderer>,
}

impl AppState {
    /// Create a state with explicit rendering collaborators.
    pub fn new(
        store: IngestionStore,
        config: ReportConfig,
        charts: Arc<dyn ChartRenderer>,
        documents: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            charts,
            documents,
        }
    }

    /// State using the SVG chart renderer and the HTML document renderer.
    pub fn with_defaults(config: ReportConfig) -> Self {
        let charts = Arc::new(SvgChartRenderer::new(&config.charts));
        Self::new(
            IngestionStore::new(),
            config,
            charts,
            Arc::new(HtmlDocumentRenderer),
        )
    }
}
