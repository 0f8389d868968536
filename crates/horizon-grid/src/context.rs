//! The grid context handed to a row tree.
//!
//! Everything a node needs from the rest of the grid is injected here
//! explicitly when the tree is built; nothing is looked up globally.

use std::sync::Arc;

use crate::event_service::EventService;
use crate::options::GridOptions;
use crate::row_model::{ClientSideRowModel, RowModelView};
use crate::tree::RowData;
use crate::value_service::{ExtractorValueService, ValueService};

/// Collaborators and configuration shared by the nodes of one grid.
pub struct GridContext<D: RowData> {
    pub(crate) options: GridOptions<D>,
    pub(crate) event_service: Arc<EventService>,
    pub(crate) value_service: Arc<dyn ValueService<D>>,
    pub(crate) row_model: Arc<dyn RowModelView<D>>,
}

impl<D: RowData> GridContext<D> {
    /// Creates a context with a fresh event service, a client-side row
    /// model and a value service that knows no columns.
    pub fn new(options: GridOptions<D>) -> Self {
        Self {
            options,
            event_service: Arc::new(EventService::new()),
            value_service: Arc::new(ExtractorValueService::empty()),
            row_model: Arc::new(ClientSideRowModel::new()),
        }
    }

    /// Shares an existing event service.
    pub fn with_event_service(mut self, event_service: Arc<EventService>) -> Self {
        self.event_service = event_service;
        self
    }

    /// Replaces the value service.
    pub fn with_value_service<V>(mut self, value_service: V) -> Self
    where
        V: ValueService<D> + 'static,
    {
        self.value_service = Arc::new(value_service);
        self
    }

    /// Replaces the row model view.
    pub fn with_row_model<R>(mut self, row_model: R) -> Self
    where
        R: RowModelView<D> + 'static,
    {
        self.row_model = Arc::new(row_model);
        self
    }

    /// The grid options.
    pub fn options(&self) -> &GridOptions<D> {
        &self.options
    }

    /// The grid-wide event service.
    pub fn event_service(&self) -> &Arc<EventService> {
        &self.event_service
    }

    /// The value service.
    pub fn value_service(&self) -> &Arc<dyn ValueService<D>> {
        &self.value_service
    }

    /// The row model view.
    pub fn row_model(&self) -> &Arc<dyn RowModelView<D>> {
        &self.row_model
    }
}
