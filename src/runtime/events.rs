//! View event stream payloads.

use crate::types::ProductId;

/// Which remote call a [`ViewEvent::RequestFailed`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Product list or search fetch.
    Refresh,
    /// Product creation.
    Create,
    /// Product deletion.
    Delete,
    /// Edit commit.
    Update,
    /// History log fetch.
    History,
}

/// Events emitted by the controller loop after a state change is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The local collection was replaced by a fetch result.
    ProductsReplaced {
        /// Number of products now held.
        count: usize,
    },
    /// A product was removed after the server confirmed deletion.
    ProductRemoved {
        /// Removed product id.
        id: ProductId,
    },
    /// The server created a product.
    ProductCreated {
        /// New product id.
        id: ProductId,
    },
    /// Search text changed and a debounced refresh is pending.
    SearchScheduled {
        /// Current search text.
        text: String,
    },
    /// A row entered edit mode.
    EditStarted {
        /// Product being edited.
        id: ProductId,
    },
    /// The server accepted an edit.
    EditCommitted {
        /// Edited product id.
        id: ProductId,
    },
    /// The edit in progress was discarded.
    EditCancelled,
    /// Add form visibility changed.
    AddFormToggled {
        /// Whether the form is now open.
        open: bool,
    },
    /// History sidebar opened with a freshly fetched log.
    HistoryOpened {
        /// Product whose log is shown.
        product_id: ProductId,
        /// Number of log entries.
        entries: usize,
    },
    /// History sidebar closed.
    HistoryClosed,
    /// CSV export was opened.
    ExportOpened {
        /// Export link.
        url: String,
    },
    /// A remote call failed; local state was left as it was.
    RequestFailed {
        /// Failed call.
        operation: Operation,
    },
}
