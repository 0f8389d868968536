//! Core primitives for Horizon Grid.
//!
//! This crate provides the foundational pieces shared by the grid's row model:
//!
//! - **Signal/Slot System**: Type-safe, synchronous publish/subscribe
//! - **Logging**: `tracing` targets, span names and tree formatting options
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let selection_changed = Signal::<usize>::new();
//!
//! let conn_id = selection_changed.connect(|count| {
//!     println!("{} rows changed selection", count);
//! });
//!
//! selection_changed.emit(3);
//! selection_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::SignalError;
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal, SignalEmitter};
