//! Signal/slot system for Horizon Grid.
//!
//! This module provides a type-safe, synchronous signal/slot mechanism used
//! for every notification the grid raises: per-row local events as well as
//! grid-wide events. Signals are emitted when state changes, and connected
//! slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Delivery
//!
//! Emission is synchronous: every slot runs on the emitting thread before
//! [`Signal::emit`] returns. Slots are invoked in the order they were
//! connected. The connection list is snapshotted before slots run, so a slot
//! may connect or disconnect other slots (or itself) without deadlocking;
//! such changes take effect from the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let row_count_changed = Signal::<usize>::new();
//!
//! let conn_id = row_count_changed.connect(|count| {
//!     println!("Row count is now {}", count);
//! });
//!
//! row_count_changed.emit(42);
//! row_count_changed.disconnect(conn_id);
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connection storage: slots keyed by id plus the order they were connected in.
struct Connections<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

impl<Args> Connections<Args> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    fn snapshot(&self) -> Vec<Slot<Args>> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(*id).cloned())
            .collect()
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a struct/tuple for richer payloads.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync` and can be shared between threads; slots
/// always run on the thread that emits.
pub struct Signal<Args> {
    connections: Mutex<Connections<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections::new()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_grid_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut connections = self.connections.lock();
        let id = connections.slots.insert(Arc::new(slot));
        connections.order.push(id);
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.try_disconnect(id).is_ok()
    }

    /// Disconnect a specific slot, reporting why it could not be removed.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        let mut connections = self.connections.lock();
        if connections.slots.remove(id).is_none() {
            return Err(SignalError::InvalidConnection);
        }
        connections.order.retain(|existing| *existing != id);
        Ok(())
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut connections = self.connections.lock();
        connections.slots.clear();
        connections.order.clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().slots.len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing. This is useful during
    /// batch updates to prevent cascading notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// If the signal is blocked, this does nothing.
    #[tracing::instrument(skip_all, target = "horizon_grid_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        // Release the lock before running slots so they may reconnect freely.
        let slots = self.connections.lock().snapshot();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }

    /// Connect a slot that is disconnected when the returned guard is dropped.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard { signal: self, id }
    }
}

/// Type-erased signal access.
///
/// This allows working with signals without knowing their argument type,
/// which is how a node's whole listener block can be torn down at once.
pub trait SignalEmitter: Send + Sync {
    /// Disconnect a connection by ID.
    fn disconnect(&self, id: ConnectionId) -> bool;

    /// Disconnect all connections.
    fn disconnect_all(&self);

    /// Get the number of connections.
    fn connection_count(&self) -> usize;

    /// Check if blocked.
    fn is_blocked(&self) -> bool;

    /// Set blocked state.
    fn set_blocked(&self, blocked: bool);

    /// Get this as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<Args: Send + 'static> SignalEmitter for Signal<Args> {
    fn disconnect(&self, id: ConnectionId) -> bool {
        Signal::disconnect(self, id)
    }

    fn disconnect_all(&self) {
        Signal::disconnect_all(self);
    }

    fn connection_count(&self) -> usize {
        Signal::connection_count(self)
    }

    fn is_blocked(&self) -> bool {
        Signal::is_blocked(self)
    }

    fn set_blocked(&self, blocked: bool) {
        Signal::set_blocked(self, blocked);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`]. The guard borrows the signal, so
/// the borrow checker guarantees the signal outlives it.
///
/// # Example
///
/// ```
/// use horizon_grid_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<i32>::new();
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43);
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<'a, Args: Send + 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: Send + 'static> ConnectionGuard<'_, Args> {
    /// The id of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: Send + 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        let _ = self.signal.disconnect(self.id);
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
