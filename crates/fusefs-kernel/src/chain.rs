//! Copy-on-write interceptor chains and undo handles.
//!
//! A call iterates an `Arc` snapshot of its chain, so registration and
//! removal during that call swap in a fresh vector and leave the traversal
//! untouched. Entries are addressed by a per-chain token; removal by token
//! means a stale undo can never hit a later registration that happens to
//! occupy the same position.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

pub(crate) struct Entry<T: ?Sized> {
    token: u64,
    pub(crate) hook: Arc<T>,
}

impl<T: ?Sized> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            token: self.token,
            hook: Arc::clone(&self.hook),
        }
    }
}

struct ChainState<T: ?Sized> {
    next_token: u64,
    entries: Arc<Vec<Entry<T>>>,
}

/// Ordered interceptor list for one phase of one operation.
pub(crate) struct Chain<T: ?Sized> {
    state: RwLock<ChainState<T>>,
}

impl<T: ?Sized> Chain<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(ChainState {
                next_token: 0,
                entries: Arc::new(Vec::new()),
            }),
        }
    }

    /// Append an interceptor, returning its removal token.
    pub(crate) fn push(&self, hook: Arc<T>) -> u64 {
        let mut state = self.state.write();
        let token = state.next_token;
        state.next_token += 1;
        Arc::make_mut(&mut state.entries).push(Entry { token, hook });
        token
    }

    /// Remove the entry registered under `token`, if still present.
    pub(crate) fn remove(&self, token: u64) -> bool {
        let mut state = self.state.write();
        match state.entries.iter().position(|e| e.token == token) {
            Some(ix) => {
                Arc::make_mut(&mut state.entries).remove(ix);
                true
            }
            None => false,
        }
    }

    /// Current entries; unaffected by later mutation.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Entry<T>>> {
        Arc::clone(&self.state.read().entries)
    }

    pub(crate) fn len(&self) -> usize {
        self.state.read().entries.len()
    }
}

/// Type-erased removal, so one undo can span before and after chains.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, token: u64) -> bool;
}

impl<T: ?Sized + Send + Sync> Detach for Chain<T> {
    fn detach(&self, token: u64) -> bool {
        self.remove(token)
    }
}

struct Registration {
    chain: Weak<dyn Detach>,
    token: u64,
}

/// Handle that reverses one or more interceptor registrations.
///
/// The first [`Undo::undo`] detaches everything, newest first; later calls
/// from this handle or any clone are no-ops. Dropping the handle does not
/// detach anything.
#[derive(Clone, Default)]
pub struct Undo {
    registrations: Arc<Mutex<Vec<Registration>>>,
}

impl Undo {
    /// Handle with nothing to reverse.
    pub fn noop() -> Self {
        Self::default()
    }

    pub(crate) fn single(chain: Weak<dyn Detach>, token: u64) -> Self {
        Self {
            registrations: Arc::new(Mutex::new(vec![Registration { chain, token }])),
        }
    }

    /// Merge several handles into one, preserving registration order.
    ///
    /// Registrations move into the combined handle; the parts are spent.
    pub fn join(undos: impl IntoIterator<Item = Undo>) -> Self {
        let mut registrations = Vec::new();
        for undo in undos {
            registrations.append(&mut undo.registrations.lock());
        }
        Self {
            registrations: Arc::new(Mutex::new(registrations)),
        }
    }

    /// Reverse every registration still held, newest first.
    pub fn undo(&self) {
        let mut registrations = self.registrations.lock();
        for reg in registrations.drain(..).rev() {
            if let Some(chain) = reg.chain.upgrade() {
                chain.detach(reg.token);
            }
        }
    }

    /// Returns true if nothing is left to reverse.
    pub fn is_spent(&self) -> bool {
        self.registrations.lock().is_empty()
    }
}

impl std::fmt::Debug for Undo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Undo")
            .field("pending", &self.registrations.lock().len())
            .finish()
    }
}
