//! Host protocol handlers.
//!
//! The host bridge speaks a callback convention: each handler receives the
//! positional arguments and a reply it must call exactly once with the
//! decoded result tuple, error code first. This module adapts the
//! pipeline's `Results`-returning operations to that shape.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use fusefs_types::{Args, Results, Value};

use crate::errno::UNKNOWN_ERRNO;
use crate::operation::Operation;

/// Reply callback passed to a host handler.
pub type HostReply = Box<dyn FnOnce(Results) + Send>;

/// One host-facing operation handler.
pub type HostHandler = Arc<dyn Fn(Args, HostReply) -> BoxFuture<'static, ()> + Send + Sync>;

/// Mount lifecycle notification.
pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;

/// The `{name -> handler}` mapping handed to a host bridge.
#[derive(Clone, Default)]
pub struct HostOperations {
    handlers: BTreeMap<&'static str, HostHandler>,
    init: Option<LifecycleHook>,
    destroy: Option<LifecycleHook>,
}

impl HostOperations {
    pub(crate) fn new(ops: impl IntoIterator<Item = Arc<Operation>>) -> Self {
        let handlers = ops
            .into_iter()
            .map(|op| (op.name(), handler_for(op)))
            .collect();
        Self {
            handlers,
            init: None,
            destroy: None,
        }
    }

    /// Attach mount lifecycle hooks.
    pub fn with_lifecycle(mut self, init: LifecycleHook, destroy: LifecycleHook) -> Self {
        self.init = Some(init);
        self.destroy = Some(destroy);
        self
    }

    pub fn handler(&self, name: &str) -> Option<&HostHandler> {
        self.handlers.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `name`, replying `[-1]` if there is none.
    pub async fn dispatch(&self, name: &str, args: Args, reply: HostReply) {
        match self.handlers.get(name) {
            Some(handler) => handler(args, reply).await,
            None => reply(vec![Value::from(UNKNOWN_ERRNO)]),
        }
    }

    /// Called by the bridge once the filesystem is live.
    pub fn init(&self) {
        if let Some(hook) = &self.init {
            hook();
        }
    }

    /// Called by the bridge once the filesystem is gone.
    pub fn destroy(&self) {
        if let Some(hook) = &self.destroy {
            hook();
        }
    }
}

impl fmt::Debug for HostOperations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostOperations")
            .field("handlers", &self.names())
            .field("lifecycle", &self.init.is_some())
            .finish()
    }
}

fn handler_for(op: Arc<Operation>) -> HostHandler {
    Arc::new(move |args: Args, reply: HostReply| -> BoxFuture<'static, ()> {
        let op = Arc::clone(&op);
        Box::pin(async move { reply(op.invoke(args).await) })
    })
}
