//! Operation registry and the interception registration API.

use std::collections::BTreeMap;
use std::sync::Arc;

use fusefs_types::{Args, Results, Value};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::capability::Capabilities;
use crate::chain::Undo;
use crate::context::CallContext;
use crate::errno::UNKNOWN_ERRNO;
use crate::hooks::{Observer, PathAdjust};
use crate::host::HostOperations;
use crate::intercept::{AfterCall, BeforeCall};
use crate::op::OpKind;
use crate::operation::Operation;

/// All operations a provider supports.
///
/// Built once from a [`Capabilities`] descriptor: an [`Operation`] exists
/// for every catalogue entry whose (possibly renamed) provider method is
/// present. Registration against an unsupported or unknown name is a no-op
/// that hands back [`Undo::noop`].
#[derive(Debug)]
pub struct Operations {
    ops: BTreeMap<OpKind, Arc<Operation>>,
}

impl Operations {
    pub fn new(caps: &Capabilities) -> Self {
        let ops: BTreeMap<_, _> = OpKind::iter()
            .filter_map(|op| {
                caps.method(op)
                    .map(|method| (op, Arc::new(Operation::new(op, Arc::clone(method)))))
            })
            .collect();
        debug!(
            supported = ops.len(),
            provided = ?caps.provided(),
            "built operation registry"
        );
        Self { ops }
    }

    /// Look up a supported operation by host name.
    pub fn get(&self, name: &str) -> Option<&Arc<Operation>> {
        let op = name.parse::<OpKind>().ok()?;
        self.ops.get(&op)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Supported operation names, in catalogue order.
    pub fn names(&self) -> Vec<&'static str> {
        self.ops.keys().map(|op| op.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Operation>> {
        self.ops.values()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Register a before-interceptor on one operation.
    pub fn before_call(&self, name: &str, hook: Arc<dyn BeforeCall>) -> Undo {
        match self.get(name) {
            Some(op) => op.before_call(hook),
            None => Undo::noop(),
        }
    }

    /// Register an after-interceptor on one operation.
    pub fn after_call(&self, name: &str, hook: Arc<dyn AfterCall>) -> Undo {
        match self.get(name) {
            Some(op) => op.after_call(hook),
            None => Undo::noop(),
        }
    }

    /// Register every hook on every named operation.
    ///
    /// Names are the outer loop, hooks the inner one. The combined undo
    /// reverses all of them, newest first.
    pub fn before(&self, names: &[&str], hooks: &[Arc<dyn BeforeCall>]) -> Undo {
        Undo::join(names.iter().flat_map(|name| {
            hooks
                .iter()
                .map(move |hook| self.before_call(name, Arc::clone(hook)))
        }))
    }

    /// Bulk form of [`Operations::after_call`].
    pub fn after(&self, names: &[&str], hooks: &[Arc<dyn AfterCall>]) -> Undo {
        Undo::join(names.iter().flat_map(|name| {
            hooks
                .iter()
                .map(move |hook| self.after_call(name, Arc::clone(hook)))
        }))
    }

    /// Rewrite path arguments of every path-taking operation.
    ///
    /// Single-path operations get argument 0 adjusted, dual-path operations
    /// (`rename`, `link`, `symlink`) arguments 0 and 1.
    pub fn path_adjust<F>(&self, adjustor: F) -> Undo
    where
        F: Fn(&str, &str, usize) -> String + Send + Sync + 'static,
    {
        let adjustor = Arc::new(adjustor);
        let mut undos = Vec::new();
        for op in OpKind::iter().filter(|op| op.path_arity() > 0) {
            let adjustor = Arc::clone(&adjustor);
            let hook = PathAdjust::new(
                move |path: &str, name: &str, ix| adjustor(path, name, ix),
                op.path_arity(),
            );
            undos.push(self.before_call(op.name(), Arc::new(hook)));
        }
        Undo::join(undos)
    }

    /// Observe completed calls of one operation.
    pub fn on<F>(&self, name: &str, callback: F) -> Undo
    where
        F: Fn(&CallContext) + Send + Sync + 'static,
    {
        self.after_call(name, Arc::new(Observer(callback)))
    }

    /// Invoke an operation directly. Unknown names resolve to `[-1]`.
    pub async fn invoke(&self, name: &str, args: Args) -> Results {
        match self.get(name) {
            Some(op) => op.invoke(args).await,
            None => {
                debug!(name, "invoke of unsupported operation");
                vec![Value::from(UNKNOWN_ERRNO)]
            }
        }
    }

    /// Handlers for the host bridge, one per supported operation.
    pub fn host_operations(&self) -> HostOperations {
        HostOperations::new(self.iter().cloned())
    }
}
