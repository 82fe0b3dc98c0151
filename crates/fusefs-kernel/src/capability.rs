//! Capability descriptor: the user-supplied filesystem methods.
//!
//! A provider fills in the methods it supports; absent fields mean the
//! corresponding host operations are not offered at all.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use fusefs_types::{Args, Results};
use tokio::sync::oneshot;

use crate::error::{FuseError, FuseResult};
use crate::op::OpKind;

/// Future returned by a capability method.
pub type CapabilityFuture = BoxFuture<'static, FuseResult<Results>>;

/// An asynchronous provider method.
///
/// `Ok` carries the provider's result tuple, error slot first. `Err` is a
/// provider fault and takes the pipeline's failure path.
pub type CapabilityMethod = Arc<dyn Fn(Args) -> CapabilityFuture + Send + Sync>;

/// Wrap an async closure as a [`CapabilityMethod`].
pub fn capability_fn<F, Fut>(f: F) -> CapabilityMethod
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FuseResult<Results>> + Send + 'static,
{
    Arc::new(move |args| -> CapabilityFuture { Box::pin(f(args)) })
}

/// One-shot completion handed to callback-style provider methods.
pub struct Completion(oneshot::Sender<Results>);

impl Completion {
    /// Deliver the result tuple.
    pub fn complete(self, results: Results) {
        // The receiver only goes away when the call itself was dropped.
        let _ = self.0.send(results);
    }
}

/// Adapt a callback-style provider method.
///
/// The function receives the positional arguments plus a [`Completion`] it
/// must invoke exactly once. Dropping the completion without invoking it
/// fails the call with [`FuseError::Abandoned`].
pub fn callback_method<F>(f: F) -> CapabilityMethod
where
    F: Fn(Args, Completion) + Send + Sync + 'static,
{
    Arc::new(move |args| -> CapabilityFuture {
        let (tx, rx) = oneshot::channel();
        f(args, Completion(tx));
        Box::pin(async move { rx.await.map_err(|_| FuseError::Abandoned) })
    })
}

macro_rules! capabilities {
    ($($method:ident),* $(,)?) => {
        /// Provider methods, one optional field per method name.
        ///
        /// Build with struct-literal syntax or the per-method setters:
        ///
        /// ```ignore
        /// let caps = Capabilities::default()
        ///     .stat(|args| async move { Ok(vec![Value::Null, stat_for(&args[0])]) })
        ///     .readdir(|_| async { Ok(vec![Value::Null, Value::List(vec![])]) });
        /// ```
        #[derive(Clone, Default)]
        pub struct Capabilities {
            $(pub $method: Option<CapabilityMethod>,)*
        }

        impl Capabilities {
            $(
                #[doc = concat!("Provide the `", stringify!($method), "` method.")]
                pub fn $method<F, Fut>(mut self, f: F) -> Self
                where
                    F: Fn(Args) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = FuseResult<Results>> + Send + 'static,
                {
                    self.$method = Some(capability_fn(f));
                    self
                }
            )*

            /// Look up a provider method by its provider-side name.
            pub fn by_name(&self, name: &str) -> Option<&CapabilityMethod> {
                match name {
                    $(stringify!($method) => self.$method.as_ref(),)*
                    _ => None,
                }
            }

            /// Provider-side names of the methods present.
            pub fn provided(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$method.is_some() {
                        names.push(stringify!($method));
                    }
                )*
                names
            }
        }
    };
}

capabilities!(
    stat, readdir, access, truncate, readlink, chown, chmod, unlink, mkdir, rmdir, rename, link,
    symlink, utimes, fstat, ftruncate, close, fsync, open, read, write,
);

impl Capabilities {
    /// The provider method backing a host operation, if present.
    pub fn method(&self, op: OpKind) -> Option<&CapabilityMethod> {
        self.by_name(op.capability_name())
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("provided", &self.provided())
            .finish()
    }
}
