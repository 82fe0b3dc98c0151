//! Interceptor traits.
//!
//! Before-interceptors run ahead of the provider call and may reshape
//! arguments or end the call early; after-interceptors see the (decoded)
//! result tuple and may rewrite it.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use fusefs_types::Results;

use crate::context::CallContext;
use crate::error::FuseResult;

/// Outcome of a before-interceptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Run the next interceptor, then the provider.
    Continue,
    /// Skip the remaining before-interceptors and the provider call; this
    /// tuple becomes both the current and the original result.
    ShortCircuit(Results),
}

/// Logic run before the provider call.
#[async_trait]
pub trait BeforeCall: Send + Sync {
    async fn before_call(&self, ctx: &mut CallContext) -> FuseResult<Flow>;
}

/// Logic run after the provider call.
#[async_trait]
pub trait AfterCall: Send + Sync {
    async fn after_call(&self, ctx: &mut CallContext) -> FuseResult<()>;
}

/// Future returned by closure before-interceptors.
pub type BeforeFuture<'a> = BoxFuture<'a, FuseResult<Flow>>;

/// Future returned by closure after-interceptors.
pub type AfterFuture<'a> = BoxFuture<'a, FuseResult<()>>;

struct BeforeFn<F>(F);

#[async_trait]
impl<F> BeforeCall for BeforeFn<F>
where
    F: for<'a> Fn(&'a mut CallContext) -> BeforeFuture<'a> + Send + Sync,
{
    async fn before_call(&self, ctx: &mut CallContext) -> FuseResult<Flow> {
        (self.0)(ctx).await
    }
}

struct AfterFn<F>(F);

#[async_trait]
impl<F> AfterCall for AfterFn<F>
where
    F: for<'a> Fn(&'a mut CallContext) -> AfterFuture<'a> + Send + Sync,
{
    async fn after_call(&self, ctx: &mut CallContext) -> FuseResult<()> {
        (self.0)(ctx).await
    }
}

/// Wrap a closure as a before-interceptor.
///
/// ```ignore
/// let hook = before_fn(|ctx| Box::pin(async move {
///     ctx.args[0] = Value::from("/redirected");
///     Ok(Flow::Continue)
/// }));
/// ```
pub fn before_fn<F>(f: F) -> Arc<dyn BeforeCall>
where
    F: for<'a> Fn(&'a mut CallContext) -> BeforeFuture<'a> + Send + Sync + 'static,
{
    Arc::new(BeforeFn(f))
}

/// Wrap a closure as an after-interceptor.
pub fn after_fn<F>(f: F) -> Arc<dyn AfterCall>
where
    F: for<'a> Fn(&'a mut CallContext) -> AfterFuture<'a> + Send + Sync + 'static,
{
    Arc::new(AfterFn(f))
}
