//! Ready-made interceptors: path rewriting and call observers.

use async_trait::async_trait;
use fusefs_types::Value;

use crate::context::CallContext;
use crate::error::FuseResult;
use crate::intercept::{AfterCall, BeforeCall, Flow};

/// Rewrites the leading path arguments of a call.
///
/// The adjustor gets `(path, op name, argument index)` and returns the
/// replacement. Non-string arguments are left alone.
pub struct PathAdjust<F> {
    adjustor: F,
    paths: usize,
}

impl<F> PathAdjust<F>
where
    F: Fn(&str, &str, usize) -> String + Send + Sync,
{
    pub fn new(adjustor: F, paths: usize) -> Self {
        Self { adjustor, paths }
    }

    fn adjust(&self, ctx: &mut CallContext) {
        let name = ctx.name();
        for (ix, arg) in ctx.args.iter_mut().take(self.paths).enumerate() {
            if let Value::Str(path) = arg {
                *path = (self.adjustor)(path, name, ix);
            }
        }
    }
}

#[async_trait]
impl<F> BeforeCall for PathAdjust<F>
where
    F: Fn(&str, &str, usize) -> String + Send + Sync,
{
    async fn before_call(&self, ctx: &mut CallContext) -> FuseResult<Flow> {
        self.adjust(ctx);
        Ok(Flow::Continue)
    }
}

/// Read-only after-interceptor that reports each completed call.
pub struct Observer<F>(pub F);

#[async_trait]
impl<F> AfterCall for Observer<F>
where
    F: Fn(&CallContext) + Send + Sync,
{
    async fn after_call(&self, ctx: &mut CallContext) -> FuseResult<()> {
        (self.0)(ctx);
        Ok(())
    }
}
