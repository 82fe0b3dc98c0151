//! One host operation and its invocation pipeline.

use std::sync::{Arc, Weak};

use fusefs_types::{Args, Results, Value};
use tracing::{Instrument, debug, trace};

use crate::adapters::{StandardAfter, StandardBefore};
use crate::chain::{Chain, Detach, Undo};
use crate::capability::CapabilityMethod;
use crate::context::CallContext;
use crate::errno::decode_error;
use crate::error::FuseResult;
use crate::intercept::{AfterCall, BeforeCall, Flow};
use crate::op::OpKind;

/// A supported host operation bound to its provider method.
///
/// Owns the before and after interceptor chains. Each call runs:
///
/// 1. before-interceptors in order, stopping at the first short-circuit
/// 2. the provider method, unless short-circuited
/// 3. errno decoding of a truthy error slot (provider results only)
/// 4. after-interceptors in order
///
/// Any interceptor or provider fault abandons the remaining steps and the
/// call resolves to `[errno]`.
pub struct Operation {
    op: OpKind,
    method: CapabilityMethod,
    before: Arc<Chain<dyn BeforeCall>>,
    after: Arc<Chain<dyn AfterCall>>,
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("op", &self.op)
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl Operation {
    /// Bind `op` to `method` and install its standard adapters.
    pub(crate) fn new(op: OpKind, method: CapabilityMethod) -> Self {
        let before = Arc::new(Chain::<dyn BeforeCall>::new());
        let after = Arc::new(Chain::<dyn AfterCall>::new());

        if let Some(adapter) = StandardBefore::for_op(op) {
            before.push(Arc::new(adapter));
        }
        if let Some(adapter) = StandardAfter::for_op(op) {
            after.push(Arc::new(adapter));
        }

        Self {
            op,
            method,
            before,
            after,
        }
    }

    pub fn kind(&self) -> OpKind {
        self.op
    }

    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    /// Append a before-interceptor.
    pub fn before_call(&self, hook: Arc<dyn BeforeCall>) -> Undo {
        let token = self.before.push(hook);
        let chain = Arc::downgrade(&self.before);
        let chain: Weak<dyn Detach> = chain;
        Undo::single(chain, token)
    }

    /// Append an after-interceptor.
    pub fn after_call(&self, hook: Arc<dyn AfterCall>) -> Undo {
        let token = self.after.push(hook);
        let chain = Arc::downgrade(&self.after);
        let chain: Weak<dyn Detach> = chain;
        Undo::single(chain, token)
    }

    /// Number of installed (before, after) interceptors, adapters included.
    pub fn interceptor_counts(&self) -> (usize, usize) {
        (self.before.len(), self.after.len())
    }

    /// Run the pipeline for one call.
    pub async fn invoke(&self, args: Args) -> Results {
        let span = tracing::debug_span!("fuse_op", op = self.name());
        async move {
            let mut ctx = CallContext::new(self.op, args);
            match self.run(&mut ctx).await {
                Ok(()) => ctx.into_results(),
                Err(err) => {
                    let code = err.errno();
                    debug!(%err, code, "call failed");
                    vec![Value::from(code)]
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, ctx: &mut CallContext) -> FuseResult<()> {
        let mut short_circuit = None;
        let before = self.before.snapshot();
        for entry in before.iter() {
            if let Flow::ShortCircuit(results) = entry.hook.before_call(ctx).await? {
                short_circuit = Some(results);
                break;
            }
        }

        let results = match short_circuit {
            Some(results) => {
                debug!("short-circuited before dispatch");
                ctx.set_orig_results(results.clone());
                results
            }
            None => {
                trace!(args = ctx.args.len(), "dispatch");
                let original = (self.method)(ctx.args.clone()).await?;
                ctx.set_orig_results(original.clone());
                decode_results(original)
            }
        };
        ctx.set_results(results);

        let after = self.after.snapshot();
        for entry in after.iter() {
            entry.hook.after_call(ctx).await?;
        }
        trace!("done");
        Ok(())
    }
}

/// Replace a truthy error slot with its numeric errno.
fn decode_results(mut results: Results) -> Results {
    if let Some(err) = results.first_mut() {
        if err.is_truthy() {
            *err = Value::from(decode_error(err));
        }
    }
    results
}
