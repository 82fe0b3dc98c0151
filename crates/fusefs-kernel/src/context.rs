//! Per-call invocation context.

use fusefs_types::{Args, Results, Value};

use crate::op::OpKind;

/// State of one in-flight call.
///
/// Created when a call starts, owned exclusively by that call, dropped when
/// it finishes. Interceptors mutate `args` and the current results; the
/// original arguments and the original result tuple are frozen.
#[derive(Debug, Clone)]
pub struct CallContext {
    op: OpKind,
    /// Current arguments, reshaped in place by before-interceptors.
    pub args: Args,
    orig_args: Args,
    results: Option<Results>,
    orig_results: Option<Results>,
}

impl CallContext {
    /// Start a context for a call to `op`.
    pub fn new(op: OpKind, args: Args) -> Self {
        Self {
            op,
            orig_args: args.clone(),
            args,
            results: None,
            orig_results: None,
        }
    }

    pub fn op(&self) -> OpKind {
        self.op
    }

    /// Host operation name.
    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    /// Arguments exactly as the caller supplied them.
    pub fn orig_args(&self) -> &[Value] {
        &self.orig_args
    }

    /// Current result tuple. `None` until the before phase is over.
    pub fn results(&self) -> Option<&[Value]> {
        self.results.as_deref()
    }

    pub fn results_mut(&mut self) -> Option<&mut Results> {
        self.results.as_mut()
    }

    /// Replace the current result tuple wholesale.
    ///
    /// Only meaningful in the after phase; before-interceptors end a call
    /// early with [`Flow::ShortCircuit`](crate::Flow::ShortCircuit) instead.
    pub fn set_results(&mut self, results: Results) {
        self.results = Some(results);
    }

    /// Result tuple as first produced, before errno decoding.
    pub fn orig_results(&self) -> Option<&[Value]> {
        self.orig_results.as_deref()
    }

    pub(crate) fn set_orig_results(&mut self, results: Results) {
        self.orig_results = Some(results);
    }

    pub(crate) fn into_results(self) -> Results {
        self.results.unwrap_or_default()
    }
}
