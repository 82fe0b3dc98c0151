//! # fusefs-kernel
//!
//! Adapts a callback-style filesystem provider to a FUSE-like host protocol.
//!
//! Every host operation runs through an invocation pipeline:
//! - Standard adapters reshape arguments into the provider's convention
//! - Caller-registered before-interceptors may rewrite arguments or
//!   short-circuit with a final result
//! - The provider method is dispatched and its error slot decoded to errno
//! - After-interceptors may rewrite the result tuple
//!
//! Interceptor chains can be edited at any time, including while calls are
//! in flight; each registration returns an [`Undo`] handle.

pub mod adapters;
pub mod capability;
pub mod chain;
pub mod config;
pub mod context;
pub mod errno;
pub mod error;
pub mod flags;
pub mod fuse_fs;
pub mod hooks;
pub mod host;
pub mod intercept;
pub mod op;
pub mod operation;
pub mod registry;

pub use capability::{
    Capabilities, CapabilityFuture, CapabilityMethod, Completion, callback_method, capability_fn,
};
pub use chain::Undo;
pub use config::MountOptions;
pub use context::CallContext;
pub use errno::{UNKNOWN_ERRNO, decode_error, errno_of};
pub use error::{FuseError, FuseResult};
pub use flags::decode_flags;
pub use fuse_fs::{FuseFs, HostBridge};
pub use hooks::{Observer, PathAdjust};
pub use host::{HostHandler, HostOperations, HostReply, LifecycleHook};
pub use intercept::{
    AfterCall, AfterFuture, BeforeCall, BeforeFuture, Flow, after_fn, before_fn,
};
pub use op::OpKind;
pub use operation::Operation;
pub use registry::Operations;

pub use fusefs_types::{Args, Buffer, Results, Value};
