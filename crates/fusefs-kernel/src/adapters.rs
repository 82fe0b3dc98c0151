//! Standard adapters between the host and provider calling conventions.
//!
//! Installed as the first before- and after-entries of their operation at
//! registry construction, ahead of anything a caller registers, and never
//! removable.
//!
//! | Operation                      | Before                                   | After                  |
//! |--------------------------------|------------------------------------------|------------------------|
//! | `utimens`                      | atime/mtime nanoseconds → seconds        |                        |
//! | `fgetattr` `ftruncate` `release` | drop the path                          |                        |
//! | `fsync`                        | keep only the descriptor                 |                        |
//! | `open`                         | flag bitmask → mode string               |                        |
//! | `create`                       | `(path, "w", mode)`                      |                        |
//! | `read` `write`                 | `(fd, buf, 0, len, pos)`                 | bytes-only on success  |

use async_trait::async_trait;
use fusefs_types::{Args, Value};

use crate::context::CallContext;
use crate::error::{FuseError, FuseResult};
use crate::flags::decode_flags;
use crate::intercept::{AfterCall, BeforeCall, Flow};
use crate::op::OpKind;

const NANOS_PER_SECOND: f64 = 1e9;

/// Built-in argument reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardBefore {
    /// `(path, atime_ns, mtime_ns)` → `(path, atime_s, mtime_s)`.
    NanosToSeconds,
    /// Drop the leading path, keep the rest.
    DropPath,
    /// `(path, fd, datasync)` → `(fd)`.
    IgnoreDatasync,
    /// `(path, flags)` → `(path, mode)`.
    DecodeOpenFlags,
    /// `(path, mode)` → `(path, "w", mode)`.
    CreateMode,
    /// `(path, fd, buf, len, pos)` → `(fd, buf, 0, len, pos)`.
    ZeroOffset,
}

impl StandardBefore {
    pub fn for_op(op: OpKind) -> Option<Self> {
        match op {
            OpKind::Utimens => Some(Self::NanosToSeconds),
            OpKind::Fgetattr | OpKind::Ftruncate | OpKind::Release => Some(Self::DropPath),
            OpKind::Fsync => Some(Self::IgnoreDatasync),
            OpKind::Open => Some(Self::DecodeOpenFlags),
            OpKind::Create => Some(Self::CreateMode),
            OpKind::Read | OpKind::Write => Some(Self::ZeroOffset),
            _ => None,
        }
    }

    /// Reshape `args` in place.
    pub fn apply(self, args: &mut Args) -> FuseResult<()> {
        match self {
            Self::NanosToSeconds => {
                let atime = seconds(args, 1)?;
                let mtime = seconds(args, 2)?;
                *args = vec![arg(args, 0), atime, mtime];
            }
            Self::DropPath => {
                if !args.is_empty() {
                    args.remove(0);
                }
            }
            Self::IgnoreDatasync => {
                *args = vec![arg(args, 1)];
            }
            Self::DecodeOpenFlags => {
                let flags = args.get(1).and_then(Value::as_i64).unwrap_or(0);
                *args = vec![arg(args, 0), Value::from(decode_flags(flags))];
            }
            Self::CreateMode => {
                *args = vec![arg(args, 0), Value::from("w"), arg(args, 1)];
            }
            Self::ZeroOffset => {
                *args = vec![
                    arg(args, 1),
                    arg(args, 2),
                    Value::Int(0),
                    arg(args, 3),
                    arg(args, 4),
                ];
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BeforeCall for StandardBefore {
    async fn before_call(&self, ctx: &mut CallContext) -> FuseResult<Flow> {
        self.apply(&mut ctx.args)?;
        Ok(Flow::Continue)
    }
}

/// Built-in result reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardAfter {
    /// On success, reduce the result tuple to the byte count alone.
    BytesReturn,
}

impl StandardAfter {
    pub fn for_op(op: OpKind) -> Option<Self> {
        match op {
            OpKind::Read | OpKind::Write => Some(Self::BytesReturn),
            _ => None,
        }
    }

    pub fn apply(self, ctx: &mut CallContext) {
        match self {
            Self::BytesReturn => {
                let Some(orig) = ctx.orig_results() else {
                    return;
                };
                if orig.first().is_some_and(Value::is_truthy) {
                    return;
                }
                let bytes = arg(orig, 1);
                ctx.set_results(vec![bytes]);
            }
        }
    }
}

#[async_trait]
impl AfterCall for StandardAfter {
    async fn after_call(&self, ctx: &mut CallContext) -> FuseResult<()> {
        self.apply(ctx);
        Ok(())
    }
}

fn arg(args: &[Value], ix: usize) -> Value {
    args.get(ix).cloned().unwrap_or_default()
}

fn seconds(args: &[Value], ix: usize) -> FuseResult<Value> {
    args.get(ix)
        .and_then(Value::as_f64)
        .map(|nanos| Value::Float(nanos / NANOS_PER_SECOND))
        .ok_or_else(|| FuseError::invalid_argument(format!("utimens: argument {ix} is not a number")))
}
