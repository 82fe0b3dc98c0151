//! Shared fixtures: tracing setup, recording providers, an in-memory
//! filesystem and a fake kernel bridge.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fusefs_kernel::{
    Args, Capabilities, CapabilityMethod, FuseError, FuseResult, HostBridge, HostOperations,
    MountOptions, Results, Value, capability_fn,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Recording providers
// ============================================================================

/// Every argument tuple a provider method was called with.
pub type CallLog = Arc<Mutex<Vec<Args>>>;

/// Provider method that records its arguments and replies with `reply`.
pub fn recording(reply: Results) -> (CapabilityMethod, CallLog) {
    let log = CallLog::default();
    let calls = log.clone();
    let method = capability_fn(move |args: Args| {
        calls.lock().push(args);
        let reply = reply.clone();
        async move {
            tokio::task::yield_now().await;
            Ok(reply)
        }
    });
    (method, log)
}

/// Last recorded argument tuple, if any.
pub fn last_call(log: &CallLog) -> Option<Args> {
    log.lock().last().cloned()
}

// ============================================================================
// In-memory filesystem
// ============================================================================

/// Directory-only filesystem keyed by absolute path.
#[derive(Debug)]
pub struct MemFs {
    dirs: Mutex<BTreeSet<String>>,
}

impl MemFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dirs: Mutex::new(BTreeSet::from(["/".to_string()])),
        })
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.dirs.lock().contains(path)
    }

    pub fn mkdir_sync(&self, path: &str) {
        self.dirs.lock().insert(path.to_string());
    }

    fn stat(&self, args: &Args) -> Results {
        if self.is_dir(&path_arg(args, 0)) {
            vec![Value::Null, Value::object([("kind", "dir")])]
        } else {
            vec![Value::from("ENOENT")]
        }
    }

    fn mkdir(&self, args: &Args) -> Results {
        if self.dirs.lock().insert(path_arg(args, 0)) {
            vec![Value::Null]
        } else {
            vec![Value::from("EEXIST")]
        }
    }

    fn rename(&self, args: &Args) -> Results {
        let mut dirs = self.dirs.lock();
        if dirs.remove(&path_arg(args, 0)) {
            dirs.insert(path_arg(args, 1));
            vec![Value::Null]
        } else {
            vec![Value::from("ENOENT")]
        }
    }

    pub fn capabilities(self: &Arc<Self>) -> Capabilities {
        let (stat, mkdir, rename) = (self.clone(), self.clone(), self.clone());
        Capabilities::default()
            .stat(move |args| {
                let fs = stat.clone();
                async move { Ok(fs.stat(&args)) }
            })
            .mkdir(move |args| {
                let fs = mkdir.clone();
                async move { Ok(fs.mkdir(&args)) }
            })
            .rename(move |args| {
                let fs = rename.clone();
                async move { Ok(fs.rename(&args)) }
            })
    }
}

fn path_arg(args: &Args, ix: usize) -> String {
    args.get(ix)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Fake kernel bridge
// ============================================================================

/// Bridge that keeps the handlers in memory and reports lifecycle
/// transitions from a spawned task, like a real kernel would.
#[derive(Default)]
pub struct FakeKernel {
    live: Mutex<Option<HostOperations>>,
    pub mounts: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

#[async_trait]
impl HostBridge for FakeKernel {
    async fn mount(
        &self,
        mount_point: &Path,
        ops: HostOperations,
        options: &MountOptions,
    ) -> FuseResult<()> {
        self.mounts
            .lock()
            .push((mount_point.to_path_buf(), options.mount_args()));
        let live = ops.clone();
        *self.live.lock() = Some(ops);
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            live.init();
        });
        Ok(())
    }

    async fn unmount(&self, _mount_point: &Path) -> FuseResult<()> {
        let ops = self.live.lock().take().ok_or(FuseError::NotMounted)?;
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            ops.destroy();
        });
        Ok(())
    }
}

impl FakeKernel {
    /// Issue a host call the way the kernel module would.
    pub async fn call(&self, name: &str, args: Args) -> Results {
        let Some(ops) = self.live.lock().clone() else {
            return vec![Value::from(-libc::ENOTCONN)];
        };
        let (tx, rx) = oneshot::channel();
        ops.dispatch(
            name,
            args,
            Box::new(move |results| {
                let _ = tx.send(results);
            }),
        )
        .await;
        rx.await.unwrap_or_default()
    }

    pub fn is_live(&self) -> bool {
        self.live.lock().is_some()
    }
}
