//! Mount front-end.
//!
//! `FuseFs` ties an [`Operations`] registry to a [`HostBridge`], the
//! native side that talks to the kernel module. The bridge receives the
//! host handlers together with lifecycle hooks; `mount` and `unmount`
//! resolve only once the bridge has reported the matching transition.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fusefs_types::{Args, Results};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::capability::Capabilities;
use crate::chain::Undo;
use crate::config::MountOptions;
use crate::context::CallContext;
use crate::error::{FuseError, FuseResult};
use crate::host::HostOperations;
use crate::intercept::{AfterCall, BeforeCall};
use crate::registry::Operations;

/// Native mount bridge.
///
/// `mount` must eventually call [`HostOperations::init`] and `unmount`
/// must eventually call [`HostOperations::destroy`] on the handlers it was
/// given.
#[async_trait]
pub trait HostBridge: Send + Sync {
    async fn mount(
        &self,
        mount_point: &Path,
        ops: HostOperations,
        options: &MountOptions,
    ) -> FuseResult<()>;

    async fn unmount(&self, mount_point: &Path) -> FuseResult<()>;
}

/// A capability provider mounted (or mountable) through a host bridge.
pub struct FuseFs {
    operations: Operations,
    options: MountOptions,
    bridge: Arc<dyn HostBridge>,
    state: Mutex<MountState>,
    mounted: Arc<watch::Sender<bool>>,
}

/// Where the front-end is in its mount lifecycle.
///
/// The transitional states are claimed under the lock before any bridge
/// call, so only one mount or unmount can be in flight at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum MountState {
    #[default]
    Idle,
    Mounting(PathBuf),
    Mounted(PathBuf),
    Unmounting(PathBuf),
}

impl FuseFs {
    pub fn new(caps: &Capabilities, bridge: Arc<dyn HostBridge>) -> Self {
        Self::with_options(caps, bridge, MountOptions::default())
    }

    pub fn with_options(
        caps: &Capabilities,
        bridge: Arc<dyn HostBridge>,
        options: MountOptions,
    ) -> Self {
        let (mounted, _) = watch::channel(false);
        Self {
            operations: Operations::new(caps),
            options,
            bridge,
            state: Mutex::new(MountState::Idle),
            mounted: Arc::new(mounted),
        }
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn options(&self) -> &MountOptions {
        &self.options
    }

    pub fn is_mounted(&self) -> bool {
        *self.mounted.borrow()
    }

    /// Path of the live mount, if any.
    pub fn mount_point(&self) -> Option<PathBuf> {
        match &*self.state.lock() {
            MountState::Mounted(path) => Some(path.clone()),
            _ => None,
        }
    }

    /// Mount at `mount_point`, resolving once the bridge reports init.
    pub async fn mount(&self, mount_point: impl AsRef<Path>) -> FuseResult<()> {
        let mount_point = mount_point.as_ref().to_path_buf();
        {
            let mut state = self.state.lock();
            match &*state {
                MountState::Idle => *state = MountState::Mounting(mount_point.clone()),
                MountState::Mounted(current) => {
                    return Err(FuseError::other(format!(
                        "already mounted at {}",
                        current.display()
                    )));
                }
                busy => {
                    return Err(FuseError::other(format!("mount busy: {busy:?}")));
                }
            }
        }

        let mut mounted = self.mounted.subscribe();
        let (on_init, on_destroy) = (Arc::clone(&self.mounted), Arc::clone(&self.mounted));
        let host = self.operations.host_operations().with_lifecycle(
            Arc::new(move || {
                on_init.send_replace(true);
            }),
            Arc::new(move || {
                on_destroy.send_replace(false);
            }),
        );

        debug!(mount_point = %mount_point.display(), ops = host.len(), "mounting");
        let result = match self.bridge.mount(&mount_point, host, &self.options).await {
            Ok(()) => wait_until(&mut mounted, true).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            *self.state.lock() = MountState::Idle;
            return Err(err);
        }

        info!(mount_point = %mount_point.display(), "mounted");
        *self.state.lock() = MountState::Mounted(mount_point);
        Ok(())
    }

    /// Unmount, resolving once the bridge reports destroy.
    pub async fn unmount(&self) -> FuseResult<()> {
        let mount_point = {
            let mut state = self.state.lock();
            match &*state {
                MountState::Mounted(path) => {
                    let path = path.clone();
                    *state = MountState::Unmounting(path.clone());
                    path
                }
                MountState::Idle => return Err(FuseError::NotMounted),
                busy => {
                    return Err(FuseError::other(format!("mount busy: {busy:?}")));
                }
            }
        };

        let mut mounted = self.mounted.subscribe();
        if let Err(err) = self.bridge.unmount(&mount_point).await {
            *self.state.lock() = MountState::Mounted(mount_point);
            return Err(err);
        }
        if let Err(err) = wait_until(&mut mounted, false).await {
            *self.state.lock() = MountState::Mounted(mount_point);
            return Err(err);
        }

        info!(mount_point = %mount_point.display(), "unmounted");
        *self.state.lock() = MountState::Idle;
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.operations.has(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.operations.names()
    }

    pub fn before_call(&self, name: &str, hook: Arc<dyn BeforeCall>) -> Undo {
        self.operations.before_call(name, hook)
    }

    pub fn after_call(&self, name: &str, hook: Arc<dyn AfterCall>) -> Undo {
        self.operations.after_call(name, hook)
    }

    pub fn before(&self, names: &[&str], hooks: &[Arc<dyn BeforeCall>]) -> Undo {
        self.operations.before(names, hooks)
    }

    pub fn after(&self, names: &[&str], hooks: &[Arc<dyn AfterCall>]) -> Undo {
        self.operations.after(names, hooks)
    }

    pub fn path_adjust<F>(&self, adjustor: F) -> Undo
    where
        F: Fn(&str, &str, usize) -> String + Send + Sync + 'static,
    {
        self.operations.path_adjust(adjustor)
    }

    pub fn on<F>(&self, name: &str, callback: F) -> Undo
    where
        F: Fn(&CallContext) + Send + Sync + 'static,
    {
        self.operations.on(name, callback)
    }

    pub async fn invoke(&self, name: &str, args: Args) -> Results {
        self.operations.invoke(name, args).await
    }
}

impl std::fmt::Debug for FuseFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuseFs")
            .field("operations", &self.operations.names())
            .field("options", &self.options)
            .field("mount_point", &self.mount_point())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

async fn wait_until(state: &mut watch::Receiver<bool>, target: bool) -> FuseResult<()> {
    let reached = state.wait_for(|mounted| *mounted == target).await.is_ok();
    if reached {
        Ok(())
    } else {
        Err(FuseError::other("mount state channel closed"))
    }
}
