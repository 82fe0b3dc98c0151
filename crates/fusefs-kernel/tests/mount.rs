//! Mount lifecycle and interception through a fake kernel bridge.

mod common;

use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use common::{FakeKernel, MemFs, init_tracing};
use futures::poll;
use fusefs_kernel::{Flow, FuseError, FuseFs, MountOptions, Value, after_fn, before_fn};
use parking_lot::Mutex;

const MOUNT: &str = "/mnt/sandbox";

struct Harness {
    kernel: Arc<FakeKernel>,
    mem: Arc<MemFs>,
    fs: FuseFs,
}

async fn mounted() -> Harness {
    init_tracing();
    let kernel = Arc::new(FakeKernel::default());
    let mem = MemFs::new();
    let fs = FuseFs::new(&mem.capabilities(), kernel.clone());
    fs.mount(MOUNT).await.expect("mount");
    Harness { kernel, mem, fs }
}

async fn mkdir(h: &Harness, path: &str) -> Vec<Value> {
    h.kernel
        .call("mkdir", vec![Value::from(path), Value::Int(0o755)])
        .await
}

#[tokio::test]
async fn mount_and_unmount() {
    let h = mounted().await;
    assert!(h.fs.is_mounted());
    assert!(h.kernel.is_live());
    assert_eq!(h.fs.mount_point(), Some(PathBuf::from(MOUNT)));

    h.fs.unmount().await.unwrap();
    assert!(!h.fs.is_mounted());
    assert!(!h.kernel.is_live());

    assert!(matches!(h.fs.unmount().await, Err(FuseError::NotMounted)));
}

#[tokio::test]
async fn remount_after_unmount() {
    let h = mounted().await;
    h.fs.unmount().await.unwrap();
    h.fs.mount("/mnt/again").await.unwrap();
    assert!(h.fs.is_mounted());
    assert_eq!(h.kernel.mounts.lock().len(), 2);
}

#[tokio::test]
async fn concurrent_mounts_claim_one_slot() {
    init_tracing();
    let kernel = Arc::new(FakeKernel::default());
    let fs = FuseFs::new(&MemFs::new().capabilities(), kernel.clone());

    // First mount is handed to the kernel but not yet live.
    let mut first = pin!(fs.mount("/mnt/a"));
    assert!(poll!(first.as_mut()).is_pending());

    let second = fs.mount("/mnt/b").await;
    assert!(matches!(second, Err(FuseError::Other(_))));
    first.await.unwrap();

    assert_eq!(kernel.mounts.lock().len(), 1);
    assert_eq!(fs.mount_point(), Some(PathBuf::from("/mnt/a")));

    fs.unmount().await.unwrap();
    assert!(!kernel.is_live());
    assert!(matches!(fs.unmount().await, Err(FuseError::NotMounted)));
}

#[tokio::test]
async fn joined_mounts_leave_one_live() {
    let kernel = Arc::new(FakeKernel::default());
    let fs = FuseFs::new(&MemFs::new().capabilities(), kernel.clone());

    let (a, b) = tokio::join!(fs.mount("/mnt/a"), fs.mount("/mnt/b"));
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert_eq!(kernel.mounts.lock().len(), 1);
    assert!(fs.mount_point().is_some());
}

#[tokio::test]
async fn unmount_while_mounting_is_refused() {
    let kernel = Arc::new(FakeKernel::default());
    let fs = FuseFs::new(&MemFs::new().capabilities(), kernel.clone());

    let mut mounting = pin!(fs.mount(MOUNT));
    assert!(poll!(mounting.as_mut()).is_pending());
    assert!(matches!(fs.unmount().await, Err(FuseError::Other(_))));

    mounting.await.unwrap();
    assert!(fs.is_mounted());
}

#[tokio::test]
async fn options_reach_the_bridge() {
    let kernel = Arc::new(FakeKernel::default());
    let options = MountOptions::from_toml_str(
        r#"
        display_folder = "Sandbox"
        options = ["allow_other"]
        "#,
    )
    .unwrap();
    let fs = FuseFs::with_options(&MemFs::new().capabilities(), kernel.clone(), options);
    fs.mount(MOUNT).await.unwrap();

    let mounts = kernel.mounts.lock();
    assert_eq!(mounts[0].0, PathBuf::from(MOUNT));
    assert_eq!(mounts[0].1, ["-o", "volname=Sandbox", "-o", "allow_other"]);
}

#[tokio::test]
async fn basic_file_access() {
    let h = mounted().await;
    assert_eq!(mkdir(&h, "/foo").await, vec![Value::Null]);
    assert!(h.mem.is_dir("/foo"));

    assert_eq!(mkdir(&h, "/foo").await, vec![Value::from(-libc::EEXIST)]);
    assert_eq!(
        h.kernel.call("getattr", vec![Value::from("/nope")]).await,
        vec![Value::from(-libc::ENOENT)]
    );
    assert_eq!(
        h.kernel.call("write", vec![Value::from("/foo")]).await,
        vec![Value::Int(-1)]
    );
}

#[tokio::test]
async fn before_call_sees_arguments_only() {
    let h = mounted().await;
    let count = Arc::new(Mutex::new(0));
    let seen = count.clone();
    h.fs.before_call(
        "mkdir",
        before_fn(move |ctx| {
            assert_eq!(ctx.name(), "mkdir");
            assert_eq!(ctx.args[0], Value::from("/foo"));
            assert!(ctx.results().is_none());
            *seen.lock() += 1;
            Box::pin(async { Ok(Flow::Continue) })
        }),
    );

    mkdir(&h, "/foo").await;
    assert_eq!(*count.lock(), 1);
    assert!(h.mem.is_dir("/foo"));
}

#[tokio::test]
async fn after_call_sees_results() {
    let h = mounted().await;
    let count = Arc::new(Mutex::new(0));
    let seen = count.clone();
    h.fs.after_call(
        "mkdir",
        after_fn(move |ctx| {
            assert_eq!(ctx.name(), "mkdir");
            assert_eq!(ctx.args[0], Value::from("/foo"));
            assert!(ctx.results().is_some_and(|r| !r[0].is_truthy()));
            *seen.lock() += 1;
            Box::pin(async { Ok(()) })
        }),
    );

    mkdir(&h, "/foo").await;
    assert_eq!(*count.lock(), 1);
    assert!(h.mem.is_dir("/foo"));
}

#[tokio::test]
async fn path_adjust() {
    let h = mounted().await;
    h.mem.mkdir_sync("/foo");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    let undo = h.fs.path_adjust(move |path, name, index| {
        if name != "getattr" {
            log.lock().push((path.to_string(), name.to_string(), index));
        }
        format!("/foo{path}")
    });

    mkdir(&h, "/bar").await;
    assert!(h.mem.is_dir("/foo/bar"));
    assert_eq!(
        calls.lock().drain(..).collect::<Vec<_>>(),
        vec![("/bar".to_string(), "mkdir".to_string(), 0)]
    );

    let renamed = h
        .kernel
        .call("rename", vec![Value::from("/bar"), Value::from("/baz")])
        .await;
    assert_eq!(renamed, vec![Value::Null]);
    assert!(h.mem.is_dir("/foo/baz"));
    assert_eq!(
        *calls.lock(),
        vec![
            ("/bar".to_string(), "rename".to_string(), 0),
            ("/baz".to_string(), "rename".to_string(), 1),
        ]
    );

    undo.undo();
    mkdir(&h, "/qux").await;
    assert!(h.mem.is_dir("/qux"));
}

#[tokio::test]
async fn on_observes_until_undone() {
    let h = mounted().await;
    let calls = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    let undo = h.fs.on("mkdir", move |ctx| {
        log.lock().push(ctx.args[0].clone());
    });

    mkdir(&h, "/foo").await;
    assert!(h.mem.is_dir("/foo"));
    assert_eq!(*calls.lock(), vec![Value::from("/foo")]);

    undo.undo();
    calls.lock().clear();
    mkdir(&h, "/bar").await;
    assert!(h.mem.is_dir("/bar"));
    assert!(calls.lock().is_empty());
}

#[tokio::test]
async fn interceptors_survive_remount() {
    let h = mounted().await;
    h.fs.before_call(
        "getattr",
        before_fn(|_| Box::pin(async { Ok(Flow::ShortCircuit(vec![Value::Null, Value::Int(7)])) })),
    );
    h.fs.unmount().await.unwrap();
    h.fs.mount(MOUNT).await.unwrap();

    assert_eq!(
        h.kernel.call("getattr", vec![Value::from("/anything")]).await,
        vec![Value::Null, Value::Int(7)]
    );
}
