//! The fixed catalogue of host filesystem operations.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// One host filesystem verb.
///
/// String forms are the host protocol's operation names (`"getattr"`,
/// `"fgetattr"`, ...). Variant order is catalogue order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum OpKind {
    Getattr,
    Readdir,
    Access,
    Truncate,
    Readlink,
    Chown,
    Chmod,
    Unlink,
    Mkdir,
    Rmdir,
    Rename,
    Link,
    Symlink,
    Utimens,
    Fgetattr,
    Ftruncate,
    Release,
    Fsync,
    Open,
    Create,
    Read,
    Write,
}

impl OpKind {
    /// Host protocol name.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Name of the capability provider method backing this operation.
    pub fn capability_name(self) -> &'static str {
        match self {
            OpKind::Getattr => "stat",
            OpKind::Utimens => "utimes",
            OpKind::Fgetattr => "fstat",
            OpKind::Release => "close",
            OpKind::Create => "open",
            other => other.name(),
        }
    }

    /// Number of leading path arguments that reach the provider.
    ///
    /// Descriptor operations report 0: the host sends a path, but the
    /// standard adapters drop it.
    pub fn path_arity(self) -> usize {
        match self {
            OpKind::Getattr
            | OpKind::Readdir
            | OpKind::Access
            | OpKind::Truncate
            | OpKind::Readlink
            | OpKind::Chown
            | OpKind::Chmod
            | OpKind::Unlink
            | OpKind::Mkdir
            | OpKind::Rmdir
            | OpKind::Utimens
            | OpKind::Open
            | OpKind::Create => 1,
            OpKind::Rename | OpKind::Link | OpKind::Symlink => 2,
            OpKind::Fgetattr
            | OpKind::Ftruncate
            | OpKind::Release
            | OpKind::Fsync
            | OpKind::Read
            | OpKind::Write => 0,
        }
    }
}
