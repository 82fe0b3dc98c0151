//! Mount configuration.
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! display_folder = "Scratch"
//! force = true
//! debug = false
//! options = ["allow_other", "noatime"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FuseError, FuseResult};

/// Options forwarded to the host bridge at mount time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountOptions {
    /// Volume name shown by the host's file browser.
    pub display_folder: Option<String>,
    /// Unmount a stale mount at the same point first.
    pub force: bool,
    /// Ask the host layer for debug output.
    pub debug: bool,
    /// Raw `-o` options passed through verbatim.
    pub options: Vec<String>,
}

impl MountOptions {
    pub fn from_toml_str(source: &str) -> FuseResult<Self> {
        toml::from_str(source).map_err(|e| FuseError::Config(format!("mount options: {e}")))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FuseResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Argument list for the host mount call.
    ///
    /// `force` is not rendered; bridges act on it directly.
    pub fn mount_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.debug {
            args.push("-d".to_string());
        }
        if let Some(name) = &self.display_folder {
            args.push("-o".to_string());
            args.push(format!("volname={name}"));
        }
        for opt in &self.options {
            args.push("-o".to_string());
            args.push(opt.clone());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let opts = MountOptions::from_toml_str("").unwrap();
        assert_eq!(opts, MountOptions::default());
        assert!(opts.mount_args().is_empty());
    }

    #[test]
    fn test_mount_args_order() {
        let opts = MountOptions::from_toml_str(
            r#"
            display_folder = "Scratch"
            force = true
            debug = true
            options = ["allow_other", "noatime"]
            "#,
        )
        .unwrap();
        assert!(opts.force);
        assert_eq!(
            opts.mount_args(),
            ["-d", "-o", "volname=Scratch", "-o", "allow_other", "-o", "noatime"]
        );
    }

    #[test]
    fn test_bad_toml() {
        let err = MountOptions::from_toml_str("debug = \"yes\"").unwrap_err();
        assert!(matches!(err, FuseError::Config(_)));
        assert_eq!(err.errno(), -1);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "options = [\"ro\"]").unwrap();
        let opts = MountOptions::load(file.path()).unwrap();
        assert_eq!(opts.mount_args(), ["-o", "ro"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MountOptions::load(dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(err.errno(), -i64::from(libc::ENOENT));
    }
}
