use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What kind of backup a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A bare IPD container (`.ipd`, or `.dat` inside an archive).
    Container,
    /// A BlackBerry Desktop zip archive (`.bbb`).
    Archive,
}

impl InputKind {
    /// Detect the input kind from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "bbb" => Some(InputKind::Archive),
                "ipd" | "dat" => Some(InputKind::Container),
                _ => None,
            })
    }

    /// Detect the input kind from its leading bytes.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if ipdsms_archive::check_magic_bytes(bytes) {
            return Some(InputKind::Archive);
        }
        if ipdsms_container::check_magic_bytes(bytes) {
            return Some(InputKind::Container);
        }
        None
    }

    /// Detect by extension, falling back to the file's leading bytes.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Format`] if neither identifies a backup.
    pub fn detect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(kind) = Self::from_path(path) {
            return Ok(kind);
        }
        let mut head = Vec::with_capacity(ipdsms_container::MAGIC.len());
        File::open(path)
            .or_raise(|| ErrorKind::Io)?
            .take(ipdsms_container::MAGIC.len() as u64)
            .read_to_end(&mut head)
            .or_raise(|| ErrorKind::Io)?;
        Self::from_magic_bytes(&head)
            .ok_or_raise(|| ErrorKind::Format(format!("unrecognized input: {}", path.display())))
    }
}
