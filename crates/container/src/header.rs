use crate::error::{ErrorKind, Result};
use crate::util::{fill, fill_exact};
use std::io::Read;

/// Banner every IPD container starts with, newline included.
pub const MAGIC: &[u8; 38] = b"Inter@ctive Pager Backup/Restore File\n";
/// Length of the version/count block that follows the banner.
const INFO_LEN: usize = 4;

/// The fixed-size block at the start of a container.
///
/// A zero in either field means the file is not a container the reader
/// recognises, even though the banner matched; see [`is_recognized`](Self::is_recognized).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Format version, byte 0 of the info block.
    pub version: u8,
    /// Number of sub-database names in the directory, byte 2 of the info block.
    pub databases: u8,
}

impl Header {
    /// Both fields must be non-zero for the container to be usable.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.version != 0 && self.databases != 0
    }

    /// Validate the banner and read the info block, leaving `reader`
    /// positioned at the start of the directory.
    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut banner = [0u8; MAGIC.len()];
        let read = fill(reader, &mut banner)?;
        if read < banner.len() || &banner != MAGIC {
            exn::bail!(ErrorKind::InvalidHeader);
        }
        let mut info = [0u8; INFO_LEN];
        fill_exact(reader, &mut info, "header")?;
        // Bytes 1 and 3 are reserved; whatever they hold is ignored.
        Ok(Self { version: info[0], databases: info[2] })
    }

    /// Size in bytes of the banner plus the info block.
    pub(crate) const fn size() -> u64 {
        (MAGIC.len() + INFO_LEN) as u64
    }
}

/// Returns `true` if `bytes` start with the IPD banner.
///
/// Useful for sniffing an input before committing to a full parse.
#[must_use]
pub fn check_magic_bytes(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}
