use crate::error::Result;
use crate::util::fill_exact;
use std::borrow::Cow;
use std::io::Read;

/// A named table inside the container.
///
/// Names are kept as raw bytes; the device writes them with a trailing NUL
/// (e.g. `b"SMS Messages\0"`) and lookups must match that byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubDatabase {
    index: u32,
    name: Vec<u8>,
}

impl SubDatabase {
    /// Position in the directory, which is also the owner id its records carry.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Raw name bytes, terminator included.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Name for displaying to a user: cut at the first NUL and lossily decoded.
    pub fn display_name(&self) -> Cow<'_, str> {
        let end = memchr::memchr(0, &self.name).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end])
    }
}

/// The ordered list of sub-database names following the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<SubDatabase>,
}

impl Directory {
    /// Read `count` length-prefixed names. Returns the directory and the
    /// number of bytes consumed.
    pub(crate) fn read<R: Read>(reader: &mut R, count: u8) -> Result<(Self, u64)> {
        let mut entries = Vec::with_capacity(usize::from(count));
        let mut consumed = 0u64;
        for index in 0..u32::from(count) {
            let mut prefix = [0u8; 2];
            fill_exact(reader, &mut prefix, "directory")?;
            // Only the low byte is significant; names are never longer than 255 bytes.
            let mut name = vec![0u8; usize::from(prefix[0])];
            fill_exact(reader, &mut name, "directory")?;
            consumed += 2 + name.len() as u64;
            tracing::trace!(index, name = %String::from_utf8_lossy(&name).escape_debug(), "directory entry");
            entries.push(SubDatabase { index, name });
        }
        Ok((Self { entries }, consumed))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubDatabase> {
        self.entries.iter()
    }

    pub fn get(&self, index: u32) -> Option<&SubDatabase> {
        self.entries.get(usize::try_from(index).ok()?)
    }

    /// Find the first sub-database whose name equals `name` exactly.
    pub fn find(&self, name: impl AsRef<[u8]>) -> Option<&SubDatabase> {
        let name = name.as_ref();
        self.entries.iter().find(|entry| entry.name == name)
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a SubDatabase;
    type IntoIter = std::slice::Iter<'a, SubDatabase>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
