use crate::error::{ErrorKind, Result};
use crate::manifest::{MANIFEST, Manifest, ManifestEntry};
use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::instrument;
use zip::ZipArchive;
use zip::result::ZipError;

/// A database file extracted into a private scratch directory.
///
/// The directory and everything in it are removed when this value is
/// dropped. Removal is best-effort; failures are ignored.
#[derive(Debug)]
pub struct Extracted {
    scratch: TempDir,
    path: PathBuf,
    entry: ManifestEntry,
}

impl Extracted {
    /// Path of the extracted database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Numeric id the manifest assigns to the database.
    pub fn id(&self) -> u32 {
        self.entry.id
    }

    pub fn entry(&self) -> &ManifestEntry {
        &self.entry
    }

    /// The scratch directory holding the extracted files.
    pub fn scratch(&self) -> &Path {
        self.scratch.path()
    }

    /// Open the extracted database file for reading.
    pub fn open(&self) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path).or_raise(|| ErrorKind::Io)?))
    }
}

/// A backup archive: a zip file with a manifest naming its databases.
pub struct Archive<R> {
    zip: ZipArchive<R>,
}

impl Archive<BufReader<File>> {
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).or_raise(|| ErrorKind::Io)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArchive`] if the reader does not hold a zip archive.
    pub fn new(reader: R) -> Result<Self> {
        let zip = ZipArchive::new(reader).or_raise(|| ErrorKind::InvalidArchive)?;
        Ok(Self { zip })
    }

    /// Extract the manifest into `scratch` and parse it.
    pub fn manifest(&mut self, scratch: &Path) -> Result<Manifest> {
        let path = self.extract_entry(MANIFEST, scratch, ErrorKind::MissingManifest)?;
        let file = File::open(&path).or_raise(|| ErrorKind::Io)?;
        Manifest::parse(BufReader::new(file))
    }

    /// Resolve `name` through the manifest and extract that database into a
    /// fresh scratch directory.
    #[instrument(skip(self), fields(id, path))]
    pub fn extract(&mut self, name: &str) -> Result<Extracted> {
        let scratch = TempDir::with_prefix("ipdsms-").or_raise(|| ErrorKind::Io)?;
        let manifest = self.manifest(scratch.path())?;
        let entry = manifest.find(name)?;
        let span = tracing::Span::current();
        span.record("id", entry.id);
        span.record("path", entry.internal_path.as_str());
        let path = match self.zip.index_for_name(&entry.internal_path) {
            Some(_) => entry.internal_path.clone(),
            // Desktop software on Windows may store the entry with a backslash.
            None => entry.internal_path.replace('/', "\\"),
        };
        let path = self.extract_entry(&path, scratch.path(), ErrorKind::MissingEntry(entry.internal_path.clone()))?;
        tracing::debug!("database extracted");
        Ok(Extracted { scratch, path, entry })
    }

    /// Copy one entry to a flat file name inside `scratch`.
    fn extract_entry(&mut self, name: &str, scratch: &Path, missing: ErrorKind) -> Result<PathBuf> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => exn::bail!(missing),
            Err(err) => return Err(err).or_raise(|| ErrorKind::InvalidArchive),
        };
        let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let target = scratch.join(file_name);
        let mut output = File::create(&target).or_raise(|| ErrorKind::Io)?;
        std::io::copy(&mut entry, &mut output).or_raise(|| ErrorKind::Io)?;
        Ok(target)
    }
}

/// Open the archive at `path` and extract database `name`.
pub fn extract(path: impl AsRef<Path>, name: &str) -> Result<Extracted> {
    Archive::open_path(path)?.extract(name)
}
