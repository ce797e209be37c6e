use crate::directory::Directory;
use crate::error::Result;
use crate::header::Header;
use crate::records::Records;
use std::io::Read;
use tracing::instrument;

/// A container whose banner has been validated; the directory has not been read yet.
pub struct Container<R> {
    reader: R,
    header: Header,
}

impl<R: Read> Container<R> {
    /// Validate the banner and read the version/count block.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidHeader`](crate::error::ErrorKind::InvalidHeader) if
    /// the input does not start with [`MAGIC`](crate::MAGIC), however short it is.
    #[instrument(skip(reader), fields(version, databases))]
    pub fn open(mut reader: R) -> Result<Self> {
        let header = Header::read(&mut reader)?;
        let span = tracing::Span::current();
        span.record("version", header.version);
        span.record("databases", header.databases);
        Ok(Self { reader, header })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    /// Read the sub-database names, leaving the reader at the data region.
    #[instrument(skip(self), fields(databases = self.header.databases))]
    pub fn enumerate(mut self) -> Result<Catalog<R>> {
        let (directory, consumed) = Directory::read(&mut self.reader, self.header.databases)?;
        Ok(Catalog {
            reader: self.reader,
            header: self.header,
            directory,
            data_offset: Header::size() + consumed,
        })
    }
}

/// A container with its directory read, positioned at the data region.
pub struct Catalog<R> {
    reader: R,
    header: Header,
    directory: Directory,
    data_offset: u64,
}

impl<R: Read> Catalog<R> {
    pub fn header(&self) -> Header {
        self.header
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Byte offset at which the data region starts.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Stream the records owned by sub-database `owner`, consuming the catalog.
    pub fn records(self, owner: u32) -> Records<R> {
        Records::new(self.reader, Some(owner), self.data_offset)
    }

    /// Stream every record regardless of owner.
    pub fn all_records(self) -> Records<R> {
        Records::new(self.reader, None, self.data_offset)
    }
}
