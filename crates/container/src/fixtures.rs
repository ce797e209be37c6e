//! Builders for synthetic containers, for use in tests.

use crate::MAGIC;

/// Assembles a container byte-for-byte.
#[derive(Clone, Debug, Default)]
pub struct ContainerBuilder {
    version: u8,
    names: Vec<Vec<u8>>,
    records: Vec<(u8, Vec<u8>)>,
}

impl ContainerBuilder {
    pub fn new(version: u8) -> Self {
        Self { version, ..Self::default() }
    }

    /// Append a directory entry. Its index is the number of entries before it.
    pub fn database(mut self, name: &[u8]) -> Self {
        self.names.push(name.to_vec());
        self
    }

    /// Append a record frame with a raw payload.
    pub fn record(mut self, owner: u8, payload: &[u8]) -> Self {
        self.records.push((owner, payload.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[self.version, 0, self.names.len() as u8, 0]);
        for name in &self.names {
            bytes.extend_from_slice(&[name.len() as u8, 0]);
            bytes.extend_from_slice(name);
        }
        for (owner, payload) in &self.records {
            bytes.extend_from_slice(&[*owner, 0]);
            bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(payload);
        }
        bytes
    }
}

/// Assembles a record payload: sub-header, sequence counter, then fields.
#[derive(Clone, Debug, Default)]
pub struct RecordBuilder {
    fields: Vec<(u8, Vec<u8>)>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, kind: u8, data: &[u8]) -> Self {
        self.fields.push((kind, data.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // Handle, sub-version, unique id prefix, then the sequence counter.
        let mut bytes = vec![0x03, 0x01, 0x00, 0x2A, 0x00, 0x01, 0x00];
        for (kind, data) in &self.fields {
            bytes.extend_from_slice(&(data.len() as u16).to_le_bytes());
            bytes.push(*kind);
            bytes.extend_from_slice(data);
        }
        bytes
    }
}
