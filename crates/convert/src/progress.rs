use crate::error::{ErrorKind, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// Milestones reported while a conversion runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The container header was read.
    Opened { version: u8, databases: u8 },
    /// The message sub-database was resolved to an owner id.
    DatabaseLocated { id: u32 },
    /// Records read so far, including those of other sub-databases.
    RecordsProcessed(u64),
    /// The document was written with this many messages.
    Exported { messages: usize },
}

/// Progress reporting and cooperative cancellation for a conversion.
///
/// Sending never blocks; a dropped receiver is ignored. The cancel flag is
/// checked between records.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    sender: Option<Sender<Event>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender(mut self, sender: Sender<Event>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn emit(&self, event: Event) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            tracing::debug!("cancellation requested");
            exn::bail!(ErrorKind::Cancelled);
        }
        Ok(())
    }
}
