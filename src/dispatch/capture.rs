use std::sync::Arc;

use parking_lot::Mutex;

use crate::Document;

/// Holds the last command document a capturing rule matched.
///
/// Clones share one cell, so a test keeps a clone and hands another to the
/// dispatcher. Separate slots never see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct CaptureSlot {
    cell: Arc<Mutex<Option<Document>>>,
}

impl CaptureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites whatever was captured before.
    pub fn set(
        &self,
        document: Document,
    ) {
        *self.cell.lock() = Some(document);
    }

    /// Latest captured document, or `None` if no rule has matched yet.
    pub fn get(&self) -> Option<Document> {
        self.cell.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.cell.lock().is_some()
    }

    pub fn clear(&self) {
        self.cell.lock().take();
    }
}
