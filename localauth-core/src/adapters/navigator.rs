//! Navigator that records redirects instead of performing them

use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::ports::Navigator;

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    last: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent redirect target, if any
    pub fn last_redirect(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, to: &str) -> Result<()> {
        let mut last = self
            .last
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        *last = Some(to.to_string());
        Ok(())
    }
}
