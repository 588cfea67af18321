use super::error::EditorError;
use std::sync::{Arc, Mutex};

/// Surfaces failed actions to the user.
pub trait Notifier: Send {
    fn notify(&mut self, error: &EditorError);
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, error: &EditorError) {
        log::warn!("[editor] {error}");
    }
}

/// Keeps every notification; cloning shares the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<EditorError>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<EditorError> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<EditorError> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, error: &EditorError) {
        log::warn!("[editor] {error}");
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(error.clone());
        }
    }
}
