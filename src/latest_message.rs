use tokio::sync::watch;

/// Publisher side of the "latest message" slot shared with sibling views.
///
/// Cloning the slot clones the publisher; every clone writes the same value.
#[derive(Debug, Clone)]
pub struct LatestMessage {
    tx: watch::Sender<String>,
}

impl LatestMessage {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx }
    }

    /// Replaces the current text. Works with or without subscribers.
    pub fn publish(&self, text: impl Into<String>) {
        self.tx.send_replace(text.into());
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for LatestMessage {
    fn default() -> Self {
        Self::new(String::new())
    }
}
