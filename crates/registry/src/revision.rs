use tokio::sync::watch;

/// Monotonic change counter shared by a registry and its observers.
///
/// Every mutation bumps the counter; observers hold a `watch::Receiver` and
/// recompute whatever they derive from the registry when it changes.
#[derive(Debug)]
pub struct Revision {
    sender: watch::Sender<u64>,
}

impl Default for Revision {
    fn default() -> Self {
        Self {
            sender: watch::Sender::new(0),
        }
    }
}

impl Revision {
    pub fn bump(&self) {
        self.sender.send_modify(|revision| *revision += 1);
    }

    pub fn current(&self) -> u64 {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }
}
