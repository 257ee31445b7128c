use std::sync::Arc;

use tokio::sync::watch;

pub mod marketplace;
pub mod refresher;
pub mod source;
pub mod tracking;

pub use refresher::{spawn, Continuation, RefreshHandle, Refresher, SupervisionStrategy};

/// Sending half of a view channel. Clones publish into the same channel, so
/// a restarted refresher keeps feeding existing subscribers.
#[derive(Debug)]
pub struct Publisher<T>(Arc<watch::Sender<T>>);

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Publisher<T> {
    pub fn publish(&self, view: T) {
        self.0.send_replace(view);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.0.subscribe()
    }
}

pub fn channel<T>(initial: T) -> (Publisher<T>, watch::Receiver<T>) {
    let (sender, receiver) = watch::channel(initial);
    (Publisher(Arc::new(sender)), receiver)
}
