use std::sync::Arc;
use tokio::sync::watch;

// One-shot readiness: widgets wait once for a value instead of polling a flag.
pub fn ready_signal<T>() -> (ReadyNotifier<T>, ReadySignal<T>) {
    let (tx, rx) = watch::channel(None);
    (ReadyNotifier { tx }, ReadySignal { rx })
}

pub struct ReadyNotifier<T> {
    tx: watch::Sender<Option<Arc<T>>>,
}

impl<T> ReadyNotifier<T> {
    // Consumes the notifier, so a value is published at most once.
    pub fn notify(self, value: T) {
        self.tx.send_replace(Some(Arc::new(value)));
    }
}

pub struct ReadySignal<T> {
    rx: watch::Receiver<Option<Arc<T>>>,
}

impl<T> Clone for ReadySignal<T> {
    fn clone(&self) -> Self {
        ReadySignal { rx: self.rx.clone() }
    }
}

impl<T> ReadySignal<T> {
    // Resolves with the published value, or `None` once the notifier is dropped without one.
    pub async fn wait(mut self) -> Option<Arc<T>> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        }
    }
}
