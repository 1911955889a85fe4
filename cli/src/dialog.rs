//! Single-slot text dialog answered by the next input line.
//!
//! `open` hands back a future that resolves once the user answers. Opening a
//! new dialog, or dropping the `Dialog`, dismisses the previous one and its
//! future resolves to `None`.

use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub struct Dialog {
    pending: Option<oneshot::Sender<String>>,
}

impl Dialog {
    pub fn open(&mut self) -> impl std::future::Future<Output = Option<String>> {
        let (tx, rx) = oneshot::channel();
        self.pending = Some(tx);
        async move { rx.await.ok() }
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Delivers `line` to the open dialog. Returns false if none was open.
    pub fn answer(&mut self, line: &str) -> bool {
        match self.pending.take() {
            Some(tx) => {
                // The receiver may already be gone; the answer is then moot.
                let _ = tx.send(line.to_string());
                true
            }
            None => false,
        }
    }

    pub fn dismiss(&mut self) {
        self.pending = None;
    }
}
