//! Reset-on-input debouncing for free-text search.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Inactivity window before typed search text is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

enum Input {
    Text(String),
    Flush,
}

/// Commits the latest pushed value once no new value has arrived for the
/// configured delay.
///
/// Every settled value is committed; deciding whether it changes anything is
/// up to the commit callback. Dropping the debouncer (or calling
/// [`Debouncer::shutdown`]) discards any value still waiting for its window.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<Input>,
    task: JoinHandle<()>,
}

impl Debouncer {
    pub fn spawn<F, Fut>(delay: Duration, commit: F) -> Self
    where
        F: Fn(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, delay, commit));
        Self { tx, task }
    }

    pub fn push(&self, text: impl Into<String>) {
        // The worker only stops after `shutdown` or `finish`, which consume `self`.
        let _ = self.tx.send(Input::Text(text.into()));
    }

    /// Commit any waiting value now and stop.
    pub async fn finish(self) {
        let _ = self.tx.send(Input::Flush);
        let _ = self.task.await;
    }

    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn run<F, Fut>(mut rx: mpsc::UnboundedReceiver<Input>, delay: Duration, commit: F)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<String> = None;
    loop {
        let Some(text) = pending.take() else {
            match rx.recv().await {
                Some(Input::Text(text)) => pending = Some(text),
                Some(Input::Flush) | None => return,
            }
            continue;
        };

        tokio::select! {
            next = rx.recv() => match next {
                Some(Input::Text(newer)) => pending = Some(newer),
                Some(Input::Flush) => {
                    commit(text).await;
                    return;
                }
                None => return,
            },
            () = sleep(delay) => commit(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(delay: Duration) -> (Debouncer, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(delay, move |text| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(text);
            }
        });
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn commits_only_after_quiet_window() {
        let (debouncer, mut commits) = recording(DEFAULT_DEBOUNCE);

        debouncer.push("p");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("pu");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("puerta");
        sleep(Duration::from_millis(299)).await;
        assert!(commits.try_recv().is_err());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(commits.recv().await.as_deref(), Some("puerta"));
        assert!(commits.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_text_is_committed_again() {
        let (debouncer, mut commits) = recording(DEFAULT_DEBOUNCE);

        debouncer.push("arte");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(commits.recv().await.as_deref(), Some("arte"));

        debouncer.push("arte");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(commits.recv().await.as_deref(), Some("arte"));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_commits_pending_text_immediately() {
        let (debouncer, mut commits) = recording(DEFAULT_DEBOUNCE);

        debouncer.push("mu");
        debouncer.push("mural");
        debouncer.finish().await;

        assert_eq!(commits.recv().await.as_deref(), Some("mural"));
        assert_eq!(commits.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_pending_text() {
        let (debouncer, mut commits) = recording(DEFAULT_DEBOUNCE);

        debouncer.push("mural");
        debouncer.shutdown().await;

        assert_eq!(commits.recv().await, None);
    }
}
