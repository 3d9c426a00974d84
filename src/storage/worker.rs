use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;

use super::{PageStorage, SaveKey, SavePayload, SaveQueue, SaveRequest};

const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(3600);

enum WorkerMessage {
    Save(SaveRequest),
    Flush(mpsc::Sender<()>),
    Shutdown,
}

/// Writes save requests on a background thread, debounced per key. Edits only
/// ever enqueue; a failed write is logged and dropped.
pub struct PersistenceWorker {
    tx: mpsc::Sender<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn spawn<S>(storage: S, debounce: Duration) -> Self
    where
        S: PageStorage + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        let handle = std::thread::spawn(move || run(storage, SaveQueue::new(debounce), rx));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    pub fn submit(&self, request: SaveRequest) {
        if self.tx.send(WorkerMessage::Save(request)).is_err() {
            tracing::warn!("persistence worker stopped; save request dropped");
        }
    }

    /// Writes everything pending and waits for it to finish.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.tx.send(WorkerMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("persistence worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for PersistenceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceWorker")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

fn run<S: PageStorage>(storage: S, mut queue: SaveQueue, rx: mpsc::Receiver<WorkerMessage>) {
    loop {
        let timeout = queue
            .next_due()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL_INTERVAL);

        match rx.recv_timeout(timeout) {
            Ok(WorkerMessage::Save(request)) => {
                queue.push(request, Instant::now());
            }
            Ok(WorkerMessage::Flush(done)) => {
                write_all(&storage, queue.drain());
                let _ = done.send(());
            }
            Ok(WorkerMessage::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                write_all(&storage, queue.drain());
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        write_all(&storage, queue.take_due(Instant::now()));
    }
    tracing::debug!("persistence worker stopped");
}

fn write_all<S: PageStorage>(storage: &S, requests: Vec<SaveRequest>) {
    for request in requests {
        if let Err(err) = write(storage, &request) {
            tracing::warn!(err = ?err, "failed to persist save request");
        }
    }
}

fn write<S: PageStorage>(storage: &S, request: &SaveRequest) -> anyhow::Result<()> {
    match (&request.key, &request.payload) {
        (SaveKey::Page(page_id), SavePayload::Elements(elements)) => storage
            .save_elements(page_id, elements)
            .with_context(|| format!("saving page {page_id}")),
        (SaveKey::Design(project_id), SavePayload::Design(settings)) => storage
            .save_design(project_id, settings)
            .with_context(|| format!("saving design settings for project {project_id}")),
        (key, _) => anyhow::bail!("payload does not match save key {key:?}"),
    }
}
