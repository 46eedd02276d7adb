//! Debounced delivery of the current document to an outer owner.
//!
//! Every editor mutation calls [`Propagator::notify`]. The sink only sees the
//! latest document, once the edits have been quiet for the configured delay.
//! Dropping the propagator flushes whatever is still pending.

use folio_model::Document;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Quiet period before a pending document is delivered.
pub const DEFAULT_PROPAGATION_DELAY: Duration = Duration::from_millis(300);

/// Receives propagated documents.
pub trait DocumentSink: Send + Sync + 'static {
    fn deliver(&self, document: Document);
}

impl<F> DocumentSink for F
where
    F: Fn(Document) + Send + Sync + 'static,
{
    fn deliver(&self, document: Document) {
        self(document)
    }
}

type Pending = Arc<Mutex<Option<Document>>>;

/// Owns the debounce timer for one editor.
pub struct Propagator {
    sink: Arc<dyn DocumentSink>,
    delay: Duration,
    pending: Pending,
    timer: Option<JoinHandle<()>>,
}

impl Propagator {
    pub fn new(sink: impl DocumentSink, delay: Duration) -> Self {
        Self {
            sink: Arc::new(sink),
            delay,
            pending: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    /// Replaces the pending document and restarts the quiet period.
    ///
    /// Outside a tokio runtime there is no timer to wait on, so the document
    /// is delivered immediately.
    pub fn notify(&mut self, document: Document) {
        *lock(&self.pending) = Some(document);
        self.cancel_timer();

        let Ok(handle) = Handle::try_current() else {
            debug!("no runtime for debounce timer, delivering now");
            self.flush();
            return;
        };
        let pending = Arc::clone(&self.pending);
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        self.timer = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let document = lock(&pending).take();
            if let Some(document) = document {
                sink.deliver(document);
            }
        }));
    }

    /// Delivers the pending document now, if any.
    pub fn flush(&mut self) {
        self.cancel_timer();
        let document = lock(&self.pending).take();
        if let Some(document) = document {
            debug!(blocks = document.blocks.len(), "flushing pending document");
            self.sink.deliver(document);
        }
    }

    /// True while a document waits for its quiet period to end.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Propagator {
    fn drop(&mut self) {
        self.flush();
    }
}

impl std::fmt::Debug for Propagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Propagator")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

fn lock(pending: &Pending) -> std::sync::MutexGuard<'_, Option<Document>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
