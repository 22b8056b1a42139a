//! Caller-facing search API
//!
//! [`start_search`] validates the input synchronously and returns a
//! [`SearchHandle`]. Events produced by the coordinator are buffered until the
//! caller drives the handle with [`SearchHandle::poll`] or
//! [`SearchHandle::wait`]; callbacks registered with `on_progress` and
//! `on_complete` run on the caller's thread at that point.

use crate::candidates::prepare;
use crate::config::SearchOptions;
use crate::coordinator::Coordinator;
use crate::error::{Error, Result};
use crate::result::{SearchEvent, SearchProgress, SearchResult};
use crate::spawn::spawn_named;
use log::{error, warn};
use runeopt_core::{CharacterContext, Rune, ScoreModel, SynergyResolver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

type ProgressCallback = Box<dyn FnMut(&SearchProgress) + Send>;
type CompleteCallback = Box<dyn FnMut(&SearchResult) + Send>;

/// Start a search with the built-in score model
///
/// Fails synchronously if a category cannot fill its slots after
/// category, grade and class filtering.
pub fn start_search(
    runes: &[Arc<Rune>],
    ctx: &CharacterContext,
    options: SearchOptions,
) -> Result<SearchHandle> {
    start_search_with_model(runes, ctx, options, &ScoreModel::default())
}

/// Start a search with a custom score model
pub fn start_search_with_model(
    runes: &[Arc<Rune>],
    ctx: &CharacterContext,
    options: SearchOptions,
    model: &ScoreModel,
) -> Result<SearchHandle> {
    let ctx = options.apply_to(ctx);
    let ranked = prepare(runes, model, &ctx, options.min_grade, options.enhance_level)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let inline_fallback = options.inline_fallback;
    let coordinator = Coordinator::new(
        ranked,
        SynergyResolver::new(model.config()),
        options,
        Arc::clone(&cancel),
        tx,
    );

    // The coordinator is handed over after the spawn succeeds so it can still
    // run here if it fails.
    let (handoff_tx, handoff_rx) = mpsc::channel::<Coordinator>();
    let spawned = spawn_named("runeopt-coordinator".to_string(), move || {
        if let Ok(coordinator) = handoff_rx.recv() {
            coordinator.run();
        }
    });

    let thread = match spawned {
        Ok(thread) => {
            if let Err(mpsc::SendError(coordinator)) = handoff_tx.send(coordinator) {
                coordinator.run();
            }
            Some(thread)
        }
        Err(e) if inline_fallback => {
            warn!("failed to spawn coordinator: {}; searching on the calling thread", e);
            coordinator.run();
            None
        }
        Err(e) => return Err(Error::WorkerSpawn(e)),
    };

    Ok(SearchHandle {
        events: rx,
        cancel,
        thread,
        on_progress: None,
        on_complete: None,
        latest: None,
        result: None,
        finished: false,
        cancelled: false,
    })
}

/// Run a search to completion on the calling thread's behalf
///
/// Returns `Ok(None)` only if the search was cancelled.
pub fn search(
    runes: &[Arc<Rune>],
    ctx: &CharacterContext,
    options: SearchOptions,
) -> Result<Option<SearchResult>> {
    Ok(start_search(runes, ctx, options)?.wait())
}

/// Handle to a running search
///
/// Dropping the handle cancels the search and waits for its threads.
pub struct SearchHandle {
    events: Receiver<SearchEvent>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    on_progress: Option<ProgressCallback>,
    on_complete: Option<CompleteCallback>,
    latest: Option<SearchProgress>,
    result: Option<SearchResult>,
    finished: bool,
    cancelled: bool,
}

impl SearchHandle {
    /// Call `f` for every progress event
    pub fn on_progress<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&SearchProgress) + Send + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Call `f` once with the final result
    pub fn on_complete<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&SearchResult) + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Dispatch every buffered event without blocking
    ///
    /// Returns true once the search has finished or was cancelled.
    pub fn poll(&mut self) -> bool {
        while !self.finished {
            match self.events.try_recv() {
                Ok(event) => self.dispatch(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finished = true,
            }
        }
        self.finished
    }

    /// Block until the search finishes, dispatching events on the way
    ///
    /// Returns `None` if the search was cancelled.
    pub fn wait(mut self) -> Option<SearchResult> {
        while !self.finished {
            match self.events.recv() {
                Ok(event) => self.dispatch(event),
                Err(_) => self.finished = true,
            }
        }
        self.join();
        self.result.take()
    }

    /// Stop every worker; no further events are delivered
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.cancelled = true;
        self.finished = true;
        self.result = None;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Most recent progress dispatched so far
    pub fn latest_progress(&self) -> Option<&SearchProgress> {
        self.latest.as_ref()
    }

    /// The final result, once dispatched
    pub fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref()
    }

    fn dispatch(&mut self, event: SearchEvent) {
        if self.cancelled {
            return;
        }
        match event {
            SearchEvent::Progress(progress) => {
                if let Some(callback) = self.on_progress.as_mut() {
                    callback(&progress);
                }
                self.latest = Some(progress);
            }
            SearchEvent::Complete(result) => {
                if let Some(callback) = self.on_complete.as_mut() {
                    callback(&result);
                }
                self.result = Some(result);
                self.finished = true;
            }
            SearchEvent::Cancelled => {
                self.finished = true;
            }
        }
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("search coordinator panicked");
            }
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel.store(true, Ordering::Relaxed);
        }
        self.join();
    }
}

impl std::fmt::Debug for SearchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHandle")
            .field("finished", &self.finished)
            .field("cancelled", &self.cancelled)
            .field("latest", &self.latest.as_ref().map(|p| (p.phase, p.processed)))
            .finish()
    }
}
