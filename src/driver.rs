// driver.rs
use crate::client::Backend;
use crate::engine::{BrowseEngine, Command, Completion, CursorState, MapSurface, MutationKind};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the engine's commands against a backend. Each request goes to its own
/// thread; completions come back over a channel and are applied one at a
/// time on the thread that owns the session.
pub struct Session<B: Backend + 'static, M: MapSurface> {
    engine: BrowseEngine<M>,
    backend: Arc<B>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    pending: usize,
}

impl<B: Backend + 'static, M: MapSurface> Session<B, M> {
    pub fn new(backend: Arc<B>, surface: M) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            engine: BrowseEngine::new(surface),
            backend,
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn engine(&self) -> &BrowseEngine<M> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut BrowseEngine<M> {
        &mut self.engine
    }

    /// Requests issued but not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Sends every queued command out to a worker thread.
    pub fn dispatch(&mut self) {
        for command in self.engine.drain_commands() {
            let backend = Arc::clone(&self.backend);
            let tx = self.tx.clone();
            self.pending += 1;

            std::thread::spawn(move || {
                let completion = execute(backend.as_ref(), command);
                // receiver gone means the session was dropped
                let _ = tx.send(completion);
            });
        }
    }

    /// Applies whatever has already completed, without waiting.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Waits for the next completion and applies it. False when nothing is
    /// pending.
    pub fn pump_blocking(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.rx.recv() {
            Ok(completion) => {
                self.apply(completion);
                true
            }
            Err(_) => false,
        }
    }

    /// Dispatches and applies until no request is outstanding.
    pub fn run_until_idle(&mut self) {
        self.dispatch();
        while self.pump_blocking() {
            self.dispatch();
        }
    }

    /// Re-issues a failed page fetch once and waits for it. False when the
    /// cursor was not in the errored state.
    pub fn retry_failed_search(&mut self) -> bool {
        if !matches!(self.engine.cursor().state(), CursorState::Errored { .. }) {
            return false;
        }
        if !self.engine.retry_search() {
            return false;
        }

        info!("page fetch failed, retrying once");
        self.run_until_idle();
        true
    }

    fn apply(&mut self, completion: Completion) {
        self.pending = self.pending.saturating_sub(1);
        debug!(pending = self.pending, "applying completion");
        self.engine.apply(completion);
    }
}

/// Performs one command against the backend.
pub fn execute<B: Backend + ?Sized>(backend: &B, command: Command) -> Completion {
    match command {
        Command::FetchSaved => Completion::Saved(backend.fetch_saved()),
        Command::FetchPage { ticket, filters } => {
            let result = backend.fetch_page(&filters, ticket.offset);
            Completion::Page { ticket, result }
        }
        Command::Mutate(mutation) => {
            let result = match mutation.kind {
                MutationKind::MarkSaved => backend.mark_saved(mutation.id),
                MutationKind::UnmarkSaved => backend.unmark_saved(mutation.id),
            };
            Completion::Mutation { mutation, result }
        }
    }
}
