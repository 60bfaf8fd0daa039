use crate::input::SceneEvent;
use crate::render::{render, Drawable};
use crate::source::{FetchError, GoalSource};
use crate::state::{Effect, FetchTicket, SceneState};
use goalboard_protocol::Goal;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct Completion {
    ticket: FetchTicket,
    result: Result<Vec<Goal>, FetchError>,
}

/// Reports a fetch back to the controller exactly once. If the task
/// unwinds before a result is sent, the drop reports it as interrupted.
struct CompletionGuard {
    ticket: FetchTicket,
    tx: Option<mpsc::UnboundedSender<Completion>>,
}

impl CompletionGuard {
    fn finish(mut self, result: Result<Vec<Goal>, FetchError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<Vec<Goal>, FetchError>) {
        if let Some(tx) = self.tx.take() {
            // The receiver is closed once the scene is torn down.
            let _ = tx.send(Completion {
                ticket: self.ticket,
                result,
            });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.send(Err(FetchError::Interrupted));
    }
}

struct PendingFetch {
    ticket: FetchTicket,
    task: JoinHandle<()>,
}

/// Owns the scene state and is the only thing that mutates it.
///
/// Events and fetch completions are applied on the caller's thread; the goal
/// request itself runs as a task on `runtime` and reports back through a
/// channel. [`SceneController::unmount`] (or dropping the controller) aborts
/// that task, and anything that still arrives afterwards is ignored.
pub struct SceneController {
    state: SceneState,
    source: Box<dyn GoalSource>,
    runtime: Handle,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    pending: Option<PendingFetch>,
    mounted: bool,
}

impl SceneController {
    pub fn mount(source: Box<dyn GoalSource>, runtime: Handle) -> Self {
        Self::mount_with_state(SceneState::default(), source, runtime)
    }

    pub fn mount_with_state(
        state: SceneState,
        source: Box<dyn GoalSource>,
        runtime: Handle,
    ) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        info!(
            x = state.actor().position.x,
            y = state.actor().position.y,
            "scene mounted"
        );
        Self {
            state,
            source,
            runtime,
            completions_tx,
            completions,
            pending: None,
            mounted: true,
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn frame(&self) -> Vec<Drawable> {
        render(&self.state)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle(&mut self, event: SceneEvent) {
        if !self.mounted {
            return;
        }
        if let Some(effect) = self.state.apply(event) {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::FetchGoals(ticket) => {
                debug!(ticket = ticket.0, "fetching goals");
                let fetch = self.source.fetch_goals();
                let guard = CompletionGuard {
                    ticket,
                    tx: Some(self.completions_tx.clone()),
                };
                let task = self.runtime.spawn(async move {
                    guard.finish(fetch.await);
                });
                self.pending = Some(PendingFetch { ticket, task });
            }
        }
    }

    fn complete(&mut self, completion: Completion) -> bool {
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.ticket == completion.ticket)
        {
            self.pending = None;
        }
        if !self.mounted {
            return false;
        }
        self.state.resolve_fetch(completion.ticket, completion.result)
    }

    /// Applies every fetch that has finished so far. Returns how many
    /// changed the scene.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions.try_recv() {
            if self.complete(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the in-flight fetch, if any, and applies it.
    pub async fn next_completion(&mut self) -> bool {
        if !self.mounted || self.pending.is_none() {
            return false;
        }
        match self.completions.recv().await {
            Some(completion) => self.complete(completion),
            None => false,
        }
    }

    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            debug!(ticket = pending.ticket.0, "goal fetch cancelled");
        }
        self.completions.close();
        info!("scene unmounted");
    }
}

impl Drop for SceneController {
    fn drop(&mut self) {
        self.unmount();
    }
}
