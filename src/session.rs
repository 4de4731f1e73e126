//! Battle session: the control surface
//!
//! Owns the match controller and the autonomous player side by side. The
//! player only ever gets a handle to the controller for the duration of an
//! operation, so there is no reference cycle between the two.

use crate::auto::{lock, ActOutcome, ActionPolicy, AutoPlayer, DefaultPolicy, PlayerStatus, SharedController};
use crate::core::{ActorRef, MatchField, Roster};
use crate::game::{BattleEvent, ChannelObserver, MatchController, MatchResult};
use crate::rules::BattleSpeed;
use crate::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Capacity of the presentation event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct BattleSession {
    controller: SharedController,
    player: Arc<AutoPlayer>,
    events: broadcast::Sender<BattleEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BattleSession {
    /// Session with a fresh controller and the default policy
    pub fn new() -> Self {
        Self::with_parts(MatchController::new(), Box::new(DefaultPolicy))
    }

    pub fn with_parts(mut controller: MatchController, policy: Box<dyn ActionPolicy + Send>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        controller.add_observer(Box::new(ChannelObserver::new(events.clone())));
        BattleSession {
            controller: Arc::new(Mutex::new(controller)),
            player: Arc::new(AutoPlayer::new(policy)),
            events,
            task: Mutex::new(None),
        }
    }

    /// Stop any running loop and start a new match with these rosters
    pub fn submit_teams(&self, player: Roster, enemy: Roster) {
        self.halt();
        lock(&self.controller).submit_teams(player, enemy);
    }

    /// Stop the loop and clear the field, the log and the queue
    pub fn hard_reset(&self) {
        self.halt();
        lock(&self.controller).hard_reset();
    }

    fn halt(&self) {
        self.player.stop();
        self.player.set_status(false, false);
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }

    /// Start autonomous play on a spawned task
    ///
    /// Must be called from within a tokio runtime. Returns false if the loop
    /// is already running or there is no match to play.
    pub fn start(&self) -> bool {
        if self.player.is_running() {
            return false;
        }
        {
            let controller = lock(&self.controller);
            if controller.is_over() || controller.current_actor().is_none() {
                return false;
            }
        }

        let mut task = lock(&self.task);
        if let Some(stale) = task.take() {
            stale.abort();
        }
        self.player.set_status(true, false);
        *task = Some(tokio::spawn(self.player.clone().run(self.controller.clone())));
        true
    }

    /// Stop after the current action has settled
    pub fn pause_after_current(&self) {
        if self.player.is_running() {
            self.player.request_pause();
        }
    }

    /// Continue autonomous play after a pause
    pub fn resume(&self) -> bool {
        if !self.player.is_paused() {
            return false;
        }
        if self.start() {
            return true;
        }
        // Nothing left to play; drop the stale pause
        self.player.set_status(false, false);
        false
    }

    /// Perform exactly one action while paused
    ///
    /// Does not restart the loop. In fast-forward mode the effect is
    /// committed right away; otherwise it waits for the presentation.
    pub fn step_forward(&self) -> bool {
        if !self.player.is_paused() {
            return false;
        }
        let outcome = self.player.act(&self.controller);
        if outcome == ActOutcome::Deferred && self.player.is_fast_forward() {
            lock(&self.controller).commit_effect_instant();
        }
        matches!(outcome, ActOutcome::Deferred | ActOutcome::Applied)
    }

    /// Stepping backward is not supported; always false
    pub fn step_backward(&self) -> bool {
        false
    }

    /// Stop the loop and play the rest of the match with instant commits
    pub fn skip_to_end(&self) -> Option<MatchResult> {
        self.halt();
        let result = self.player.drain(&self.controller);
        self.player.notify_settled();
        result
    }

    pub fn set_tempo(&self, speed: BattleSpeed) {
        self.player.set_tempo(speed);
    }

    pub fn tempo(&self) -> BattleSpeed {
        self.player.tempo()
    }

    pub fn set_fast_forward(&self, enabled: bool) {
        self.player.set_fast_forward(enabled);
    }

    /// Apply the outstanding effect at the presentation's impact moment
    pub fn commit_effect(&self) -> bool {
        let committed = lock(&self.controller).commit_effect();
        if committed {
            self.player.notify_settled();
        }
        committed
    }

    /// Receive presentation events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> PlayerStatus {
        self.player.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<PlayerStatus> {
        self.player.watch_status()
    }

    /// Wait for the autonomous task to finish (match over, pause or stop)
    pub async fn wait_until_stopped(&self) -> Result<()> {
        let handle = lock(&self.task).take();
        match handle {
            Some(handle) => Ok(handle.await?),
            None => Ok(()),
        }
    }

    /// Run `f` against the controller under its lock
    pub fn with_controller<R>(&self, f: impl FnOnce(&MatchController) -> R) -> R {
        f(&lock(&self.controller))
    }

    pub fn field(&self) -> MatchField {
        self.with_controller(|c| c.field().clone())
    }

    pub fn log(&self) -> Vec<String> {
        self.with_controller(|c| c.log().to_vec())
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.with_controller(|c| c.result())
    }

    pub fn current_actor(&self) -> Option<ActorRef> {
        self.with_controller(|c| c.current_actor())
    }

    pub fn has_pending_effect(&self) -> bool {
        self.with_controller(|c| c.has_pending_effect())
    }
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BattleSession {
    fn drop(&mut self) {
        self.player.stop();
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleSession")
            .field("player", &self.player)
            .field("controller", &*lock(&self.controller))
            .finish()
    }
}
