//! Autonomous player loop
//!
//! Runs as its own tokio task and talks to the controller only through its
//! public operations. The loop suspends in two places: while an attack or heal
//! waits for its commit, and for one tempo tick between actions. Both waits
//! wake on the `settled` signal, which every commit, pause request and stop
//! raises, so nothing polls.

use crate::auto::{act_once, drain, ActOutcome, ActionPolicy};
use crate::game::{MatchController, MatchResult};
use crate::rules::BattleSpeed;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};

/// Controller handle shared between the session and the loop
pub type SharedController = Arc<Mutex<MatchController>>;

/// Lock a mutex, recovering the data if a holder panicked
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Published loop flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub running: bool,
    pub paused: bool,
}

pub struct AutoPlayer {
    policy: Mutex<Box<dyn ActionPolicy + Send>>,
    status: watch::Sender<PlayerStatus>,
    pause_requested: AtomicBool,
    fast_forward: AtomicBool,
    tempo: Mutex<BattleSpeed>,
    settled: Notify,
}

impl AutoPlayer {
    pub fn new(policy: Box<dyn ActionPolicy + Send>) -> Self {
        let (status, _) = watch::channel(PlayerStatus::default());
        AutoPlayer {
            policy: Mutex::new(policy),
            status,
            pause_requested: AtomicBool::new(false),
            fast_forward: AtomicBool::new(false),
            tempo: Mutex::new(BattleSpeed::default()),
            settled: Notify::new(),
        }
    }

    pub fn status(&self) -> PlayerStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<PlayerStatus> {
        self.status.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.status().running
    }

    pub fn is_paused(&self) -> bool {
        self.status().paused
    }

    pub fn set_status(&self, running: bool, paused: bool) {
        self.status.send_replace(PlayerStatus { running, paused });
    }

    pub fn tempo(&self) -> BattleSpeed {
        *lock(&self.tempo)
    }

    pub fn set_tempo(&self, speed: BattleSpeed) {
        *lock(&self.tempo) = speed;
    }

    pub fn is_fast_forward(&self) -> bool {
        self.fast_forward.load(Ordering::SeqCst)
    }

    /// In fast-forward the loop commits effects itself and skips the tick
    pub fn set_fast_forward(&self, enabled: bool) {
        self.fast_forward.store(enabled, Ordering::SeqCst);
        self.notify_settled();
    }

    /// Latch a pause; the loop honors it after the current action settles
    pub fn request_pause(&self) {
        self.pause_requested.store(true, Ordering::SeqCst);
        self.notify_settled();
    }

    /// Clear the running flag; the loop exits at its next check
    pub fn stop(&self) {
        self.pause_requested.store(false, Ordering::SeqCst);
        self.status.send_modify(|s| s.running = false);
        self.notify_settled();
    }

    /// Wake the loop after a commit (or any flag change it should see)
    pub fn notify_settled(&self) {
        self.settled.notify_waiters();
    }

    /// Perform exactly one action with this player's policy
    pub fn act(&self, controller: &SharedController) -> ActOutcome {
        let mut policy = lock(&self.policy);
        let mut controller = lock(controller);
        act_once(&mut controller, policy.as_mut())
    }

    /// Play the rest of the match with instant commits
    pub fn drain(&self, controller: &SharedController) -> Option<MatchResult> {
        let mut policy = lock(&self.policy);
        let mut controller = lock(controller);
        drain(&mut controller, policy.as_mut())
    }

    /// Main loop; spawn it on the runtime after setting `running`
    pub async fn run(self: Arc<Self>, controller: SharedController) {
        loop {
            if !self.is_running() {
                break;
            }
            if self.pause_requested.swap(false, Ordering::SeqCst) {
                self.set_status(false, true);
                return;
            }
            let over = lock(&controller).is_over();
            if over {
                break;
            }

            if self.act(&controller) == ActOutcome::Idle {
                break;
            }
            if !self.wait_until_settled(&controller).await {
                break;
            }

            if self.pause_requested.swap(false, Ordering::SeqCst) {
                self.set_status(false, true);
                return;
            }
            if !self.is_fast_forward() && !self.pace().await {
                break;
            }
        }
        self.status.send_modify(|s| s.running = false);
    }

    /// Wait until no effect is outstanding; false if the loop was stopped
    async fn wait_until_settled(&self, controller: &SharedController) -> bool {
        loop {
            let settled = self.settled.notified();
            tokio::pin!(settled);
            settled.as_mut().enable();

            if !self.is_running() {
                return false;
            }
            {
                let mut controller = lock(controller);
                if !controller.has_pending_effect() {
                    return true;
                }
                if self.is_fast_forward() {
                    controller.commit_effect_instant();
                    return true;
                }
            }
            settled.await;
        }
    }

    /// One tempo tick, cut short by any wake-up; false if the loop was stopped
    async fn pace(&self) -> bool {
        let woken = self.settled.notified();
        tokio::pin!(woken);
        woken.as_mut().enable();

        if !self.is_running() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.tempo().tick()) => {}
            _ = woken => {}
        }
        self.is_running()
    }
}

impl std::fmt::Debug for AutoPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPlayer")
            .field("status", &self.status())
            .field("pause_requested", &self.pause_requested.load(Ordering::SeqCst))
            .field("fast_forward", &self.is_fast_forward())
            .field("tempo", &self.tempo())
            .finish()
    }
}
