//! [`DeferredAction`] — a resettable one-shot timer.
//!
//! The plugin uses it to debounce work: every keystroke resets the timer,
//! and the action only runs once the editor has been quiet for the full
//! delay.
//!
//! ```text
//!   Idle ──start()──▶ Waiting ──delay elapsed──▶ Fired
//!    │                  │  ▲
//!    │                  │  └── reset(): re-arm the countdown
//!    │                  │
//!    └──cancel()──▶ Canceled ◀──cancel()──┘
//! ```
//!
//! The countdown runs on a tokio task that owns a pinned [`Sleep`] and
//! re-arms it on reset. [`DeferredAction::cancel`] and
//! [`DeferredAction::reset`] are synchronous and may be called from any
//! thread.
//!
//! Phase changes go through a single `watch` channel, so `Waiting → Fired`
//! and `Waiting → Canceled` cannot both happen: a `cancel()` that returns
//! `true` guarantees the action never runs. `reset()` racing the fire
//! instant is best effort.
//!
//! Terminal instances (fired or canceled) are never restarted: `start` and
//! `reset` on them return [`TimerError::Finished`]. Dropping a started
//! instance does not cancel it.
//!
//! [`Sleep`]: tokio::time::Sleep

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::TimerError;

type Action = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Waiting,
    Fired,
    Canceled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Fired | Phase::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Waiting => "waiting",
            Phase::Fired => "fired",
            Phase::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
enum Control {
    Reset(Option<Duration>),
    Cancel,
}

pub struct DeferredAction {
    delay: Duration,
    action: Mutex<Option<Action>>,
    control: Mutex<Option<mpsc::UnboundedSender<Control>>>,
    phase: Arc<watch::Sender<Phase>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DeferredAction {
    /// Create an idle timer that will call `action` once `delay` has passed
    /// after [`start`](Self::start) without an intervening reset or cancel.
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            delay,
            action: Mutex::new(Some(Box::new(action))),
            control: Mutex::new(None),
            phase: Arc::new(phase),
            task: Mutex::new(None),
        }
    }

    /// Like [`new`](Self::new), but calls `f(args)`. The arguments are owned
    /// by this instance and handed over when it fires.
    pub fn with_args<A, F>(delay: Duration, f: F, args: A) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A) + Send + 'static,
    {
        Self::new(delay, move || f(args))
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Spawn the countdown on the current tokio runtime.
    pub fn start(&self) -> Result<(), TimerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;

        let mut control = lock(&self.control);
        let mut outcome = Ok(());
        self.phase.send_if_modified(|phase| match *phase {
            Phase::Idle => {
                *phase = Phase::Waiting;
                true
            }
            Phase::Waiting => {
                outcome = Err(TimerError::AlreadyStarted);
                false
            }
            Phase::Fired | Phase::Canceled => {
                outcome = Err(TimerError::Finished);
                false
            }
        });
        outcome?;

        let Some(action) = lock(&self.action).take() else {
            return Err(TimerError::AlreadyStarted);
        };
        let (tx, rx) = mpsc::unbounded_channel();
        *control = Some(tx);

        let task = runtime.spawn(countdown(self.delay, action, rx, Arc::clone(&self.phase)));
        *lock(&self.task) = Some(task);
        tracing::debug!(delay = ?self.delay, "deferred action started");
        Ok(())
    }

    /// Stop the action from running if it has not fired yet.
    ///
    /// Returns `true` when this call moved the timer to
    /// [`Phase::Canceled`]; the action is then guaranteed never to run.
    /// Returns `false` if it already fired or was already canceled.
    pub fn cancel(&self) -> bool {
        let control = lock(&self.control);
        let canceled = self.phase.send_if_modified(|phase| match *phase {
            Phase::Idle | Phase::Waiting => {
                *phase = Phase::Canceled;
                true
            }
            Phase::Fired | Phase::Canceled => false,
        });
        if canceled {
            // Wake the countdown so it exits now instead of at the deadline.
            if let Some(tx) = control.as_ref() {
                let _ = tx.send(Control::Cancel);
            }
            tracing::debug!("deferred action canceled");
        }
        canceled
    }

    /// Restart the countdown from now, optionally with a new delay. Without
    /// one the most recent delay is reused.
    pub fn reset(&self, new_delay: Option<Duration>) -> Result<(), TimerError> {
        let control = lock(&self.control);
        match self.phase() {
            Phase::Idle => Err(TimerError::NotStarted),
            Phase::Fired | Phase::Canceled => Err(TimerError::Finished),
            Phase::Waiting => {
                let tx = control.as_ref().ok_or(TimerError::NotStarted)?;
                // A closed channel means the countdown already finished.
                tx.send(Control::Reset(new_delay))
                    .map_err(|_| TimerError::Finished)
            }
        }
    }

    /// Wait until the timer fires or is canceled. Never resolves for an
    /// instance that is left idle.
    pub async fn finished(&self) -> Phase {
        let mut rx = self.phase.subscribe();
        let phase = match rx.wait_for(|phase| phase.is_terminal()).await {
            Ok(phase) => *phase,
            Err(_) => self.phase(),
        };
        phase
    }

    /// Wait for the background task to exit. A panic inside the action is
    /// reported as [`TimerError::ActionPanicked`].
    pub async fn join(&self) -> Result<Phase, TimerError> {
        let task = lock(&self.task).take();
        let Some(task) = task else {
            let phase = self.phase();
            return if phase.is_terminal() {
                Ok(phase)
            } else {
                Err(TimerError::NotStarted)
            };
        };
        match task.await {
            Ok(()) => Ok(self.phase()),
            Err(e) if e.is_panic() => {
                Err(TimerError::ActionPanicked(panic_message(e.into_panic())))
            }
            Err(_) => Err(TimerError::Aborted),
        }
    }
}

impl std::fmt::Debug for DeferredAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredAction")
            .field("delay", &self.delay)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

async fn countdown(
    mut delay: Duration,
    action: Action,
    mut control: mpsc::UnboundedReceiver<Control>,
    phase: Arc<watch::Sender<Phase>>,
) {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    let mut listening = true;

    loop {
        tokio::select! {
            biased;
            msg = control.recv(), if listening => match msg {
                Some(Control::Reset(new_delay)) => {
                    if let Some(d) = new_delay {
                        delay = d;
                    }
                    sleep.as_mut().reset(Instant::now() + delay);
                    tracing::trace!(?delay, "deferred action reset");
                }
                Some(Control::Cancel) => return,
                // Owner dropped; keep counting down.
                None => listening = false,
            },
            () = &mut sleep => break,
        }
    }

    let fire = phase.send_if_modified(|p| {
        if *p == Phase::Waiting {
            *p = Phase::Fired;
            true
        } else {
            false
        }
    });
    if fire {
        tracing::debug!("deferred action fired");
        action();
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
