use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::category::{normalize_label, ParseEnumError};
use crate::settings::TimerSettings;

/// Focus sessions between long breaks.
pub const SESSIONS_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimerMode {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimerMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        TimerMode::ALL
            .into_iter()
            .find(|candidate| normalize_label(candidate.label()) == wanted)
            .ok_or_else(|| ParseEnumError::new("timer mode", s))
    }
}

/// Emitted by [`FocusTimer::tick`] when a countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerCompletion {
    pub finished: TimerMode,
    pub next: TimerMode,
    pub completed_sessions: u32,
}

impl TimerCompletion {
    pub fn was_focus(&self) -> bool {
        self.finished == TimerMode::Focus
    }
}

/// Pomodoro countdown. Time only advances through [`FocusTimer::tick`].
#[derive(Debug, Clone)]
pub struct FocusTimer {
    settings: TimerSettings,
    mode: TimerMode,
    remaining: u32,
    running: bool,
    completed_sessions: u32,
}

impl FocusTimer {
    pub fn new(settings: TimerSettings) -> Self {
        let settings = settings.normalized();
        Self {
            remaining: settings.seconds_for(TimerMode::Focus),
            settings,
            mode: TimerMode::Focus,
            running: false,
            completed_sessions: 0,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Stops and refills the current mode.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.settings.seconds_for(self.mode);
    }

    pub fn change_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn apply_settings(&mut self, settings: TimerSettings) {
        self.settings = settings.normalized();
        self.reset();
    }

    /// Overrides the remaining time of the current countdown. Zero is
    /// clamped to one second so the next tick completes it.
    pub fn set_remaining(&mut self, seconds: u32) {
        self.remaining = seconds.max(1);
    }

    /// Advances one second.
    pub fn tick(&mut self) -> Option<TimerCompletion> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.running = false;
        let finished = self.mode;
        let next = match finished {
            TimerMode::Focus => {
                self.completed_sessions += 1;
                if self.completed_sessions % SESSIONS_PER_LONG_BREAK == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        };
        self.mode = next;
        self.remaining = self.settings.seconds_for(next);
        debug!(%finished, %next, sessions = self.completed_sessions, "timer session finished");

        Some(TimerCompletion {
            finished,
            next,
            completed_sessions: self.completed_sessions,
        })
    }

    pub fn format_remaining(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// Background tick source: one `()` per period until cancelled.
///
/// Dropping the ticker cancels it and joins the thread. No tick is returned
/// from [`Ticker::next_tick`] after [`Ticker::cancel`].
pub struct Ticker {
    cancelled: Arc<AtomicBool>,
    stop: Option<Sender<()>>,
    ticks: Receiver<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start() -> Self {
        Self::every(Duration::from_secs(1))
    }

    pub fn every(period: Duration) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (tick_tx, tick_rx) = mpsc::channel::<()>();
        let flag = Arc::clone(&cancelled);

        let join_handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if flag.load(Ordering::Relaxed) || tick_tx.send(()).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            cancelled,
            stop: Some(stop_tx),
            ticks: tick_rx,
            join_handle: Some(join_handle),
        }
    }

    /// Blocks until the next tick. `None` once cancelled.
    pub fn next_tick(&self) -> Option<()> {
        if self.is_cancelled() {
            return None;
        }
        self.ticks.recv().ok()?;
        if self.is_cancelled() {
            None
        } else {
            Some(())
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
