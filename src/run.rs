//! Termination policy for a scanning run.
//!
//! The pipeline records advertisements until either a configured count is
//! reached or an external cancellation arrives. The policy is a plain state
//! machine owned by the run loop; the loop consults it after every record
//! and acknowledges once the scan subscription and sink are released.

/// How long the pipeline keeps processing advertisements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Stop after this many recorded advertisements.
    Bounded(u64),
    /// Run until externally cancelled.
    Unbounded,
}

/// Lifecycle of one scanning run.
///
/// `Stopped` is terminal and reached exactly once; repeated stop requests
/// afterwards are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Accepting advertisements.
    Running,
    /// Stop signaled; no further advertisements are accepted.
    Stopping,
    /// Scan subscription and sink released.
    Stopped,
}

/// Counts recorded advertisements and decides when the run ends.
#[derive(Debug)]
pub struct RunController {
    mode: RunMode,
    recorded: u64,
    state: RunState,
}

impl RunController {
    /// Create a controller for the given mode.
    ///
    /// A bounded run with target 0 is satisfied before anything arrives.
    pub fn new(mode: RunMode) -> Self {
        let state = match mode {
            RunMode::Bounded(0) => RunState::Stopping,
            _ => RunState::Running,
        };
        Self {
            mode,
            recorded: 0,
            state,
        }
    }

    /// Count one successfully recorded advertisement.
    ///
    /// Advertisements that failed the filter or the decoder never reach
    /// this. Flips to `Stopping` when a bounded target is met.
    pub fn on_recorded(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.recorded += 1;
        if let RunMode::Bounded(target) = self.mode
            && self.recorded >= target
        {
            self.state = RunState::Stopping;
        }
    }

    /// External cancellation request. No-op once stopping or stopped.
    pub fn request_stop(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Stopping;
        }
    }

    /// Driver acknowledgment that the scan subscription and the sink have
    /// been released. Idempotent.
    pub fn mark_stopped(&mut self) {
        self.state = RunState::Stopped;
    }

    /// Whether the loop should stop accepting advertisements.
    pub fn should_stop(&self) -> bool {
        self.state != RunState::Running
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Advertisements recorded so far.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }
}
