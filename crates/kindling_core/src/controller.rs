//! Refresh state machine
//!
//! The controller decides when a render pass may start. It is a three-state
//! machine driven by an explicit transition table:
//!
//! ```text
//!            Schedule                Begin
//!   Idle ───────────────▶ Pending ───────────▶ Refreshing
//!    ▲                      ▲  │ Schedule         │  │ Schedule (deferred)
//!    │                      │  └──────┘           │  └──────┘
//!    │      Finish          │     FinishDeferred   │
//!    └──────────────────────┴──────────────────────┘
//! ```
//!
//! A refresh requested while a pass is running is not executed inline; it
//! bumps the pending-request counter and the pass ends in `Pending` instead
//! of `Idle`, which makes the runtime replay another pass. A pending request
//! with nowhere to render is dropped with `Cancel` (Pending to Idle).

/// Phase of the refresh loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RefreshPhase {
    /// Nothing to do
    #[default]
    Idle,
    /// A refresh has been requested and not started yet
    Pending,
    /// A render pass (render, swap, effects) is in progress
    Refreshing,
}

/// Inputs to the refresh state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshEvent {
    /// A state setter (or mount) asked for a refresh
    Schedule,
    /// A render pass starts
    Begin,
    /// A render pass ended with no requests made while it ran
    Finish,
    /// A render pass ended and requests were made while it ran
    FinishDeferred,
    /// Pending requests were dropped without a pass
    Cancel,
}

/// Transition table: (from, event, to)
const TRANSITIONS: &[(RefreshPhase, RefreshEvent, RefreshPhase)] = &[
    (RefreshPhase::Idle, RefreshEvent::Schedule, RefreshPhase::Pending),
    (RefreshPhase::Pending, RefreshEvent::Schedule, RefreshPhase::Pending),
    (RefreshPhase::Pending, RefreshEvent::Begin, RefreshPhase::Refreshing),
    (RefreshPhase::Pending, RefreshEvent::Cancel, RefreshPhase::Idle),
    (RefreshPhase::Refreshing, RefreshEvent::Schedule, RefreshPhase::Refreshing),
    (RefreshPhase::Refreshing, RefreshEvent::Finish, RefreshPhase::Idle),
    (RefreshPhase::Refreshing, RefreshEvent::FinishDeferred, RefreshPhase::Pending),
];

impl RefreshPhase {
    /// Target phase for `event`, or `None` if the event is ignored here
    pub fn on(self, event: RefreshEvent) -> Option<RefreshPhase> {
        TRANSITIONS
            .iter()
            .find(|(from, ev, _)| *from == self && *ev == event)
            .map(|(_, _, to)| *to)
    }
}

/// Refresh bookkeeping for one mounted runtime
#[derive(Debug, Default)]
pub struct RefreshController {
    phase: RefreshPhase,
    /// Requests made since the current (or next) pass began
    pending_requests: u32,
    /// Nesting depth of open batches
    batch_depth: u32,
}

impl RefreshController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    /// Requests coalesced into the next pass
    pub fn pending_requests(&self) -> u32 {
        self.pending_requests
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    fn apply(&mut self, event: RefreshEvent) -> bool {
        match self.phase.on(event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => false,
        }
    }

    /// Record a refresh request
    ///
    /// Returns true if the caller should refresh now: the request left the
    /// machine `Pending` and no batch is open.
    pub fn schedule(&mut self) -> bool {
        self.pending_requests = self.pending_requests.saturating_add(1);
        self.apply(RefreshEvent::Schedule);
        self.phase == RefreshPhase::Pending && !self.in_batch()
    }

    /// Try to start a pass; false means the refresh is a no-op
    pub fn begin(&mut self) -> bool {
        if self.apply(RefreshEvent::Begin) {
            self.pending_requests = 0;
            true
        } else {
            false
        }
    }

    /// End the running pass
    pub fn finish(&mut self) {
        let event = if self.pending_requests > 0 {
            RefreshEvent::FinishDeferred
        } else {
            RefreshEvent::Finish
        };
        self.apply(event);
    }

    /// Drop pending requests that cannot run; ignored while refreshing
    pub fn cancel(&mut self) {
        if self.apply(RefreshEvent::Cancel) {
            self.pending_requests = 0;
        }
    }

    pub fn batch_start(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch; returns true if the outermost batch closed with a
    /// refresh waiting
    pub fn batch_end(&mut self) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        self.batch_depth == 0 && self.phase == RefreshPhase::Pending
    }
}
