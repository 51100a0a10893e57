use crate::history::HistoryTimeline;

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

/// Committed canvas mutations, each announced to the network layer by tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Draw,
    Erase,
    Fill,
    Modify,
    Undo,
    Redo,
    JumpHistory,
    Reset,
}

impl Mutation {
    pub fn tag(self) -> &'static str {
        match self {
            Mutation::Draw => "draw",
            Mutation::Erase => "erase",
            Mutation::Fill => "fill",
            Mutation::Modify => "modify",
            Mutation::Undo => "undo",
            Mutation::Redo => "redo",
            Mutation::JumpHistory => "jump_history",
            Mutation::Reset => "reset",
        }
    }
}

/// Receives the session's side effects: upload notifications and panel refreshes.
pub trait MutationSink {
    fn notify_mutated(&mut self, action: &str);

    fn history_changed(&mut self, _timeline: &HistoryTimeline) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingUpload {
    action: String,
    due_at: u64,
}

/// Quiet-period coalescing of upload triggers. The last action of a burst wins.
///
/// The host owns the timer: it calls [`UploadDebounce::trigger`] on every
/// notification, arms a timer for the returned deadline and calls
/// [`UploadDebounce::poll`] when it fires. Stale timers poll too early and get `None`.
#[derive(Clone, Debug)]
pub struct UploadDebounce {
    quiet_ms: u64,
    pending: Option<PendingUpload>,
}

impl UploadDebounce {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
        }
    }

    pub fn quiet_ms(&self) -> u64 {
        self.quiet_ms
    }

    /// Restarts the quiet period. Returns the new deadline.
    pub fn trigger(&mut self, action: &str, now: u64) -> u64 {
        let due_at = now.saturating_add(self.quiet_ms);
        self.pending = Some(PendingUpload {
            action: action.to_string(),
            due_at,
        });
        due_at
    }

    /// Takes the pending action once its deadline has passed.
    pub fn poll(&mut self, now: u64) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.due_at);
        if !due {
            return None;
        }
        self.pending.take().map(|pending| pending.action)
    }

    pub fn pending_action(&self) -> Option<&str> {
        self.pending.as_ref().map(|pending| pending.action.as_str())
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
