//! Access outcomes and quota verdicts.

use serde::Deserialize;

/// Result of the once-per-page-load access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Automated agent: shown the disclosure text, never metered
    BotGranted,
    /// Human within quota: content revealed and the view counted
    Granted,
    /// Human over quota, or explicitly refused by the backend
    Denied,
}

impl AccessOutcome {
    /// Check if this outcome lets the visitor see the page.
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessOutcome::BotGranted | AccessOutcome::Granted)
    }

    /// Check if this outcome is Denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessOutcome::Denied)
    }

    /// Short lowercase name, used as a log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::BotGranted => "bot_granted",
            AccessOutcome::Granted => "granted",
            AccessOutcome::Denied => "denied",
        }
    }
}

impl std::fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend answer to a quota check.
///
/// Only an explicit `"allowed": false` denies; a body without the field reads
/// as allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuotaVerdict {
    #[serde(default = "allowed_by_default")]
    pub allowed: bool,
}

fn allowed_by_default() -> bool {
    true
}

impl QuotaVerdict {
    /// Verdict that lets the view through.
    pub const fn allow() -> Self {
        Self { allowed: true }
    }

    /// Verdict that refuses the view.
    pub const fn deny() -> Self {
        Self { allowed: false }
    }
}
