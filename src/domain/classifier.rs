//! User-agent classification.
//!
//! Decides whether the visitor is an automated agent (search crawler, AI
//! crawler, generic bot) so it can be shown the disclosure text instead of
//! being metered.
//!
//! This is a best-effort heuristic over the user-agent string. Anything that
//! does not announce itself with one of the known signatures is classified as
//! human, and any client can spoof its user agent either way.

/// Lowercase substrings that mark a user agent as automated.
///
/// Generic tokens first, then named AI crawlers whose user agents do not
/// contain a generic token.
pub const AUTOMATED_SIGNATURES: &[&str] = &[
    "bot",
    "crawl",
    "spider",
    "chatgpt",
    "gptbot",
    "perplexity",
    "ccbot",
    "claudebot",
    "anthropic-ai",
    "bytespider",
    "google-extended",
];

/// Verdict for a single user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    matched: Option<&'static str>,
}

impl Classification {
    /// A verdict for a human visitor.
    pub const fn human() -> Self {
        Self { matched: None }
    }

    /// A verdict for an automated agent, recording the matched signature.
    pub const fn automated(signature: &'static str) -> Self {
        Self {
            matched: Some(signature),
        }
    }

    /// Whether the visitor is an automated agent.
    pub fn is_automated(&self) -> bool {
        self.matched.is_some()
    }

    /// The signature that matched, if any.
    pub fn matched_signature(&self) -> Option<&'static str> {
        self.matched
    }
}

/// Classify a user-agent string.
///
/// Matching is case-insensitive and by substring, so `Googlebot/2.1` matches
/// `bot` and `Mozilla/5.0 (compatible; GPTBot/1.0)` matches `bot` as well.
///
/// # Example
/// ```
/// use paywall_lite::classify;
///
/// assert!(classify("Mozilla/5.0 (compatible; GPTBot/1.0)").is_automated());
/// assert!(!classify("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0").is_automated());
/// ```
pub fn classify(user_agent: &str) -> Classification {
    let ua = user_agent.to_ascii_lowercase();

    AUTOMATED_SIGNATURES
        .iter()
        .copied()
        .find(|signature| ua.contains(*signature))
        .map(Classification::automated)
        .unwrap_or_else(Classification::human)
}
