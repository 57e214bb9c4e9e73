//! Recording renderer for testing.

use crate::application::ports::Renderer;
use std::sync::{Arc, Mutex, MutexGuard};

/// A renderer call, as recorded by `MockRenderer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    BlurContent,
    UnblurContent,
    ShowFade,
    BeginFadeOut,
    RemoveFade,
    ShowBotMessage(String),
    ShowPaywall { offer_registration: bool },
    ShowRegistrationPrompt,
    DismissPrompt,
    ShowValidation(String),
}

/// Renderer that records every call. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl MockRenderer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RenderCall>> {
        self.calls
            .lock()
            .expect("MockRenderer mutex poisoned - a test thread panicked while holding the lock")
    }

    fn record(&self, call: RenderCall) {
        self.lock().push(call);
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.lock().clone()
    }

    /// Number of times `call` was made.
    pub fn count(&self, call: &RenderCall) -> usize {
        self.lock().iter().filter(|c| *c == call).count()
    }

    /// Check if `call` was made at least once.
    pub fn contains(&self, call: &RenderCall) -> bool {
        self.count(call) > 0
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Renderer for MockRenderer {
    fn blur_content(&self) {
        self.record(RenderCall::BlurContent);
    }

    fn unblur_content(&self) {
        self.record(RenderCall::UnblurContent);
    }

    fn show_fade(&self) {
        self.record(RenderCall::ShowFade);
    }

    fn begin_fade_out(&self) {
        self.record(RenderCall::BeginFadeOut);
    }

    fn remove_fade(&self) {
        self.record(RenderCall::RemoveFade);
    }

    fn show_bot_message(&self, message: &str) {
        self.record(RenderCall::ShowBotMessage(message.to_string()));
    }

    fn show_paywall(&self, offer_registration: bool) {
        self.record(RenderCall::ShowPaywall { offer_registration });
    }

    fn show_registration_prompt(&self) {
        self.record(RenderCall::ShowRegistrationPrompt);
    }

    fn dismiss_prompt(&self) {
        self.record(RenderCall::DismissPrompt);
    }

    fn show_validation_message(&self, message: &str) {
        self.record(RenderCall::ShowValidation(message.to_string()));
    }
}
