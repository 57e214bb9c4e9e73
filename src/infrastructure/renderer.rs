//! Default renderer.
//!
//! Headless hosts (servers pre-rendering pages, tests, demos) have no page
//! to draw on; `LogRenderer` reports each overlay change as a debug event
//! instead.

use crate::application::ports::Renderer;

/// Renderer that logs overlay changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

impl LogRenderer {
    /// Create a log renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for LogRenderer {
    fn blur_content(&self) {
        tracing::debug!(overlay = "blur", "content blurred");
    }

    fn unblur_content(&self) {
        tracing::debug!(overlay = "blur", "content unblurred");
    }

    fn show_fade(&self) {
        tracing::debug!(overlay = "fade", "fade attached");
    }

    fn begin_fade_out(&self) {
        tracing::debug!(overlay = "fade", "fade dissolving");
    }

    fn remove_fade(&self) {
        tracing::debug!(overlay = "fade", "fade removed");
    }

    fn show_bot_message(&self, message: &str) {
        tracing::debug!(message_text = %message, "bot disclosure shown");
    }

    fn show_paywall(&self, offer_registration: bool) {
        tracing::debug!(offer_registration, "paywall shown");
    }

    fn show_registration_prompt(&self) {
        tracing::debug!("registration prompt shown");
    }

    fn dismiss_prompt(&self) {
        tracing::debug!("prompt dismissed");
    }

    fn show_validation_message(&self, message: &str) {
        tracing::debug!(validation = %message, "validation message shown");
    }
}
