//! Overlay controller.
//!
//! Holds the overlay state for one page load, feeds events through the pure
//! `transition` function and carries out the resulting effects on the
//! renderer, the meter and the gateway.

use crate::application::meter::MeterStore;
use crate::application::metrics::Metrics;
use crate::application::ports::{Gateway, Renderer};
use crate::application::tasks::spawn_detached;
use crate::application::timer::{RemovalTimer, FADE_REMOVAL_DELAY};
use crate::domain::config::{Configuration, RenderStyle};
use crate::domain::overlay::{transition, Effect, OverlayEvent, OverlayState};
use std::sync::Arc;

/// Drives the overlay of a single page load.
#[derive(Debug)]
pub struct OverlayController {
    config: Arc<Configuration>,
    renderer: Arc<dyn Renderer>,
    meter: MeterStore,
    gateway: Arc<dyn Gateway>,
    metrics: Metrics,
    path: String,
    state: OverlayState,
    fade_present: bool,
    removal: RemovalTimer,
}

impl OverlayController {
    /// Create a controller and apply the initial overlay.
    ///
    /// Blur style blurs the content right away so nothing flashes before
    /// the decision; fade style leaves the page untouched.
    pub fn new(
        config: Arc<Configuration>,
        renderer: Arc<dyn Renderer>,
        meter: MeterStore,
        gateway: Arc<dyn Gateway>,
        metrics: Metrics,
        path: impl Into<String>,
    ) -> Self {
        let state = match config.style() {
            RenderStyle::Blur => {
                renderer.blur_content();
                OverlayState::ContentBlurred
            }
            RenderStyle::Fade => OverlayState::Untouched,
        };

        Self {
            config,
            renderer,
            meter,
            gateway,
            metrics,
            path: path.into(),
            state,
            fade_present: false,
            removal: RemovalTimer::new(),
        }
    }

    /// Current overlay state.
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Feed one event to the overlay.
    ///
    /// Returns `false` if the event does not apply in the current state; the
    /// overlay is left as it was.
    pub fn handle(&mut self, event: OverlayEvent) -> bool {
        let next = transition(self.state, &event, &self.config);

        if !next.accepted {
            tracing::debug!(state = ?self.state, event = ?event, "event ignored");
            return false;
        }

        tracing::debug!(from = ?self.state, to = ?next.state, "overlay transition");
        self.state = next.state;
        for effect in next.effects {
            self.apply(effect);
        }
        true
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ShowBotMessage(message) => self.renderer.show_bot_message(&message),
            Effect::Obscure => self.obscure(),
            Effect::Unobscure => self.unobscure(),
            Effect::ShowPaywall { offer_registration } => {
                self.renderer.show_paywall(offer_registration)
            }
            Effect::ShowRegistrationPrompt => self.renderer.show_registration_prompt(),
            Effect::DismissPrompt => self.renderer.dismiss_prompt(),
            Effect::ShowValidation(message) => self.renderer.show_validation_message(message),
            Effect::ResetMeter => self.meter.reset(self.config.site_id()),
            Effect::RegisterEmail(email) => self.register(email),
        }
    }

    fn obscure(&mut self) {
        match self.config.style() {
            RenderStyle::Blur => self.renderer.blur_content(),
            RenderStyle::Fade => {
                self.removal.cancel();
                self.renderer.show_fade();
                self.fade_present = true;
            }
        }
    }

    fn unobscure(&mut self) {
        match self.config.style() {
            RenderStyle::Blur => self.renderer.unblur_content(),
            RenderStyle::Fade => {
                if !self.fade_present {
                    return;
                }
                self.fade_present = false;
                self.renderer.begin_fade_out();

                let renderer = Arc::clone(&self.renderer);
                self.removal
                    .schedule(FADE_REMOVAL_DELAY, move || renderer.remove_fade());
            }
        }
    }

    fn register(&self, email: String) {
        self.metrics.record_registration();
        tracing::info!(site = %self.config.site_id(), path = %self.path, "registration submitted");

        let gateway = Arc::clone(&self.gateway);
        let path = self.path.clone();
        spawn_detached("register_email", async move {
            if let Err(e) = gateway.register_email(&email, &path).await {
                tracing::debug!(path = %path, error = %e, "registration call failed");
            }
        });
    }

    /// Check if a fade removal is still scheduled.
    pub fn fade_removal_pending(&self) -> bool {
        self.removal.is_pending()
    }
}
