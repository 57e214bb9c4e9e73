//! One page load from the visitor's point of view.

use crate::application::controller::OverlayController;
use crate::application::decider::AccessDecider;
use crate::domain::outcome::AccessOutcome;
use crate::domain::overlay::{OverlayEvent, OverlayState};

/// A single page load: decides access once and routes visitor input to the
/// overlay.
///
/// Created by `Paywall::open_page`. Visitor input arriving before `ready`
/// has resolved is ignored.
#[derive(Debug)]
pub struct PageSession {
    path: String,
    user_agent: String,
    decider: AccessDecider,
    controller: OverlayController,
    outcome: Option<AccessOutcome>,
}

impl PageSession {
    pub(crate) fn new(
        path: impl Into<String>,
        user_agent: impl Into<String>,
        decider: AccessDecider,
        controller: OverlayController,
    ) -> Self {
        Self {
            path: path.into(),
            user_agent: user_agent.into(),
            decider,
            controller,
            outcome: None,
        }
    }

    /// Run the access decision and apply it to the overlay.
    ///
    /// Only the first call does any work; later calls return the outcome
    /// already applied.
    ///
    /// # Panics
    /// Must run on a tokio runtime with the time driver enabled; see
    /// [`AccessDecider::decide`].
    pub async fn ready(&mut self) -> AccessOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }

        let outcome = self.decider.decide(&self.path, &self.user_agent).await;
        self.outcome = Some(outcome);
        self.controller.handle(OverlayEvent::Resolved(outcome));
        outcome
    }

    /// The visitor clicked "Continue with Email" on the paywall.
    pub fn request_registration(&mut self) -> bool {
        self.controller.handle(OverlayEvent::RegistrationRequested)
    }

    /// The visitor submitted the registration form.
    ///
    /// A blank email keeps the prompt open with a validation message.
    pub fn submit_email(&mut self, email: &str) -> bool {
        self.controller.handle(OverlayEvent::Submit {
            email: email.to_string(),
        })
    }

    /// The visitor dismissed the registration prompt.
    pub fn cancel(&mut self) -> bool {
        self.controller.handle(OverlayEvent::Cancel)
    }

    /// Current overlay state.
    pub fn state(&self) -> OverlayState {
        self.controller.state()
    }

    /// The access outcome, once `ready` has run.
    pub fn outcome(&self) -> Option<AccessOutcome> {
        self.outcome
    }

    /// Path of the page being viewed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check if the fade is still dissolving.
    pub fn fade_removal_pending(&self) -> bool {
        self.controller.fade_removal_pending()
    }
}
