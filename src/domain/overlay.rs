//! Overlay state machine.
//!
//! The overlay is modelled as a finite-state machine: a single pure function
//! maps `(state, event)` to the next state plus an ordered list of effects.
//! Executing the effects (touching the page, resetting the meter, calling the
//! backend) is the controller's job, so every transition can be tested here
//! without a rendered page.
//!
//! ```text
//!   Untouched ─┐                        ┌─▶ Hidden ◀───────────────────┐
//!              ├── Resolved(BotGranted) ┤                              │
//!   ContentBlurred ─ Resolved(Granted) ─┘                    Submit(email)
//!              │                                                       │
//!              └── Resolved(Denied) ──▶ FadeAndPaywall ──Register──▶ RegistrationPrompt
//!                                             ▲                        │
//!                                             └──────── Cancel ────────┘
//! ```
//!
//! `Hidden` is terminal for the page load: no event leads back to a gating
//! state. Cancelling the registration prompt returns to the paywall unless the
//! configuration asks for cancel to unlock.

use crate::domain::config::Configuration;
use crate::domain::outcome::AccessOutcome;

/// Message shown when the registration form is submitted without an email.
pub const EMAIL_REQUIRED_MESSAGE: &str = "Email required";

/// What the visitor currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Before the decision, fade style: page left as delivered
    Untouched,
    /// Before the decision, blur style: content blurred to avoid a flash
    ContentBlurred,
    /// No overlay; content (or the bot disclosure) fully visible
    Hidden,
    /// Content obscured with the blocking paywall prompt on top
    FadeAndPaywall,
    /// Content obscured with the email registration prompt on top
    RegistrationPrompt,
}

impl OverlayState {
    /// Check if no decision has been applied yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, OverlayState::Untouched | OverlayState::ContentBlurred)
    }

    /// Check if the content is currently gated.
    pub fn is_gated(&self) -> bool {
        matches!(
            self,
            OverlayState::FadeAndPaywall | OverlayState::RegistrationPrompt
        )
    }
}

/// Inputs to the overlay state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    /// The access decision for this page load is known
    Resolved(AccessOutcome),
    /// The visitor chose "Continue with Email" on the paywall
    RegistrationRequested,
    /// The visitor submitted the registration form
    Submit {
        /// Raw value of the email field
        email: String,
    },
    /// The visitor dismissed the registration prompt
    Cancel,
}

/// Side effects requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the content with the bot disclosure text
    ShowBotMessage(String),
    /// Obscure the content (blur or fade, depending on style)
    Obscure,
    /// Remove whatever obscures the content
    Unobscure,
    /// Show the blocking paywall prompt
    ShowPaywall {
        /// Whether the prompt offers the registration button
        offer_registration: bool,
    },
    /// Show the email registration prompt
    ShowRegistrationPrompt,
    /// Remove the currently visible prompt
    DismissPrompt,
    /// Show a blocking validation message on the current prompt
    ShowValidation(&'static str),
    /// Reset the site's visit counter to zero
    ResetMeter,
    /// Send the email to the backend without waiting for the result
    RegisterEmail(String),
}

/// Result of feeding one event to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the event
    pub state: OverlayState,
    /// Effects to run, in order
    pub effects: Vec<Effect>,
    /// False if the event does not apply to the state it was delivered in
    pub accepted: bool,
}

impl Transition {
    fn to(state: OverlayState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            accepted: true,
        }
    }

    fn ignored(state: OverlayState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            accepted: false,
        }
    }
}

/// Compute the next overlay state for an event.
///
/// Events that do not apply to the current state leave it unchanged, request
/// no effects and are reported with `accepted == false`.
///
/// # Example
/// ```
/// use paywall_lite::{transition, AccessOutcome, Configuration, Effect, OverlayEvent, OverlayState};
///
/// let config = Configuration::default();
/// let t = transition(
///     OverlayState::Untouched,
///     &OverlayEvent::Resolved(AccessOutcome::Granted),
///     &config,
/// );
/// assert_eq!(t.state, OverlayState::Hidden);
/// assert_eq!(t.effects, vec![Effect::Unobscure]);
/// ```
pub fn transition(state: OverlayState, event: &OverlayEvent, config: &Configuration) -> Transition {
    use OverlayEvent as E;
    use OverlayState as S;

    match (state, event) {
        (S::Untouched | S::ContentBlurred, E::Resolved(outcome)) => match outcome {
            AccessOutcome::BotGranted => Transition::to(
                S::Hidden,
                vec![
                    Effect::ShowBotMessage(config.bot_message().to_string()),
                    Effect::Unobscure,
                ],
            ),
            AccessOutcome::Granted => Transition::to(S::Hidden, vec![Effect::Unobscure]),
            AccessOutcome::Denied => Transition::to(
                S::FadeAndPaywall,
                vec![
                    Effect::Obscure,
                    Effect::ShowPaywall {
                        offer_registration: config.offer_registration(),
                    },
                ],
            ),
        },

        (S::FadeAndPaywall, E::RegistrationRequested) if config.offer_registration() => {
            Transition::to(
                S::RegistrationPrompt,
                vec![Effect::DismissPrompt, Effect::ShowRegistrationPrompt],
            )
        }

        (S::RegistrationPrompt, E::Submit { email }) => {
            let email = email.trim();
            if email.is_empty() {
                return Transition::to(
                    S::RegistrationPrompt,
                    vec![Effect::ShowValidation(EMAIL_REQUIRED_MESSAGE)],
                );
            }
            Transition::to(
                S::Hidden,
                vec![
                    Effect::ResetMeter,
                    Effect::RegisterEmail(email.to_string()),
                    Effect::DismissPrompt,
                    Effect::Unobscure,
                ],
            )
        }

        (S::RegistrationPrompt, E::Cancel) if config.cancel_unlocks() => {
            Transition::to(S::Hidden, vec![Effect::DismissPrompt, Effect::Unobscure])
        }

        (S::RegistrationPrompt, E::Cancel) => Transition::to(
            S::FadeAndPaywall,
            vec![
                Effect::DismissPrompt,
                Effect::ShowPaywall {
                    offer_registration: config.offer_registration(),
                },
            ],
        ),

        (state, _) => Transition::ignored(state),
    }
}
