//! OnboardingWizard: the front-end facing entry point.
//!
//! Owns the single `WizardController` (and through it the profile) and
//! wires validation, submission and navigation together:
//!
//! submit → apply input → validate → save → pace → advance → route change
//!
//! For the last step, a successful save is followed by the finalize call
//! and the hand-off to the dashboard.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::WizardError;

use super::backend::OnboardingBackend;
use super::coordinator::{CompletionOutcome, Pacing, SaveOutcome, SubmissionCoordinator};
use super::model::{OnboardingProfile, StepData};
use super::notify::{NavTarget, Navigator, Notifier};
use super::session::{AuthSession, require_session};
use super::state::{SaveReceipt, WizardController, WizardPosition, WizardStep};
use super::steps::StepBody;
use super::validator::{FieldErrors, StepValidator};

/// Collaborators the wizard needs.
pub struct WizardDeps {
    pub backend: Arc<dyn OnboardingBackend>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub validator: StepValidator,
    pub pacing: Pacing,
    /// Fallback hand-off target when the finalize call names none.
    pub dashboard_url: String,
}

/// What happened to a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// Saved, now on the given step.
    Advanced(WizardStep),
    /// Step 5 saved and onboarding finalized.
    Completed { redirect: String },
    /// The save failed; the step stays active for a retry.
    SaveFailed { message: String },
    /// Step 5 saved but finalizing failed; the user stays on step 5.
    FinalizeFailed { message: String },
    /// A save for this step is still running.
    InFlight,
    /// The save finished after the user navigated away; ignored.
    Stale,
}

pub struct OnboardingWizard {
    session: AuthSession,
    controller: Mutex<WizardController>,
    validator: StepValidator,
    coordinator: SubmissionCoordinator,
    navigator: Arc<dyn Navigator>,
}

impl OnboardingWizard {
    /// Open the wizard for a signed-in user.
    ///
    /// Without a session the user is sent to the login route instead.
    pub fn start(session: Option<AuthSession>, deps: WizardDeps) -> Result<Self, WizardError> {
        let session = match require_session(session) {
            Ok(s) => s,
            Err(e) => {
                deps.navigator.navigate(NavTarget::login());
                return Err(e);
            }
        };

        info!(user_id = %session.user_id, "Onboarding wizard started");

        let coordinator = SubmissionCoordinator::new(
            deps.backend,
            deps.notifier,
            Arc::clone(&deps.navigator),
            deps.pacing,
            deps.dashboard_url,
        );
        deps.navigator
            .navigate(NavTarget::step(WizardStep::CompanyInfo));

        Ok(Self {
            session,
            controller: Mutex::new(WizardController::new()),
            validator: deps.validator,
            coordinator,
            navigator: deps.navigator,
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub async fn position(&self) -> WizardPosition {
        self.controller.lock().await.position()
    }

    pub async fn is_completed(&self) -> bool {
        self.controller.lock().await.is_completed()
    }

    /// Snapshot of the accumulated profile.
    pub async fn profile(&self) -> OnboardingProfile {
        self.controller.lock().await.profile().clone()
    }

    /// Whether the submit control for `step` should be disabled.
    pub fn is_saving(&self, step: WizardStep) -> bool {
        self.coordinator.is_in_flight(step)
    }

    /// Validate the active step without submitting, e.g. on blur.
    pub async fn check(&self, data: StepData) -> Result<FieldErrors, WizardError> {
        let mut controller = self.controller.lock().await.clone();
        let step = controller.apply(data)?;
        Ok(self.validator.validate(step, controller.profile()))
    }

    /// Submit the active step's form.
    ///
    /// The input is applied to a draft first and only committed to the
    /// profile once this call holds the step's save slot, so a submit made
    /// while a save is running leaves the profile untouched.
    pub async fn submit(&self, data: StepData) -> Result<SubmitOutcome, WizardError> {
        let (claim, body) = {
            let mut controller = self.controller.lock().await;
            let mut draft = controller.clone();
            let step = draft.apply(data)?;

            let Some(claim) = self.coordinator.claim_step(step) else {
                debug!(step = step.number(), "Save already in flight, ignoring submit");
                return Ok(SubmitOutcome::InFlight);
            };

            let errors = self.validator.validate(step, draft.profile());
            if !errors.is_empty() {
                debug!(step = step.number(), errors = errors.len(), "Step failed validation");
                *controller = draft;
                return Ok(SubmitOutcome::Invalid(errors));
            }
            let body = StepBody::from_profile(step, draft.profile())
                .ok_or(WizardError::IncompleteStep(step))?;
            *controller = draft;
            (claim, body)
        };
        let step = claim.step();

        let receipt = match self.coordinator.save_claimed(&claim, &body).await {
            SaveOutcome::Saved(receipt) => receipt,
            SaveOutcome::Failed { message } => return Ok(SubmitOutcome::SaveFailed { message }),
            SaveOutcome::InFlight => return Ok(SubmitOutcome::InFlight),
        };

        if step.is_last() {
            // Step 5 stays marked as saving until finalize settles.
            return self.finish(receipt).await;
        }

        let next = {
            let mut controller = self.controller.lock().await;
            match controller.advance(receipt) {
                Ok(next) => next,
                Err(WizardError::StaleReceipt { receipt, active }) => {
                    debug!(saved = receipt.number(), active = active.number(), "Ignoring stale save");
                    return Ok(SubmitOutcome::Stale);
                }
                Err(e) => return Err(e),
            }
        };
        self.navigator.navigate(NavTarget::step(next));
        Ok(SubmitOutcome::Advanced(next))
    }

    async fn finish(&self, receipt: SaveReceipt) -> Result<SubmitOutcome, WizardError> {
        if self.controller.lock().await.active_step()? != receipt.step() {
            debug!("Step 5 saved after navigating away, not finalizing");
            return Ok(SubmitOutcome::Stale);
        }

        let (completion, redirect) = match self.coordinator.complete_onboarding(receipt).await? {
            CompletionOutcome::Completed { receipt, redirect } => (receipt, redirect),
            CompletionOutcome::Failed { message } => {
                return Ok(SubmitOutcome::FinalizeFailed { message });
            }
            CompletionOutcome::InFlight => return Ok(SubmitOutcome::InFlight),
        };

        {
            let mut controller = self.controller.lock().await;
            match controller.complete(completion) {
                Ok(()) => {}
                Err(WizardError::InvalidTransition { .. }) => {
                    debug!("Finalized after navigating away, ignoring");
                    return Ok(SubmitOutcome::Stale);
                }
                Err(e) => return Err(e),
            }
        }
        info!(user_id = %self.session.user_id, "Onboarding profile completed");

        self.coordinator.hand_off(&redirect).await;
        Ok(SubmitOutcome::Completed { redirect })
    }

    /// Revisit an already-reached step.
    pub async fn go_to_step(&self, n: u8) -> Result<WizardStep, WizardError> {
        let step = self.controller.lock().await.go_to_step(n)?;
        self.navigator.navigate(NavTarget::step(step));
        Ok(step)
    }

    /// Back button.
    pub async fn retreat(&self) -> Result<WizardStep, WizardError> {
        let step = self.controller.lock().await.retreat()?;
        self.navigator.navigate(NavTarget::step(step));
        Ok(step)
    }
}
