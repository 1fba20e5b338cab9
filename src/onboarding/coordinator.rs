//! SubmissionCoordinator: persists validated steps and finalizes the wizard.
//!
//! Decides when to show a toast and what it says, paces transitions so the
//! toast is visible, and guards against duplicate submissions. Backend
//! failures never escape as errors: they become an error toast and a
//! `Failed` outcome, and the wizard stays where it is.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::WizardError;

use super::backend::OnboardingBackend;
use super::notify::{NavTarget, Navigator, Notifier, ToastKind};
use super::state::{CompletionReceipt, SaveReceipt, WizardStep};
use super::steps::{COMPLETE_FAILURE_MESSAGE, COMPLETE_SUCCESS_MESSAGE, StepBody, spec};

/// UX pauses so success toasts are seen before the view changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After a step save, before moving to the next step.
    pub advance_delay: Duration,
    /// After completion, before handing off to the dashboard.
    pub handoff_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            advance_delay: Duration::from_millis(1000),
            handoff_delay: Duration::from_millis(1500),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn immediate() -> Self {
        Self {
            advance_delay: Duration::ZERO,
            handoff_delay: Duration::ZERO,
        }
    }
}

/// Result of a step save.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(SaveReceipt),
    /// The backend call failed; an error toast was shown.
    Failed { message: String },
    /// A save for the same step is already running; nothing was sent.
    InFlight,
}

/// Result of the finalize call.
#[derive(Debug)]
pub enum CompletionOutcome {
    Completed {
        receipt: CompletionReceipt,
        /// Where to hand the user off to.
        redirect: String,
    },
    Failed { message: String },
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CallKey {
    Step(WizardStep),
    Finalize,
}

/// Releases an in-flight slot when dropped.
struct InFlightGuard<'a> {
    slots: &'a Mutex<HashSet<CallKey>>,
    key: CallKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Exclusive right to save one step. The step counts as saving until this
/// is dropped.
pub struct StepClaim<'a> {
    step: WizardStep,
    _guard: InFlightGuard<'a>,
}

impl StepClaim<'_> {
    pub fn step(&self) -> WizardStep {
        self.step
    }
}

/// Bridges validated step data to the backend.
pub struct SubmissionCoordinator {
    backend: Arc<dyn OnboardingBackend>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    pacing: Pacing,
    dashboard_url: String,
    in_flight: Mutex<HashSet<CallKey>>,
}

impl SubmissionCoordinator {
    pub fn new(
        backend: Arc<dyn OnboardingBackend>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        pacing: Pacing,
        dashboard_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            notifier,
            navigator,
            pacing,
            dashboard_url: dashboard_url.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Whether a save for `step` is running.
    pub fn is_in_flight(&self, step: WizardStep) -> bool {
        self.slots().contains(&CallKey::Step(step))
    }

    /// The in-flight set, recovered if a holder panicked.
    fn slots(&self) -> MutexGuard<'_, HashSet<CallKey>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| {
            warn!("In-flight set was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn claim(&self, key: CallKey) -> Option<InFlightGuard<'_>> {
        if !self.slots().insert(key) {
            return None;
        }
        Some(InFlightGuard {
            slots: &self.in_flight,
            key,
        })
    }

    /// Reserve `step` for saving. `None` while another save holds it.
    pub fn claim_step(&self, step: WizardStep) -> Option<StepClaim<'_>> {
        let guard = self.claim(CallKey::Step(step))?;
        Some(StepClaim {
            step,
            _guard: guard,
        })
    }

    /// Persist one step.
    ///
    /// On success shows the step's success toast, waits the advance delay
    /// and returns a receipt. The slot stays claimed through the delay so
    /// a second click cannot resubmit during the transition.
    pub async fn save_step(&self, step: WizardStep, body: &StepBody) -> SaveOutcome {
        let Some(claim) = self.claim_step(step) else {
            debug!(step = step.number(), "Save already in flight, ignoring submit");
            return SaveOutcome::InFlight;
        };
        self.save_claimed(&claim, body).await
    }

    /// Persist a step already reserved with [`claim_step`](Self::claim_step).
    ///
    /// The claim outlives the call, so the caller decides how long the step
    /// stays marked as saving (e.g. through the finalize call).
    pub async fn save_claimed(&self, claim: &StepClaim<'_>, body: &StepBody) -> SaveOutcome {
        let step = claim.step();
        let row = spec(step);
        let attempt_id = Uuid::new_v4();
        info!(step = step.number(), %attempt_id, endpoint = row.endpoint, "Saving onboarding step");

        match self.backend.save_step(step, body).await {
            Ok(()) => {
                info!(step = step.number(), %attempt_id, "Onboarding step saved");
                self.notifier.show_toast(ToastKind::Success, row.success_message);
                pause(self.pacing.advance_delay).await;
                SaveOutcome::Saved(SaveReceipt::new(step))
            }
            Err(e) => {
                warn!(step = step.number(), %attempt_id, error = %e, "Failed to save onboarding step");
                self.notifier.show_toast(ToastKind::Error, row.failure_message);
                SaveOutcome::Failed {
                    message: row.failure_message.to_string(),
                }
            }
        }
    }

    /// Finalize onboarding. Requires the receipt from step 5's save.
    pub async fn complete_onboarding(
        &self,
        receipt: SaveReceipt,
    ) -> Result<CompletionOutcome, WizardError> {
        if !receipt.step().is_last() {
            return Err(WizardError::InvalidTransition {
                from: receipt.step().number(),
                to: receipt.step().number() + 1,
            });
        }

        let Some(_guard) = self.claim(CallKey::Finalize) else {
            debug!("Finalize already in flight, ignoring");
            return Ok(CompletionOutcome::InFlight);
        };

        let attempt_id = Uuid::new_v4();
        info!(%attempt_id, "Finalizing onboarding");

        match self.backend.complete().await {
            Ok(response) => {
                let redirect = response
                    .redirect_url
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| self.dashboard_url.clone());
                info!(%attempt_id, %redirect, "Onboarding completed");
                self.notifier
                    .show_toast(ToastKind::Success, COMPLETE_SUCCESS_MESSAGE);
                Ok(CompletionOutcome::Completed {
                    receipt: CompletionReceipt::new(),
                    redirect,
                })
            }
            Err(e) => {
                warn!(%attempt_id, error = %e, "Failed to finalize onboarding");
                self.notifier
                    .show_toast(ToastKind::Error, COMPLETE_FAILURE_MESSAGE);
                Ok(CompletionOutcome::Failed {
                    message: COMPLETE_FAILURE_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Wait the hand-off delay, then leave for the dashboard.
    pub async fn hand_off(&self, redirect: &str) {
        pause(self.pacing.handoff_delay).await;
        info!(target_url = %redirect, "Handing off to dashboard");
        self.navigator.navigate(NavTarget::External(redirect.to_string()));
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::backend::{MockBackend, MockEndpoint};
    use crate::onboarding::notify::RecordingCollaborator;
    use crate::onboarding::steps::CompanyInfoBody;

    const DASHBOARD: &str = "https://dashboard.biz365.app";

    fn setup(backend: MockBackend) -> (SubmissionCoordinator, Arc<MockBackend>, Arc<RecordingCollaborator>) {
        let backend = Arc::new(backend);
        let rec = Arc::new(RecordingCollaborator::new());
        let coordinator = SubmissionCoordinator::new(
            backend.clone(),
            rec.clone(),
            rec.clone(),
            Pacing::immediate(),
            DASHBOARD,
        );
        (coordinator, backend, rec)
    }

    fn company() -> StepBody {
        StepBody::CompanyInfo(CompanyInfoBody {
            company_name: "Acme".into(),
        })
    }

    #[tokio::test]
    async fn successful_save_returns_receipt_and_toast() {
        let (coordinator, backend, rec) = setup(MockBackend::new());

        let outcome = coordinator.save_step(WizardStep::CompanyInfo, &company()).await;
        match outcome {
            SaveOutcome::Saved(receipt) => assert_eq!(receipt.step(), WizardStep::CompanyInfo),
            other => panic!("expected Saved, got {other:?}"),
        }
        assert_eq!(
            rec.last_toast(),
            Some((ToastKind::Success, "Company information saved!".into()))
        );
        assert_eq!(backend.call_count(MockEndpoint::Step(WizardStep::CompanyInfo)), 1);
        assert!(!coordinator.is_in_flight(WizardStep::CompanyInfo));
    }

    #[tokio::test]
    async fn failed_save_shows_step_specific_error() {
        let backend = MockBackend::new();
        backend.fail_next(MockEndpoint::Step(WizardStep::CompanyInfo), 1);
        let (coordinator, _backend, rec) = setup(backend);

        let outcome = coordinator.save_step(WizardStep::CompanyInfo, &company()).await;
        assert!(matches!(outcome, SaveOutcome::Failed { .. }));
        assert_eq!(
            rec.last_toast(),
            Some((
                ToastKind::Error,
                "Failed to save company information. Please try again.".into()
            ))
        );
        // Guard released on the failure path too.
        assert!(!coordinator.is_in_flight(WizardStep::CompanyInfo));
    }

    #[tokio::test]
    async fn concurrent_save_for_same_step_is_rejected() {
        let (coordinator, backend, _rec) =
            setup(MockBackend::new().with_latency(Duration::from_millis(100)));
        let body = company();

        let (first, second) = tokio::join!(
            coordinator.save_step(WizardStep::CompanyInfo, &body),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                coordinator.save_step(WizardStep::CompanyInfo, &body).await
            }
        );
        assert!(matches!(first, SaveOutcome::Saved(_)));
        assert!(matches!(second, SaveOutcome::InFlight));
        assert_eq!(backend.call_count(MockEndpoint::Step(WizardStep::CompanyInfo)), 1);
    }

    #[tokio::test]
    async fn claimed_step_stays_in_flight_after_save() {
        let (coordinator, backend, _rec) = setup(MockBackend::new());

        let claim = coordinator.claim_step(WizardStep::BusinessAims).unwrap();
        let body = company();
        let outcome = coordinator.save_claimed(&claim, &body).await;
        assert!(matches!(outcome, SaveOutcome::Saved(_)));

        assert!(coordinator.is_in_flight(WizardStep::BusinessAims));
        assert!(matches!(
            coordinator.save_step(WizardStep::BusinessAims, &body).await,
            SaveOutcome::InFlight
        ));
        assert_eq!(backend.call_count(MockEndpoint::Step(WizardStep::BusinessAims)), 1);

        drop(claim);
        assert!(!coordinator.is_in_flight(WizardStep::BusinessAims));
    }

    #[tokio::test]
    async fn poisoned_in_flight_set_is_recovered() {
        let (coordinator, _backend, _rec) = setup(MockBackend::new());
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _slots = coordinator.in_flight.lock().unwrap();
            panic!("holder panicked");
        }));
        assert!(coordinator.in_flight.is_poisoned());

        let outcome = coordinator.save_step(WizardStep::CompanyInfo, &company()).await;
        assert!(matches!(outcome, SaveOutcome::Saved(_)));
        assert!(!coordinator.is_in_flight(WizardStep::CompanyInfo));
    }

    #[tokio::test]
    async fn complete_requires_last_step_receipt() {
        let (coordinator, backend, _rec) = setup(MockBackend::new());
        let err = coordinator
            .complete_onboarding(SaveReceipt::new(WizardStep::Address))
            .await
            .unwrap_err();
        assert_eq!(err, WizardError::InvalidTransition { from: 3, to: 4 });
        assert_eq!(backend.call_count(MockEndpoint::Complete), 0);
    }

    #[tokio::test]
    async fn complete_falls_back_to_dashboard_url() {
        let (coordinator, _backend, rec) = setup(MockBackend::new());
        let outcome = coordinator
            .complete_onboarding(SaveReceipt::new(WizardStep::BusinessAims))
            .await
            .unwrap();
        match outcome {
            CompletionOutcome::Completed { redirect, .. } => assert_eq!(redirect, DASHBOARD),
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(rec.last_toast().unwrap().0, ToastKind::Success);
    }

    #[tokio::test]
    async fn complete_uses_backend_redirect() {
        let (coordinator, _backend, _rec) =
            setup(MockBackend::new().with_redirect("https://dashboard.biz365.app/setup"));
        let outcome = coordinator
            .complete_onboarding(SaveReceipt::new(WizardStep::BusinessAims))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CompletionOutcome::Completed { ref redirect, .. } if redirect == "https://dashboard.biz365.app/setup"
        ));
    }

    #[tokio::test]
    async fn complete_failure_is_reported_not_raised() {
        let backend = MockBackend::new();
        backend.fail_next(MockEndpoint::Complete, 1);
        let (coordinator, _backend, rec) = setup(backend);

        let outcome = coordinator
            .complete_onboarding(SaveReceipt::new(WizardStep::BusinessAims))
            .await
            .unwrap();
        assert!(matches!(outcome, CompletionOutcome::Failed { .. }));
        assert_eq!(
            rec.last_toast(),
            Some((ToastKind::Error, COMPLETE_FAILURE_MESSAGE.into()))
        );
    }

    #[tokio::test]
    async fn hand_off_navigates_externally() {
        let (coordinator, _backend, rec) = setup(MockBackend::new());
        coordinator.hand_off(DASHBOARD).await;
        assert_eq!(
            rec.navigations(),
            vec![NavTarget::External(DASHBOARD.into())]
        );
    }
}
