//! Biz365 onboarding wizard.
//!
//! A five-step form flow that collects a company profile, validates each
//! step, persists it through an [`OnboardingBackend`], and hands the user off
//! to the dashboard once the final step is saved and onboarding is finalized.

pub mod backend;
pub mod catalog;
pub mod coordinator;
pub mod model;
pub mod notify;
pub mod routes;
pub mod session;
pub mod state;
pub mod steps;
pub mod validator;
pub mod wizard;

pub use backend::{HttpBackend, MockBackend, MockCall, MockEndpoint, OnboardingBackend};
pub use catalog::Industry;
pub use coordinator::{CompletionOutcome, Pacing, SaveOutcome, SubmissionCoordinator};
pub use model::{Address, BusinessAim, OnboardingProfile, PosUsage, StepData};
pub use notify::{NavTarget, Navigator, Notifier, RecordingCollaborator, ToastKind};
pub use routes::{StubBackendState, StubProgress, onboarding_routes};
pub use session::{AuthSession, require_session};
pub use state::{CompletionReceipt, SaveReceipt, WizardController, WizardPosition, WizardStep};
pub use steps::{CompletionResponse, STEPS, StepBody, StepSpec};
pub use validator::{FieldErrors, StepValidator};
pub use wizard::{OnboardingWizard, SubmitOutcome, WizardDeps};
