//! Wizard state machine: tracks which step the user is on.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

use super::model::{OnboardingProfile, StepData};

/// The five screens of the wizard.
///
/// Progresses linearly: CompanyInfo → Industry → Address → PosUsage →
/// BusinessAims. Serialized as the step number (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    CompanyInfo = 1,
    Industry = 2,
    Address = 3,
    PosUsage = 4,
    BusinessAims = 5,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        Self::CompanyInfo,
        Self::Industry,
        Self::Address,
        Self::PosUsage,
        Self::BusinessAims,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<WizardStep> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<WizardStep> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn is_last(&self) -> bool {
        matches!(self, Self::BusinessAims)
    }

    /// Front-end route for this step.
    pub fn route(&self) -> String {
        format!("/onboarding/step{}", self.number())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::CompanyInfo => "Company information",
            Self::Industry => "Industry",
            Self::Address => "Business address",
            Self::PosUsage => "Point of sale",
            Self::BusinessAims => "Business goals",
        }
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = WizardError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n).ok_or(WizardError::NoSuchStep(n))
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}", self.number())
    }
}

/// Where the wizard is. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "step", rename_all = "snake_case")]
pub enum WizardPosition {
    Step(WizardStep),
    Completed,
}

impl WizardPosition {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Proof that a step's save succeeded.
///
/// Only the submission coordinator mints these, so a forward transition
/// without a successful save cannot be expressed.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a save receipt is the only way to advance the wizard"]
pub struct SaveReceipt {
    step: WizardStep,
}

impl SaveReceipt {
    pub(crate) fn new(step: WizardStep) -> Self {
        Self { step }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }
}

/// Proof that the finalize call succeeded after step 5 was saved.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a completion receipt is the only way to complete the wizard"]
pub struct CompletionReceipt {
    _private: (),
}

impl CompletionReceipt {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

/// Owns the profile and the step position.
///
/// Backward moves are free. Forward moves need a [`SaveReceipt`] for the
/// active step. Going back never clears data entered on later steps.
#[derive(Debug, Clone, Default)]
pub struct WizardController {
    profile: OnboardingProfile,
}

impl WizardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> &OnboardingProfile {
        &self.profile
    }

    pub fn position(&self) -> WizardPosition {
        if self.profile.completed {
            WizardPosition::Completed
        } else {
            WizardPosition::Step(self.profile.current_step)
        }
    }

    /// The active step, or an error once the wizard is completed.
    pub fn active_step(&self) -> Result<WizardStep, WizardError> {
        match self.position() {
            WizardPosition::Step(step) => Ok(step),
            WizardPosition::Completed => Err(WizardError::AlreadyCompleted),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.profile.completed
    }

    /// Merge the active step's input into the profile.
    pub fn apply(&mut self, data: StepData) -> Result<WizardStep, WizardError> {
        let active = self.active_step()?;
        let submitted = data.step();
        if submitted != active {
            return Err(WizardError::StepMismatch { active, submitted });
        }
        self.profile.apply(data);
        Ok(active)
    }

    /// Revisit an already-reached step (`n <= current`).
    ///
    /// Moving to `current + 1` goes through [`advance`](Self::advance);
    /// anything further ahead is rejected.
    pub fn go_to_step(&mut self, n: u8) -> Result<WizardStep, WizardError> {
        let active = self.active_step()?;
        let target = WizardStep::from_number(n).ok_or(WizardError::NoSuchStep(n))?;
        if target > active {
            return Err(WizardError::InvalidTransition {
                from: active.number(),
                to: n,
            });
        }
        self.profile.current_step = target;
        Ok(target)
    }

    /// Step back once. Fails on step 1.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let active = self.active_step()?;
        let previous = active.previous().ok_or(WizardError::InvalidTransition {
            from: active.number(),
            to: 0,
        })?;
        self.go_to_step(previous.number())
    }

    /// Move to the step after the one named by `receipt`.
    ///
    /// A receipt for a step that is no longer active (the user navigated
    /// away while the save was in flight) is stale and leaves the wizard
    /// where it is.
    pub fn advance(&mut self, receipt: SaveReceipt) -> Result<WizardStep, WizardError> {
        let active = self.active_step()?;
        if receipt.step != active {
            return Err(WizardError::StaleReceipt {
                receipt: receipt.step,
                active,
            });
        }
        let next = active.next().ok_or(WizardError::InvalidTransition {
            from: active.number(),
            to: active.number() + 1,
        })?;
        self.profile.current_step = next;
        Ok(next)
    }

    /// Enter the terminal state. Only valid from the last step.
    pub fn complete(&mut self, _receipt: CompletionReceipt) -> Result<(), WizardError> {
        let active = self.active_step()?;
        if !active.is_last() {
            return Err(WizardError::InvalidTransition {
                from: active.number(),
                to: active.number() + 1,
            });
        }
        self.profile.completed = true;
        self.profile.completed_at = Some(chrono::Utc::now());
        Ok(())
    }
}
