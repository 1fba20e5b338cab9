//! Per-step configuration table and request bodies.
//!
//! Every step is described by one [`StepSpec`] row: the endpoint that
//! persists it, the fields it owns and the toast messages shown after a
//! save. The coordinator is driven entirely by this table.

use serde::{Deserialize, Serialize};

use super::catalog::Industry;
use super::model::{BusinessAim, OnboardingProfile, PosUsage};
use super::state::WizardStep;

/// Static description of one wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec {
    pub step: WizardStep,
    /// Path relative to the API base URL.
    pub endpoint: &'static str,
    /// Field keys this step owns, as used in [`FieldErrors`](super::FieldErrors).
    pub fields: &'static [&'static str],
    pub success_message: &'static str,
    pub failure_message: &'static str,
}

pub static STEPS: [StepSpec; 5] = [
    StepSpec {
        step: WizardStep::CompanyInfo,
        endpoint: "/onboarding/step1",
        fields: &["companyName"],
        success_message: "Company information saved!",
        failure_message: "Failed to save company information. Please try again.",
    },
    StepSpec {
        step: WizardStep::Industry,
        endpoint: "/onboarding/step2",
        fields: &["industry", "subIndustry", "branchLocation"],
        success_message: "Industry details saved!",
        failure_message: "Failed to save industry details. Please try again.",
    },
    StepSpec {
        step: WizardStep::Address,
        endpoint: "/onboarding/step3",
        fields: &["street", "city", "state", "country", "postalCode"],
        success_message: "Address saved!",
        failure_message: "Failed to save address. Please try again.",
    },
    StepSpec {
        step: WizardStep::PosUsage,
        endpoint: "/onboarding/step4",
        fields: &["posUsage", "currentSoftware", "specificNeeds"],
        success_message: "POS preferences saved!",
        failure_message: "Failed to save POS preferences. Please try again.",
    },
    StepSpec {
        step: WizardStep::BusinessAims,
        endpoint: "/onboarding/step5",
        fields: &["businessAims", "otherAim"],
        success_message: "Business goals saved!",
        failure_message: "Failed to save business goals. Please try again.",
    },
];

/// Finalize call made after step 5 is saved.
pub const COMPLETE_ENDPOINT: &str = "/onboarding/complete";
pub const COMPLETE_SUCCESS_MESSAGE: &str = "Onboarding complete! Redirecting to your dashboard...";
pub const COMPLETE_FAILURE_MESSAGE: &str = "Failed to complete onboarding. Please try again.";

/// Look up the table row for a step.
pub fn spec(step: WizardStep) -> &'static StepSpec {
    &STEPS[usize::from(step.number()) - 1]
}

// ── Request bodies ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfoBody {
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBody {
    pub industry: Industry,
    pub sub_industry: Option<String>,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBody {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosUsageBody {
    pub pos_usage: PosUsage,
    pub current_software: Option<String>,
    pub specific_needs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAimsBody {
    pub business_aims: Vec<BusinessAim>,
    pub other_aim: Option<String>,
}

/// JSON body for one step's save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepBody {
    CompanyInfo(CompanyInfoBody),
    Industry(IndustryBody),
    Address(AddressBody),
    PosUsage(PosUsageBody),
    BusinessAims(BusinessAimsBody),
}

impl StepBody {
    /// Build the body for `step` from the profile, trimming free text.
    ///
    /// Returns `None` if a required selection is missing, which a validated
    /// profile never has.
    pub fn from_profile(step: WizardStep, profile: &OnboardingProfile) -> Option<StepBody> {
        let body = match step {
            WizardStep::CompanyInfo => StepBody::CompanyInfo(CompanyInfoBody {
                company_name: profile.company_name.trim().to_string(),
            }),
            WizardStep::Industry => StepBody::Industry(IndustryBody {
                industry: profile.industry?,
                sub_industry: profile.sub_industry.clone(),
                location: profile.branch_location.trim().to_string(),
            }),
            WizardStep::Address => {
                let a = &profile.address;
                StepBody::Address(AddressBody {
                    address: a.street.trim().to_string(),
                    city: a.city.trim().to_string(),
                    state: a.state.trim().to_string(),
                    country: a.country.trim().to_string(),
                    pincode: a.postal_code.trim().to_string(),
                })
            }
            WizardStep::PosUsage => StepBody::PosUsage(PosUsageBody {
                pos_usage: profile.pos_usage?,
                current_software: trimmed(&profile.current_software),
                specific_needs: trimmed(&profile.specific_needs),
            }),
            WizardStep::BusinessAims => StepBody::BusinessAims(BusinessAimsBody {
                business_aims: profile.business_aims.iter().copied().collect(),
                other_aim: trimmed(&profile.other_aim),
            }),
        };
        Some(body)
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Response to the finalize call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}
