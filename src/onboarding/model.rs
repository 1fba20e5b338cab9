//! Onboarding profile and the per-step input that builds it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Industry;
use super::state::WizardStep;

/// Whether the company already runs a point-of-sale system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PosUsage {
    AlreadyUsing,
    WantBiz365,
    NotSure,
}

impl PosUsage {
    pub const ALL: [PosUsage; 3] = [Self::AlreadyUsing, Self::WantBiz365, Self::NotSure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyUsing => "already-using",
            Self::WantBiz365 => "want-biz365",
            Self::NotSure => "not-sure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyUsing => "Yes, I already use a POS system",
            Self::WantBiz365 => "No, I want to use Biz365 POS",
            Self::NotSure => "Not sure yet",
        }
    }
}

impl std::fmt::Display for PosUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the company wants to achieve with the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusinessAim {
    IncreaseSales,
    ManageInventory,
    CustomerLoyalty,
    OnlinePresence,
    StreamlineOperations,
    ReduceCosts,
    Other,
}

impl BusinessAim {
    pub const ALL: [BusinessAim; 7] = [
        Self::IncreaseSales,
        Self::ManageInventory,
        Self::CustomerLoyalty,
        Self::OnlinePresence,
        Self::StreamlineOperations,
        Self::ReduceCosts,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncreaseSales => "increase-sales",
            Self::ManageInventory => "manage-inventory",
            Self::CustomerLoyalty => "customer-loyalty",
            Self::OnlinePresence => "online-presence",
            Self::StreamlineOperations => "streamline-operations",
            Self::ReduceCosts => "reduce-costs",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::IncreaseSales => "Increase sales",
            Self::ManageInventory => "Manage inventory",
            Self::CustomerLoyalty => "Build customer loyalty",
            Self::OnlinePresence => "Grow online presence",
            Self::StreamlineOperations => "Streamline operations",
            Self::ReduceCosts => "Reduce costs",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for BusinessAim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Postal address collected in step 3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    /// ISO 3166-1 alpha-2 code, e.g. "IN".
    pub country: String,
    pub postal_code: String,
}

/// The single profile accumulated across the wizard.
///
/// Data fields are public for reading; the position fields (`current_step`,
/// `completed`) only move through
/// [`WizardController`](super::state::WizardController).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    pub company_name: String,
    pub industry: Option<Industry>,
    pub sub_industry: Option<String>,
    pub branch_location: String,
    pub address: Address,
    pub pos_usage: Option<PosUsage>,
    pub current_software: Option<String>,
    pub specific_needs: Option<String>,
    pub business_aims: BTreeSet<BusinessAim>,
    pub other_aim: Option<String>,
    pub(crate) current_step: WizardStep,
    pub(crate) completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl Default for OnboardingProfile {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            industry: None,
            sub_industry: None,
            branch_location: String::new(),
            address: Address::default(),
            pos_usage: None,
            current_software: None,
            specific_needs: None,
            business_aims: BTreeSet::new(),
            other_aim: None,
            current_step: WizardStep::CompanyInfo,
            completed: false,
            completed_at: None,
        }
    }
}

impl OnboardingProfile {
    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Merge one step's input into the profile.
    ///
    /// Only the fields owned by that step are touched. Conditional fields
    /// whose condition no longer holds are dropped.
    pub(crate) fn apply(&mut self, data: StepData) {
        match data {
            StepData::CompanyInfo { company_name } => {
                self.company_name = company_name;
            }
            StepData::Industry {
                industry,
                sub_industry,
                branch_location,
            } => {
                self.industry = industry;
                self.sub_industry = match (industry, sub_industry) {
                    (Some(ind), Some(sub)) if ind.offers(&sub) => Some(sub),
                    _ => None,
                };
                self.branch_location = branch_location;
            }
            StepData::Address(address) => {
                self.address = address;
            }
            StepData::PosUsage {
                pos_usage,
                current_software,
                specific_needs,
            } => {
                self.pos_usage = pos_usage;
                self.current_software =
                    current_software.filter(|_| pos_usage == Some(PosUsage::AlreadyUsing));
                self.specific_needs = specific_needs
                    .filter(|s| !s.trim().is_empty())
                    .filter(|_| pos_usage == Some(PosUsage::WantBiz365));
            }
            StepData::BusinessAims {
                business_aims,
                other_aim,
            } => {
                self.other_aim = other_aim.filter(|_| business_aims.contains(&BusinessAim::Other));
                self.business_aims = business_aims;
            }
        }
    }
}

/// Input submitted from one wizard screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepData {
    CompanyInfo {
        company_name: String,
    },
    Industry {
        industry: Option<Industry>,
        sub_industry: Option<String>,
        branch_location: String,
    },
    Address(Address),
    PosUsage {
        pos_usage: Option<PosUsage>,
        current_software: Option<String>,
        specific_needs: Option<String>,
    },
    BusinessAims {
        business_aims: BTreeSet<BusinessAim>,
        other_aim: Option<String>,
    },
}

impl StepData {
    /// The step this input belongs to.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::CompanyInfo { .. } => WizardStep::CompanyInfo,
            Self::Industry { .. } => WizardStep::Industry,
            Self::Address(_) => WizardStep::Address,
            Self::PosUsage { .. } => WizardStep::PosUsage,
            Self::BusinessAims { .. } => WizardStep::BusinessAims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_empty_and_on_first_step() {
        let p = OnboardingProfile::default();
        assert!(p.company_name.is_empty());
        assert!(p.industry.is_none());
        assert!(p.business_aims.is_empty());
        assert_eq!(p.current_step(), WizardStep::CompanyInfo);
        assert!(!p.is_completed());
        assert!(p.completed_at().is_none());
    }

    #[test]
    fn apply_touches_only_its_step() {
        let mut p = OnboardingProfile::default();
        p.apply(StepData::CompanyInfo {
            company_name: "Acme Traders".into(),
        });
        p.apply(StepData::Address(Address {
            street: "12 MG Road, Fort".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            country: "IN".into(),
            postal_code: "400001".into(),
        }));
        assert_eq!(p.company_name, "Acme Traders");
        assert_eq!(p.address.city, "Mumbai");
        assert!(p.industry.is_none());
    }

    #[test]
    fn sub_industry_dropped_when_catalog_is_empty() {
        let mut p = OnboardingProfile::default();
        p.apply(StepData::Industry {
            industry: Some(Industry::Education),
            sub_industry: Some("cafe".into()),
            branch_location: "Pune".into(),
        });
        assert_eq!(p.industry, Some(Industry::Education));
        assert!(p.sub_industry.is_none());
    }

    #[test]
    fn sub_industry_dropped_when_not_in_catalog() {
        let mut p = OnboardingProfile::default();
        p.apply(StepData::Industry {
            industry: Some(Industry::Restaurant),
            sub_industry: Some("grocery".into()),
            branch_location: "Pune".into(),
        });
        assert!(p.sub_industry.is_none());

        p.apply(StepData::Industry {
            industry: Some(Industry::Restaurant),
            sub_industry: Some("cafe".into()),
            branch_location: "Pune".into(),
        });
        assert_eq!(p.sub_industry.as_deref(), Some("cafe"));
    }

    #[test]
    fn conditional_pos_fields_follow_usage() {
        let mut p = OnboardingProfile::default();
        p.apply(StepData::PosUsage {
            pos_usage: Some(PosUsage::NotSure),
            current_software: Some("Tally".into()),
            specific_needs: Some("GST billing".into()),
        });
        assert!(p.current_software.is_none());
        assert!(p.specific_needs.is_none());

        p.apply(StepData::PosUsage {
            pos_usage: Some(PosUsage::WantBiz365),
            current_software: None,
            specific_needs: Some("GST billing".into()),
        });
        assert_eq!(p.specific_needs.as_deref(), Some("GST billing"));
    }

    #[test]
    fn other_aim_dropped_without_other() {
        let mut p = OnboardingProfile::default();
        p.apply(StepData::BusinessAims {
            business_aims: BTreeSet::from([BusinessAim::IncreaseSales]),
            other_aim: Some("franchise".into()),
        });
        assert!(p.other_aim.is_none());
    }

    #[test]
    fn pos_usage_serde_is_kebab_case() {
        let v: PosUsage = serde_json::from_str("\"already-using\"").unwrap();
        assert_eq!(v, PosUsage::AlreadyUsing);
        assert_eq!(
            serde_json::to_string(&PosUsage::WantBiz365).unwrap(),
            "\"want-biz365\""
        );
        for aim in BusinessAim::ALL {
            assert_eq!(
                serde_json::to_string(&aim).unwrap(),
                format!("\"{aim}\"")
            );
        }
    }

    #[test]
    fn step_data_knows_its_step() {
        let data = StepData::BusinessAims {
            business_aims: BTreeSet::new(),
            other_aim: None,
        };
        assert_eq!(data.step(), WizardStep::BusinessAims);
        assert_eq!(StepData::Address(Address::default()).step(), WizardStep::Address);
    }
}
