//! Per-step field validation.
//!
//! Pure functions from `(step, profile)` to a map of field name → message.
//! An empty map means the step may be submitted.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::model::{BusinessAim, OnboardingProfile, PosUsage};
use super::state::WizardStep;

/// Indian PIN code: six digits, first digit non-zero.
static INDIA_PIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("static regex"));

const INDIA: &str = "IN";

/// Field-level validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Validates the fields owned by one wizard step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepValidator {
    /// Accept any company information on step 1.
    pub permissive_company_step: bool,
}

impl StepValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permissive() -> Self {
        Self {
            permissive_company_step: true,
        }
    }

    pub fn validate(&self, step: WizardStep, profile: &OnboardingProfile) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match step {
            WizardStep::CompanyInfo => {
                if !self.permissive_company_step {
                    company_info(profile, &mut errors);
                }
            }
            WizardStep::Industry => industry(profile, &mut errors),
            WizardStep::Address => address(profile, &mut errors),
            WizardStep::PosUsage => pos_usage(profile, &mut errors),
            WizardStep::BusinessAims => business_aims(profile, &mut errors),
        }
        errors
    }
}

fn company_info(profile: &OnboardingProfile, errors: &mut FieldErrors) {
    if is_blank(&profile.company_name) {
        errors.add("companyName", "Company name is required");
    }
}

fn industry(profile: &OnboardingProfile, errors: &mut FieldErrors) {
    match profile.industry {
        None => errors.add("industry", "Please select an industry"),
        Some(industry) if industry.has_sub_industries() => {
            let valid = profile
                .sub_industry
                .as_deref()
                .is_some_and(|sub| industry.offers(sub));
            if !valid {
                errors.add("subIndustry", "Please select a sub-industry");
            }
        }
        Some(_) => {}
    }
    if is_blank(&profile.branch_location) {
        errors.add("branchLocation", "Branch location is required");
    }
}

fn address(profile: &OnboardingProfile, errors: &mut FieldErrors) {
    let address = &profile.address;

    // Loose heuristic for "looks like a full address".
    let street = address.street.trim();
    if street.is_empty() {
        errors.add("street", "Street address is required");
    } else if char_len(street) < 10 {
        errors.add(
            "street",
            "Please enter a complete address (at least 10 characters)",
        );
    }

    let city = address.city.trim();
    if city.is_empty() {
        errors.add("city", "City is required");
    } else if char_len(city) < 2 {
        errors.add("city", "City must be at least 2 characters");
    }

    if is_blank(&address.state) {
        errors.add("state", "State is required");
    }

    let country = address.country.trim();
    if country.is_empty() {
        errors.add("country", "Country is required");
    }

    let postal = address.postal_code.trim();
    if postal.is_empty() {
        errors.add("postalCode", "Postal code is required");
    } else if country.eq_ignore_ascii_case(INDIA) {
        if !INDIA_PIN.is_match(postal) {
            errors.add("postalCode", "Please enter a valid 6-digit PIN code");
        }
    } else if char_len(postal) < 3 {
        errors.add("postalCode", "Postal code must be at least 3 characters");
    }
}

fn pos_usage(profile: &OnboardingProfile, errors: &mut FieldErrors) {
    match profile.pos_usage {
        None => errors.add("posUsage", "Please select an option"),
        Some(PosUsage::AlreadyUsing) => {
            let software = profile.current_software.as_deref().unwrap_or("").trim();
            if software.is_empty() {
                errors.add("currentSoftware", "Please tell us which software you use");
            } else if char_len(software) < 2 {
                errors.add(
                    "currentSoftware",
                    "Software name must be at least 2 characters",
                );
            }
        }
        // specificNeeds is optional free text.
        Some(PosUsage::WantBiz365) | Some(PosUsage::NotSure) => {}
    }
}

fn business_aims(profile: &OnboardingProfile, errors: &mut FieldErrors) {
    if profile.business_aims.is_empty() {
        errors.add("businessAims", "Please select at least one aim");
    }
    if profile.business_aims.contains(&BusinessAim::Other) {
        let other = profile.other_aim.as_deref().unwrap_or("").trim();
        if other.is_empty() {
            errors.add("otherAim", "Please describe your aim");
        } else if char_len(other) < 3 {
            errors.add("otherAim", "Please provide at least 3 characters");
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::onboarding::{Address, Industry};

    fn validate(step: WizardStep, profile: &OnboardingProfile) -> FieldErrors {
        StepValidator::new().validate(step, profile)
    }

    fn valid_address() -> Address {
        Address {
            street: "221B Baker Street".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            country: "IN".into(),
            postal_code: "400001".into(),
        }
    }

    fn with_address(address: Address) -> OnboardingProfile {
        OnboardingProfile {
            address,
            ..Default::default()
        }
    }

    // ── Step 1 ──────────────────────────────────────────────────────────

    #[test]
    fn company_name_required() {
        let mut p = OnboardingProfile::default();
        let errors = validate(WizardStep::CompanyInfo, &p);
        assert_eq!(errors.get("companyName"), Some("Company name is required"));

        p.company_name = "   ".into();
        assert!(validate(WizardStep::CompanyInfo, &p).contains("companyName"));

        p.company_name = "Acme".into();
        assert!(validate(WizardStep::CompanyInfo, &p).is_empty());
    }

    #[test]
    fn permissive_company_step_accepts_anything() {
        let p = OnboardingProfile::default();
        assert!(
            StepValidator::permissive()
                .validate(WizardStep::CompanyInfo, &p)
                .is_empty()
        );
        // Other steps are unaffected.
        assert!(
            !StepValidator::permissive()
                .validate(WizardStep::Industry, &p)
                .is_empty()
        );
    }

    // ── Step 2 ──────────────────────────────────────────────────────────

    #[test]
    fn industry_step_empty_reports_all_required() {
        let errors = validate(WizardStep::Industry, &OnboardingProfile::default());
        assert!(errors.contains("industry"));
        assert!(errors.contains("branchLocation"));
        // No industry chosen yet, so no sub-industry requirement.
        assert!(!errors.contains("subIndustry"));
    }

    #[test]
    fn sub_industry_required_when_catalog_non_empty() {
        let mut p = OnboardingProfile {
            industry: Some(Industry::Retail),
            branch_location: "Koramangala".into(),
            ..Default::default()
        };
        let errors = validate(WizardStep::Industry, &p);
        assert_eq!(errors.get("subIndustry"), Some("Please select a sub-industry"));
        assert_eq!(errors.len(), 1);

        p.sub_industry = Some("grocery".into());
        assert!(validate(WizardStep::Industry, &p).is_empty());
    }

    #[test]
    fn sub_industry_not_required_when_catalog_empty() {
        let mut p = OnboardingProfile {
            industry: Some(Industry::Education),
            branch_location: "Koramangala".into(),
            ..Default::default()
        };
        assert!(validate(WizardStep::Industry, &p).is_empty());

        p.sub_industry = Some("anything".into());
        assert!(validate(WizardStep::Industry, &p).is_empty());
    }

    #[test]
    fn sub_industry_from_other_catalog_is_invalid() {
        let p = OnboardingProfile {
            industry: Some(Industry::Restaurant),
            sub_industry: Some("grocery".into()),
            branch_location: "Koramangala".into(),
            ..Default::default()
        };
        assert!(validate(WizardStep::Industry, &p).contains("subIndustry"));
    }

    // ── Step 3 ──────────────────────────────────────────────────────────

    #[test]
    fn address_empty_reports_every_field() {
        let errors = validate(WizardStep::Address, &OnboardingProfile::default());
        for field in ["street", "city", "state", "country", "postalCode"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn short_street_rejected() {
        let p = with_address(Address {
            street: "12 Road".into(),
            ..valid_address()
        });
        assert_eq!(
            validate(WizardStep::Address, &p).get("street"),
            Some("Please enter a complete address (at least 10 characters)")
        );
    }

    #[test]
    fn one_letter_city_rejected() {
        let p = with_address(Address {
            city: "X".into(),
            ..valid_address()
        });
        assert!(validate(WizardStep::Address, &p).contains("city"));
    }

    #[test]
    fn indian_pin_codes() {
        let ok = with_address(valid_address());
        assert!(validate(WizardStep::Address, &ok).is_empty());

        let leading_zero = with_address(Address {
            postal_code: "040001".into(),
            ..valid_address()
        });
        assert_eq!(
            validate(WizardStep::Address, &leading_zero).get("postalCode"),
            Some("Please enter a valid 6-digit PIN code")
        );

        for bad in ["40001", "4000012", "40000a"] {
            let p = with_address(Address {
                postal_code: bad.into(),
                ..valid_address()
            });
            assert!(validate(WizardStep::Address, &p).contains("postalCode"), "{bad}");
        }
    }

    #[test]
    fn generic_postal_codes() {
        let us = |code: &str| {
            with_address(Address {
                street: "350 Fifth Avenue".into(),
                city: "New York".into(),
                state: "NY".into(),
                country: "US".into(),
                postal_code: code.into(),
            })
        };
        assert!(validate(WizardStep::Address, &us("NY")).contains("postalCode"));
        assert!(validate(WizardStep::Address, &us("10001")).is_empty());
        assert!(validate(WizardStep::Address, &us("SW1")).is_empty());
    }

    // ── Step 4 ──────────────────────────────────────────────────────────

    #[test]
    fn pos_usage_required() {
        let errors = validate(WizardStep::PosUsage, &OnboardingProfile::default());
        assert_eq!(errors.get("posUsage"), Some("Please select an option"));
    }

    #[test]
    fn current_software_required_when_already_using() {
        let mut p = OnboardingProfile {
            pos_usage: Some(PosUsage::AlreadyUsing),
            current_software: Some(String::new()),
            ..Default::default()
        };
        assert!(validate(WizardStep::PosUsage, &p).contains("currentSoftware"));

        p.current_software = Some("Z".into());
        assert_eq!(
            validate(WizardStep::PosUsage, &p).get("currentSoftware"),
            Some("Software name must be at least 2 characters")
        );

        p.current_software = Some("Petpooja".into());
        assert!(validate(WizardStep::PosUsage, &p).is_empty());
    }

    #[test]
    fn current_software_not_required_otherwise() {
        let p = OnboardingProfile {
            pos_usage: Some(PosUsage::NotSure),
            ..Default::default()
        };
        assert!(validate(WizardStep::PosUsage, &p).is_empty());

        let p = OnboardingProfile {
            pos_usage: Some(PosUsage::WantBiz365),
            ..Default::default()
        };
        assert!(validate(WizardStep::PosUsage, &p).is_empty());
    }

    // ── Step 5 ──────────────────────────────────────────────────────────

    #[test]
    fn business_aims_non_empty() {
        let errors = validate(WizardStep::BusinessAims, &OnboardingProfile::default());
        assert_eq!(errors.get("businessAims"), Some("Please select at least one aim"));
    }

    #[test]
    fn other_aim_needs_three_characters() {
        let mut p = OnboardingProfile {
            business_aims: BTreeSet::from([BusinessAim::Other]),
            other_aim: Some("ab".into()),
            ..Default::default()
        };
        assert_eq!(
            validate(WizardStep::BusinessAims, &p).get("otherAim"),
            Some("Please provide at least 3 characters")
        );

        p.other_aim = Some("  ab  ".into());
        assert!(validate(WizardStep::BusinessAims, &p).contains("otherAim"));

        p.other_aim = Some("custom need".into());
        assert!(validate(WizardStep::BusinessAims, &p).is_empty());

        p.other_aim = None;
        assert_eq!(
            validate(WizardStep::BusinessAims, &p).get("otherAim"),
            Some("Please describe your aim")
        );
    }

    #[test]
    fn other_aim_ignored_without_other() {
        let p = OnboardingProfile {
            business_aims: BTreeSet::from([BusinessAim::ReduceCosts]),
            ..Default::default()
        };
        assert!(validate(WizardStep::BusinessAims, &p).is_empty());
    }

    #[test]
    fn validation_only_looks_at_its_step() {
        // A fully empty profile fails every step on its own fields only.
        let p = OnboardingProfile::default();
        let step2 = validate(WizardStep::Industry, &p);
        assert!(!step2.contains("companyName"));
        assert!(!step2.contains("street"));
    }

    #[test]
    fn field_errors_serialize_as_object() {
        let errors = validate(WizardStep::PosUsage, &OnboardingProfile::default());
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["posUsage"], "Please select an option");
    }
}
