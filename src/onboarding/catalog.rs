//! Industry catalog and the sub-industries offered for each.

use serde::{Deserialize, Serialize};

/// Industries a company can pick in step 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    Retail,
    Restaurant,
    Healthcare,
    ProfessionalServices,
    Manufacturing,
    Education,
    Hospitality,
    Other,
}

impl Industry {
    /// Every industry, in display order.
    pub const ALL: [Industry; 8] = [
        Industry::Retail,
        Industry::Restaurant,
        Industry::Healthcare,
        Industry::ProfessionalServices,
        Industry::Manufacturing,
        Industry::Education,
        Industry::Hospitality,
        Industry::Other,
    ];

    /// Wire identifier, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Restaurant => "restaurant",
            Self::Healthcare => "healthcare",
            Self::ProfessionalServices => "professional-services",
            Self::Manufacturing => "manufacturing",
            Self::Education => "education",
            Self::Hospitality => "hospitality",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Retail => "Retail",
            Self::Restaurant => "Restaurant & Food Service",
            Self::Healthcare => "Healthcare",
            Self::ProfessionalServices => "Professional Services",
            Self::Manufacturing => "Manufacturing",
            Self::Education => "Education",
            Self::Hospitality => "Hospitality",
            Self::Other => "Other",
        }
    }

    /// Sub-industry catalog. Empty when the industry has no breakdown.
    pub fn sub_industries(&self) -> &'static [&'static str] {
        match self {
            Self::Retail => &[
                "grocery",
                "fashion",
                "electronics",
                "pharmacy",
                "home-furnishing",
            ],
            Self::Restaurant => &["fine-dining", "quick-service", "cafe", "cloud-kitchen", "bakery"],
            Self::Healthcare => &["clinic", "diagnostics", "dental", "wellness"],
            Self::ProfessionalServices => &["consulting", "legal", "accounting", "agency"],
            Self::Manufacturing => &["food-processing", "textiles", "machinery"],
            Self::Hospitality => &["hotel", "resort", "guest-house"],
            Self::Education | Self::Other => &[],
        }
    }

    pub fn has_sub_industries(&self) -> bool {
        !self.sub_industries().is_empty()
    }

    pub fn offers(&self, sub_industry: &str) -> bool {
        self.sub_industries().contains(&sub_industry)
    }

    /// Parse a wire identifier.
    pub fn parse(s: &str) -> Option<Industry> {
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
