use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Facility family served by one dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Hospital,
    School,
    Preschool,
}

impl Domain {
    pub const fn ordered() -> [Self; 3] {
        [Self::Hospital, Self::School, Self::Preschool]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hospital => "Hospitals",
            Self::School => "Schools",
            Self::Preschool => "Preschools",
        }
    }

    /// Path segment used by the survey backend (`/api/{slug}-data`).
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::School => "school",
            Self::Preschool => "preschool",
        }
    }

    /// Record field carrying the display name of the facility.
    pub const fn entity_name_field(self) -> &'static str {
        match self {
            Self::Hospital => "hospital_name",
            Self::School => "school_name",
            Self::Preschool => "kindergarten_name",
        }
    }

    /// Query parameter accepted by the backend for server-side name filtering.
    pub fn name_query_param(self) -> String {
        format!("{}_name", self.slug())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dashboard domain '{0}'")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hospital" | "hospitals" => Ok(Self::Hospital),
            "school" | "schools" => Ok(Self::School),
            "preschool" | "preschools" | "kindergarten" => Ok(Self::Preschool),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

/// One of the three scored dimensions every facility carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAxis {
    Infrastructure,
    Population,
    Resources,
}

impl ScoreAxis {
    pub const fn ordered() -> [Self; 3] {
        [Self::Infrastructure, Self::Population, Self::Resources]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Population => "Population",
            Self::Resources => "Resources",
        }
    }

    pub const fn score_field(self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure_score",
            Self::Population => "population_score",
            Self::Resources => "resources_score",
        }
    }
}

impl fmt::Display for ScoreAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown score axis '{0}'")]
pub struct UnknownAxis(pub String);

impl FromStr for ScoreAxis {
    type Err = UnknownAxis;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "infrastructure" | "infra" => Ok(Self::Infrastructure),
            "population" => Ok(Self::Population),
            "resources" => Ok(Self::Resources),
            other => Err(UnknownAxis(other.to_string())),
        }
    }
}

pub const YELLOW_THRESHOLD: f64 = 0.4;
pub const GREEN_THRESHOLD: f64 = 0.7;

/// Ordinal severity band derived from a score. Declaration order is the
/// severity order, so `Red < Yellow < Green`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NeedCategory {
    Red,
    Yellow,
    Green,
}

impl NeedCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Red, Self::Yellow, Self::Green]
    }

    /// Classify a score. NaN and negative values land in `Red`.
    pub fn classify(score: f64) -> Self {
        if score >= GREEN_THRESHOLD {
            Self::Green
        } else if score >= YELLOW_THRESHOLD {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
        }
    }

    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "orange",
            Self::Green => "green",
        }
    }

    pub const fn score_class(self) -> &'static str {
        match self {
            Self::Red => "score-low",
            Self::Yellow => "score-medium",
            Self::Green => "score-high",
        }
    }

    /// Parse a backend-reported label (`"RED"`, `"yellow"`, ...).
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RED" => Some(Self::Red),
            "YELLOW" => Some(Self::Yellow),
            "GREEN" => Some(Self::Green),
            _ => None,
        }
    }
}

/// Free-function form of [`NeedCategory::classify`].
pub fn classify(score: f64) -> NeedCategory {
    NeedCategory::classify(score)
}
