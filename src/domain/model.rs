use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Body of `POST /phase_for_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseQuery {
    #[serde(default)]
    pub date: Option<String>,
}

impl PhaseQuery {
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
        }
    }

    pub fn today() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub date: String,
    pub illumination_percentage: f64,
    pub image_number: u32,
    pub image_url: String,
    pub next_new_moon: String,
    pub next_full_moon: String,
}

/// Everything the ephemeris reports about one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct LunarSnapshot {
    pub date: NaiveDate,
    pub illumination: f64,
    pub next_illumination: f64,
    pub next_new_moon: NaiveDateTime,
    pub next_full_moon: NaiveDateTime,
}

impl LunarSnapshot {
    /// Illumination grows toward tomorrow; a tie counts as waning.
    pub fn is_waxing(&self) -> bool {
        self.next_illumination > self.illumination
    }
}

/// Flat failure body shared by every error the endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl ErrorBody {
    pub const GENERIC: &'static str = "An unexpected error occurred";

    pub fn new(details: impl Into<String>) -> Self {
        Self {
            error: Self::GENERIC.to_string(),
            details: details.into(),
        }
    }
}
