// Core models for the trip-planning pipeline

use chrono::Local;
use serde::{Deserialize, Serialize};

/// The four fields a trip plan cannot be built without.
///
/// Kept as a closed enum so routing after validation is exhaustive; the
/// snake_case identifiers match the JSON field names of [`TripDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryField {
    Destination,
    Duration,
    StartDate,
    Budget,
}

impl MandatoryField {
    pub const ALL: [MandatoryField; 4] = [
        MandatoryField::Destination,
        MandatoryField::Duration,
        MandatoryField::StartDate,
        MandatoryField::Budget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MandatoryField::Destination => "destination",
            MandatoryField::Duration => "duration",
            MandatoryField::StartDate => "start_date",
            MandatoryField::Budget => "budget",
        }
    }

    /// Human-facing prompt label used by the console input provider.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            MandatoryField::Destination => "📍 Destination (where you want to travel)",
            MandatoryField::Duration => "📅 Duration (e.g., '5 days', '2 weeks', '1 month')",
            MandatoryField::StartDate => "📅 Start Date (when your trip begins)",
            MandatoryField::Budget => "💰 Budget (your budget range or amount)",
        }
    }
}

impl std::fmt::Display for MandatoryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip parameters extracted from the user's free-text query.
///
/// All text fields stay free-form exactly as the user phrased them; duration
/// and budget are classified by keyword downstream, never parsed into
/// numbers or dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    pub destination: Option<String>,
    pub duration: Option<String>,
    pub start_date: Option<String>,
    pub budget: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub group_size: Option<u32>,
    pub accommodation_type: Option<String>,
}

impl TripDetails {
    fn field_value(&self, field: MandatoryField) -> Option<&str> {
        match field {
            MandatoryField::Destination => self.destination.as_deref(),
            MandatoryField::Duration => self.duration.as_deref(),
            MandatoryField::StartDate => self.start_date.as_deref(),
            MandatoryField::Budget => self.budget.as_deref(),
        }
    }

    pub fn set_field(&mut self, field: MandatoryField, value: String) {
        let slot = match field {
            MandatoryField::Destination => &mut self.destination,
            MandatoryField::Duration => &mut self.duration,
            MandatoryField::StartDate => &mut self.start_date,
            MandatoryField::Budget => &mut self.budget,
        };
        *slot = Some(value);
    }

    /// True when the field is present and not just whitespace.
    pub fn has_field(&self, field: MandatoryField) -> bool {
        self.field_value(field)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    /// Mandatory fields that are absent or empty, in declaration order.
    pub fn missing_mandatory_fields(&self) -> Vec<MandatoryField> {
        MandatoryField::ALL
            .iter()
            .copied()
            .filter(|f| !self.has_field(*f))
            .collect()
    }

    /// A record is complete iff all four mandatory fields are non-empty.
    /// This is the sole gating invariant of the pipeline.
    pub fn is_complete(&self) -> bool {
        self.missing_mandatory_fields().is_empty()
    }
}

/// A single attraction found for the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_visit_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Attraction {
    /// Clamp the rating into the 0–5 range the rest of the app assumes.
    pub fn clamp_rating(&mut self) {
        if let Some(r) = self.rating {
            self.rating = Some(r.clamp(0.0, 5.0));
        }
    }
}

/// Result of the attractions search step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionsSearchResult {
    pub destination: String,
    pub attractions: Vec<Attraction>,
    pub total_found: usize,
    pub search_date: String,
}

impl AttractionsSearchResult {
    /// Build a result with the count invariant enforced and ratings clamped.
    pub fn new(destination: impl Into<String>, mut attractions: Vec<Attraction>) -> Self {
        for attraction in &mut attractions {
            attraction.clamp_rating();
        }
        let total_found = attractions.len();
        Self {
            destination: destination.into(),
            attractions,
            total_found,
            search_date: Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Empty result for a destination, used when coercion of the search
    /// output fails and the run degrades rather than aborts.
    pub fn empty(destination: impl Into<String>) -> Self {
        Self::new(destination, Vec::new())
    }

    /// Re-establish invariants after deserializing LLM output: total_found
    /// must equal the list length and ratings must be in range.
    pub fn normalize(&mut self) {
        for attraction in &mut self.attractions {
            attraction.clamp_rating();
        }
        self.total_found = self.attractions.len();
    }
}

/// Mutable working state for a single pipeline run.
///
/// Owned exclusively by the pipeline; each step mutates it in turn and it is
/// discarded after persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripPlanningState {
    pub run_id: Option<uuid::Uuid>,
    pub user_query: String,
    pub trip_details: Option<TripDetails>,
    pub missing_fields: Vec<MandatoryField>,
    pub attractions_result: Option<AttractionsSearchResult>,
    pub final_trip_plan: String,
    pub needs_missing_details: bool,
}

impl TripPlanningState {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            run_id: Some(uuid::Uuid::new_v4()),
            user_query: user_query.into(),
            ..Default::default()
        }
    }
}
