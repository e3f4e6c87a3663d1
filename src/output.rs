//! Output persistence
//!
//! Writes the three run artifacts: `trip_details.json`, `attractions.json`
//! and `complete_trip_plan.md`. Each run overwrites; directory creation is
//! idempotent.

use crate::models::TripPlanningState;
use crate::types::AppResult;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TRIP_DETAILS_FILE: &str = "trip_details.json";
pub const ATTRACTIONS_FILE: &str = "attractions.json";
pub const TRIP_PLAN_FILE: &str = "complete_trip_plan.md";

/// Save all available artifacts for a run, returning the paths written.
pub fn save_artifacts(state: &TripPlanningState, dir: &Path) -> AppResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();

    if let Some(details) = &state.trip_details {
        let path = dir.join(TRIP_DETAILS_FILE);
        fs::write(&path, serde_json::to_string_pretty(details)?)?;
        written.push(path);
    }

    if let Some(attractions) = &state.attractions_result {
        let path = dir.join(ATTRACTIONS_FILE);
        fs::write(&path, serde_json::to_string_pretty(attractions)?)?;
        written.push(path);
    }

    if !state.final_trip_plan.is_empty() {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let path = dir.join(TRIP_PLAN_FILE);
        fs::write(&path, build_plan_document(state, &generated_at))?;
        written.push(path);
    }

    info!(count = written.len(), dir = %dir.display(), "Artifacts saved");
    Ok(written)
}

/// Compose the final trip-plan document: title, generation timestamp, a
/// trip-details section when details are present, and the raw itinerary.
fn build_plan_document(state: &TripPlanningState, generated_at: &str) -> String {
    let trip_title = state
        .trip_details
        .as_ref()
        .and_then(|d| d.destination.as_deref())
        .map(|dest| format!("Trip to {}", dest))
        .unwrap_or_else(|| "Your Trip Plan".to_string());

    let mut content = format!("# {}\n\n", trip_title);
    content.push_str(&format!("**Generated on:** {}\n\n", generated_at));

    if let Some(details) = &state.trip_details {
        content.push_str("## Trip Details\n\n");
        content.push_str(&format!(
            "- **Destination:** {}\n",
            details.destination.as_deref().unwrap_or("Not specified")
        ));
        content.push_str(&format!(
            "- **Duration:** {}\n",
            details.duration.as_deref().unwrap_or("Not specified")
        ));
        content.push_str(&format!(
            "- **Start Date:** {}\n",
            details.start_date.as_deref().unwrap_or("Not specified")
        ));
        content.push_str(&format!(
            "- **Budget:** {}\n",
            details.budget.as_deref().unwrap_or("Not specified")
        ));
        if let Some(group_size) = details.group_size {
            content.push_str(&format!("- **Group Size:** {}\n", group_size));
        }
        if !details.interests.is_empty() {
            content.push_str(&format!(
                "- **Interests:** {}\n",
                details.interests.join(", ")
            ));
        }
        content.push('\n');
    }

    content.push_str("## Your Itinerary\n\n");
    content.push_str(&state.final_trip_plan);
    content
}
