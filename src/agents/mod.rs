//! Agent System
//!
//! The reasoning steps that power the trip planner:
//!
//! - **Extraction Agent**: pulls structured trip details out of the query
//! - **Collection Agent**: gathers missing mandatory fields from the user
//! - **Attractions Agent**: searches the web for attractions scaled to the
//!   trip length and budget
//! - **Planner Agent**: synthesizes the day-by-day itinerary
//!
//! ## Pipeline Overview
//!
//! ```text
//! User Query
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Extraction  │  → Best-effort TripDetails
//! └─────────────┘
//!      │
//!      ▼ (validate)
//! ┌─────────────┐
//! │ Collection  │  → Only when mandatory fields are missing
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Attractions │  → Web search (max 2 queries) + compilation
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Planner   │  → Day-by-day itinerary text
//! └─────────────┘
//! ```

pub mod attractions;
pub mod collection;
pub mod extraction;
pub mod planner;

pub use attractions::{AttractionsAgent, BudgetTier, DurationBand, SearchPolicy};
pub use collection::CollectionAgent;
pub use extraction::ExtractionAgent;
pub use planner::PlannerAgent;

/// Pull the JSON payload out of an LLM response that may wrap it in
/// markdown code fences or surrounding prose.
pub(crate) fn extract_json_block(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
            .trim()
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .unwrap_or(response)
            .trim()
    } else {
        response.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_block_plain() {
        assert_eq!(extract_json_block(r#" {"a": 1} "#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_block_fenced() {
        let response = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(extract_json_block(response), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_block_bare_fence() {
        let response = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_block(response), r#"{"a": 1}"#);
    }
}
