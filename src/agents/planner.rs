//! Planner Agent
//!
//! Role: "Trip Planner". Synthesizes the day-by-day itinerary from the trip
//! details and the attractions found. Output is free text; no schema
//! coercion happens here, and an invocation fault is fatal for the run.

use crate::config::LLMConfig;
use crate::llm::provider::LLM;
use crate::models::{AttractionsSearchResult, TripDetails};
use crate::types::{AppResult, LLMMessage, LLMRequest};
use tracing::info;

const NO_ATTRACTIONS_FALLBACK: &str =
    "No specific attractions found, please research popular attractions for the destination.";

pub struct PlannerAgent;

impl PlannerAgent {
    /// Generate the final itinerary text.
    pub async fn generate(
        details: &TripDetails,
        attractions: Option<&AttractionsSearchResult>,
        llm: &LLM,
        llm_config: &LLMConfig,
    ) -> AppResult<String> {
        info!(
            destination = details.destination.as_deref().unwrap_or("unknown"),
            attraction_count = attractions.map(|a| a.attractions.len()).unwrap_or(0),
            "Generating trip plan"
        );

        let request = LLMRequest {
            provider: llm_config.default_provider.clone(),
            model: llm_config.default_model.clone(),
            messages: vec![LLMMessage::user(Self::create_planning_prompt(
                details,
                attractions,
            ))],
            max_tokens: Some(4096),
            temperature: Some(0.7),
            system_instruction: Some(
                "You are a travel enthusiast who is very good at planning trips day by day, \
                 with detailed information about attractions, restaurants, and activities, \
                 presented in a clear and concise manner."
                    .to_string(),
            ),
        };

        let response = llm.create_chat_completion(&request).await?;
        info!(plan_len = response.content.len(), "Trip plan generated");
        Ok(response.content)
    }

    /// Flatten the attractions into prompt lines, or the research-fallback
    /// instruction when none were found.
    fn format_attractions(attractions: Option<&AttractionsSearchResult>) -> String {
        match attractions {
            Some(result) if !result.attractions.is_empty() => result
                .attractions
                .iter()
                .map(|a| {
                    format!(
                        "- {}: {} (Location: {})",
                        a.name, a.description, a.location
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            _ => NO_ATTRACTIONS_FALLBACK.to_string(),
        }
    }

    fn create_planning_prompt(
        details: &TripDetails,
        attractions: Option<&AttractionsSearchResult>,
    ) -> String {
        let attractions_info = Self::format_attractions(attractions);
        let interests = if details.interests.is_empty() {
            "General sightseeing".to_string()
        } else {
            details.interests.join(", ")
        };
        let group_size = details
            .group_size
            .map(|n| n.to_string())
            .unwrap_or_else(|| "Not specified".to_string());

        format!(
            r#"Create a detailed day-by-day trip plan using the following information:

TRIP DETAILS:
- Destination: {destination}
- Duration: {duration}
- Start Date: {start_date}
- Budget: {budget}
- Group Size: {group_size}
- Interests: {interests}

AVAILABLE ATTRACTIONS:
{attractions_info}

Create a comprehensive day-by-day itinerary that includes:
1. Daily schedule with specific timings
2. Attractions to visit each day
3. Recommended restaurants for meals
4. Transportation suggestions between locations
5. Budget considerations for each day
6. Tips and recommendations

Make sure the plan is realistic, considering travel time between locations and the specified budget."#,
            destination = details.destination.as_deref().unwrap_or("Not specified"),
            duration = details.duration.as_deref().unwrap_or("Not specified"),
            start_date = details.start_date.as_deref().unwrap_or("Not specified"),
            budget = details.budget.as_deref().unwrap_or("Not specified"),
            group_size = group_size,
            interests = interests,
            attractions_info = attractions_info,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attraction;

    fn details() -> TripDetails {
        TripDetails {
            destination: Some("Paris".to_string()),
            duration: Some("5 days".to_string()),
            start_date: Some("June 1".to_string()),
            budget: Some("$2000".to_string()),
            interests: vec!["art".to_string(), "food".to_string()],
            group_size: Some(2),
            accommodation_type: None,
        }
    }

    #[test]
    fn test_format_attractions_lines() {
        let result = AttractionsSearchResult::new(
            "Paris",
            vec![Attraction {
                name: "Louvre".to_string(),
                description: "Art museum".to_string(),
                location: "Rue de Rivoli".to_string(),
                opening_hours: None,
                estimated_visit_time: None,
                category: None,
                rating: None,
            }],
        );

        let formatted = PlannerAgent::format_attractions(Some(&result));
        assert_eq!(formatted, "- Louvre: Art museum (Location: Rue de Rivoli)");
    }

    #[test]
    fn test_format_attractions_empty_uses_fallback() {
        let empty = AttractionsSearchResult::empty("Paris");
        assert_eq!(
            PlannerAgent::format_attractions(Some(&empty)),
            NO_ATTRACTIONS_FALLBACK
        );
        assert_eq!(PlannerAgent::format_attractions(None), NO_ATTRACTIONS_FALLBACK);
    }

    #[test]
    fn test_planning_prompt_embeds_trip_fields() {
        let prompt = PlannerAgent::create_planning_prompt(&details(), None);
        assert!(prompt.contains("Destination: Paris"));
        assert!(prompt.contains("Duration: 5 days"));
        assert!(prompt.contains("Interests: art, food"));
        assert!(prompt.contains("Group Size: 2"));
        assert!(prompt.contains(NO_ATTRACTIONS_FALLBACK));
    }
}
