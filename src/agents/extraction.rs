//! Extraction Agent
//!
//! Role: "Detail Extractor". Pulls trip parameters out of the user's
//! free-text query. Fields the query does not mention stay absent; the
//! model is explicitly forbidden from fabricating values. A response that
//! cannot be coerced into [`TripDetails`] degrades to an empty record so
//! the run continues into the collection step.

use crate::agents::extract_json_block;
use crate::config::LLMConfig;
use crate::llm::provider::LLM;
use crate::models::TripDetails;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use tracing::{info, warn};

pub struct ExtractionAgent;

impl ExtractionAgent {
    /// Extract trip details from the user query.
    ///
    /// LLM invocation faults propagate; coercion faults fall back to an
    /// empty record.
    pub async fn extract(
        user_query: &str,
        llm: &LLM,
        llm_config: &LLMConfig,
    ) -> AppResult<TripDetails> {
        info!(query_len = user_query.len(), "Starting trip detail extraction");

        let request = LLMRequest {
            provider: llm_config.default_provider.clone(),
            model: llm_config.default_model.clone(),
            messages: vec![LLMMessage::user(Self::create_extraction_prompt(user_query))],
            max_tokens: Some(1024),
            temperature: Some(0.1), // Extraction should be as literal as possible
            system_instruction: Some(
                "You are a precise detail extractor who extracts trip information from user \
                 queries. You never make up or assume any data."
                    .to_string(),
            ),
        };

        let response = llm.create_chat_completion(&request).await?;

        match Self::parse_trip_details(&response.content) {
            Ok(details) => {
                info!(
                    complete = details.is_complete(),
                    missing = details.missing_mandatory_fields().len(),
                    "Trip details extracted"
                );
                Ok(details)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse trip details, falling back to empty record");
                Ok(TripDetails::default())
            }
        }
    }

    fn create_extraction_prompt(user_query: &str) -> String {
        format!(
            r#"Here is the user's query:
{user_query}

Extract trip details from the user's query.

MANDATORY FIELDS (Required for trip planning):
- destination: Where the user wants to travel
- duration: How long the trip will last (can be in any format: "5 days", "2 weeks", "1 month", etc.)
- start_date: When the trip begins
- budget: The budget range or amount for the trip

OPTIONAL FIELDS (Extract if mentioned):
- interests: Activities, attractions, or experiences they're interested in
- group_size: Number of people traveling
- accommodation_type: Preferred type of accommodation

RULES:
- Only extract information that is actually present in the query
- Never invent or assume values; leave unmentioned fields null
- Duration must be extracted as a string exactly as mentioned (e.g., "5 days", "2 weeks", "1 month")

OUTPUT FORMAT (respond with ONLY valid JSON):
{{
  "destination": "city or location, or null",
  "duration": "duration string, or null",
  "start_date": "start date string, or null",
  "budget": "budget string, or null",
  "interests": ["interest 1", "interest 2"],
  "group_size": 2,
  "accommodation_type": "accommodation string, or null"
}}"#,
            user_query = user_query
        )
    }

    /// Parse the LLM response into a TripDetails record.
    fn parse_trip_details(response: &str) -> AppResult<TripDetails> {
        let json_str = extract_json_block(response);
        let details: TripDetails = serde_json::from_str(json_str).map_err(|e| {
            AppError::SchemaCoercion(format!("Failed to parse trip details JSON: {}", e))
        })?;
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trip_details_complete() {
        let response = r#"{
            "destination": "Paris",
            "duration": "5 days",
            "start_date": "June 1",
            "budget": "$2000",
            "interests": ["museums"],
            "group_size": 2,
            "accommodation_type": null
        }"#;

        let details = ExtractionAgent::parse_trip_details(response).unwrap();
        assert_eq!(details.destination.as_deref(), Some("Paris"));
        assert_eq!(details.duration.as_deref(), Some("5 days"));
        assert!(details.is_complete());
    }

    #[test]
    fn test_parse_trip_details_fenced() {
        let response = "```json\n{\"destination\": \"Tokyo\"}\n```";
        let details = ExtractionAgent::parse_trip_details(response).unwrap();
        assert_eq!(details.destination.as_deref(), Some("Tokyo"));
        assert!(!details.is_complete());
    }

    #[test]
    fn test_parse_trip_details_garbage_is_coercion_fault() {
        let err = ExtractionAgent::parse_trip_details("I could not find any details.").unwrap_err();
        assert!(matches!(err, AppError::SchemaCoercion(_)));
    }

    #[test]
    fn test_extraction_prompt_embeds_query() {
        let prompt = ExtractionAgent::create_extraction_prompt("Plan a trip to Rome");
        assert!(prompt.contains("Plan a trip to Rome"));
        assert!(prompt.contains("MANDATORY FIELDS"));
        assert!(prompt.contains("Never invent or assume values"));
    }
}
