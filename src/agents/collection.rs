//! Collection Agent
//!
//! Role: "Detail Collector". Entered only when validation finds mandatory
//! fields missing. The human-input capability is invoked deterministically
//! for exactly the missing fields (a bounded policy, not an opaque agent
//! decision), then one LLM call merges and normalizes the collected values
//! into the record. If that call fails or cannot be coerced, the directly
//! merged record is kept; by then it already holds the user's answers.

use crate::agents::extract_json_block;
use crate::config::LLMConfig;
use crate::input::HumanInput;
use crate::llm::provider::LLM;
use crate::models::{MandatoryField, TripDetails};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use tracing::{info, warn};

pub struct CollectionAgent;

impl CollectionAgent {
    /// Collect the missing mandatory fields from the user.
    pub async fn collect(
        user_query: &str,
        missing: &[MandatoryField],
        current: &TripDetails,
        input: &mut dyn HumanInput,
        llm: &LLM,
        llm_config: &LLMConfig,
    ) -> TripDetails {
        info!(missing = ?missing, "Collecting missing trip details");

        let merged = input.collect(missing, current);

        let request = LLMRequest {
            provider: llm_config.default_provider.clone(),
            model: llm_config.default_model.clone(),
            messages: vec![LLMMessage::user(Self::create_collection_prompt(
                user_query, missing, &merged,
            ))],
            max_tokens: Some(1024),
            temperature: Some(0.1),
            system_instruction: Some(
                "You specialize in gathering missing trip information from users in a friendly \
                 and efficient manner. You never discard or alter values the user has provided."
                    .to_string(),
            ),
        };

        match llm.create_chat_completion(&request).await {
            Ok(response) => match Self::parse_collected_details(&response.content) {
                Ok(normalized) => {
                    info!(complete = normalized.is_complete(), "Collected details normalized");
                    normalized
                }
                Err(e) => {
                    warn!(error = %e, "Could not parse normalized details, keeping merged record");
                    merged
                }
            },
            Err(e) => {
                warn!(error = %e, "Normalization call failed, keeping merged record");
                merged
            }
        }
    }

    fn create_collection_prompt(
        user_query: &str,
        missing: &[MandatoryField],
        merged: &TripDetails,
    ) -> String {
        let missing_fields_str = missing
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let current_data =
            serde_json::to_string(merged).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"The user has provided this original query: {user_query}

Missing mandatory fields were: {missing_fields_str}
Trip data after asking the user for those fields: {current_data}

Merge the user's answers into a clean trip details record. Keep every value
the user supplied exactly as given; only tidy obvious formatting (stray
whitespace, duplicated words). Do not invent values for fields that are
still empty.

OUTPUT FORMAT (respond with ONLY valid JSON, same shape as the trip data
above): destination, duration, start_date, budget, interests, group_size,
accommodation_type."#,
            user_query = user_query,
            missing_fields_str = missing_fields_str,
            current_data = current_data
        )
    }

    fn parse_collected_details(response: &str) -> AppResult<TripDetails> {
        let json_str = extract_json_block(response);
        let details: TripDetails = serde_json::from_str(json_str).map_err(|e| {
            AppError::SchemaCoercion(format!("Failed to parse collected details JSON: {}", e))
        })?;
        Ok(details)
    }
}
