//! Attractions Agent
//!
//! Role: "Attractions Searcher". Finds attractions matching the trip
//! duration and budget. The scaling rules are derived deterministically
//! here rather than left to the model's judgment:
//!
//! - duration band picks the target attraction count (short 3–5,
//!   medium 6–10, long 10–15)
//! - budget keywords pick the attraction tier (budget / mixed / premium)
//!
//! Web searches run under an explicit [`SearchPolicy`]: one comprehensive
//! query, at most one tier-targeted follow-up, never more than
//! `max_searches` calls, and the follow-up is discarded when it is
//! materially repetitive of the first response.

use crate::agents::extract_json_block;
use crate::config::LLMConfig;
use crate::llm::provider::LLM;
use crate::models::{AttractionsSearchResult, TripDetails};
use crate::search::SearchProvider;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use std::collections::HashSet;
use tracing::{info, warn};

/// Duration classification over the free-form duration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBand {
    /// 1–3 days
    Short,
    /// 4–7 days
    Medium,
    /// 8+ days, or any duration counted in weeks or months
    Long,
}

impl DurationBand {
    pub fn classify(duration: &str) -> Self {
        let lower = duration.to_lowercase();
        if lower.contains("week") || lower.contains("month") {
            return DurationBand::Long;
        }

        match first_number(&lower) {
            Some(n) if n <= 3 => DurationBand::Short,
            Some(n) if n <= 7 => DurationBand::Medium,
            Some(_) => DurationBand::Long,
            // No recognizable count; aim for the middle band.
            None => DurationBand::Medium,
        }
    }

    /// Target number of attractions for this band, inclusive.
    pub fn target_range(&self) -> (usize, usize) {
        match self {
            DurationBand::Short => (3, 5),
            DurationBand::Medium => (6, 10),
            DurationBand::Long => (10, 15),
        }
    }
}

/// Budget classification by keyword; amounts are never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Budget,
    Mixed,
    Premium,
}

impl BudgetTier {
    pub fn classify(budget: &str) -> Self {
        let lower = budget.to_lowercase();
        if ["low", "budget", "cheap", "affordable"]
            .iter()
            .any(|k| lower.contains(k))
        {
            BudgetTier::Budget
        } else if ["high", "luxury", "premium", "expensive", "exclusive"]
            .iter()
            .any(|k| lower.contains(k))
        {
            BudgetTier::Premium
        } else {
            BudgetTier::Mixed
        }
    }

    fn guidance(&self) -> &'static str {
        match self {
            BudgetTier::Budget => {
                "Focus on free attractions, parks, walking tours, local markets"
            }
            BudgetTier::Mixed => {
                "Mix of free and paid attractions, museums, local restaurants"
            }
            BudgetTier::Premium => {
                "Premium attractions, fine dining, exclusive experiences, luxury activities"
            }
        }
    }

    fn targeted_query(&self, destination: &str) -> String {
        match self {
            BudgetTier::Budget => format!(
                "free attractions parks walking tours local markets in {}",
                destination
            ),
            BudgetTier::Mixed => format!(
                "best museums restaurants and attractions in {}",
                destination
            ),
            BudgetTier::Premium => format!(
                "premium attractions fine dining exclusive experiences in {}",
                destination
            ),
        }
    }
}

/// Bound on the search capability for one attractions step.
#[derive(Debug, Clone, Copy)]
pub struct SearchPolicy {
    pub max_searches: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self { max_searches: 2 }
    }
}

/// True when the second response adds nothing material over the first:
/// most of its non-empty lines already appeared verbatim.
pub fn is_repetitive(first: &str, second: &str) -> bool {
    let first_lines: HashSet<&str> = first
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let second_lines: Vec<&str> = second
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if second_lines.is_empty() {
        return true;
    }

    let overlap = second_lines
        .iter()
        .filter(|l| first_lines.contains(*l))
        .count();
    overlap * 10 >= second_lines.len() * 6
}

fn first_number(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|n| n.parse().ok())
}

pub struct AttractionsAgent;

impl AttractionsAgent {
    /// Search for attractions for the (best-effort) trip details.
    ///
    /// LLM invocation faults propagate; coercion faults degrade to an
    /// empty result so the run still reaches the planner.
    pub async fn search(
        details: &TripDetails,
        llm: &LLM,
        llm_config: &LLMConfig,
        search: &dyn SearchProvider,
        policy: SearchPolicy,
        max_results: usize,
    ) -> AppResult<AttractionsSearchResult> {
        let destination = details.destination.clone().unwrap_or_default();
        let duration = details.duration.as_deref().unwrap_or("a few days");
        let budget = details.budget.as_deref().unwrap_or("medium");

        let band = DurationBand::classify(duration);
        let tier = BudgetTier::classify(budget);
        let (min_count, max_count) = band.target_range();

        info!(
            destination = %destination,
            ?band,
            ?tier,
            target = %format!("{}-{}", min_count, max_count),
            "Starting attractions search"
        );

        let comprehensive = format!(
            "top attractions in {} for {} trip {} budget",
            destination, duration, budget
        );
        let targeted = tier.targeted_query(&destination);

        let (context, searches_used) =
            Self::gather_search_context(search, policy, &comprehensive, &targeted, max_results)
                .await;
        info!(searches_used, "Search context gathered");

        let prompt = Self::create_compilation_prompt(
            &destination,
            duration,
            budget,
            min_count,
            max_count,
            tier,
            &context,
        );

        let request = LLMRequest {
            provider: llm_config.default_provider.clone(),
            model: llm_config.default_model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: Some(2048),
            temperature: Some(0.3),
            system_instruction: Some(
                "You are a smart travel researcher who tailors attraction recommendations to \
                 trip length and budget. You only compile attractions supported by the search \
                 results provided."
                    .to_string(),
            ),
        };

        let response = llm.create_chat_completion(&request).await?;

        match Self::parse_attractions(&response.content, &destination) {
            Ok(result) => {
                info!(total_found = result.total_found, "Attractions compiled");
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Could not parse attractions result, using empty result");
                Ok(AttractionsSearchResult::empty(destination))
            }
        }
    }

    /// Run the bounded search sequence and return the compiled context plus
    /// the number of search invocations actually made.
    pub async fn gather_search_context(
        search: &dyn SearchProvider,
        policy: SearchPolicy,
        comprehensive_query: &str,
        targeted_query: &str,
        max_results: usize,
    ) -> (String, usize) {
        let mut searches_used = 0;
        let mut sections = Vec::new();

        if policy.max_searches == 0 {
            return (String::new(), 0);
        }

        let first = search.search(comprehensive_query, max_results).await;
        searches_used += 1;
        let first_failed = first.starts_with("Error");
        sections.push(first.clone());

        // A second, tier-targeted pass, skipped when the first already
        // failed or the follow-up is repetitive.
        if !first_failed && searches_used < policy.max_searches {
            let second = search.search(targeted_query, max_results).await;
            searches_used += 1;
            if is_repetitive(&first, &second) {
                info!("Second search was repetitive, discarding");
            } else {
                sections.push(second);
            }
        }

        (sections.join("\n\n---\n\n"), searches_used)
    }

    fn create_compilation_prompt(
        destination: &str,
        duration: &str,
        budget: &str,
        min_count: usize,
        max_count: usize,
        tier: BudgetTier,
        search_context: &str,
    ) -> String {
        format!(
            r#"Compile a list of attractions in {destination} for a {duration} trip with a {budget} budget.

TARGET: between {min_count} and {max_count} attractions.
ATTRACTION TYPES: {guidance}.

SEARCH RESULTS:
{search_context}

RULES:
- Prioritize attractions that match the trip duration and budget
- Do not suggest expensive attractions for budget trips
- Do not pad the list beyond what the search results support
- If the search results contain errors or nothing usable, return an empty attractions list

OUTPUT FORMAT (respond with ONLY valid JSON):
{{
  "destination": "{destination}",
  "attractions": [
    {{
      "name": "Attraction name",
      "description": "Brief description",
      "location": "Location or address",
      "opening_hours": "hours or null",
      "estimated_visit_time": "time estimate or null",
      "category": "museum, park, restaurant, etc. or null",
      "rating": 4.5
    }}
  ],
  "total_found": 0,
  "search_date": "YYYY-MM-DD"
}}"#,
            destination = destination,
            duration = duration,
            budget = budget,
            min_count = min_count,
            max_count = max_count,
            guidance = tier.guidance(),
            search_context = search_context,
        )
    }

    /// Parse the LLM response, re-enforcing the result invariants: the
    /// destination is pinned to the trip's and total_found is recomputed.
    fn parse_attractions(
        response: &str,
        destination: &str,
    ) -> AppResult<AttractionsSearchResult> {
        let json_str = extract_json_block(response);
        let mut result: AttractionsSearchResult = serde_json::from_str(json_str).map_err(|e| {
            AppError::SchemaCoercion(format!("Failed to parse attractions JSON: {}", e))
        })?;
        result.destination = destination.to_string();
        result.normalize();
        Ok(result)
    }
}
