//! Trip Planning Pipeline
//!
//! The deterministic control flow tying the agents together:
//! extraction → validation → optional collection → attraction search →
//! itinerary generation → persistence. Strictly sequential; validation is
//! the single branch point, expressed as the closed [`ValidationRoute`]
//! enum rather than string-keyed routing.

use crate::agents::{
    AttractionsAgent, CollectionAgent, ExtractionAgent, PlannerAgent, SearchPolicy,
};
use crate::config::{Config, LLMConfig};
use crate::input::{ConsoleInput, HumanInput};
use crate::llm::provider::{LLMProviderConfig, LLM};
use crate::models::{MandatoryField, TripDetails, TripPlanningState};
use crate::output;
use crate::search::{SearchProvider, TavilyClient};
use crate::types::AppResult;
use std::path::PathBuf;
use tracing::{info, warn};

/// Route selected by the validation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRoute {
    CollectMissing(Vec<MandatoryField>),
    SearchAttractions,
}

/// Collection re-runs validation afterwards, bounded at this many attempts;
/// past the bound the run proceeds best-effort with whatever was gathered.
pub const MAX_COLLECTION_ATTEMPTS: usize = 2;

/// The one true decision point in the pipeline. Deterministic, no external
/// calls: `CollectMissing` iff any mandatory field is absent or empty.
pub fn validate(details: &TripDetails) -> ValidationRoute {
    let missing = details.missing_mandatory_fields();
    if missing.is_empty() {
        ValidationRoute::SearchAttractions
    } else {
        ValidationRoute::CollectMissing(missing)
    }
}

pub struct TripPlanner {
    llm: LLM,
    llm_config: LLMConfig,
    search: Box<dyn SearchProvider>,
    input: Box<dyn HumanInput>,
    policy: SearchPolicy,
    max_search_results: usize,
    output_dir: PathBuf,
}

impl TripPlanner {
    /// Wire up the production capabilities from configuration.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let api_key = config.llm.active_api_key().unwrap_or_default();
        let llm = LLM::new(LLMProviderConfig {
            name: config.llm.default_provider.clone(),
            api_key,
        })?;

        Ok(Self::with_capabilities(
            llm,
            config.llm.clone(),
            Box::new(TavilyClient::from_config(&config.search)),
            Box::new(ConsoleInput),
            config.search.max_results,
            PathBuf::from(&config.output.dir),
        ))
    }

    /// Explicit capability injection; tests use this with mock adapters,
    /// counting search providers and scripted input.
    pub fn with_capabilities(
        llm: LLM,
        llm_config: LLMConfig,
        search: Box<dyn SearchProvider>,
        input: Box<dyn HumanInput>,
        max_search_results: usize,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            llm,
            llm_config,
            search,
            input,
            policy: SearchPolicy::default(),
            max_search_results,
            output_dir,
        }
    }

    /// Run the full pipeline for one query. The returned state is the
    /// complete run record; its artifacts have already been persisted.
    pub async fn run(&mut self, user_query: &str) -> AppResult<TripPlanningState> {
        let mut state = TripPlanningState::new(user_query);
        info!(run_id = ?state.run_id, "Starting trip planning run");

        println!("🔍 Extracting trip details from your query...");
        let mut details =
            ExtractionAgent::extract(user_query, &self.llm, &self.llm_config).await?;
        println!("✅ Trip details extracted");

        println!("🔍 Validating trip details...");
        let mut attempts = 0;
        loop {
            match validate(&details) {
                ValidationRoute::SearchAttractions => {
                    if attempts == 0 {
                        state.needs_missing_details = false;
                    }
                    println!("✅ All mandatory trip details are present!");
                    break;
                }
                ValidationRoute::CollectMissing(missing) => {
                    if attempts == 0 {
                        // Record the outcome of the first validation pass.
                        state.needs_missing_details = true;
                        state.missing_fields = missing.clone();
                    }
                    if attempts >= MAX_COLLECTION_ATTEMPTS {
                        warn!(still_missing = ?missing, "Collection attempts exhausted, proceeding best-effort");
                        break;
                    }
                    println!(
                        "❌ Missing mandatory details: {}",
                        missing
                            .iter()
                            .map(|f| f.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    println!("📝 Collecting missing trip details...");
                    details = CollectionAgent::collect(
                        user_query,
                        &missing,
                        &details,
                        self.input.as_mut(),
                        &self.llm,
                        &self.llm_config,
                    )
                    .await;
                    attempts += 1;
                }
            }
        }
        state.trip_details = Some(details.clone());

        println!("🔍 Searching for attractions...");
        let attractions = AttractionsAgent::search(
            &details,
            &self.llm,
            &self.llm_config,
            self.search.as_ref(),
            self.policy,
            self.max_search_results,
        )
        .await?;
        println!("✅ Found {} attractions", attractions.total_found);
        state.attractions_result = Some(attractions);

        println!("📅 Generating your personalized trip plan...");
        state.final_trip_plan = PlannerAgent::generate(
            &details,
            state.attractions_result.as_ref(),
            &self.llm,
            &self.llm_config,
        )
        .await?;
        println!("✅ Trip plan generated successfully!");

        println!("💾 Saving your trip plan...");
        let written = output::save_artifacts(&state, &self.output_dir)?;
        println!("\n🎉 Trip planning completed!");
        println!("📁 Files saved:");
        for path in &written {
            println!("   - {}", path.display());
        }

        info!(run_id = ?state.run_id, "Trip planning run complete");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LLMAdapter;
    use crate::types::{LLMRequest, LLMResponse, TokenUsage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Adapter replaying a queue of canned responses, one per LLM call.
    struct ScriptedAdapter {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedAdapter {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl LLMAdapter for ScriptedAdapter {
        async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
            let content = self
                .responses
                .lock()
                .expect("response queue poisoned")
                .pop_front()
                .expect("more LLM calls than scripted responses");
            Ok(LLMResponse {
                content,
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    struct CountingSearch {
        calls: Arc<AtomicUsize>,
        response: String,
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    /// Input provider that counts invocations and answers from a script.
    struct TrackingInput {
        calls: Arc<AtomicUsize>,
        answers: Vec<(MandatoryField, String)>,
    }

    impl HumanInput for TrackingInput {
        fn collect(&mut self, missing: &[MandatoryField], current: &TripDetails) -> TripDetails {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut updated = current.clone();
            for field in missing {
                if updated.has_field(*field) {
                    continue;
                }
                if let Some((_, answer)) = self.answers.iter().find(|(f, _)| f == field) {
                    updated.set_field(*field, answer.clone());
                }
            }
            updated
        }
    }

    fn test_llm_config() -> LLMConfig {
        LLMConfig {
            openai_api_key: "test".to_string(),
            anthropic_api_key: String::new(),
            openrouter_api_key: String::new(),
            default_provider: "openai".to_string(),
            default_model: "gpt-4o-mini".to_string(),
        }
    }

    fn temp_output_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tripflow-pipeline-{}", uuid::Uuid::new_v4()))
    }

    const PARIS_EXTRACTION: &str = r#"{
        "destination": "Paris",
        "duration": "5 days",
        "start_date": "June 1",
        "budget": "$2000",
        "interests": [],
        "group_size": null,
        "accommodation_type": null
    }"#;

    const PARIS_ATTRACTIONS: &str = r#"{
        "destination": "Paris",
        "attractions": [
            {"name": "Louvre", "description": "Art museum", "location": "Rue de Rivoli", "rating": 4.8},
            {"name": "Eiffel Tower", "description": "Landmark", "location": "Champ de Mars", "rating": 4.6}
        ],
        "total_found": 2,
        "search_date": "2026-08-30"
    }"#;

    const PLAN_TEXT: &str = "### Day 1\nMorning at the Louvre, evening Seine cruise.";

    fn planner_with(
        responses: Vec<&str>,
        search_response: &str,
        input_answers: Vec<(MandatoryField, String)>,
        output_dir: PathBuf,
    ) -> (TripPlanner, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let search_calls = Arc::new(AtomicUsize::new(0));
        let input_calls = Arc::new(AtomicUsize::new(0));

        let planner = TripPlanner::with_capabilities(
            LLM::from_adapter(Box::new(ScriptedAdapter::new(responses))),
            test_llm_config(),
            Box::new(CountingSearch {
                calls: Arc::clone(&search_calls),
                response: search_response.to_string(),
            }),
            Box::new(TrackingInput {
                calls: Arc::clone(&input_calls),
                answers: input_answers,
            }),
            5,
            output_dir,
        );

        (planner, search_calls, input_calls)
    }

    #[test]
    fn test_validate_routes_complete_record_to_search() {
        let details: TripDetails = serde_json::from_str(PARIS_EXTRACTION).unwrap();
        assert_eq!(validate(&details), ValidationRoute::SearchAttractions);
    }

    #[test]
    fn test_validate_routes_incomplete_record_to_collection() {
        let details = TripDetails {
            destination: Some("Tokyo".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate(&details),
            ValidationRoute::CollectMissing(vec![
                MandatoryField::Duration,
                MandatoryField::StartDate,
                MandatoryField::Budget,
            ])
        );
    }

    #[tokio::test]
    async fn test_complete_query_skips_collection() {
        let dir = temp_output_dir();
        // LLM calls: extraction, attractions compilation, planner.
        let (mut planner, search_calls, input_calls) = planner_with(
            vec![PARIS_EXTRACTION, PARIS_ATTRACTIONS, PLAN_TEXT],
            "1. **Louvre**\n   URL: https://example.com",
            vec![],
            dir.clone(),
        );

        let state = planner
            .run("Plan a 5-day trip to Paris starting June 1 with a $2000 budget")
            .await
            .unwrap();

        assert!(!state.needs_missing_details);
        assert!(state.missing_fields.is_empty());
        assert_eq!(input_calls.load(Ordering::SeqCst), 0);
        assert!(search_calls.load(Ordering::SeqCst) <= 2);

        let details = state.trip_details.unwrap();
        assert_eq!(details.destination.as_deref(), Some("Paris"));
        assert_eq!(details.duration.as_deref(), Some("5 days"));
        assert!(details.start_date.as_deref().unwrap().contains("June 1"));
        assert!(details.budget.as_deref().unwrap().contains("2000"));

        assert_eq!(state.final_trip_plan, PLAN_TEXT);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_incomplete_query_collects_missing_fields() {
        let dir = temp_output_dir();
        let collected = r#"{
            "destination": "Tokyo",
            "duration": "1 week",
            "start_date": "March 10",
            "budget": "medium",
            "interests": [],
            "group_size": null,
            "accommodation_type": null
        }"#;
        let tokyo_attractions = r#"{
            "destination": "Tokyo",
            "attractions": [],
            "total_found": 0,
            "search_date": "2026-08-30"
        }"#;
        // LLM calls: extraction, collection normalization, attractions, planner.
        let (mut planner, _search_calls, input_calls) = planner_with(
            vec![
                r#"{"destination": "Tokyo"}"#,
                collected,
                tokyo_attractions,
                PLAN_TEXT,
            ],
            "1. **Senso-ji**",
            vec![
                (MandatoryField::Duration, "1 week".to_string()),
                (MandatoryField::StartDate, "March 10".to_string()),
                (MandatoryField::Budget, "medium".to_string()),
            ],
            dir.clone(),
        );

        let state = planner.run("I want to visit Tokyo").await.unwrap();

        assert!(state.needs_missing_details);
        assert_eq!(
            state.missing_fields,
            vec![
                MandatoryField::Duration,
                MandatoryField::StartDate,
                MandatoryField::Budget,
            ]
        );
        assert_eq!(input_calls.load(Ordering::SeqCst), 1);
        assert!(state.trip_details.unwrap().is_complete());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_collection_bound_exhausted_proceeds_best_effort() {
        let dir = temp_output_dir();
        let still_incomplete = r#"{"destination": "Tokyo"}"#;
        let tokyo_attractions = r#"{
            "destination": "Tokyo",
            "attractions": [],
            "total_found": 0,
            "search_date": "2026-08-30"
        }"#;
        // The user never answers and normalization never fills the gaps, so
        // every validation pass routes back to collection. LLM calls:
        // extraction, one normalization per attempt, attractions, planner.
        let (mut planner, search_calls, input_calls) = planner_with(
            vec![
                still_incomplete,
                still_incomplete,
                still_incomplete,
                tokyo_attractions,
                PLAN_TEXT,
            ],
            "1. **Senso-ji**",
            vec![],
            dir.clone(),
        );

        let state = planner.run("I want to visit Tokyo").await.unwrap();

        // The loop gives up after the bound instead of spinning forever.
        assert_eq!(input_calls.load(Ordering::SeqCst), MAX_COLLECTION_ATTEMPTS);
        assert!(state.needs_missing_details);
        assert!(!state.trip_details.unwrap().is_complete());

        // Search, planning, and persistence still run on the partial record.
        assert!(search_calls.load(Ordering::SeqCst) >= 1);
        assert_eq!(state.final_trip_plan, PLAN_TEXT);
        assert!(dir.join(crate::output::TRIP_DETAILS_FILE).exists());
        assert!(dir.join(crate::output::TRIP_PLAN_FILE).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_empty_attractions_still_produces_itinerary() {
        let dir = temp_output_dir();
        // Attractions compilation returns prose the coercion cannot parse;
        // the step degrades to an empty result and the planner still runs.
        let (mut planner, _search_calls, _input_calls) = planner_with(
            vec![
                PARIS_EXTRACTION,
                "Sorry, I could not find any attractions.",
                PLAN_TEXT,
            ],
            "No results found for the given query.",
            vec![],
            dir.clone(),
        );

        let state = planner
            .run("Plan a 5-day trip to Paris starting June 1 with a $2000 budget")
            .await
            .unwrap();

        let attractions = state.attractions_result.unwrap();
        assert_eq!(attractions.total_found, 0);
        assert!(!state.final_trip_plan.is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_search_credential_still_reaches_persistence() {
        let dir = temp_output_dir();
        let planner_llm = LLM::from_adapter(Box::new(ScriptedAdapter::new(vec![
            PARIS_EXTRACTION,
            "No usable search results were provided.",
            PLAN_TEXT,
        ])));
        // Real Tavily client with no credential: the search step yields the
        // configuration-fault string instead of results.
        let search = TavilyClient::from_config(&crate::config::SearchConfig {
            tavily_api_key: String::new(),
            max_results: 5,
        });
        let mut planner = TripPlanner::with_capabilities(
            planner_llm,
            test_llm_config(),
            Box::new(search),
            Box::new(TrackingInput {
                calls: Arc::new(AtomicUsize::new(0)),
                answers: vec![],
            }),
            5,
            dir.clone(),
        );

        let state = planner
            .run("Plan a 5-day trip to Paris starting June 1 with a $2000 budget")
            .await
            .unwrap();

        assert_eq!(state.attractions_result.unwrap().total_found, 0);
        assert!(dir.join(crate::output::ATTRACTIONS_FILE).exists());
        assert!(dir.join(crate::output::TRIP_PLAN_FILE).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
