// Tripflow - AI trip-planning assistant

pub mod agents;
pub mod config;
pub mod input;
pub mod llm;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod search;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::{Attraction, AttractionsSearchResult, MandatoryField, TripDetails};
pub use pipeline::{TripPlanner, ValidationRoute};
