//! Search Module
//!
//! Web search capability for the attractions step, backed by the Tavily API.

pub mod tavily;

pub use tavily::{SearchError, SearchProvider, TavilyClient};
