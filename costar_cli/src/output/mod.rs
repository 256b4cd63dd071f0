mod formatters;

pub use formatters::{JsonFormatter, TextFormatter};

use anyhow::Result;
use costar_core::{Actor, CacheStats, PathResult};
use serde::Serialize;
use std::time::Duration;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown output format: {} (expected text or json)", s),
        }
    }
}

/// Counters for one record store of the lookup cache
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub store: &'static str,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl StoreStats {
    pub fn collect(stores: Vec<(&'static str, CacheStats)>) -> Vec<Self> {
        stores
            .into_iter()
            .map(|(store, stats)| Self {
                store,
                hit_rate: stats.hit_rate(),
                stats,
            })
            .collect()
    }
}

/// Everything printed for a `path` command
#[derive(Debug, Serialize)]
pub struct PathReport<'a> {
    #[serde(flatten)]
    pub result: &'a PathResult,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<Vec<StoreStats>>,
}

impl<'a> PathReport<'a> {
    pub fn new(result: &'a PathResult, elapsed: Duration) -> Self {
        Self {
            result,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            cache: None,
        }
    }

    pub fn with_cache(mut self, stores: Vec<StoreStats>) -> Self {
        self.cache = Some(stores);
        self
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format a connection between two actors
    fn format_path(&self, report: &PathReport<'_>) -> Result<String>;

    /// Format the actors matching a search query
    fn format_actors(&self, query: &str, actors: &[Actor]) -> Result<String>;
}

/// Create a formatter based on output format
pub fn create_formatter(format: OutputFormat, use_color: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(use_color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!(OutputFormat::from_string("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_string("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_string("csv").is_err());
    }

    #[test]
    fn test_store_stats_carry_hit_rate() {
        let stats = CacheStats {
            entry_count: 2,
            hit_count: 3,
            miss_count: 1,
            eviction_count: 0,
        };

        let stores = StoreStats::collect(vec![("actors", stats)]);

        assert_eq!(stores[0].store, "actors");
        assert!((stores[0].hit_rate - 0.75).abs() < f64::EPSILON);
    }
}
