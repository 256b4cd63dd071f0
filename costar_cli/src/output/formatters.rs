use super::{OutputFormatter, PathReport, StoreStats};
use anyhow::Result;
use colored::*;
use costar_core::{Actor, FoundBy, Movie, PathStep};
use serde::Serialize;
use serde_json::json;

/// Text formatter for human-readable output
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn actor_line(&self, actor: &Actor) -> String {
        format!(
            "{} {}",
            self.colorize(&actor.name, |s| s.bold()),
            self.colorize(&format!("(#{})", actor.id), |s| s.dimmed())
        )
    }

    fn movie_line(&self, movie: &Movie) -> String {
        let title = self.colorize(&movie.title, |s| s.cyan());
        match movie.year() {
            Some(year) => format!("{title} ({year})"),
            None => title,
        }
    }

    fn cache_table(&self, stores: &[StoreStats]) -> String {
        let mut output = String::from("\nCache:\n");
        for store in stores {
            output.push_str(&format!(
                "  {:<14} entries {:>6}  hits {:>6}  misses {:>6}  evictions {:>5}  hit rate {:>5.1}%\n",
                store.store,
                store.stats.entry_count,
                store.stats.hit_count,
                store.stats.miss_count,
                store.stats.eviction_count,
                store.hit_rate * 100.0
            ));
        }
        output
    }
}

fn found_by_label(found_by: &FoundBy) -> String {
    match found_by {
        FoundBy::Trivial => "same actor".to_string(),
        FoundBy::Direct => "direct".to_string(),
        FoundBy::Phase(name) => format!("{name} phase"),
    }
}

fn degree_label(degrees: usize) -> String {
    if degrees == 1 {
        "1 degree".to_string()
    } else {
        format!("{degrees} degrees")
    }
}

impl OutputFormatter for TextFormatter {
    fn format_path(&self, report: &PathReport<'_>) -> Result<String> {
        let result = report.result;
        let mut output = String::new();

        if let (Some(start), Some(end)) = (result.start(), result.end()) {
            output.push_str(&format!(
                "{} → {}: {} {}\n\n",
                start.name,
                end.name,
                self.colorize(&degree_label(result.degrees()), |s| s.green()),
                self.colorize(
                    &format!("({})", found_by_label(result.found_by())),
                    |s| s.dimmed()
                )
            ));
        }

        for step in result.path() {
            match step {
                PathStep::Actor(actor) => {
                    output.push_str(&format!("  {}\n", self.actor_line(actor)));
                }
                PathStep::Movie(movie) => {
                    output.push_str(&format!("    └ {}\n", self.movie_line(movie)));
                }
            }
        }

        output.push_str(&format!("\nFound in {} ms\n", report.elapsed_ms));

        if let Some(stores) = &report.cache {
            output.push_str(&self.cache_table(stores));
        }

        Ok(output)
    }

    fn format_actors(&self, query: &str, actors: &[Actor]) -> Result<String> {
        if actors.is_empty() {
            return Ok(format!("No actors match '{query}'\n"));
        }

        let mut output = format!(
            "{} match{} '{query}':\n",
            self.colorize(
                &format!(
                    "{} actor{}",
                    actors.len(),
                    if actors.len() == 1 { "" } else { "s" }
                ),
                |s| s.green()
            ),
            if actors.len() == 1 { "es" } else { "" }
        );
        for actor in actors {
            output.push_str(&format!(
                "  {:>9}  {}\n",
                self.colorize(&actor.id.to_string(), |s| s.yellow()),
                actor.name
            ));
        }

        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text + "\n")
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_path(&self, report: &PathReport<'_>) -> Result<String> {
        self.render(report)
    }

    fn format_actors(&self, query: &str, actors: &[Actor]) -> Result<String> {
        self.render(&json!({
            "query": query,
            "results": actors,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costar_core::{CacheStats, PathResult};
    use std::time::Duration;

    fn heat_path() -> PathResult {
        PathResult::direct(
            Actor::new(380, "Robert De Niro"),
            Movie::new(949, "Heat"),
            Actor::new(1158, "Al Pacino"),
        )
    }

    #[test]
    fn test_text_path_lists_every_step() {
        let result = heat_path();
        let report = PathReport::new(&result, Duration::from_millis(12));

        let output = TextFormatter::new(false).format_path(&report).unwrap();

        assert!(output.starts_with("Robert De Niro → Al Pacino: 1 degree (direct)"));
        assert!(output.contains("  Robert De Niro (#380)\n    └ Heat\n  Al Pacino (#1158)\n"));
        assert!(output.contains("Found in 12 ms"));
        assert!(!output.contains("Cache:"));
    }

    #[test]
    fn test_text_path_appends_cache_table() {
        let result = heat_path();
        let stores = StoreStats::collect(vec![("paths", CacheStats::default())]);
        let report = PathReport::new(&result, Duration::ZERO).with_cache(stores);

        let output = TextFormatter::new(false).format_path(&report).unwrap();

        assert!(output.contains("Cache:"));
        assert!(output.contains("paths"));
    }

    #[test]
    fn test_trivial_path_is_zero_degrees() {
        let result = PathResult::trivial(Actor::new(7, "Solo"));
        let report = PathReport::new(&result, Duration::ZERO);

        let output = TextFormatter::new(false).format_path(&report).unwrap();

        assert!(output.starts_with("Solo → Solo: 0 degrees (same actor)"));
    }

    #[test]
    fn test_json_path_flattens_result() {
        let result = heat_path();
        let report = PathReport::new(&result, Duration::from_millis(3));

        let output = JsonFormatter::new(false).format_path(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["degrees"], 1);
        assert_eq!(value["found_by"], "direct");
        assert_eq!(value["elapsed_ms"], 3);
        assert_eq!(value["path"].as_array().unwrap().len(), 3);
        assert!(value.get("cache").is_none());
    }

    #[test]
    fn test_actor_listing_formats() {
        let actors = vec![Actor::new(380, "Robert De Niro")];

        let text = TextFormatter::new(false)
            .format_actors("de niro", &actors)
            .unwrap();
        assert!(text.starts_with("1 actor matches 'de niro':"));
        assert!(text.contains("Robert De Niro"));

        let empty = TextFormatter::new(false).format_actors("zzz", &[]).unwrap();
        assert_eq!(empty, "No actors match 'zzz'\n");

        let json = JsonFormatter::new(true).format_actors("de niro", &actors).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["id"], 380);
    }
}
