//! Search budgets and tuning

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// Budget of a single breadth-first search phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBudget {
    pub name: String,
    /// Filmography prefix explored per actor
    pub max_movies_per_actor: usize,
    /// Cast prefix explored per movie
    pub max_cast_per_movie: usize,
    /// Highest actor-step count a partial path may reach before it stops expanding
    pub max_depth: usize,
    /// Frontier pops allowed across both sides
    pub max_iterations: usize,
}

impl PhaseBudget {
    /// Phase A: top-billed cast of the most prominent titles
    pub fn fast() -> Self {
        Self {
            name: "fast".to_string(),
            max_movies_per_actor: 15,
            max_cast_per_movie: 15,
            max_depth: 3,
            max_iterations: 40,
        }
    }

    /// Phase B
    pub fn comprehensive() -> Self {
        Self {
            name: "comprehensive".to_string(),
            max_movies_per_actor: 40,
            max_cast_per_movie: 30,
            max_depth: 4,
            max_iterations: 200,
        }
    }

    /// Phase C: last resort, large budgets
    pub fn exhaustive() -> Self {
        Self {
            name: "exhaustive".to_string(),
            max_movies_per_actor: 100,
            max_cast_per_movie: 100,
            max_depth: 6,
            max_iterations: 1000,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::invalid_parameter("phases.name", "must not be empty").into());
        }
        for (field, value) in [
            ("max_movies_per_actor", self.max_movies_per_actor),
            ("max_cast_per_movie", self.max_cast_per_movie),
            ("max_depth", self.max_depth),
            ("max_iterations", self.max_iterations),
        ] {
            if value == 0 {
                return Err(ValidationError::invalid_parameter(
                    &format!("phases.{}.{field}", self.name),
                    "must be greater than zero",
                )
                .into());
            }
        }
        Ok(())
    }
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Titles of actor1's filmography checked by the direct shortcut
    pub direct_prefix: usize,
    /// Concurrent cast fetches in the direct shortcut
    pub direct_batch_size: usize,
    /// Concurrent cast fetches per expansion
    pub batch_size: usize,
    /// Expand from both endpoints; otherwise only from actor1
    pub bidirectional: bool,
    /// Phases in escalation order
    pub phases: Vec<PhaseBudget>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            direct_prefix: 30,
            direct_batch_size: 10,
            batch_size: 5,
            bidirectional: true,
            phases: vec![
                PhaseBudget::fast(),
                PhaseBudget::comprehensive(),
                PhaseBudget::exhaustive(),
            ],
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.direct_batch_size == 0 {
            return Err(ValidationError::invalid_parameter(
                "direct_batch_size",
                "must be greater than zero",
            )
            .into());
        }
        if self.batch_size == 0 {
            return Err(
                ValidationError::invalid_parameter("batch_size", "must be greater than zero").into(),
            );
        }
        if self.phases.is_empty() {
            return Err(
                ValidationError::invalid_configuration("at least one search phase is required")
                    .into(),
            );
        }
        self.phases.iter().try_for_each(PhaseBudget::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phases_escalate() {
        let config = SearchConfig::default();
        config.validate().unwrap();

        let names: Vec<&str> = config.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "comprehensive", "exhaustive"]);
        for pair in config.phases.windows(2) {
            assert!(pair[0].max_iterations < pair[1].max_iterations);
            assert!(pair[0].max_depth <= pair[1].max_depth);
        }
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = SearchConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("batch_size"));
    }

    #[test]
    fn test_empty_phase_list_is_rejected() {
        let config = SearchConfig {
            phases: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_field_names_the_phase() {
        let mut phase = PhaseBudget::fast();
        phase.max_depth = 0;
        let config = SearchConfig {
            phases: vec![phase],
            ..Default::default()
        };

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("phases.fast.max_depth"));
    }

    #[test]
    fn test_direct_prefix_zero_disables_shortcut_but_is_valid() {
        let config = SearchConfig {
            direct_prefix: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
