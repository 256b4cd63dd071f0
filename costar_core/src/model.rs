//! Data types shared by the provider, cache and search layers
//!
//! Provider records (`Actor`, `Movie`, `CastMember`) are plain immutable DTOs.
//! `PathResult` is the only type with an invariant: its steps alternate
//! actor/movie/actor and begin and end with an actor.

use crate::error::{InternalError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A person in the cast graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    /// Portrait image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

impl Actor {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            profile_path: None,
        }
    }
}

/// A title in an actor's filmography
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// Poster image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// External cross-reference identifier (IMDb)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl Movie {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            release_date: None,
            poster_path: None,
            imdb_id: None,
        }
    }

    /// Release year, when the release date is known
    pub fn year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }
}

/// One credited actor of a movie, in billing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// Billing position, 0 is top billed
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

impl CastMember {
    pub fn new(id: u64, name: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: name.into(),
            character: None,
            order,
            profile_path: None,
        }
    }
}

impl From<&CastMember> for Actor {
    fn from(member: &CastMember) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            profile_path: member.profile_path.clone(),
        }
    }
}

/// One element of a connection path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum PathStep {
    Actor(Actor),
    Movie(Movie),
}

impl PathStep {
    pub fn is_actor(&self) -> bool {
        matches!(self, Self::Actor(_))
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            Self::Actor(actor) => Some(actor),
            Self::Movie(_) => None,
        }
    }

    pub fn as_movie(&self) -> Option<&Movie> {
        match self {
            Self::Movie(movie) => Some(movie),
            Self::Actor(_) => None,
        }
    }

    /// Id of the wrapped record
    pub fn id(&self) -> u64 {
        match self {
            Self::Actor(actor) => actor.id,
            Self::Movie(movie) => movie.id,
        }
    }
}

/// Which stage of the engine produced a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundBy {
    /// Both endpoints are the same actor
    Trivial,
    /// The direct-connection shortcut found a shared movie
    Direct,
    /// A breadth-first search phase, by name
    Phase(String),
}

/// A validated connection between two actors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    path: Vec<PathStep>,
    degrees: usize,
    found_by: FoundBy,
}

impl PathResult {
    /// Build a result from raw steps, checking the alternation invariant
    pub fn from_steps(path: Vec<PathStep>, found_by: FoundBy) -> Result<Self> {
        if path.is_empty() {
            return Err(InternalError::malformed_path("path is empty").into());
        }
        if path.len() % 2 == 0 {
            return Err(InternalError::malformed_path(format!(
                "path has {} steps, expected an odd count",
                path.len()
            ))
            .into());
        }
        for (index, step) in path.iter().enumerate() {
            let expect_actor = index % 2 == 0;
            if step.is_actor() != expect_actor {
                return Err(InternalError::malformed_path(format!(
                    "step {index} is {} where {} was expected",
                    if step.is_actor() { "an actor" } else { "a movie" },
                    if expect_actor { "an actor" } else { "a movie" },
                ))
                .into());
            }
        }

        let degrees = path.len() / 2;
        Ok(Self {
            path,
            degrees,
            found_by,
        })
    }

    /// Single-step path for an actor connected to themselves
    pub fn trivial(actor: Actor) -> Self {
        Self {
            path: vec![PathStep::Actor(actor)],
            degrees: 0,
            found_by: FoundBy::Trivial,
        }
    }

    /// Three-step path for two actors sharing a movie
    pub fn direct(from: Actor, movie: Movie, to: Actor) -> Self {
        Self {
            path: vec![
                PathStep::Actor(from),
                PathStep::Movie(movie),
                PathStep::Actor(to),
            ],
            degrees: 1,
            found_by: FoundBy::Direct,
        }
    }

    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    /// Movie hops between the endpoints (actor steps minus one)
    pub fn degrees(&self) -> usize {
        self.degrees
    }

    pub fn found_by(&self) -> &FoundBy {
        &self.found_by
    }

    /// First actor of the path
    pub fn start(&self) -> Option<&Actor> {
        self.path.first().and_then(PathStep::as_actor)
    }

    /// Last actor of the path
    pub fn end(&self) -> Option<&Actor> {
        self.path.last().and_then(PathStep::as_actor)
    }

    pub fn actors(&self) -> impl DoubleEndedIterator<Item = &Actor> {
        self.path.iter().filter_map(PathStep::as_actor)
    }

    pub fn movies(&self) -> impl DoubleEndedIterator<Item = &Movie> {
        self.path.iter().filter_map(PathStep::as_movie)
    }

    /// Same connection walked from the other end
    pub fn reversed(mut self) -> Self {
        self.path.reverse();
        self
    }

    pub fn into_steps(self) -> Vec<PathStep> {
        self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: u64) -> PathStep {
        PathStep::Actor(Actor::new(id, format!("Actor {id}")))
    }

    fn movie(id: u64) -> PathStep {
        PathStep::Movie(Movie::new(id, format!("Movie {id}")))
    }

    #[test]
    fn test_from_steps_counts_degrees() {
        let result = PathResult::from_steps(
            vec![actor(1), movie(10), actor(2), movie(20), actor(3)],
            FoundBy::Phase("fast".to_string()),
        )
        .unwrap();

        assert_eq!(result.degrees(), 2);
        assert_eq!(result.start().unwrap().id, 1);
        assert_eq!(result.end().unwrap().id, 3);
        assert_eq!(result.movies().count(), 2);
    }

    #[test]
    fn test_from_steps_rejects_even_length() {
        let error =
            PathResult::from_steps(vec![actor(1), movie(10)], FoundBy::Direct).unwrap_err();
        assert!(error.to_string().contains("odd count"));
    }

    #[test]
    fn test_from_steps_rejects_adjacent_movies() {
        let error = PathResult::from_steps(vec![actor(1), movie(10), movie(11)], FoundBy::Direct)
            .unwrap_err();
        assert!(error.to_string().contains("step 2"));
    }

    #[test]
    fn test_from_steps_rejects_empty_path() {
        assert!(PathResult::from_steps(Vec::new(), FoundBy::Direct).is_err());
    }

    #[test]
    fn test_trivial_path() {
        let result = PathResult::trivial(Actor::new(7, "Solo"));
        assert_eq!(result.degrees(), 0);
        assert_eq!(result.path().len(), 1);
        assert_eq!(result.start(), result.end());
        assert_eq!(result.found_by(), &FoundBy::Trivial);
    }

    #[test]
    fn test_reversed_swaps_endpoints() {
        let result = PathResult::direct(
            Actor::new(1, "A"),
            Movie::new(10, "M"),
            Actor::new(2, "B"),
        )
        .reversed();

        assert_eq!(result.start().unwrap().id, 2);
        assert_eq!(result.end().unwrap().id, 1);
        assert_eq!(result.degrees(), 1);
    }

    #[test]
    fn test_path_step_serialization_is_tagged() {
        let json = serde_json::to_value(actor(5)).unwrap();
        assert_eq!(json["type"], "actor");
        assert_eq!(json["data"]["id"], 5);

        let json = serde_json::to_value(movie(9)).unwrap();
        assert_eq!(json["type"], "movie");
        assert_eq!(json["data"]["title"], "Movie 9");
    }

    #[test]
    fn test_movie_year() {
        let mut movie = Movie::new(1, "Heat");
        assert_eq!(movie.year(), None);

        movie.release_date = NaiveDate::from_ymd_opt(1995, 12, 15);
        assert_eq!(movie.year(), Some(1995));
    }

    #[test]
    fn test_cast_member_converts_to_actor() {
        let mut member = CastMember::new(3, "Val Kilmer", 2);
        member.profile_path = Some("/val.jpg".to_string());

        let actor = Actor::from(&member);
        assert_eq!(actor.id, 3);
        assert_eq!(actor.profile_path.as_deref(), Some("/val.jpg"));
    }
}
