//! TMDB HTTP metadata provider
//!
//! Talks to the v3 REST API with rate limiting and retry logic. Rate limit
//! (429) and transient server responses are retried with exponential backoff
//! and jitter; a `Retry-After` header, when present, takes precedence.

use crate::error::{Error, Result, UpstreamError, ValidationError};
use crate::model::{Actor, CastMember, Movie};
use crate::provider::MetadataProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, trace, warn};
use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Public TMDB v3 endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Longest server-requested wait we are willing to honour
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// TMDB client configuration
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    /// v3 API key, or a v4 read access token
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay, doubled on every retry
    pub retry_delay: Duration,
    /// Client-side request ceiling
    pub requests_per_second: f64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            requests_per_second: 40.0,
        }
    }
}

/// Spaces requests out to respect the provider's rate limit
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(requests_per_second: f64) -> Self {
        let min_delay = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            last_request: Mutex::new(None),
            min_delay,
        }
    }

    async fn wait_if_needed(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                trace!("Rate limiter: waiting {wait_time:?}");
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// [`MetadataProvider`] backed by the TMDB REST API
pub struct TmdbProvider {
    config: TmdbConfig,
    client: Client,
    rate_limiter: RateLimiter,
}

impl TmdbProvider {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        if config.api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
            return Err(ValidationError::invalid_configuration(
                "a TMDB API key is required (provider.api_key)",
            )
            .into());
        }
        if config.base_url.trim().is_empty() {
            return Err(ValidationError::invalid_configuration("provider base_url is empty").into());
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("costar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::other(format!("failed to build HTTP client: {e}")))?;

        debug!("Created TMDB provider for {}", config.base_url);
        Ok(Self {
            rate_limiter: RateLimiter::new(config.requests_per_second),
            config,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET a resource and decode it, retrying transient failures
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            self.rate_limiter.wait_if_needed().await;
            trace!("GET {url} (attempt {})", attempt + 1);

            let error = match self.send_once(&url, query).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if error.is_permanent() {
                debug!("Request to {path} failed permanently, not retrying: {error}");
                return Err(error.into());
            }
            if !error.is_transient() || attempt >= self.config.max_retries {
                return Err(error.into());
            }

            let retry_after = match &error {
                UpstreamError::RateLimited { retry_after } => *retry_after,
                _ => None,
            };
            let delay = backoff_delay(self.config.retry_delay, attempt, retry_after);
            warn!(
                "Request to {path} failed ({error}), retry {}/{} in {delay:?}",
                attempt + 1,
                self.config.max_retries
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, UpstreamError> {
        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.config.api_key {
            // v4 read access tokens are JWTs and go in the Authorization header
            request = if key.starts_with("eyJ") {
                request.bearer_auth(key)
            } else {
                request.query(&[("api_key", key.as_str())])
            };
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
            ));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::decode(e.to_string()))
    }

    /// Fetch a single entity, mapping 404 to a missing entity error
    async fn get_entity<T: DeserializeOwned>(&self, resource: &str, id: u64, path: &str) -> Result<T> {
        self.get_json(path, &[]).await.map_err(|error| match error {
            Error::Upstream(UpstreamError::Http { status: 404, .. }) => {
                UpstreamError::missing_entity(resource, id).into()
            }
            other => other,
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    async fn actor_details(&self, actor_id: u64) -> Result<Actor> {
        let person: WirePerson = self
            .get_entity("person", actor_id, &format!("person/{actor_id}"))
            .await?;
        Ok(person.into())
    }

    async fn actor_filmography(&self, actor_id: u64) -> Result<Vec<Movie>> {
        let credits: WireMovieCredits = self
            .get_entity(
                "person",
                actor_id,
                &format!("person/{actor_id}/movie_credits"),
            )
            .await?;
        let films = filmography_from_credits(credits);
        debug!("Actor {actor_id} has {} usable credits", films.len());
        Ok(films)
    }

    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<CastMember>> {
        let credits: WireCredits = self
            .get_entity("movie", movie_id, &format!("movie/{movie_id}/credits"))
            .await?;
        Ok(cast_from_credits(credits))
    }

    async fn movie_details(&self, movie_id: u64) -> Result<Movie> {
        let movie: WireMovie = self
            .get_entity("movie", movie_id, &format!("movie/{movie_id}"))
            .await?;
        Ok(movie.into())
    }

    async fn search_actors(&self, query: &str) -> Result<Vec<Actor>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let page: WireSearchPage = self
            .get_json("search/person", &[("query", query), ("include_adult", "false")])
            .await?;
        Ok(page.results.into_iter().map(Actor::from).collect())
    }
}

/// Delay before retry number `attempt + 1`
fn backoff_delay(base: Duration, attempt: u32, retry_after: Option<Duration>) -> Duration {
    if let Some(wait) = retry_after {
        return wait.min(MAX_RETRY_AFTER);
    }

    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter_ceiling = (base.as_millis() / 2) as u64;
    let jitter = if jitter_ceiling == 0 {
        0
    } else {
        rand::rng().random_range(0..=jitter_ceiling)
    };
    exponential + Duration::from_millis(jitter)
}

/// `Retry-After` in its delta-seconds form
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Usable filmography: no adult titles, no untitled entries, one entry per
/// movie, most popular first
fn filmography_from_credits(credits: WireMovieCredits) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut credits: Vec<WireMovieCredit> = credits
        .cast
        .into_iter()
        .filter(|credit| !credit.adult)
        .filter(|credit| credit.title.as_deref().is_some_and(|t| !t.trim().is_empty()))
        .filter(|credit| seen.insert(credit.id))
        .collect();

    credits.sort_by(|a, b| {
        b.popularity
            .total_cmp(&a.popularity)
            .then_with(|| a.id.cmp(&b.id))
    });

    credits.into_iter().map(Movie::from).collect()
}

/// Cast in billing order, one entry per actor
fn cast_from_credits(credits: WireCredits) -> Vec<CastMember> {
    let mut cast = credits.cast;
    cast.sort_by_key(|member| member.order);

    let mut seen = HashSet::new();
    cast.into_iter()
        .filter(|member| seen.insert(member.id))
        .map(CastMember::from)
        .collect()
}

/// TMDB sends `""` for unknown release dates
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()))
}

#[derive(Debug, Deserialize)]
struct WirePerson {
    id: u64,
    name: String,
    #[serde(default)]
    profile_path: Option<String>,
}

impl From<WirePerson> for Actor {
    fn from(person: WirePerson) -> Self {
        Self {
            id: person.id,
            name: person.name,
            profile_path: person.profile_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireSearchPage {
    #[serde(default)]
    results: Vec<WirePerson>,
}

#[derive(Debug, Deserialize)]
struct WireMovie {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "lenient_date")]
    release_date: Option<NaiveDate>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    imdb_id: Option<String>,
}

impl From<WireMovie> for Movie {
    fn from(movie: WireMovie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            release_date: movie.release_date,
            poster_path: movie.poster_path,
            imdb_id: movie.imdb_id.filter(|id| !id.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireMovieCredits {
    #[serde(default)]
    cast: Vec<WireMovieCredit>,
}

#[derive(Debug, Deserialize)]
struct WireMovieCredit {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    release_date: Option<NaiveDate>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    adult: bool,
}

impl From<WireMovieCredit> for Movie {
    fn from(credit: WireMovieCredit) -> Self {
        Self {
            id: credit.id,
            title: credit.title.unwrap_or_default(),
            release_date: credit.release_date,
            poster_path: credit.poster_path,
            imdb_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCredits {
    #[serde(default)]
    cast: Vec<WireCastMember>,
}

#[derive(Debug, Deserialize)]
struct WireCastMember {
    id: u64,
    name: String,
    #[serde(default)]
    character: Option<String>,
    #[serde(default)]
    order: u32,
    #[serde(default)]
    profile_path: Option<String>,
}

impl From<WireCastMember> for CastMember {
    fn from(member: WireCastMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            character: member.character.filter(|c| !c.is_empty()),
            order: member.order,
            profile_path: member.profile_path,
        }
    }
}
