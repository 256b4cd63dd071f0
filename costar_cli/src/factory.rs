//! Provider and engine construction from the loaded configuration

use crate::config::AppConfig;
use crate::error::{CliError, ErrorContext};
use anyhow::Result;
use costar_core::{ConnectionEngine, FixtureProvider, MetadataProvider, TmdbProvider};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// A fixture graph when `fixture` is given, the TMDB API otherwise
pub fn create_provider(
    config: &AppConfig,
    fixture: Option<&Path>,
) -> Result<Arc<dyn MetadataProvider>> {
    if let Some(path) = fixture {
        let provider = FixtureProvider::load(path).map_err(|e| {
            CliError::from_core(&e).with_context("fixture", &path.display().to_string())
        })?;
        info!(
            "Loaded fixture {} ({} actors, {} movies)",
            path.display(),
            provider.actor_count(),
            provider.movie_count()
        );
        return Ok(Arc::new(provider));
    }

    let provider = TmdbProvider::new(config.provider.tmdb_config()).map_err(|e| {
        CliError::from_core(&e)
            .with_suggestion("Set a key with 'costar config set provider.api_key <KEY>'")
            .with_suggestion("Or run offline against a graph file with --fixture <FILE>")
    })?;
    debug!("Using TMDB provider at {}", config.provider.base_url);
    Ok(Arc::new(provider))
}

/// Build an engine and start the cache sweeper on the current runtime
pub fn create_engine(config: &AppConfig, fixture: Option<&Path>) -> Result<ConnectionEngine> {
    let provider = create_provider(config, fixture)?;
    let engine = config
        .core
        .build_engine(provider)
        .map_err(|e| CliError::from_core(&e))?;
    engine
        .lookup()
        .spawn_sweeper(config.core.cache.sweep_interval());
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExitCode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn exit_code(error: anyhow::Error) -> ExitCode {
        CliError::from(error).exit_code()
    }

    #[test]
    fn test_missing_api_key_is_misuse() {
        let error = create_provider(&AppConfig::default(), None).err().unwrap();
        let cli_error = CliError::from(error);

        assert_eq!(cli_error.exit_code(), ExitCode::Misuse);
        assert!(cli_error.to_string().contains("api_key"));
        assert!(cli_error.suggestions.iter().any(|s| s.contains("--fixture")));
    }

    #[test]
    fn test_api_key_builds_tmdb_provider() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("abc123".to_string());

        assert!(create_provider(&config, None).is_ok());
    }

    #[test]
    fn test_unreadable_fixture_is_misuse() {
        let error = create_provider(&AppConfig::default(), Some(Path::new("/no/such/graph.json")))
            .err()
            .unwrap();

        assert_eq!(exit_code(error), ExitCode::Misuse);
    }

    #[tokio::test]
    async fn test_fixture_engine_finds_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"movies": [{{"id": 10, "title": "Heat", "cast": [
                {{"id": 1, "name": "Robert De Niro", "order": 0}},
                {{"id": 2, "name": "Al Pacino", "order": 1}}
            ]}}]}}"#
        )
        .unwrap();

        let engine = create_engine(&AppConfig::default(), Some(file.path())).unwrap();
        let result = engine.find_path(1, 2).await.unwrap();

        assert_eq!(result.degrees(), 1);
    }
}
