use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use costar_cli::config::{ConfigManager, get_config};
use costar_cli::error::{CliError, ErrorContext};
use costar_cli::factory::create_engine;
use costar_cli::output::{OutputFormat, OutputFormatter, PathReport, StoreStats, create_formatter};
use costar_cli::progress::SearchSpinner;
use costar_cli::terminal::TerminalCapabilities;
use costar_core::ConnectionEngine;
use log::debug;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "costar")]
#[command(author, version, about = "Degrees of separation between actors through shared movies", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read the cast graph from a JSON fixture instead of the TMDB API
    #[arg(long, global = true, value_name = "FILE")]
    fixture: Option<PathBuf>,

    /// Output format (defaults to output.default_format)
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Disable the progress spinner
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the chain of shared movies between two actors
    Path {
        /// First actor (id, or name with --by-name)
        actor1: String,

        /// Second actor (id, or name with --by-name)
        actor2: String,

        /// Resolve both actors by name using the top search hit
        #[arg(short, long)]
        by_name: bool,

        /// Print cache statistics after the result
        #[arg(long)]
        stats: bool,
    },

    /// Search actors by name
    Search {
        /// Name or part of a name
        query: String,

        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (dot notation, e.g. provider.timeout_seconds)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (dot notation)
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
    /// Print the configuration file location
    Path,
}

/// Session-wide output settings resolved from flags, config and terminal
struct Session {
    engine: ConnectionEngine,
    formatter: Box<dyn OutputFormatter>,
    show_progress: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("costar_core", log::LevelFilter::Debug)
            .filter_module("costar_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let terminal = TerminalCapabilities::detect();
    colored::control::set_override(terminal.supports_color());

    let debug = cli.debug;
    if let Err(error) = run(cli, terminal).await {
        let error = CliError::from(error);
        eprint!("{}", error.format_for_user(debug));
        std::process::exit(error.exit_code() as i32);
    }
}

async fn run(cli: Cli, terminal: TerminalCapabilities) -> Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
        Commands::Config { command } => config_command(command),
        Commands::Path {
            actor1,
            actor2,
            by_name,
            stats,
        } => {
            let session = open_session(cli.fixture, cli.format, cli.no_progress, terminal)?;
            path_command(&session, &actor1, &actor2, by_name, stats).await
        }
        Commands::Search { query, limit } => {
            let session = open_session(cli.fixture, cli.format, cli.no_progress, terminal)?;
            search_command(&session, &query, limit).await
        }
    }
}

fn open_session(
    fixture: Option<PathBuf>,
    format: Option<OutputFormat>,
    no_progress: bool,
    terminal: TerminalCapabilities,
) -> Result<Session> {
    let config = get_config()
        .map_err(|e| CliError::misuse(&format!("Failed to load configuration: {e:#}")))?;

    let format = match format {
        Some(format) => format,
        None => OutputFormat::from_string(&config.output.default_format)?,
    };
    let use_color = config.output.color_enabled && terminal.supports_color();
    colored::control::set_override(use_color);

    let engine = create_engine(&config, fixture.as_deref())?;
    debug!("Session ready: format={format:?} color={use_color}");

    Ok(Session {
        engine,
        formatter: create_formatter(format, use_color),
        show_progress: !no_progress
            && config.output.progress_enabled
            && terminal.supports_progress(),
    })
}

fn parse_actor_id(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CliError::misuse(&format!("'{value}' is not an actor id"))
            .with_suggestion("Pass --by-name to look actors up by name")
            .into()),
    }
}

async fn resolve_by_name(engine: &ConnectionEngine, name: &str) -> Result<u64> {
    let matches = engine
        .search_actors(name)
        .await
        .with_context(|| format!("Failed to look up '{name}'"))?;

    match matches.first() {
        Some(actor) => {
            debug!("Resolved '{name}' to {} (#{})", actor.name, actor.id);
            Ok(actor.id)
        }
        None => Err(CliError::not_found(&format!("No actor matches '{name}'"))
            .with_suggestion(&format!("Try 'costar search \"{name}\"' with a shorter name"))
            .into()),
    }
}

async fn path_command(
    session: &Session,
    actor1: &str,
    actor2: &str,
    by_name: bool,
    stats: bool,
) -> Result<()> {
    let engine = &session.engine;
    let spinner = SearchSpinner::start("Resolving actors", session.show_progress);

    let outcome = async {
        let (id1, id2) = if by_name {
            tokio::try_join!(
                resolve_by_name(engine, actor1),
                resolve_by_name(engine, actor2)
            )?
        } else {
            (parse_actor_id(actor1)?, parse_actor_id(actor2)?)
        };

        spinner.set_message(format!("Searching connections between {id1} and {id2}"));
        let started = Instant::now();
        let result = engine
            .find_path(id1, id2)
            .await
            .with_context(|| format!("Failed to connect {actor1} and {actor2}"))?;
        anyhow::Ok((result, started.elapsed()))
    }
    .await;
    spinner.finish();

    let (result, elapsed) = outcome?;
    let mut report = PathReport::new(&result, elapsed);
    if stats {
        report = report.with_cache(StoreStats::collect(
            engine.lookup().stats_by_store().await,
        ));
    }

    print!("{}", session.formatter.format_path(&report)?);
    Ok(())
}

async fn search_command(session: &Session, query: &str, limit: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(CliError::misuse("Search query is empty").into());
    }

    let spinner = SearchSpinner::start(format!("Searching for '{query}'"), session.show_progress);
    let outcome = session.engine.search_actors(query).await;
    spinner.finish();

    let mut actors = outcome.with_context(|| format!("Actor search for '{query}' failed"))?;
    actors.truncate(limit);

    print!("{}", session.formatter.format_actors(query, &actors)?);
    Ok(())
}

fn config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Get { key } => {
            let value = manager.get(&key).map_err(|e| {
                CliError::misuse(&format!("{e:#}"))
                    .with_suggestion("Run 'costar config list' to see available keys")
            })?;
            println!("{value}");
        }
        ConfigCommand::Set { key, value } => {
            manager.set(&key, &value).map_err(|e| {
                CliError::misuse(&format!("Failed to set '{key}': {e:#}"))
                    .with_context("file", &manager.get_config_path().display().to_string())
            })?;
            println!("{} {} = {}", "✓".green(), key.bold(), value);
        }
        ConfigCommand::List => {
            let items = manager
                .list()
                .map_err(|e| CliError::misuse(&format!("{e:#}")))?;
            println!(
                "{} {}",
                "Configuration:".bold(),
                manager.get_config_path().display().to_string().dimmed()
            );
            for (key, value) in items {
                let shown = if key.ends_with("api_key") {
                    "********".to_string()
                } else {
                    value
                };
                println!("  {} = {}", key.cyan(), shown);
            }
        }
        ConfigCommand::Path => {
            println!("{}", manager.get_config_path().display());
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
