use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::activation::{Activator, LogActivator};
use crate::config::{self, ConfigError};
use crate::core_service::{ServiceError, SwitcherService};
use crate::discovery::{AuxiliaryRegistry, FixtureFile, SourceError, StaticWindowSource, WindowSource};
use crate::pipeline::SearchPage;
use crate::transport::handle_json;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("logging error: {0}")]
    Logging(std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "fastswitch-core", about = "Fuzzy window and tab switcher core")]
pub struct RuntimeOptions {
    /// Config file (.json/.json5 or .toml).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// JSON description of owners, windows and tabs to enumerate.
    #[arg(long)]
    pub fixture: Option<PathBuf>,
    /// Rank the snapshot against this query and print the results.
    #[arg(long)]
    pub query: Option<String>,
    /// Number of "show more" expansions to apply to --query.
    #[arg(long, default_value_t = 0)]
    pub more: u32,
    /// Accept the top result of --query and record it in history.
    #[arg(long)]
    pub accept: bool,
    /// Serve line-delimited JSON requests on stdin.
    #[arg(long)]
    pub stdio: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let argv = std::iter::once("fastswitch-core".to_string()).chain(args.iter().cloned());
    RuntimeOptions::try_parse_from(argv).map_err(|error| error.to_string())
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        println!("[fastswitch-core] wrote default config to {}", config.config_path.display());
    }
    crate::logging::init(&config).map_err(RuntimeError::Logging)?;

    let (primary, auxiliary) = load_sources(options.fixture.as_ref())?;
    let service = SwitcherService::from_config(config, primary, auxiliary)?;

    let snapshot = service.refresh_blocking().unwrap_or_else(|| service.current_snapshot());
    info!(candidates = snapshot.len(), "startup refresh complete");

    if options.stdio {
        return serve_stdio(&service);
    }

    let Some(query) = options.query.as_deref() else {
        print_recent(&service);
        return Ok(());
    };

    let mut page = service.search(query);
    for _ in 0..options.more {
        page = service.expand_limit();
    }
    print_page(&page);

    if options.accept {
        if let Some(target) = service.accept_selected() {
            if let Err(error) = LogActivator.activate(&target) {
                eprintln!("[fastswitch-core] activation failed: {error}");
            }
            println!("[fastswitch-core] accepted {target:?}");
        }
    }
    Ok(())
}

fn load_sources(fixture: Option<&PathBuf>) -> Result<(Box<dyn WindowSource>, AuxiliaryRegistry), RuntimeError> {
    let Some(path) = fixture else {
        return Ok((Box::new(StaticWindowSource::empty()), AuxiliaryRegistry::new()));
    };
    let fixture = FixtureFile::load(path)?;
    Ok((Box::new(fixture.window_source()), fixture.auxiliary_registry()))
}

fn serve_stdio(service: &SwitcherService) -> Result<(), RuntimeError> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(stdout, "{}", handle_json(service, &line))?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_page(page: &SearchPage) {
    if page.results.is_empty() {
        println!("No matches for '{}'.", page.query);
        return;
    }
    for scored in &page.results {
        let candidate = &scored.candidate;
        println!("{:>3}  {:>6}  {}", candidate.id, scored.score, candidate.display_name());
    }
    if page.has_more() {
        println!("Show more ({} remaining)", page.remaining());
    }
}

fn print_recent(service: &SwitcherService) {
    let recent = service.default_recent_searches();
    if recent.is_empty() {
        println!("No recent searches.");
        return;
    }
    println!("Recent searches:");
    for entry in recent {
        println!("  {entry}");
    }
}
