use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hwfacts::cfg::{self, Config, SummaryStyle};
use hwfacts::parse::Fact;
use hwfacts::report::{self, HostInfo};
use hwfacts::{ui, FsSource, OverrideSet, Publisher};

/// hwfacts - Hardware detection and classification for system tuning
#[derive(Parser)]
#[command(name = "hwfacts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.hwfacts/config.toml)
    #[arg(long, global = true, env = "HWFACTS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to probe instead of the live system root
    #[arg(long, global = true, env = "HWFACTS_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Detect hardware and print the profile
    Detect {
        /// Print a JSON diagnostic dump instead of the summary
        #[arg(long)]
        json: bool,

        /// One-line summary
        #[arg(long)]
        compact: bool,

        /// Ignore overrides from the config file
        #[arg(long)]
        no_overrides: bool,
    },

    /// Check configuration and show detection blind spots
    Doctor,

    /// View configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },

    /// Re-detect periodically and report profile changes
    Watch {
        /// Seconds between runs (defaults to watch.interval_secs)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many refreshes
        #[arg(long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    ui::init();

    let config_path = match cli.config {
        Some(path) => path,
        None => match cfg::default_path() {
            Ok(path) => path,
            Err(e) => {
                ui::error(&format!("Error: {:#}", e));
                std::process::exit(1);
            }
        },
    };
    let root = cli.root;

    let result = match cli.command {
        Commands::Init { force } => cmd_init(&config_path, force).await,
        Commands::Detect {
            json,
            compact,
            no_overrides,
        } => cmd_detect(&config_path, root, json, compact, no_overrides).await,
        Commands::Doctor => cmd_doctor(&config_path, root).await,
        Commands::Config { show } => cmd_config(&config_path, show).await,
        Commands::Watch { interval, count } => cmd_watch(&config_path, root, interval, count).await,
    };

    if let Err(e) = result {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    if verbose {
        if let Ok(directive) = "hwfacts=debug".parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    // stdout carries the profile; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn probe_root(cli_root: Option<PathBuf>, config: &Config) -> PathBuf {
    cli_root.unwrap_or_else(|| config.general.root.clone())
}

async fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    ui::info("Initializing hwfacts...");
    cfg::init(config_path, force)?;
    ui::success(&format!("Config written to {}", config_path.display()));
    ui::hint("Add operator overrides under [overrides] and run 'hwfacts detect'");
    Ok(())
}

async fn cmd_detect(
    config_path: &Path,
    cli_root: Option<PathBuf>,
    json: bool,
    compact: bool,
    no_overrides: bool,
) -> Result<()> {
    let config = cfg::load_or_default(config_path)?;
    let root = probe_root(cli_root, &config);

    let overrides = if no_overrides {
        OverrideSet::default()
    } else {
        config.overrides.clone()
    };

    let publisher = Publisher::new(Box::new(FsSource::new(&root)), overrides)?;
    let snapshot = publisher.current();

    if json {
        println!("{}", report::to_json(&snapshot, &HostInfo::current())?);
        return Ok(());
    }

    if compact || config.general.summary_style == SummaryStyle::Compact {
        println!("{}", report::format_compact(&snapshot.profile));
    } else {
        print!("{}", report::format_summary(&snapshot.profile));
    }

    if !snapshot.diagnostics.is_clean() {
        let facts: Vec<String> = snapshot
            .diagnostics
            .defaulted
            .iter()
            .map(|f| f.to_string())
            .collect();
        ui::warn(&format!("Defaulted: {}", facts.join(", ")));
        ui::hint("Run 'hwfacts doctor' to see which sources were unavailable");
    }

    Ok(())
}

async fn cmd_doctor(config_path: &Path, cli_root: Option<PathBuf>) -> Result<()> {
    ui::info("Running diagnostics...");

    let loaded = cfg::load(config_path);
    let checks = vec![
        ("Config file exists", cfg::check_exists(config_path)),
        ("Config valid", loaded.as_ref().map(|_| ()).map_err(|e| anyhow::anyhow!("{:#}", e))),
    ];

    let mut has_issues = false;
    for (check, result) in checks {
        match result {
            Ok(_) => ui::success(&format!("✓ {}", check)),
            Err(e) => {
                has_issues = true;
                ui::error(&format!("✗ {}: {}", check, e));
            }
        }
    }

    let config = loaded.unwrap_or_default();
    let root = probe_root(cli_root, &config);
    if root.is_dir() {
        ui::success(&format!("✓ Probe root {}", root.display()));
    } else {
        has_issues = true;
        ui::error(&format!("✗ Probe root {} is not a directory", root.display()));
    }

    let publisher = Publisher::new(Box::new(FsSource::new(&root)), config.overrides.clone())?;
    let snapshot = publisher.current();

    ui::section("Detection sources");
    let rows = Fact::ALL
        .iter()
        .map(|fact| {
            let status = if snapshot.diagnostics.defaulted.contains(fact) {
                "defaulted".yellow().to_string()
            } else {
                "detected".green().to_string()
            };
            vec![fact.to_string(), status, fact.source_hint().to_string()]
        })
        .collect();
    ui::print_table(&["Fact", "Status", "Source"], rows);

    let details = report::format_diagnostics(&snapshot.diagnostics);
    if !details.is_empty() {
        println!();
        print!("{}", details);
    }

    println!();
    println!(
        "Performance profile: {}",
        ui::profile_label(snapshot.profile.performance_profile())
    );

    if !has_issues && snapshot.diagnostics.is_clean() {
        ui::success("All checks passed!");
    } else if !snapshot.diagnostics.is_clean() {
        ui::hint("Defaulted facts can be pinned with [overrides] in the config file");
    }

    Ok(())
}

async fn cmd_config(config_path: &Path, show: bool) -> Result<()> {
    if show {
        let config = cfg::load(config_path)?;
        println!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to serialize config")?
        );
    } else {
        ui::hint("Use --show to view the configuration");
    }

    Ok(())
}

async fn cmd_watch(
    config_path: &Path,
    cli_root: Option<PathBuf>,
    interval: Option<u64>,
    count: Option<u64>,
) -> Result<()> {
    let config = cfg::load_or_default(config_path)?;
    let root = probe_root(cli_root, &config);

    let secs = interval.unwrap_or(config.watch.interval_secs);
    if secs == 0 {
        anyhow::bail!("--interval must be greater than zero");
    }

    let publisher = Publisher::new(Box::new(FsSource::new(&root)), config.overrides.clone())?;
    let first = publisher.current();
    ui::info(&format!(
        "[{}] {}",
        first.generation,
        report::format_compact(&first.profile)
    ));

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    // the first tick completes immediately
    ticker.tick().await;

    let mut refreshes = 0u64;
    loop {
        if count.is_some_and(|limit| refreshes >= limit) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                ui::info("Stopping watch");
                break;
            }
        }

        let outcome = publisher.refresh();
        refreshes += 1;

        if outcome.changed {
            ui::warn(&format!(
                "[{}] profile changed: {}",
                outcome.snapshot.generation,
                report::format_compact(&outcome.snapshot.profile)
            ));
        } else {
            ui::info(&format!(
                "[{}] unchanged ({})",
                outcome.snapshot.generation,
                outcome.snapshot.profile.performance_profile()
            ));
        }
    }

    Ok(())
}
