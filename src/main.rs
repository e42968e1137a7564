//! cyberlab: hands-on security labs in your terminal

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cyberlab::data::labs;
use cyberlab::tui::App;
use cyberlab::LabConfig;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cyberlab", version, about = "Hands-on cybersecurity labs in your terminal")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Open this lab directly instead of showing the lab list
    #[arg(long)]
    lab: Option<String>,

    /// Print the available labs and exit
    #[arg(long)]
    list_labs: bool,

    /// With --list-labs, print JSON instead of a table
    #[arg(long, requires = "list_labs")]
    json: bool,

    /// Log file (overrides the config file)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seed for the simulated tool latency
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct LabListing<'a> {
    id: &'a str,
    title: &'a str,
    difficulty: u8,
    objectives: Vec<&'a str>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = LabConfig::load_or_default(cli.config.as_deref())?;
    if let Some(lab) = cli.lab {
        config.ui.default_lab = Some(lab);
    }
    if let Some(log_file) = cli.log_file {
        config.log.file = log_file;
    }
    if cli.seed.is_some() {
        config.timing.seed = cli.seed;
    }
    if cli.verbose {
        config.log.level = "debug".to_string();
    }

    if cli.list_labs {
        return list_labs(cli.json);
    }

    init_logging(&config)?;
    info!(version = cyberlab::VERSION, "starting cyberlab");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("cyberlab-engine")
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    run_tui(config, runtime.handle().clone())?;

    info!("cyberlab exited");
    println!("\nThanks for training with cyberlab. Stay curious, stay ethical.\n");
    Ok(())
}

fn run_tui(config: LabConfig, runtime: tokio::runtime::Handle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, runtime);

    // Main loop
    let result = (|| -> Result<()> {
        while app.running {
            terminal.draw(|frame| {
                app.render(frame);
            })?;

            if !app.handle_input()? {
                break;
            }
        }
        Ok(())
    })();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(config: &LabConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log.file)
        .with_context(|| format!("opening log file {}", config.log.file.display()))?;

    let filter = EnvFilter::try_new(&config.log.level)
        .with_context(|| format!("invalid log level {:?}", config.log.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn list_labs(json: bool) -> Result<()> {
    if json {
        let listing: Vec<LabListing> = labs::catalogue()
            .iter()
            .map(|lab| LabListing {
                id: lab.id,
                title: lab.title,
                difficulty: lab.difficulty,
                objectives: lab.objectives.iter().map(|o| o.description).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for lab in labs::catalogue() {
        println!("{:<12} {:<30} {}", lab.id, lab.title, lab.difficulty_stars());
        for objective in lab.objectives {
            println!("    {:<6} {}", objective.id, objective.description);
        }
    }
    Ok(())
}
