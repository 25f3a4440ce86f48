//! orakle — terminal front end.
//!
//! `read` for a one-shot reading, `play` for the interactive session,
//! `theme` and `models` for inspection without touching the network.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use crossterm::style::{Color, Stylize};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use orakle::oracle::{Oracle, OracleError, Query, Reading};
use orakle::session::{Screen, Session, LOADING_PHRASES};
use orakle::share::share_text;
use orakle::theme::{theme_for, theme_key, Theme};
use orakle::Settings;
use orakle_llm::ModelBackend;

/// How often the loading phrase rotates.
const LOADING_TICK: Duration = Duration::from_millis(1200);

#[derive(Parser)]
#[command(
    name = "orakle",
    version,
    about = "What coin are you? Three words. One coin. Your uncomfortable truth."
)]
struct Cli {
    /// YAML settings file (base_url, models, fallback, timeout_secs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Candidate model, in priority order (repeatable; replaces the configured list).
    /// With `fallback: false` or `--single` only the first is tried.
    #[arg(long = "model", global = true)]
    models: Vec<String>,

    /// Only try the primary model
    #[arg(long, global = true)]
    single: bool,

    /// Debug logging for orakle crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consult the orakle once
    Read {
        first: String,
        second: String,
        third: String,
        /// Print the raw reading as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive session
    Play,
    /// Show the theme a coin name maps to
    Theme {
        #[arg(required = true, num_args = 1..)]
        coin: Vec<String>,
    },
    /// Show the resolved candidate models
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    load_dotenv();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    settings = settings.with_models(cli.models.clone());
    if cli.single {
        settings = settings.single_model();
    }
    debug!(?settings, "settings resolved");
    let settings = Arc::new(settings);

    match cli.command {
        Command::Read {
            first,
            second,
            third,
            json,
        } => {
            let query = match Query::new([first, second, third]) {
                Ok(q) => q,
                Err(e) => {
                    eprintln!("{}", format!("Three words, please: {e}.").red());
                    return Ok(ExitCode::from(2));
                }
            };
            let oracle = Oracle::from_settings(settings)?;
            read_once(&oracle, &query, json).await
        }
        Command::Play => {
            let oracle = Oracle::from_settings(settings)?;
            play(&oracle).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Theme { coin } => {
            let coin = coin.join(" ");
            print_theme(&coin);
            Ok(ExitCode::SUCCESS)
        }
        Command::Models => {
            print_models(&settings);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "orakle=debug,orakle_llm=debug,orakle_config=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `.env.local` first so it wins over `.env`; neither overrides the real environment.
fn load_dotenv() {
    for file in [".env.local", ".env"] {
        match dotenvy::from_filename(file) {
            Ok(path) => debug!(path = %path.display(), "loaded env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(file, error = %e, "ignoring unreadable env file"),
        }
    }
}

// ── Reading ──

/// Await a reading, calling `tick` every `LOADING_TICK` while it's in flight.
async fn consult<B: ModelBackend>(
    oracle: &Oracle<B>,
    query: &Query,
    mut tick: impl FnMut(),
) -> Result<Reading, OracleError> {
    let reading = oracle.get_reading(query);
    tokio::pin!(reading);

    let mut interval = tokio::time::interval(LOADING_TICK);
    interval.tick().await;

    loop {
        tokio::select! {
            outcome = &mut reading => return outcome,
            _ = interval.tick() => tick(),
        }
    }
}

async fn read_once<B: ModelBackend>(
    oracle: &Oracle<B>,
    query: &Query,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let show_loading = !json && std::io::stderr().is_terminal();
    let mut phrases = LOADING_PHRASES.iter().cycle();
    let mut announce = |phrase: Option<&&str>| {
        if let (true, Some(phrase)) = (show_loading, phrase) {
            eprintln!("{}", phrase.italic());
        }
    };
    announce(phrases.next());
    let outcome = consult(oracle, query, || announce(phrases.next())).await;

    match outcome {
        Ok(reading) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&reading)?);
            } else {
                print_reading(&reading);
                println!();
                println!("{}", share_text(query.words(), &reading).dark_grey());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            debug!(error = ?e, "reading failed");
            eprintln!("{}", "The orakle is clouded".italic().red());
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Interactive session ──

async fn play<B: ModelBackend>(oracle: &Oracle<B>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::new();
    let mut pending: Option<Query> = None;

    println!("{}", "d' orakle".italic().bold());
    println!("{}", "Three words. One coin. Your uncomfortable truth.".dark_grey());
    println!(
        "{}",
        "No accounts. No data saved. Just you and the orakle.".dark_grey()
    );
    if !oracle.settings().has_api_key() {
        println!(
            "{}",
            "Set GEMINI_API_KEY in .env.local and restart.".yellow()
        );
    }

    loop {
        match session.screen() {
            Screen::Entry => {
                println!();
                for i in 0..3 {
                    let current = session.words()[i].clone();
                    let prompt = if current.is_empty() {
                        format!("0{} › ", i + 1)
                    } else {
                        format!("0{} [{current}] › ", i + 1)
                    };
                    let Some(line) = ask(&mut lines, &prompt).await? else {
                        return Ok(());
                    };
                    if !line.trim().is_empty() {
                        session.set_word(i, &line);
                    }
                }
                match session.submit() {
                    Some(query) => pending = Some(query),
                    None => println!("{}", "The orakle needs all three words.".red()),
                }
            }
            Screen::Loading => {
                let query = pending
                    .take()
                    .ok_or_else(|| anyhow!("loading without a pending query"))?;
                println!("{}", session.loading_phrase().italic());
                let outcome = consult(oracle, &query, || {
                    println!("{}", session.advance_loading().italic());
                })
                .await;
                session.finish(outcome);
            }
            Screen::Error => {
                println!();
                println!("{}", "The orakle is clouded".italic().red());
                println!("{}", session.error().unwrap_or_default());
                let Some(choice) = ask(&mut lines, "[r]etry  [b]ack  [q]uit › ").await? else {
                    return Ok(());
                };
                match choice.trim() {
                    "r" | "retry" => pending = session.retry(),
                    "b" | "back" => session.back_to_entry(),
                    "q" | "quit" => return Ok(()),
                    _ => {}
                }
            }
            Screen::Result => {
                if let Some(reading) = session.reading() {
                    print_reading(reading);
                }
                let Some(choice) =
                    ask(&mut lines, "[s]hare  [a]nother  [r]eset  [q]uit › ").await?
                else {
                    return Ok(());
                };
                match choice.trim() {
                    "s" | "share" => {
                        if let Some(text) = session.share_text() {
                            println!();
                            println!("{text}");
                        }
                    }
                    "a" | "another" => session.try_another(),
                    "r" | "reset" => session.reset(),
                    "q" | "quit" => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

/// Print a prompt and read one line. `None` on end of input.
async fn ask(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

// ── Rendering ──

fn color_of(theme: &Theme) -> Color {
    theme
        .rgb()
        .map(|(r, g, b)| Color::Rgb { r, g, b })
        .unwrap_or(Color::Reset)
}

fn print_reading(reading: &Reading) {
    let theme = theme_for(&reading.coin);
    let color = color_of(&theme);

    println!();
    println!("  {}", "The orakle has spoken...".italic().dark_grey());
    println!();
    println!(
        "  {}  {}  {}",
        theme.emoji,
        reading.coin.as_str().bold().with(color),
        reading.ticker.to_uppercase().with(color)
    );
    println!();
    println!("  {}", format!("\"{}\"", reading.verdict).italic());
    if !reading.traits.is_empty() {
        let traits = reading
            .traits
            .iter()
            .map(|t| t.to_uppercase())
            .collect::<Vec<_>>()
            .join("  ·  ");
        println!("  {}", traits.dark_grey());
    }
    println!();
    println!("  {}", "THE UNCOMFORTABLE TRUTH".dark_grey());
    println!("  {} {}", "▌".with(color), reading.uncomfortable_truth);
    println!();
    println!("  {}", "Not financial advice. Obviously.".dark_grey());
}

fn print_theme(coin: &str) {
    let theme = theme_for(coin);
    let key = theme_key(coin).unwrap_or("default");
    println!(
        "{}  {}  {}",
        theme.emoji,
        key.bold().with(color_of(&theme)),
        theme.color
    );
}

fn print_models(settings: &Settings) {
    for (i, model) in settings.models().iter().enumerate() {
        let marker = if i == 0 { "primary" } else { "fallback" };
        println!("{}. {model} ({marker})", i + 1);
    }
    let key = if settings.has_api_key() {
        "set".green()
    } else {
        "missing".red()
    };
    println!("{}: {key}", orakle_config::API_KEY_VAR);
}
