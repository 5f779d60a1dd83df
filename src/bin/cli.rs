//! Daybook CLI
//!
//! Command-line interface for Daybook:
//! - Write morning and evening reflections
//! - Look up saved reflections and the weekly summary
//! - Manage locally saved drafts
//! - Check server status

use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daybook::api::dto::{CreateReflectionRequest, ReflectionResponse};
use daybook::journal::{
    find_question, questions_for, ImagePicker, JournalSession, ReflectionError, ReportMode,
    SelectedFile,
};
use daybook::store::{HttpStore, MemoryStore, StoreError};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Morning and evening reflection journal")]
#[command(long_about = "Daybook keeps a morning and an evening reflection per day.\nWrite them from the terminal, attach photos, and review the week.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:5003", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Draft file (default: <data dir>/daybook/draft.json)
    #[arg(long, global = true)]
    pub draft_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the questions for a mode
    Questions {
        /// morning or evening
        #[arg(value_parser = parse_mode)]
        mode: ReportMode,
    },

    /// Write and submit a reflection
    Write {
        /// morning or evening
        #[arg(value_parser = parse_mode)]
        mode: ReportMode,
        /// Answers in question=text format
        #[arg(short, long)]
        answer: Vec<String>,
        /// Images to attach (.jpeg, .jpg, .png)
        #[arg(short, long)]
        image: Vec<PathBuf>,
        /// Don't prompt for unanswered questions
        #[arg(long)]
        no_prompt: bool,
        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show a saved reflection
    Show {
        /// Date: "today", "yesterday" or YYYY-MM-DD
        date: String,
        /// morning or evening
        #[arg(value_parser = parse_mode)]
        mode: ReportMode,
    },

    /// Reflections from the last 7 days
    Weekly,

    /// Show or discard locally saved drafts
    Draft {
        /// Discard the draft for this mode
        #[arg(long, value_parser = parse_mode)]
        discard: Option<ReportMode>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let draft_path = cli.draft_file.clone().unwrap_or_else(default_draft_file);

    match cli.command {
        Commands::Questions { mode } => {
            let questions = questions_for(mode);
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(questions)?);
            } else {
                println!("{}", mode.title());
                println!("{}", "-".repeat(40));
                for q in questions {
                    println!("{:<12} {}", q.id, q.label);
                }
            }
        }

        Commands::Write {
            mode,
            answer,
            image,
            no_prompt,
            dry_run,
        } => {
            let mut session = load_session(&draft_path);
            session.select_mode(mode);
            if session.form().draft(mode).is_some() {
                println!("Resuming saved {} draft", mode);
            }

            for raw in &answer {
                let (id, text) = parse_answer(raw)?;
                if find_question(mode, id).is_none() {
                    bail!(
                        "Unknown question '{}' for {} (expected one of: {})",
                        id,
                        mode,
                        question_ids(mode)
                    );
                }
                session.edit(id, text)?;
            }

            if !no_prompt {
                prompt_unanswered(&mut session)?;
            }

            if !image.is_empty() {
                let files = image
                    .iter()
                    .map(|path| read_image(path))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let selected = files.len();
                let attachments = ImagePicker::default().on_drop(files);
                if attachments.len() < selected {
                    eprintln!(
                        "Skipped {} file(s): only .jpeg, .jpg and .png images are accepted",
                        selected - attachments.len()
                    );
                }
                session.attach(attachments)?;
            }

            if dry_run {
                let store = MemoryStore::new();
                session.submit(&store).await?;
                for submission in store.saved() {
                    let request = CreateReflectionRequest::from_submission(&submission);
                    println!("{}", serde_json::to_string_pretty(&request)?);
                }
                println!();
                println!("(Dry run - nothing was sent)");
                return Ok(());
            }

            let store = HttpStore::new(&cli.api_url)?;
            match session.submit(&store).await {
                Ok(receipt) => {
                    println!("Saved {} reflection #{}", receipt.mode, receipt.id);
                    persist_drafts(&session, &draft_path)?;
                }
                Err(e) => {
                    session
                        .save(&draft_path)
                        .with_context(|| format!("Failed to save draft to {:?}", draft_path))?;
                    eprintln!("{}", e);
                    if is_unavailable(&e) {
                        eprintln!();
                        eprintln!("Make sure the Daybook API server is running:");
                        eprintln!("  cargo run --bin daybook");
                    }
                    eprintln!();
                    print_draft(&session, mode);
                    eprintln!("Draft kept in {:?}; run the same command again to retry.", draft_path);
                    if !session.form().images(mode).is_empty() {
                        eprintln!("Attached images are not stored in drafts; pass --image again.");
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Show { date, mode } => {
            let date = parse_date_arg(&date)?;
            let store = HttpStore::new(&cli.api_url)?;

            match store.fetch(date, mode).await? {
                Some(reflection) if cli.format == "json" => {
                    println!("{}", serde_json::to_string_pretty(&reflection)?);
                }
                Some(reflection) => print_reflection(&reflection),
                None => {
                    eprintln!("No {} reflection for {}", mode, date);
                    std::process::exit(1);
                }
            }
        }

        Commands::Weekly => {
            let store = HttpStore::new(&cli.api_url)?;
            let entries = store.weekly().await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No reflections in the last 7 days.");
                println!();
                println!("Write your first one with:");
                println!("  daybook-cli write morning");
            } else {
                println!("{:<12} {:<8} {}", "Date", "Type", "Summary");
                println!("{}", "-".repeat(60));
                for entry in entries {
                    let summary = match entry.mode {
                        ReportMode::Morning => entry.priorities,
                        ReportMode::Evening => entry.reflection,
                    };
                    println!(
                        "{:<12} {:<8} {}",
                        entry.date,
                        entry.mode,
                        truncate(summary.as_deref().unwrap_or("-"), 40)
                    );
                }
            }
        }

        Commands::Draft { discard } => {
            let mut session = load_session(&draft_path);

            if let Some(mode) = discard {
                if session.discard_draft(mode) {
                    persist_drafts(&session, &draft_path)?;
                    println!("Discarded {} draft", mode);
                } else {
                    println!("No {} draft to discard", mode);
                }
                return Ok(());
            }

            let pending = session.form().pending_drafts();
            if pending.is_empty() {
                println!("No saved drafts.");
            }
            for mode in pending {
                print_draft(&session, mode);
                println!();
            }
        }

        Commands::Status => {
            let store = HttpStore::new(&cli.api_url)?;
            match store.health().await {
                Ok(health) => {
                    println!("Daybook v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {} (server v{})", health.status, health.version);
                    println!("Storage: {}", health.storage);
                    if let Some(count) = health.reflections {
                        println!("  Reflections: {}", count);
                    }
                    if !health.integrations.is_empty() {
                        println!("Integrations:");
                        for integration in &health.integrations {
                            match &integration.error {
                                Some(error) => println!("  {:<10} error ({})", integration.name, error),
                                None => println!("  {:<10} {}", integration.name, integration.status),
                            }
                        }
                    }
                    println!();
                    println!("Uptime: {}", format_duration(health.uptime_seconds));
                }
                Err(e) => {
                    eprintln!("Cannot connect to Daybook API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Daybook API server is running:");
                    eprintln!("  cargo run --bin daybook");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = daybook::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn parse_mode(s: &str) -> Result<ReportMode, ReflectionError> {
    s.parse()
}

fn default_draft_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("daybook"))
        .unwrap_or_else(|| PathBuf::from("./daybook_data"))
        .join("draft.json")
}

/// Saved drafts, or a fresh session if there are none
fn load_session(path: &Path) -> JournalSession {
    if !path.exists() {
        return JournalSession::new();
    }
    match JournalSession::load(path) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Ignoring unreadable draft file");
            JournalSession::new()
        }
    }
}

/// Write remaining drafts back, or remove the file when none are left
fn persist_drafts(session: &JournalSession, path: &Path) -> anyhow::Result<()> {
    if !session.form().pending_drafts().is_empty() {
        return session
            .save(path)
            .with_context(|| format!("Failed to save draft to {:?}", path));
    }
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
    }
}

fn prompt_unanswered(session: &mut JournalSession) -> anyhow::Result<()> {
    let mode = session.mode();
    let blank: Vec<_> = session
        .form()
        .fields(mode)
        .into_iter()
        .filter(|f| f.value.trim().is_empty())
        .map(|f| f.question)
        .collect();

    if blank.is_empty() {
        return Ok(());
    }

    println!("{} (leave empty to skip)", mode.title());
    let stdin = std::io::stdin();
    let mut lines = stdin.lock();

    for question in blank {
        print!("{}\n> ", question.label);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if lines.read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if !text.is_empty() {
            session.edit(question.id, text)?;
        }
    }

    Ok(())
}

fn parse_answer(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((id, text)) if !id.trim().is_empty() => Ok((id.trim(), text)),
        _ => bail!("Invalid answer '{}': use question=text", raw),
    }
}

fn question_ids(mode: ReportMode) -> String {
    questions_for(mode)
        .iter()
        .map(|q| q.id)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_date_arg(raw: &str) -> anyhow::Result<NaiveDate> {
    let today = Utc::now().date_naive();
    match raw.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}': use today, yesterday or YYYY-MM-DD", raw)),
    }
}

fn read_image(path: &Path) -> anyhow::Result<SelectedFile> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let content_type = guess_content_type(&name);
    Ok(SelectedFile::new(name, content_type, data))
}

fn guess_content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

fn is_unavailable(err: &ReflectionError) -> bool {
    matches!(
        err,
        ReflectionError::Submission {
            source: StoreError::Unavailable(_),
            ..
        }
    )
}

fn print_draft(session: &JournalSession, mode: ReportMode) {
    eprintln!("{} draft:", mode.title());
    for field in session.form().fields(mode) {
        let value = if field.value.is_empty() { "-" } else { field.value.as_str() };
        eprintln!("  {}: {}", field.question.label, value);
    }
    let images = session.form().images(mode);
    if !images.is_empty() {
        let names: Vec<&str> = images.iter().map(|i| i.name()).collect();
        eprintln!("  Images: {}", names.join(", "));
    }
}

fn print_reflection(reflection: &ReflectionResponse) {
    println!("{} #{} ({})", reflection.mode.title(), reflection.id, reflection.date);
    println!("{}", "-".repeat(40));

    let answers = [
        ("priorities", &reflection.priorities),
        ("intention", &reflection.intention),
        ("reflection", &reflection.reflection),
        ("challenges", &reflection.challenges),
        ("tomorrow", &reflection.tomorrow),
    ];
    for (id, value) in answers {
        if let (Some(question), Some(value)) = (find_question(reflection.mode, id), value) {
            println!("{}", question.label);
            println!("  {}", if value.is_empty() { "-" } else { value });
        }
    }

    if !reflection.images.is_empty() {
        println!();
        println!("Images:");
        for image in &reflection.images {
            println!("  {} ({})", image.filename, image.path);
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && line.len() == text.len() {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
