use anyhow::{Context, Result, anyhow};
use catalog::{CatalogIndex, DatePosted, ExperienceLevel, JobListing, WorkLocation};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{Collaborators, EngineConfig, SessionController, SessionMode, SessionView};
use query::{FilterState, QueryParser, merge};
use sources::{CandidateProfile, CatalogMatches, CatalogSearch, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Job board discovery engine
#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Browse, search and match job listings from a local catalog", long_about = None)]
struct Cli {
    /// Path to the listing catalog (JSON array or JSON lines)
    #[arg(short, long, default_value = "data/sample_listings.json")]
    catalog: PathBuf,

    /// Optional engine config overrides (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// User the session runs as
    #[arg(short, long, default_value = "demo")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Page through the newest listings
    Browse {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: usize,

        /// Save these listings before showing results
        #[arg(long)]
        save: Vec<String>,

        /// Dismiss these listings before showing results
        #[arg(long)]
        dismiss: Vec<String>,
    },

    /// Search with free text plus explicit filters
    Search {
        /// Free-text query, e.g. "senior rust engineer remote"
        text: String,

        /// Required technology (repeatable)
        #[arg(long)]
        tech: Vec<String>,

        /// Only remote listings
        #[arg(long)]
        remote: bool,

        /// Experience level (entry, mid, senior, lead, executive)
        #[arg(long)]
        level: Option<ExperienceLevel>,

        /// Posted within (any, past-day, past-week, past-month)
        #[arg(long)]
        posted: Option<DatePosted>,

        /// Number of pages to show
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Personalized matches for a skill profile
    Matches {
        /// Candidate skill (repeatable); none means an incomplete profile
        #[arg(long)]
        skill: Vec<String>,

        /// Candidate experience level
        #[arg(long)]
        level: Option<ExperienceLevel>,

        /// Preferred work location (remote, hybrid, on-site)
        #[arg(long)]
        work_location: Option<WorkLocation>,

        /// Number of pages to show
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Show how free text is parsed and merged with filters
    Parse {
        text: String,

        /// Explicit technology selection to merge in (repeatable)
        #[arg(long)]
        tech: Vec<String>,

        /// Explicit remote selection to merge in
        #[arg(long)]
        remote: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Browse { pages, save, dismiss } => {
            let session = open_session(&cli.catalog, cli.config.as_deref(), &cli.user, None)?;
            handle_browse(&session, pages, &save, &dismiss).await?
        }
        Commands::Search {
            text,
            tech,
            remote,
            level,
            posted,
            pages,
        } => {
            let mut filters = FilterState::new();
            for t in &tech {
                filters = filters.with_technology(t);
            }
            if remote {
                filters = filters.with_work_location(WorkLocation::Remote);
            }
            if let Some(level) = level {
                filters = filters.with_experience_level(level);
            }
            if let Some(posted) = posted {
                filters = filters.with_date_posted(posted);
            }
            let session = open_session(&cli.catalog, cli.config.as_deref(), &cli.user, None)?;
            handle_search(&session, &text, filters, pages).await?
        }
        Commands::Matches {
            skill,
            level,
            work_location,
            pages,
        } => {
            let profile = CandidateProfile {
                skills: skill.into_iter().collect(),
                experience_level: level,
                preferred_work_location: work_location,
            };
            let session =
                open_session(&cli.catalog, cli.config.as_deref(), &cli.user, Some(profile))?;
            handle_matches(&session, pages).await?
        }
        Commands::Parse { text, tech, remote } => handle_parse(&text, &tech, remote)?,
    }

    Ok(())
}

/// Load config and catalog, then build a session over them
fn open_session(
    catalog: &Path,
    config: Option<&Path>,
    user: &str,
    profile: Option<CandidateProfile>,
) -> Result<SessionController> {
    let config = match config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    debug!("Engine config: {:?}", config);

    println!("Loading catalog from {}...", catalog.display());
    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_file(catalog).context("Failed to load listing catalog")?,
    );
    println!(
        "{} Loaded {} listings in {:?}",
        "✓".green(),
        index.len(),
        start.elapsed()
    );

    build_session(index, user, config, profile)
}

/// Wire a session to the in-memory backends over one shared catalog
fn build_session(
    index: Arc<CatalogIndex>,
    user: &str,
    config: EngineConfig,
    profile: Option<CandidateProfile>,
) -> Result<SessionController> {
    let mut matches = CatalogMatches::new(index.clone());
    if let Some(profile) = profile {
        matches = matches.with_profile(user, profile);
    }
    let store = Arc::new(MemoryStore::new(index.clone()));
    let collaborators = Collaborators {
        search: Arc::new(CatalogSearch::new(index)),
        matches: Arc::new(matches),
        store: store.clone(),
        tracker: store,
    };
    Ok(SessionController::new(user, collaborators, config)?)
}

/// Handle the 'browse' command
async fn handle_browse(
    session: &SessionController,
    pages: usize,
    save: &[String],
    dismiss: &[String],
) -> Result<()> {
    session.start().await;
    for _ in 1..pages {
        session.load_more().await;
    }

    let interactions = session.interactions();
    for id in save {
        interactions.save(id).await?;
    }
    for id in dismiss {
        interactions.dismiss(id).await?;
    }

    print_view(&session.view(), "Newest listings", session);
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(
    session: &SessionController,
    text: &str,
    filters: FilterState,
    pages: usize,
) -> Result<()> {
    session.set_filters(filters).await;
    session.submit_search(text).await;
    for _ in 1..pages {
        session.load_more().await;
    }

    let view = session.view();
    if let Some(error) = &view.error {
        return Err(anyhow!("{}", error));
    }
    print_view(&view, &format!("Results for '{}'", text), session);
    Ok(())
}

/// Handle the 'matches' command
async fn handle_matches(session: &SessionController, pages: usize) -> Result<()> {
    session.switch_mode(SessionMode::Personalized).await;
    for _ in 1..pages {
        session.load_more().await;
    }

    let view = session.view();
    if view.profile_incomplete {
        println!(
            "{} Add at least one --skill to get personalized matches",
            "!".yellow()
        );
        return Ok(());
    }
    print_view(&view, "Your matches", session);
    Ok(())
}

/// Handle the 'parse' command
fn handle_parse(text: &str, tech: &[String], remote: bool) -> Result<()> {
    let parser = QueryParser::new();
    let parsed = parser.parse(text);

    let mut explicit = FilterState::new().with_query(text);
    for t in tech {
        explicit = explicit.with_technology(t);
    }
    if remote {
        explicit = explicit.with_work_location(WorkLocation::Remote);
    }
    let effective = merge(&parsed, &explicit);

    println!("{}", "Parsed:".bold().blue());
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    println!("{}", "Effective query:".bold().blue());
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

fn print_view(view: &SessionView, title: &str, session: &SessionController) {
    println!(
        "{} ({} shown, {} held, source {:?})",
        title.bold().blue(),
        view.listings.len(),
        view.total_results,
        view.source
    );
    for (rank, listing) in view.listings.iter().enumerate() {
        print_listing(rank + 1, listing, session.interactions().is_saved(&listing.id));
    }
    if let Some(error) = &view.load_more_error {
        println!("{} {}", "!".yellow(), error);
    }
    if view.has_more {
        println!("{}", "More results available (use --pages)".dimmed());
    }
}

fn print_listing(rank: usize, listing: &JobListing, saved: bool) {
    let marker = if saved { "★".yellow() } else { " ".normal() };
    let mut line = format!(
        "{}{} {} - {}",
        marker,
        rank.to_string().green(),
        listing.title.bold(),
        listing.company
    );
    if !listing.location.is_empty() {
        line.push_str(&format!(" ({})", listing.location));
    }
    if let Some(work_location) = listing.work_location {
        line.push_str(&format!(" [{}]", work_location));
    }
    if let Some(score) = listing.match_score {
        line.push_str(&format!(" - match {:.0}%", score * 100.0));
    }
    println!("{}", line);
    if let Some(breakdown) = &listing.match_breakdown
        && !breakdown.missing_skills.is_empty()
    {
        println!("   missing: {}", breakdown.missing_skills.join(", ").dimmed());
    }
}
