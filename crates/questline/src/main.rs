//! questline - daily challenges and progress from the command line
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization (SQLite, or memory when asked or when SQLite is unusable)
//! - Daily challenge tracker
//! - Progress tracker and high scores

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use questline_config::{Settings, StorageBackend, load_config_or_default};
use questline_core::{ChallengeState, DailyChallenge, ProgressTracker};
use questline_store::{FallbackStore, KvStore, MemoryStore, SqliteStore, TypedStore};
use questline_util::{
    ActivityId, Clock, DATABASE_FILENAME, QuestlineError, SystemClock, default_config_path,
    format_countdown, until_next_midnight,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// questline - daily challenges and progress tracking
#[derive(Parser, Debug)]
#[command(name = "questline")]
#[command(about = "Daily challenges and progress tracking", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/questline/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set QUESTLINE_DATA_DIR env var)
    #[arg(short, long, env = "QUESTLINE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory for this run
    #[arg(long)]
    memory: bool,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's daily challenge for an activity
    Status { activity: String },

    /// Record a game result, optionally as today's daily challenge
    Play {
        activity: String,

        /// Base score before any bonus
        #[arg(long, value_parser = parse_score)]
        score: f64,

        /// Play as the daily challenge (bonus multiplier applies)
        #[arg(long)]
        daily: bool,
    },

    /// List stored daily challenge results for an activity
    History { activity: String },

    /// List configured activities
    Activities,

    /// Inspect or change XP, cards and operations
    Progress {
        #[command(subcommand)]
        action: Option<ProgressAction>,
    },
}

#[derive(Subcommand, Debug)]
enum ProgressAction {
    /// Show XP, rank and unlocks
    Show,
    /// Grant XP
    AddXp { amount: u64 },
    /// Collect a card (+25 XP the first time)
    CollectCard { card_id: String },
    /// Complete an operation (+100 XP, unlocks the next one)
    CompleteOp { op_id: String },
    /// Unlock an operation without completing anything
    Unlock { op_id: String },
    /// Discard all progress
    Reset,
}

struct App {
    settings: Settings,
    /// Raw durable store; daily records go here directly
    store: Arc<dyn KvStore>,
    /// Store for everything else, degrading to memory on failure
    safe_store: Arc<dyn KvStore>,
    clock: SystemClock,
    json: bool,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let settings = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        debug!(
            config_path = %args.config.display(),
            activity_count = settings.activities.len(),
            "Configuration loaded"
        );

        let store = open_store(&settings, args)?;
        let safe_store: Arc<dyn KvStore> = Arc::new(FallbackStore::new(store.clone()));

        Ok(Self {
            settings,
            store,
            safe_store,
            clock: SystemClock,
            json: args.json,
        })
    }

    fn resolve_activity(&self, raw: &str) -> Result<ActivityId> {
        let id = ActivityId::parse(raw)?;
        if !self.settings.activities.is_empty() && self.settings.get_activity(&id).is_none() {
            return Err(QuestlineError::UnknownActivity(id).into());
        }
        Ok(id)
    }

    fn tracker(&self, id: ActivityId) -> DailyChallenge {
        DailyChallenge::with_multiplier(
            id,
            self.store.clone(),
            &self.clock,
            self.settings.challenge.bonus_multiplier,
        )
    }

    fn run(&self, command: &Command) -> Result<()> {
        match command {
            Command::Status { activity } => self.status(activity),
            Command::Play {
                activity,
                score,
                daily,
            } => self.play(activity, *score, *daily),
            Command::History { activity } => self.history(activity),
            Command::Activities => self.activities(),
            Command::Progress { action } => {
                self.progress(action.as_ref().unwrap_or(&ProgressAction::Show))
            }
        }
    }

    fn status(&self, activity: &str) -> Result<()> {
        let id = self.resolve_activity(activity)?;
        let tracker = self.tracker(id.clone());
        let typed = TypedStore::new(self.safe_store.clone());
        let stored_score = typed.daily_completion(&id, tracker.today_key());
        let high_score = typed.high_score(&id);

        if self.json {
            let status = tracker.status();
            let out = serde_json::json!({
                "status": status,
                "stored_score": stored_score,
                "high_score": high_score,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("Activity:    {}", id);
        println!("Day:         {}", tracker.today_key());
        let state = match tracker.state() {
            ChallengeState::NotStarted => "available",
            ChallengeState::Active => "active",
            ChallengeState::Completed => "completed",
        };
        println!("Daily:       {}", state);
        if let Some(score) = stored_score {
            println!("Today score: {}", score);
        }
        let remaining = until_next_midnight(&self.clock.now());
        println!(
            "Resets in:   {}h ({})",
            tracker.hours_until_reset(),
            format_countdown(remaining)
        );
        println!("High score:  {}", high_score);
        Ok(())
    }

    fn play(&self, activity: &str, score: f64, daily: bool) -> Result<()> {
        let id = self.resolve_activity(activity)?;
        let mut tracker = self.tracker(id.clone());

        if daily && !tracker.start() {
            println!(
                "Daily challenge for {} already completed today, next one in {}h",
                id,
                tracker.hours_until_reset()
            );
        }

        let multiplier = tracker.score_multiplier();
        let final_score = score * f64::from(multiplier);

        if let Some(completion) = tracker.complete(final_score) {
            println!("Daily challenge complete: {} ({}x bonus)", final_score, multiplier);
            if !completion.persisted {
                warn!(key = %completion.key, "Result kept for this run only");
                println!("Warning: result could not be saved and will be lost on exit");
            }
        } else {
            println!("Score: {}", final_score);
        }

        let typed = TypedStore::new(self.safe_store.clone());
        if typed.record_high_score(&id, final_score) {
            info!(activity = %id, score = final_score, "New high score");
            println!("New high score!");
        }
        Ok(())
    }

    fn history(&self, activity: &str) -> Result<()> {
        let id = self.resolve_activity(activity)?;
        let typed = TypedStore::new(self.store.clone());
        let records = typed.daily_history(&id);

        if self.json {
            let out: Vec<_> = records
                .iter()
                .map(|r| serde_json::json!({ "day": r.day, "score": r.score }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No daily challenges recorded for {}", id);
        }
        for record in &records {
            println!("{:<12} {}", record.day.as_str(), record.score);
        }
        Ok(())
    }

    fn activities(&self) -> Result<()> {
        if self.json {
            let out: Vec<_> = self
                .settings
                .activities
                .iter()
                .map(|a| serde_json::json!({ "id": a.id, "label": a.label }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        if self.settings.activities.is_empty() {
            println!("No activities configured; any activity id is accepted");
        }
        for activity in &self.settings.activities {
            println!("{:<16} {}", activity.id.as_str(), activity.label);
        }
        Ok(())
    }

    fn progress(&self, action: &ProgressAction) -> Result<()> {
        let mut tracker = ProgressTracker::load(self.safe_store.clone());

        match action {
            ProgressAction::Show => {}
            ProgressAction::AddXp { amount } => tracker.add_xp(*amount),
            ProgressAction::CollectCard { card_id } => {
                if !tracker.collect_card(card_id) {
                    println!("Card {} already collected", card_id);
                }
            }
            ProgressAction::CompleteOp { op_id } => {
                if !tracker.complete_operation(op_id) {
                    println!("Operation {} already completed", op_id);
                }
            }
            ProgressAction::Unlock { op_id } => {
                tracker.unlock_operation(op_id);
            }
            ProgressAction::Reset => tracker.reset(),
        }

        let progress = tracker.progress();
        let rank = tracker.rank();

        if self.json {
            let out = serde_json::json!({
                "progress": progress,
                "rank": rank,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("XP:         {}", progress.xp);
        println!("Rank:       {}", rank.name);
        println!("Cards:      {}", progress.collected_cards.len());
        println!("Operations: {} completed", progress.completed_operations.len());
        println!("Unlocked:   {}", progress.unlocked_operations.join(", "));
        Ok(())
    }
}

/// Scores must be finite so they can be stored and compared
fn parse_score(raw: &str) -> std::result::Result<f64, String> {
    let score: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !score.is_finite() {
        return Err(format!("score must be a finite number, got '{}'", raw));
    }
    Ok(score)
}

/// Open the configured store. An unusable database degrades to memory
/// rather than failing the run.
fn open_store(settings: &Settings, args: &Args) -> Result<Arc<dyn KvStore>> {
    if args.memory || settings.storage.backend == StorageBackend::Memory {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| settings.storage.data_dir.clone());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(DATABASE_FILENAME);
    match SqliteStore::open(&db_path) {
        Ok(store) => {
            debug!(db_path = %db_path.display(), "Store initialized");
            Ok(Arc::new(store))
        }
        Err(e) => {
            warn!(
                db_path = %db_path.display(),
                error = %e,
                "Could not open database, progress will not be saved"
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "questline starting");

    let app = App::new(&args)?;
    app.run(&args.command)
}
