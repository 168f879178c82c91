use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use nutriplan_engine::{
    classify, AdaptationEngine, AdaptationRequest, AdaptTelemetry, CatalogMeal, EngineConfig,
    Strategy, WeekPlan,
};
use nutriplan_history::{FileHistoryStore, HistoryStore, UserId};
use nutriplan_plansource::{
    HttpPlanSource, HttpProfileLookup, PlanSource, ProfileLookup, ProfileTag, StaticProfileLookup,
};
use shared_event_bus::FileEventSink;
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "nutriplan", version, about = "Meal-plan adaptation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Adapts a weekly plan after a life event.
    Adapt(AdaptArgs),
    /// Lists recorded adaptation events.
    History {
        /// Restrict to one user.
        #[arg(long)]
        user: Option<String>,
        /// Number of most recent entries to display.
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value = "data/history.jsonl")]
        history: PathBuf,
    },
    /// Clears recorded events for one user, or for everyone.
    Reset {
        /// Restrict the reset to one user.
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = "data/history.jsonl")]
        history: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct AdaptArgs {
    /// Weekly plan JSON file (weekday -> meal entries).
    #[arg(long)]
    plan: PathBuf,
    /// User identifier (external store object-id scheme).
    #[arg(long)]
    user: String,
    /// Life-event category (party, trip, illness, stress, day-off).
    #[arg(long)]
    event: String,
    /// Weekday the event occurred on.
    #[arg(long)]
    day: String,
    /// Engine configuration TOML.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "data/history.jsonl")]
    history: PathBuf,
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
    /// Durable JSONL event log.
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// External plan service base URL; sampled meals extend the catalog.
    #[arg(long)]
    plans_url: Option<String>,
    /// External user service base URL for profile classification.
    #[arg(long)]
    users_url: Option<String>,
    #[arg(long, default_value_t = 4_000)]
    source_timeout_ms: u64,
    /// Writes the updated plan JSON here in addition to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Adapt(args) => run_adapt(args),
        Commands::History {
            user,
            limit,
            history,
        } => run_history(user, limit, &history),
        Commands::Reset { user, history } => run_reset(user, &history),
    }
}

fn run_adapt(args: AdaptArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let store = FileHistoryStore::open(&args.history)?;

    let mut builder = AdaptTelemetry::builder("nutriplan-cli")
        .log_path(args.log_dir.join("adapt.log"))
        .min_level(LogLevel::Debug);
    if let Some(event_log) = &args.event_log {
        builder = builder.event_sink(Arc::new(FileEventSink::new(event_log)?));
    }
    let telemetry = builder.build()?;

    let snapshot = store.snapshot()?;
    if snapshot.skipped > 0 {
        let _ = telemetry.log(
            LogLevel::Warn,
            "history.malformed_lines_skipped",
            serde_json::json!({ "skipped": snapshot.skipped }),
        );
    }

    let mut catalog = config.build_catalog();
    if let Some(plans_url) = &args.plans_url {
        let (_, impact) = classify(&args.event)?;
        let strategy = Strategy::for_class(impact.impact_class);
        match sample_external_meals(&args, plans_url) {
            Ok(meals) if !meals.is_empty() => {
                let count = meals.len();
                catalog.extend_pool(strategy, meals);
                let _ = telemetry.log(
                    LogLevel::Info,
                    "catalog.extended_from_plan_source",
                    serde_json::json!({ "strategy": strategy.name(), "meals": count }),
                );
            }
            Ok(_) => {}
            Err(err) => {
                let _ = telemetry.log(
                    LogLevel::Warn,
                    "catalog.plan_source_unavailable",
                    serde_json::json!({ "error": err.to_string() }),
                );
            }
        }
    }

    let raw_plan = fs::read_to_string(&args.plan)
        .with_context(|| format!("reading plan {}", args.plan.display()))?;
    let plan: WeekPlan = serde_json::from_str(&raw_plan)
        .with_context(|| format!("parsing plan {}", args.plan.display()))?;

    let engine = AdaptationEngine::new(&config, Arc::new(store))
        .with_catalog(catalog)
        .with_telemetry(telemetry);
    let request = AdaptationRequest {
        user_id: args.user,
        event_category: args.event,
        anchor_day: args.day,
        plan,
    };
    let outcome = engine.adapt(&request)?;

    println!("{}", outcome.message);
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    let updated = serde_json::to_string_pretty(&outcome.plan)?;
    println!("{updated}");
    if let Some(out) = &args.out {
        fs::write(out, format!("{updated}\n"))
            .with_context(|| format!("writing {}", out.display()))?;
    }
    Ok(())
}

fn sample_external_meals(args: &AdaptArgs, plans_url: &str) -> Result<Vec<CatalogMeal>> {
    let runtime = Runtime::new()?;
    runtime.block_on(async {
        let tag: ProfileTag = match &args.users_url {
            Some(users_url) => {
                HttpProfileLookup::new(users_url.as_str(), args.source_timeout_ms)?
                    .classification(&args.user)
                    .await
            }
            None => {
                StaticProfileLookup::default()
                    .classification(&args.user)
                    .await
            }
        };
        let source = HttpPlanSource::new(plans_url, args.source_timeout_ms)?;
        let meals = source.sample_meals(&tag).await?;
        Ok(meals
            .into_iter()
            .map(|meal| CatalogMeal::new(meal.name, meal.calories, meal.category))
            .collect())
    })
}

fn run_history(user: Option<String>, limit: usize, history: &PathBuf) -> Result<()> {
    let store = FileHistoryStore::open(history)?;
    let snapshot = store.snapshot()?;
    if snapshot.skipped > 0 {
        eprintln!("warning: skipped {} malformed history line(s)", snapshot.skipped);
    }
    let mut records = snapshot.records;
    if let Some(raw) = user {
        let user = UserId::parse(&raw)?;
        records.retain(|record| record.user_id == user);
    }
    let start = records.len().saturating_sub(limit);
    for record in &records[start..] {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}

fn run_reset(user: Option<String>, history: &PathBuf) -> Result<()> {
    let store = FileHistoryStore::open(history)?;
    let removed = match user {
        Some(raw) => {
            let user = UserId::parse(&raw)?;
            store.reset_user(&user)?
        }
        None => store.reset_all()?,
    };
    println!("removed {removed} record(s)");
    Ok(())
}
