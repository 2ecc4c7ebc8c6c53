use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use nereid_core::input::{normalize_sensor, parse_date, parse_log_entry};
use nereid_core::insights::Priority;
use nereid_core::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.json";

#[derive(Parser)]
#[command(name = "nereid")]
#[command(about = "Menstrual cycle tracking and prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Compute as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, hide = true)]
    today: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show predictions, risks, goals and insights (default)
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a period start, or remove it if already recorded
    Period {
        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// Log symptoms for a day
    Log {
        /// Date (YYYY-MM-DD)
        date: String,

        /// spotting, light, medium, heavy
        #[arg(long)]
        flow: Option<String>,

        /// bright_red, dark_red, brown, pink
        #[arg(long)]
        color: Option<String>,

        /// none, crampy, backache, headache, pelvic
        #[arg(long)]
        pain: Option<String>,

        /// calm, happy, low, irritable, anxious
        #[arg(long)]
        mood: Option<String>,

        /// balanced, iron_rich, low_appetite, high_carb, high_protein
        #[arg(long)]
        nutrition: Option<String>,
    },

    /// Replace the current sensor readings
    Sensor {
        #[arg(long)]
        steps: i64,

        /// Hours slept
        #[arg(long)]
        sleep: f64,

        /// Hours of screen time
        #[arg(long)]
        screen: f64,

        /// Body temperature in °C
        #[arg(long)]
        temp: f64,

        /// Resting heart rate
        #[arg(long)]
        rhr: Option<f64>,
    },

    /// Apply server-produced predictions and/or goals from a JSON file
    Remote {
        file: PathBuf,
    },

    /// Import period starts and logs from CSV
    Import {
        file: PathBuf,
    },

    /// Show upcoming cycles
    Forecast {
        /// Days ahead to cover (at most ten years)
        #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..=3650))]
        days: u32,
    },
}

/// Payload accepted by `remote`
#[derive(Deserialize)]
struct RemotePayload {
    #[serde(default)]
    predictions: Option<Predictions>,
    #[serde(default)]
    goals: Option<Vec<Goal>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    nereid_core::logging::init_with_level(nereid_core::logging::level_for_verbosity(cli.verbose));

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let state_path = data_dir.join(STATE_FILE);
    tracing::debug!("Using state file {:?}", state_path);
    let engine = InferenceEngine::from_config(&config);
    let today = match cli.today.as_deref() {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };

    match cli.command.unwrap_or(Commands::Status { json: false }) {
        Commands::Status { json } => cmd_status(&state_path, &engine, today, json),
        Commands::Period { date } => cmd_period(&state_path, &engine, today, &date),
        Commands::Log {
            date,
            flow,
            color,
            pain,
            mood,
            nutrition,
        } => {
            let fields = [
                ("flow", flow),
                ("color", color),
                ("pain", pain),
                ("mood", mood),
                ("nutrition", nutrition),
            ];
            cmd_log(&state_path, &engine, today, &date, &fields)
        }
        Commands::Sensor {
            steps,
            sleep,
            screen,
            temp,
            rhr,
        } => {
            let sensor = normalize_sensor(steps, sleep, screen, temp, rhr)?;
            cmd_sensor(&state_path, &engine, today, sensor)
        }
        Commands::Remote { file } => cmd_remote(&state_path, &engine, today, &file),
        Commands::Import { file } => cmd_import(&state_path, &engine, today, &file),
        Commands::Forecast { days } => cmd_forecast(&state_path, &engine, days),
    }
}

fn cmd_status(state_path: &Path, engine: &InferenceEngine, today: NaiveDate, json: bool) -> Result<()> {
    let mut state = UserCycleState::load(state_path)?;

    // Remote predictions stay until the next mutation recomputes locally
    let output = match state.store.output() {
        Some(output) if state.store.source() == PredictionSource::Remote => output.clone(),
        _ => {
            let output = state.refresh(engine, today);
            state.save(state_path)?;
            output
        }
    };

    if json {
        let doc = serde_json::json!({
            "source": state.store.source(),
            "updated_on": state.store.updated_on(),
            "output": output,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        display_status(&output, &state.store, today);
    }
    Ok(())
}

fn cmd_period(state_path: &Path, engine: &InferenceEngine, today: NaiveDate, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let mut recorded = false;

    let state = UserCycleState::update(state_path, |state| {
        recorded = state.history.toggle(date);
        state.refresh(engine, today);
        Ok(())
    })?;

    if recorded {
        println!("✓ Recorded period start {}", date);
    } else {
        println!("✓ Removed period start {}", date);
    }
    print_next_period(&state.store);
    Ok(())
}

fn cmd_log(
    state_path: &Path,
    engine: &InferenceEngine,
    today: NaiveDate,
    date: &str,
    fields: &[(&str, Option<String>)],
) -> Result<()> {
    let date = parse_date(date)?;

    let entries = fields
        .iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| parse_log_entry(field, v)))
        .collect::<Result<Vec<_>>>()?;

    if entries.is_empty() {
        return Err(Error::InvalidInput(
            "nothing to log; pass at least one of --flow, --color, --pain, --mood, --nutrition"
                .into(),
        ));
    }

    UserCycleState::update(state_path, |state| {
        for entry in &entries {
            state.logs.save(date, *entry);
        }
        state.refresh(engine, today);
        Ok(())
    })?;

    println!("✓ Logged {} field(s) for {}", entries.len(), date);
    Ok(())
}

fn cmd_sensor(
    state_path: &Path,
    engine: &InferenceEngine,
    today: NaiveDate,
    sensor: SensorSnapshot,
) -> Result<()> {
    UserCycleState::update(state_path, |state| {
        state.sensor = sensor;
        state.refresh(engine, today);
        Ok(())
    })?;

    println!("✓ Sensor readings updated");
    Ok(())
}

fn cmd_remote(state_path: &Path, engine: &InferenceEngine, today: NaiveDate, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let payload: RemotePayload = serde_json::from_str(&contents)?;

    if payload.predictions.is_none() && payload.goals.is_none() {
        return Err(Error::RemoteUpdate(
            "payload has neither predictions nor goals".into(),
        ));
    }

    UserCycleState::update(state_path, |state| {
        if state.store.output().is_none() {
            state.refresh(engine, today);
        }
        state.apply_remote(payload.predictions, payload.goals, today)
    })?;

    println!("✓ Applied remote update");
    Ok(())
}

fn cmd_import(state_path: &Path, engine: &InferenceEngine, today: NaiveDate, file: &Path) -> Result<()> {
    let summary = import_csv(file)?;

    UserCycleState::update(state_path, |state| {
        summary.merge_into(&mut state.history, &mut state.logs);
        state.refresh(engine, today);
        Ok(())
    })?;

    println!(
        "✓ Imported {} rows ({} period starts)",
        summary.rows_imported,
        summary.history.len()
    );
    if summary.rows_skipped > 0 {
        println!("  Skipped {} malformed rows", summary.rows_skipped);
    }
    Ok(())
}

fn cmd_forecast(state_path: &Path, engine: &InferenceEngine, days: u32) -> Result<()> {
    let state = UserCycleState::load(state_path)?;
    let forecast = engine.forecast(&state.history, days);

    if forecast.is_empty() {
        println!("No period history yet. Record a period start with `nereid period <date>`.");
        return Ok(());
    }

    println!("Upcoming cycles ({} days):", days);
    for cycle in &forecast {
        println!(
            "  {} → {}  {} days  ({:.0}% confidence)",
            cycle.start,
            cycle.end,
            cycle.length_days,
            cycle.confidence * 100.0
        );
        for phase in &cycle.phases {
            println!(
                "      {:<11} {} → {}",
                phase.name.as_str(),
                phase.start,
                phase.end
            );
        }
    }
    Ok(())
}

fn print_next_period(store: &PredictionStore) {
    match store.predictions().and_then(|p| p.next_period_start) {
        Some(next) => println!("  Next period: {}", next),
        None => println!("  Next period: unknown (no history)"),
    }
}

fn display_status(output: &InferenceOutput, store: &PredictionStore, today: NaiveDate) {
    let p = &output.predictions;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CYCLE STATUS  {}", today);
    println!("╰─────────────────────────────────────────╯");
    println!();

    if store.source() == PredictionSource::Remote {
        let age = store.age_days(today).unwrap_or(0);
        println!("  Source: remote ({} day(s) old)", age);
    }

    print_next_period(store);
    println!(
        "  Cycle length: {} days ({}, {:.0}% confidence)",
        p.cycle_length_days,
        p.regularity.as_str(),
        p.confidence * 100.0
    );
    if let Some(window) = &p.fertile_window {
        println!(
            "  Fertile window: {} → {} (ovulation {})",
            window.start, window.end, window.ovulation_day
        );
    }

    let insights = &output.insights;
    if let (Some(phase), Some(day)) = (insights.current_phase, insights.day_of_cycle) {
        println!("  Today: day {}, {} phase", day, phase.as_str());
    }
    if insights.fertile_today {
        println!("  Today is in the fertile window");
    }

    println!();
    println!("  Phases:");
    for phase in &p.phases {
        println!(
            "    {:<11} {} → {}  ({} days)",
            phase.name.as_str(),
            phase.start,
            phase.end,
            phase.duration_days
        );
    }

    println!();
    println!("  Condition risks:");
    for risk in &p.conditions {
        let marker = if risk.actionable { "→" } else { " " };
        println!(
            "    {} {:<24} {:>4.0}%",
            marker,
            risk.condition.as_str(),
            risk.probability * 100.0
        );
    }

    println!();
    println!("  Goals:");
    for goal in output.goals.iter().filter(|g| g.enabled) {
        let target = match &goal.target {
            GoalTarget::Value(v) => format!("{}", v),
            GoalTarget::Range { min, max } => format!("{}–{}", min, max),
        };
        let check = if goal.target.is_met(goal.current) { "✓" } else { "·" };
        println!(
            "    {} {:<12} {} / {} {}",
            check, goal.title, goal.current, target, goal.unit
        );
    }

    if !insights.cycle_insights.is_empty() {
        println!();
        println!("  Insights:");
        for insight in &insights.cycle_insights {
            let tag = match insight.priority {
                Priority::High => "!",
                Priority::Medium => "~",
                Priority::Low => "-",
            };
            println!("    {} {}: {}", tag, insight.title, insight.message);
        }
    }

    if let Some(guidance) = &insights.guidance {
        println!();
        println!(
            "  Activity: {} ({})",
            guidance.activity.activities, guidance.activity.duration
        );
        println!("    {}", guidance.activity.reason);
        if !guidance.nutrition.is_empty() {
            println!("  Nutrition: {}", guidance.nutrition.join(", "));
        }
    }

    println!();
    println!("  Reminders:");
    for reminder in &insights.reminders {
        println!("    {}  {}", reminder.time, reminder.title);
    }
    println!();
}
