use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use fitlog_core::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Personal workout log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new exercise
    Add {
        /// Display name, e.g. "Morning run"
        #[arg(long)]
        name: String,

        /// Exercise type (cardio, strength, yoga, ...)
        #[arg(long = "type")]
        kind: String,

        /// Duration in minutes
        #[arg(long)]
        duration: u32,

        /// Intensity level (low, moderate, high, very-high)
        #[arg(long)]
        intensity: String,

        /// Calories burned
        #[arg(long)]
        calories: Option<u32>,

        /// When the exercise occurred (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long)]
        date: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List logged exercises, most recent first
    List {
        /// Only this exercise type
        #[arg(long = "type")]
        kind: Option<String>,

        /// Only this intensity level
        #[arg(long)]
        intensity: Option<String>,

        /// Only on or after this date
        #[arg(long)]
        from: Option<String>,

        /// Only on or before this date
        #[arg(long)]
        to: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single exercise by id
    Show { id: Uuid },

    /// Edit fields of an existing exercise
    Edit {
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long)]
        duration: Option<u32>,

        #[arg(long)]
        intensity: Option<String>,

        #[arg(long, conflicts_with = "clear_calories")]
        calories: Option<u32>,

        /// Remove the calories figure
        #[arg(long)]
        clear_calories: bool,

        #[arg(long)]
        date: Option<String>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        /// Remove the notes
        #[arg(long)]
        clear_notes: bool,
    },

    /// Delete an exercise by id
    Delete { id: Uuid },

    /// Show aggregate statistics and streaks
    Stats {
        /// Emit JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Export all exercises for backup
    Export {
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import exercises from a backup, skipping ids already present
    Import {
        /// Path to a previously exported JSON file
        file: PathBuf,
    },

    /// Delete every logged exercise. Irreversible.
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    fitlog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let slot_path = match cli.data_dir {
        Some(dir) => dir.join("exercises.json"),
        None => config.slot_path(),
    };
    let mut store = ExerciseStore::open(JsonSlot::new(slot_path));
    let week_start = config.stats.week_start;

    match cli.command {
        Commands::Add {
            name,
            kind,
            duration,
            intensity,
            calories,
            date,
            notes,
        } => cmd_add(&mut store, name, kind, duration, intensity, calories, date, notes),
        Commands::List {
            kind,
            intensity,
            from,
            to,
            json,
        } => cmd_list(&store, kind, intensity, from, to, json),
        Commands::Show { id } => cmd_show(&store, id),
        Commands::Edit {
            id,
            name,
            kind,
            duration,
            intensity,
            calories,
            clear_calories,
            date,
            notes,
            clear_notes,
        } => {
            let patch = build_patch(
                name,
                kind,
                duration,
                intensity,
                calories,
                clear_calories,
                date,
                notes,
                clear_notes,
            )?;
            cmd_edit(&mut store, id, patch)
        }
        Commands::Delete { id } => cmd_delete(&mut store, id),
        Commands::Stats { json } => cmd_stats(&store, week_start, json),
        Commands::Export { format, output } => cmd_export(&store, format, output),
        Commands::Import { file } => cmd_import(&mut store, &file),
        Commands::Clear { yes } => cmd_clear(&mut store, yes),
    }
}

/// Boundary-side field validation; the store trusts what it receives
#[allow(clippy::too_many_arguments)]
fn cmd_add(
    store: &mut ExerciseStore,
    name: String,
    kind: String,
    duration: u32,
    intensity: String,
    calories: Option<u32>,
    date: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Other("name must not be empty".into()));
    }
    if duration == 0 {
        return Err(Error::Other("duration must be positive".into()));
    }

    let draft = ExerciseDraft {
        name,
        kind: parse_kind(&kind)?,
        duration,
        intensity_level: parse_intensity(&intensity)?,
        calories_burned: calories,
        date: match date {
            Some(d) => parse_date(&d)?,
            None => Utc::now(),
        },
        notes,
    };

    let exercise = store.create(draft)?;
    println!("✓ Logged \"{}\" ({})", exercise.name, exercise.id);
    Ok(())
}

fn cmd_list(
    store: &ExerciseStore,
    kind: Option<String>,
    intensity: Option<String>,
    from: Option<String>,
    to: Option<String>,
    json: bool,
) -> Result<()> {
    let date_range = match (from, to) {
        (None, None) => None,
        (from, to) => Some(DateRange {
            start: from.map(|d| parse_date(&d)).transpose()?.unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: to.map(|d| parse_end_date(&d)).transpose()?.unwrap_or(DateTime::<Utc>::MAX_UTC),
        }),
    };

    let filter = ExerciseFilter {
        kind: kind.map(|k| parse_kind(&k)).transpose()?,
        intensity_level: intensity.map(|i| parse_intensity(&i)).transpose()?,
        date_range,
    };

    let exercises = store.list(Some(&filter));

    if json {
        println!("{}", serde_json::to_string_pretty(&exercises)?);
        return Ok(());
    }

    if exercises.is_empty() {
        println!("No exercises logged.");
        return Ok(());
    }

    for exercise in &exercises {
        display_row(exercise);
    }
    println!("\n{} exercise(s)", exercises.len());
    Ok(())
}

fn cmd_show(store: &ExerciseStore, id: Uuid) -> Result<()> {
    match store.get(id) {
        Some(exercise) => {
            display_full(exercise);
            Ok(())
        }
        None => {
            eprintln!("Exercise {} not found", id);
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_patch(
    name: Option<String>,
    kind: Option<String>,
    duration: Option<u32>,
    intensity: Option<String>,
    calories: Option<u32>,
    clear_calories: bool,
    date: Option<String>,
    notes: Option<String>,
    clear_notes: bool,
) -> Result<ExercisePatch> {
    if let Some(ref n) = name {
        if n.trim().is_empty() {
            return Err(Error::Other("name must not be empty".into()));
        }
    }
    if duration == Some(0) {
        return Err(Error::Other("duration must be positive".into()));
    }

    Ok(ExercisePatch {
        name,
        kind: kind.map(|k| parse_kind(&k)).transpose()?,
        duration,
        intensity_level: intensity.map(|i| parse_intensity(&i)).transpose()?,
        calories_burned: if clear_calories {
            Some(None)
        } else {
            calories.map(Some)
        },
        date: date.map(|d| parse_date(&d)).transpose()?,
        notes: if clear_notes { Some(None) } else { notes.map(Some) },
    })
}

fn cmd_edit(store: &mut ExerciseStore, id: Uuid, patch: ExercisePatch) -> Result<()> {
    match store.update(id, patch)? {
        Some(exercise) => {
            println!("✓ Updated \"{}\"", exercise.name);
            Ok(())
        }
        None => {
            eprintln!("Exercise {} not found", id);
            std::process::exit(1);
        }
    }
}

fn cmd_delete(store: &mut ExerciseStore, id: Uuid) -> Result<()> {
    if store.delete(id)? {
        println!("✓ Deleted {}", id);
        Ok(())
    } else {
        eprintln!("Exercise {} not found", id);
        std::process::exit(1);
    }
}

fn cmd_stats(store: &ExerciseStore, week_start: WeekStart, json: bool) -> Result<()> {
    let stats = store.stats(Utc::now(), week_start);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT STATISTICS");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total workouts:    {}", stats.total_workouts);
    println!("  Total duration:    {} min", stats.total_duration);
    println!("  Total calories:    {}", stats.total_calories);
    println!("  Avg intensity:     {:.1} / 4", stats.average_intensity);
    println!();
    println!("  Current streak:    {} day(s)", stats.current_streak);
    println!("  Longest streak:    {} day(s)", stats.longest_streak);
    println!();
    println!("  This week:         {}", stats.this_week_workouts);
    println!("  This month:        {}", stats.this_month_workouts);
    println!();
    Ok(())
}

fn cmd_export(
    store: &ExerciseStore,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let contents = match format {
        ExportFormat::Json => store.export(Utc::now())?,
        ExportFormat::Csv => {
            let mut out = Vec::new();
            write_csv(&store.list(None), &mut out)?;
            String::from_utf8(out).map_err(|e| Error::Other(e.to_string()))?
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, contents)?;
            println!("✓ Exported {} exercise(s) to {}", store.len(), path.display());
        }
        None => {
            std::io::stdout().write_all(contents.as_bytes())?;
        }
    }
    Ok(())
}

fn cmd_import(store: &mut ExerciseStore, file: &Path) -> Result<()> {
    let payload = std::fs::read_to_string(file)?;
    let imported = store.import(&payload)?;
    println!("✓ Imported {} new exercise(s)", imported);
    Ok(())
}

fn cmd_clear(store: &mut ExerciseStore, yes: bool) -> Result<()> {
    if !yes {
        eprintln!("Refusing to wipe the log without --yes");
        std::process::exit(1);
    }
    store.clear()?;
    println!("✓ All exercises deleted");
    Ok(())
}

fn parse_kind(s: &str) -> Result<ExerciseType> {
    s.parse().map_err(Error::Other)
}

fn parse_intensity(s: &str) -> Result<IntensityLevel> {
    s.parse().map_err(Error::Other)
}

/// Accept RFC 3339 instants or plain dates (taken as midnight UTC)
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = s.parse::<NaiveDate>() {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(Error::Other(format!(
        "invalid date: {} (expected YYYY-MM-DD or RFC 3339)",
        s
    )))
}

/// Like [`parse_date`] but plain dates cover the whole day (end of range)
fn parse_end_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = s.parse::<NaiveDate>() {
        if let Some(dt) = d.and_hms_opt(23, 59, 59) {
            return Ok(dt.and_utc());
        }
    }
    Err(Error::Other(format!(
        "invalid date: {} (expected YYYY-MM-DD or RFC 3339)",
        s
    )))
}

fn display_row(exercise: &Exercise) {
    let calories = exercise
        .calories_burned
        .map(|c| format!("  {} kcal", c))
        .unwrap_or_default();
    println!(
        "  {}  {:<10} {:<12} {:>4} min  {}{}",
        exercise.date.format("%Y-%m-%d"),
        exercise.kind,
        exercise.intensity_level,
        exercise.duration,
        exercise.name,
        calories,
    );
}

fn display_full(exercise: &Exercise) {
    println!("  Id:         {}", exercise.id);
    println!("  Name:       {}", exercise.name);
    println!("  Type:       {}", exercise.kind);
    println!("  Duration:   {} min", exercise.duration);
    println!("  Intensity:  {}", exercise.intensity_level);
    if let Some(calories) = exercise.calories_burned {
        println!("  Calories:   {}", calories);
    }
    println!("  Date:       {}", exercise.date.to_rfc3339());
    if let Some(ref notes) = exercise.notes {
        println!("  Notes:      {}", notes);
    }
    println!("  Created:    {}", exercise.created_at.to_rfc3339());
    println!("  Updated:    {}", exercise.updated_at.to_rfc3339());
}
