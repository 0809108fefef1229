use clap::Parser;
use gradebook::config::AppConfig;
use gradebook::error::AppError;
use gradebook::importers;
use gradebook::policy::{GradingConfig, LateMultiplierTable, PolicyEngine};
use gradebook::report;
use gradebook::telemetry;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "gradebook",
    about = "Resolve final course grades from Gradescope exports, picking the best policy application per student",
    version
)]
struct Cli {
    /// Registrar roster CSV (Student ID, Name)
    roster: PathBuf,
    /// Category configuration CSV
    categories: PathBuf,
    /// Assignment configuration CSV
    assignments: PathBuf,
    /// Gradescope grade export CSV
    grades: PathBuf,
    /// Extensions CSV (SID, Assignment, Days)
    #[arg(long)]
    extensions: Option<PathBuf>,
    /// Accommodations CSV (SID, Category, Extra Drops, Extra Slip Days)
    #[arg(long)]
    accommodations: Option<PathBuf>,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Emit the report as JSON instead of CSV
    #[arg(long)]
    json: bool,
    /// Decimal places for reported grades (overrides GRADEBOOK_ROUND)
    #[arg(long)]
    round: Option<u32>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut students = importers::roster::from_path(&cli.roster)?;
    info!(students = students.len(), "roster imported");

    let categories = importers::categories::from_path(&cli.categories)?;
    let assignments = importers::assignments::from_path(&cli.assignments, &categories)?;
    info!(
        categories = categories.len(),
        assignments = assignments.len(),
        "grading configuration imported"
    );

    let summary = importers::grades::from_path(&cli.grades, &mut students, &assignments)?;
    info!(
        matched = summary.matched_rows,
        "grade export rows matched to roster"
    );
    if summary.skipped_malformed > 0 || summary.skipped_unrostered > 0 {
        warn!(
            malformed = summary.skipped_malformed,
            unrostered = summary.skipped_unrostered,
            "grade export rows skipped"
        );
    }

    let extensions = match &cli.extensions {
        Some(path) => importers::extensions::from_path(path)?,
        None => Vec::new(),
    };
    let accommodations = match &cli.accommodations {
        Some(path) => importers::accommodations::from_path(path)?,
        None => Vec::new(),
    };
    info!(
        extensions = extensions.len(),
        accommodations = accommodations.len(),
        "policy adjustments imported"
    );

    let grading = GradingConfig::new(
        categories,
        assignments,
        LateMultiplierTable::new(config.late_multipliers.clone()),
    );
    let category_names: Vec<String> = grading.categories.keys().cloned().collect();

    let engine = PolicyEngine::new(grading, extensions, accommodations);
    let reports = engine.resolve_all(&students);
    info!(reports = reports.len(), "grades resolved");

    let round = cli.round.unwrap_or(config.report.round);
    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };

    if cli.json {
        report::write_json(out, &reports)?;
    } else {
        report::write_csv(out, &category_names, &reports, round)?;
    }

    if let Some(path) = &cli.output {
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
