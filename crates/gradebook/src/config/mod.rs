use std::env;
use std::fmt;

/// Top-level configuration for the grading pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub report: ReportConfig,
    pub late_multipliers: Vec<f64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let log_level = env::var("GRADEBOOK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let round = env::var("GRADEBOOK_ROUND")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidRound)?;

        let late_multipliers = match env::var("GRADEBOOK_LATE_MULTIPLIERS") {
            Ok(raw) => parse_multipliers(&raw)?,
            Err(_) => default_late_multipliers(),
        };

        Ok(Self {
            telemetry: TelemetryConfig { log_level },
            report: ReportConfig { round },
            late_multipliers,
        })
    }
}

/// Reduction applied per residual day of lateness; tier N covers day N.
/// Submissions later than the last tier score zero.
pub fn default_late_multipliers() -> Vec<f64> {
    vec![0.9, 0.8, 0.6]
}

fn parse_multipliers(raw: &str) -> Result<Vec<f64>, ConfigError> {
    let mut tiers = Vec::new();
    for part in raw.split(',') {
        let value = part
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidMultipliers {
                value: raw.to_string(),
            })?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidMultipliers {
                value: raw.to_string(),
            });
        }
        tiers.push(value);
    }
    Ok(tiers)
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Presentation controls for emitted reports.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub round: u32,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRound,
    InvalidMultipliers { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRound => {
                write!(f, "GRADEBOOK_ROUND must be a non-negative integer")
            }
            ConfigError::InvalidMultipliers { value } => {
                write!(
                    f,
                    "GRADEBOOK_LATE_MULTIPLIERS must be comma-separated fractions in [0, 1], got '{}'",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
