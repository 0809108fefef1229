mod writer;

pub use writer::{write_csv, write_json};

use crate::policy::{CategoryOutcome, Sid};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fully resolved grade for one enrolled student, including the trace
/// of which policy choices produced it.
#[derive(Debug, Clone, Serialize)]
pub struct StudentGradeReport {
    pub sid: Sid,
    pub name: String,
    pub final_grade: f64,
    pub assignment_scores: BTreeMap<String, f64>,
    pub categories: Vec<CategoryOutcome>,
    pub annotations: Vec<String>,
}

impl StudentGradeReport {
    pub fn rounded_grade(&self, round: u32) -> f64 {
        round_to(self.final_grade, round)
    }

    pub fn category(&self, name: &str) -> Option<&CategoryOutcome> {
        self.categories.iter().find(|outcome| outcome.category == name)
    }
}

pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
