use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Student identifier as issued by the registrar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Sid(pub u64);

impl std::fmt::Display for Sid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One submission as exported by Gradescope: the raw score, the score
/// ceiling the autograder advertised, and how late the submission was.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentGrade {
    pub raw_score: f64,
    pub max_points: f64,
    pub lateness: Duration,
}

/// An enrolled student with whatever submissions the export contained.
/// Assignments without a submission simply have no entry here.
#[derive(Debug, Clone)]
pub struct Student {
    pub sid: Sid,
    pub name: String,
    pub grades: BTreeMap<String, AssignmentGrade>,
}

impl Student {
    pub fn new(sid: Sid, name: impl Into<String>) -> Self {
        Self {
            sid,
            name: name.into(),
            grades: BTreeMap::new(),
        }
    }
}

/// Configured assignment. `weight` is relative within the category and
/// is renormalized over non-dropped assignments when a category is
/// scored. Assignments sharing a `slip_group` share one due-date clock
/// and therefore one lateness value and one slip/drop decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub category: String,
    pub points_possible: f64,
    pub weight: f64,
    pub slip_group: Option<String>,
}

impl Assignment {
    /// Slip-group key: explicit group if configured, otherwise the
    /// assignment stands alone under its own name.
    pub fn slip_key(&self) -> &str {
        self.slip_group.as_deref().unwrap_or(&self.name)
    }
}

/// Configured category with its base policy budgets. The set of
/// category weights is assumed, not verified, to sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub weight: f64,
    pub drops: u32,
    pub slip_days: u32,
    pub has_late_multiplier: bool,
}

/// Per-student, per-assignment lateness forgiveness. Applied before
/// any slip-day budget is considered and consumes no budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub sid: Sid,
    pub assignment: String,
    pub days: i64,
}

/// Per-student, per-category budget adjustment. Deltas may be
/// negative; the effective budget clamps at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub sid: Sid,
    pub category: String,
    pub extra_drops: i64,
    pub extra_slip_days: i64,
}

/// Late-penalty tier table. Tier N (1-based) is the multiplier for a
/// residual lateness of N days; anything past the last tier scores
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateMultiplierTable {
    tiers: Vec<f64>,
}

impl LateMultiplierTable {
    pub fn new(tiers: Vec<f64>) -> Self {
        Self { tiers }
    }

    pub fn standard() -> Self {
        Self::new(crate::config::default_late_multipliers())
    }

    pub fn multiplier(&self, days_late: u32) -> f64 {
        if days_late == 0 {
            return 1.0;
        }
        self.tiers
            .get(days_late as usize - 1)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Read-only grading tables shared by every student's resolution.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    pub categories: BTreeMap<String, Category>,
    pub assignments: BTreeMap<String, Assignment>,
    pub late_multipliers: LateMultiplierTable,
}

impl GradingConfig {
    pub fn new(
        categories: BTreeMap<String, Category>,
        assignments: BTreeMap<String, Assignment>,
        late_multipliers: LateMultiplierTable,
    ) -> Self {
        Self {
            categories,
            assignments,
            late_multipliers,
        }
    }

    pub fn assignments_in(&self, category: &str) -> Vec<&Assignment> {
        self.assignments
            .values()
            .filter(|assignment| assignment.category == category)
            .collect()
    }
}
