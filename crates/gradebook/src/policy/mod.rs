mod category;
mod domain;
mod drops;
mod engine;
mod lateness;
mod scores;
mod slips;

pub use category::CategoryOutcome;
pub use domain::{
    Accommodation, Assignment, AssignmentGrade, Category, Extension, GradingConfig,
    LateMultiplierTable, Sid, Student,
};
pub use engine::PolicyEngine;
