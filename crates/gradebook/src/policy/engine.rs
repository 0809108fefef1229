use super::category::{resolve_category, CategoryBudgets, GroupMember, SlipGroup};
use super::domain::{Accommodation, Extension, GradingConfig, Sid, Student};
use super::{lateness, scores};
use crate::report::StudentGradeReport;
use chrono::Duration;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Resolves every student's grade against the shared grading tables,
/// choosing for each category the drop/slip-day combination that
/// maximizes the student's score. Students are independent, so the
/// whole pass is a pure function of the configuration plus one
/// student's rows.
pub struct PolicyEngine {
    config: GradingConfig,
    extensions: HashMap<Sid, Vec<Extension>>,
    accommodations: HashMap<Sid, Vec<Accommodation>>,
}

impl PolicyEngine {
    pub fn new(
        config: GradingConfig,
        extensions: Vec<Extension>,
        accommodations: Vec<Accommodation>,
    ) -> Self {
        let mut extensions_by_sid: HashMap<Sid, Vec<Extension>> = HashMap::new();
        for extension in extensions {
            extensions_by_sid
                .entry(extension.sid)
                .or_default()
                .push(extension);
        }
        let mut accommodations_by_sid: HashMap<Sid, Vec<Accommodation>> = HashMap::new();
        for accommodation in accommodations {
            accommodations_by_sid
                .entry(accommodation.sid)
                .or_default()
                .push(accommodation);
        }
        Self {
            config,
            extensions: extensions_by_sid,
            accommodations: accommodations_by_sid,
        }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Resolves all students in parallel and returns reports ordered
    /// by SID.
    pub fn resolve_all(&self, students: &BTreeMap<Sid, Student>) -> Vec<StudentGradeReport> {
        let mut reports: Vec<StudentGradeReport> = students
            .par_iter()
            .map(|(_, student)| self.resolve_student(student))
            .collect();
        reports.sort_by_key(|report| report.sid);
        reports
    }

    pub fn resolve_student(&self, student: &Student) -> StudentGradeReport {
        let mut annotations = Vec::new();

        let extension_days = self.extension_days_for(student, &mut annotations);
        let budget_overrides = self.budgets_for(student.sid, &mut annotations);

        let mut final_grade = 0.0;
        let mut assignment_scores = BTreeMap::new();
        let mut outcomes = Vec::new();

        for category in self.config.categories.values() {
            let groups = self.slip_groups(student, &category.name, &extension_days);
            let budgets = budget_overrides
                .get(category.name.as_str())
                .copied()
                .unwrap_or(CategoryBudgets {
                    drops: category.drops,
                    slip_days: category.slip_days,
                });

            let outcome =
                resolve_category(category, &groups, budgets, &self.config.late_multipliers);

            for dropped in &outcome.dropped {
                annotations.push(format!("{}: dropped {}", category.name, dropped));
            }
            for (group, days) in &outcome.slip_days_used {
                annotations.push(format!(
                    "{}: {} slip day(s) on {}",
                    category.name, days, group
                ));
            }

            final_grade += category.weight * outcome.score;
            assignment_scores.extend(outcome.assignment_scores.clone());
            outcomes.push(outcome);
        }

        StudentGradeReport {
            sid: student.sid,
            name: student.name.clone(),
            final_grade,
            assignment_scores,
            categories: outcomes,
            annotations,
        }
    }

    /// Whole days of extension per assignment for this student.
    /// Extensions on assignments the student never submitted are
    /// ignored; lateness of a missing submission is already zero.
    fn extension_days_for<'a>(
        &'a self,
        student: &Student,
        annotations: &mut Vec<String>,
    ) -> HashMap<&'a str, i64> {
        let mut days: HashMap<&str, i64> = HashMap::new();
        if let Some(extensions) = self.extensions.get(&student.sid) {
            for extension in extensions {
                if !student.grades.contains_key(&extension.assignment) {
                    continue;
                }
                *days.entry(extension.assignment.as_str()).or_default() += extension.days;
                annotations.push(format!(
                    "extension: {} day(s) on {}",
                    extension.days, extension.assignment
                ));
            }
        }
        days
    }

    /// Per-category budgets after accommodations, clamped at zero.
    fn budgets_for<'a>(
        &'a self,
        sid: Sid,
        annotations: &mut Vec<String>,
    ) -> HashMap<&'a str, CategoryBudgets> {
        let mut budgets = HashMap::new();
        if let Some(accommodations) = self.accommodations.get(&sid) {
            for accommodation in accommodations {
                let Some(category) = self.config.categories.get(&accommodation.category) else {
                    continue;
                };
                let drops = (category.drops as i64 + accommodation.extra_drops).max(0) as u32;
                let slip_days =
                    (category.slip_days as i64 + accommodation.extra_slip_days).max(0) as u32;
                budgets.insert(category.name.as_str(), CategoryBudgets { drops, slip_days });
                annotations.push(format!(
                    "{}: accommodation adjusts budgets to {} drop(s), {} slip day(s)",
                    category.name, drops, slip_days
                ));
            }
        }
        budgets
    }

    /// Builds the category's slip groups as this student sees them.
    /// Every configured assignment participates; missing submissions
    /// score zero with no lateness but remain droppable. Group
    /// lateness is the maximum over members, and extensions on any
    /// member subtract from the shared clock before budgets apply.
    fn slip_groups(
        &self,
        student: &Student,
        category: &str,
        extension_days: &HashMap<&str, i64>,
    ) -> Vec<SlipGroup> {
        let mut accumulators: BTreeMap<String, (Duration, i64, Vec<GroupMember>)> =
            BTreeMap::new();

        for assignment in self.config.assignments_in(category) {
            let (score, submitted_lateness) = match student.grades.get(&assignment.name) {
                Some(grade) => (
                    scores::normalized_score(
                        grade.raw_score,
                        grade.max_points,
                        assignment.points_possible,
                    ),
                    grade.lateness,
                ),
                None => (0.0, Duration::zero()),
            };

            let entry = accumulators
                .entry(assignment.slip_key().to_string())
                .or_insert_with(|| (Duration::zero(), 0, Vec::new()));
            if submitted_lateness > entry.0 {
                entry.0 = submitted_lateness;
            }
            entry.1 += extension_days
                .get(assignment.name.as_str())
                .copied()
                .unwrap_or(0);
            entry.2.push(GroupMember {
                assignment: assignment.name.clone(),
                weight: assignment.weight,
                score,
            });
        }

        accumulators
            .into_iter()
            .map(|(key, (max_lateness, extension, members))| SlipGroup {
                key,
                days_late: lateness::days_late(lateness::effective_lateness(
                    max_lateness,
                    extension,
                )),
                members,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::domain::{Assignment, AssignmentGrade, Category, LateMultiplierTable};

    fn config() -> GradingConfig {
        let categories = BTreeMap::from([
            (
                "Homework".to_string(),
                Category {
                    name: "Homework".to_string(),
                    weight: 0.4,
                    drops: 0,
                    slip_days: 0,
                    has_late_multiplier: true,
                },
            ),
            (
                "Exams".to_string(),
                Category {
                    name: "Exams".to_string(),
                    weight: 0.6,
                    drops: 0,
                    slip_days: 0,
                    has_late_multiplier: false,
                },
            ),
        ]);
        let assignments = BTreeMap::from([
            (
                "hw1".to_string(),
                Assignment {
                    name: "hw1".to_string(),
                    category: "Homework".to_string(),
                    points_possible: 10.0,
                    weight: 1.0,
                    slip_group: None,
                },
            ),
            (
                "hw2".to_string(),
                Assignment {
                    name: "hw2".to_string(),
                    category: "Homework".to_string(),
                    points_possible: 10.0,
                    weight: 1.0,
                    slip_group: None,
                },
            ),
            (
                "midterm".to_string(),
                Assignment {
                    name: "midterm".to_string(),
                    category: "Exams".to_string(),
                    points_possible: 100.0,
                    weight: 1.0,
                    slip_group: None,
                },
            ),
        ]);
        GradingConfig::new(categories, assignments, LateMultiplierTable::standard())
    }

    fn on_time(raw: f64, max: f64) -> AssignmentGrade {
        AssignmentGrade {
            raw_score: raw,
            max_points: max,
            lateness: Duration::zero(),
        }
    }

    fn late(raw: f64, max: f64, hours: i64) -> AssignmentGrade {
        AssignmentGrade {
            raw_score: raw,
            max_points: max,
            lateness: Duration::hours(hours),
        }
    }

    fn student(grades: Vec<(&str, AssignmentGrade)>) -> Student {
        let mut student = Student::new(Sid(1), "Test Student");
        for (name, grade) in grades {
            student.grades.insert(name.to_string(), grade);
        }
        student
    }

    #[test]
    fn aggregates_categories_by_weight() {
        let engine = PolicyEngine::new(config(), Vec::new(), Vec::new());
        let student = student(vec![
            ("hw1", on_time(10.0, 10.0)),
            ("hw2", on_time(5.0, 10.0)),
            ("midterm", on_time(80.0, 100.0)),
        ]);
        let report = engine.resolve_student(&student);
        // Homework (1.0 + 0.5) / 2 = 0.75, Exams 0.8.
        assert!((report.final_grade - (0.4 * 0.75 + 0.6 * 0.8)).abs() < 1e-12);
    }

    #[test]
    fn missing_submission_scores_zero_but_counts_weight() {
        let engine = PolicyEngine::new(config(), Vec::new(), Vec::new());
        let student = student(vec![
            ("hw1", on_time(10.0, 10.0)),
            ("midterm", on_time(100.0, 100.0)),
        ]);
        let report = engine.resolve_student(&student);
        let homework = report.category("Homework").expect("homework outcome");
        assert!((homework.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unconfigured_grade_columns_are_ignored() {
        let engine = PolicyEngine::new(config(), Vec::new(), Vec::new());
        let mut with_extra = student(vec![("hw1", on_time(10.0, 10.0))]);
        with_extra
            .grades
            .insert("mystery".to_string(), on_time(1.0, 1.0));
        let without = student(vec![("hw1", on_time(10.0, 10.0))]);
        assert_eq!(
            engine.resolve_student(&with_extra).final_grade,
            engine.resolve_student(&without).final_grade
        );
    }

    #[test]
    fn full_extension_removes_late_penalty_without_slip_days() {
        let extensions = vec![Extension {
            sid: Sid(1),
            assignment: "hw1".to_string(),
            days: 2,
        }];
        let engine = PolicyEngine::new(config(), extensions, Vec::new());
        let student = student(vec![
            ("hw1", late(10.0, 10.0, 30)),
            ("hw2", on_time(10.0, 10.0)),
            ("midterm", on_time(100.0, 100.0)),
        ]);
        let report = engine.resolve_student(&student);
        assert!((report.final_grade - 1.0).abs() < 1e-12);
        assert!(report
            .annotations
            .iter()
            .any(|note| note.contains("extension") && note.contains("hw1")));
    }

    #[test]
    fn accommodation_raises_category_budget() {
        let accommodations = vec![Accommodation {
            sid: Sid(1),
            category: "Homework".to_string(),
            extra_drops: 1,
            extra_slip_days: 0,
        }];
        let engine = PolicyEngine::new(config(), Vec::new(), accommodations);
        let student = student(vec![
            ("hw1", on_time(0.0, 10.0)),
            ("hw2", on_time(10.0, 10.0)),
            ("midterm", on_time(100.0, 100.0)),
        ]);
        let report = engine.resolve_student(&student);
        let homework = report.category("Homework").expect("homework outcome");
        assert!((homework.score - 1.0).abs() < 1e-12);
        assert_eq!(homework.dropped, vec!["hw1".to_string()]);
    }

    #[test]
    fn negative_accommodation_clamps_at_zero() {
        let accommodations = vec![Accommodation {
            sid: Sid(1),
            category: "Homework".to_string(),
            extra_drops: -5,
            extra_slip_days: -5,
        }];
        let engine = PolicyEngine::new(config(), Vec::new(), accommodations);
        let student = student(vec![
            ("hw1", on_time(0.0, 10.0)),
            ("hw2", on_time(10.0, 10.0)),
        ]);
        let report = engine.resolve_student(&student);
        let homework = report.category("Homework").expect("homework outcome");
        assert!(homework.dropped.is_empty());
        assert!((homework.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn resolution_is_idempotent() {
        let engine = PolicyEngine::new(config(), Vec::new(), Vec::new());
        let student = student(vec![
            ("hw1", late(8.0, 10.0, 20)),
            ("hw2", on_time(10.0, 10.0)),
            ("midterm", on_time(90.0, 100.0)),
        ]);
        let first = engine.resolve_student(&student);
        let second = engine.resolve_student(&student);
        assert_eq!(first.final_grade, second.final_grade);
        assert_eq!(first.annotations, second.annotations);
    }

    #[test]
    fn resolve_all_orders_by_sid() {
        let engine = PolicyEngine::new(config(), Vec::new(), Vec::new());
        let mut students = BTreeMap::new();
        for sid in [Sid(30), Sid(10), Sid(20)] {
            let mut entry = Student::new(sid, format!("Student {}", sid.0));
            entry.grades.insert("hw1".to_string(), on_time(10.0, 10.0));
            students.insert(sid, entry);
        }
        let reports = engine.resolve_all(&students);
        let sids: Vec<Sid> = reports.iter().map(|report| report.sid).collect();
        assert_eq!(sids, vec![Sid(10), Sid(20), Sid(30)]);
    }

    #[test]
    fn shared_slip_group_spends_one_allocation_for_both_members() {
        let categories = BTreeMap::from([(
            "Labs".to_string(),
            Category {
                name: "Labs".to_string(),
                weight: 1.0,
                drops: 0,
                slip_days: 1,
                has_late_multiplier: true,
            },
        )]);
        let assignments = BTreeMap::from([
            (
                "lab1a".to_string(),
                Assignment {
                    name: "lab1a".to_string(),
                    category: "Labs".to_string(),
                    points_possible: 10.0,
                    weight: 1.0,
                    slip_group: Some("week1".to_string()),
                },
            ),
            (
                "lab1b".to_string(),
                Assignment {
                    name: "lab1b".to_string(),
                    category: "Labs".to_string(),
                    points_possible: 10.0,
                    weight: 1.0,
                    slip_group: Some("week1".to_string()),
                },
            ),
        ]);
        let config =
            GradingConfig::new(categories, assignments, LateMultiplierTable::standard());
        let engine = PolicyEngine::new(config, Vec::new(), Vec::new());
        let student = student(vec![
            ("lab1a", late(10.0, 10.0, 10)),
            ("lab1b", late(10.0, 10.0, 6)),
        ]);
        let report = engine.resolve_student(&student);
        let labs = report.category("Labs").expect("labs outcome");
        // One slip day covers the whole co-due group.
        assert!((labs.score - 1.0).abs() < 1e-12);
        assert_eq!(labs.slip_days_used.get("week1"), Some(&1));
    }
}
