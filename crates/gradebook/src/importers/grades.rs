use super::ImportError;
use crate::policy::{Assignment, AssignmentGrade, Sid, Student};
use chrono::Duration;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Counters surfaced to the operator after a grade import pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GradeImportSummary {
    pub matched_rows: usize,
    /// Rows whose SID cell did not parse (test-student rows and the
    /// like).
    pub skipped_malformed: usize,
    /// Rows for students who are not on the roster.
    pub skipped_unrostered: usize,
}

struct AssignmentColumns<'a> {
    assignment: &'a Assignment,
    score: usize,
    lateness: usize,
    max_points: Option<usize>,
}

/// Imports a Gradescope grade export into the rostered students.
/// Score columns without a configured assignment are ignored; that is
/// the supported way to grade a subset of the export.
pub fn from_path<P: AsRef<Path>>(
    path: P,
    students: &mut BTreeMap<Sid, Student>,
    assignments: &BTreeMap<String, Assignment>,
) -> Result<GradeImportSummary, ImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file, students, assignments)
}

pub fn from_reader<R: Read>(
    reader: R,
    students: &mut BTreeMap<Sid, Student>,
    assignments: &BTreeMap<String, Assignment>,
) -> Result<GradeImportSummary, ImportError> {
    let mut csv_reader = super::csv_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column_of = |name: &str| headers.iter().position(|header| header == name);

    let sid_column = column_of("SID").ok_or_else(|| ImportError::MissingColumn {
        column: "SID".to_string(),
    })?;

    let mut columns = Vec::new();
    for assignment in assignments.values() {
        let Some(score) = column_of(&assignment.name) else {
            // No column for this assignment in the export.
            continue;
        };
        let lateness_header = format!("{} - Lateness (H:M:S)", assignment.name);
        let lateness = column_of(&lateness_header).ok_or(ImportError::MissingColumn {
            column: lateness_header,
        })?;
        let max_points = column_of(&format!("{} - Max Points", assignment.name));
        columns.push(AssignmentColumns {
            assignment,
            score,
            lateness,
            max_points,
        });
    }

    let mut summary = GradeImportSummary::default();
    for record in csv_reader.records() {
        let record = record?;
        let Some(sid) = record.get(sid_column).and_then(|cell| cell.parse::<u64>().ok())
        else {
            summary.skipped_malformed += 1;
            continue;
        };
        let Some(student) = students.get_mut(&Sid(sid)) else {
            summary.skipped_unrostered += 1;
            continue;
        };

        for column in &columns {
            let score_cell = record.get(column.score).unwrap_or("");
            if score_cell.is_empty() {
                // No submission.
                continue;
            }
            let raw_score = score_cell
                .parse::<f64>()
                .map_err(|_| ImportError::InvalidScore {
                    assignment: column.assignment.name.clone(),
                    value: score_cell.to_string(),
                })?;

            let lateness = match record.get(column.lateness) {
                Some("") | None => Duration::zero(),
                Some(cell) => parse_lateness(cell)?,
            };

            let max_points = column
                .max_points
                .and_then(|index| record.get(index))
                .and_then(|cell| cell.parse::<f64>().ok())
                .unwrap_or(column.assignment.points_possible);

            student.grades.insert(
                column.assignment.name.clone(),
                AssignmentGrade {
                    raw_score,
                    max_points,
                    lateness,
                },
            );
        }
        summary.matched_rows += 1;
    }

    Ok(summary)
}

/// Gradescope lateness is formatted as H:M:S with unbounded hours.
fn parse_lateness(value: &str) -> Result<Duration, ImportError> {
    let invalid = || ImportError::InvalidLateness {
        value: value.to_string(),
    };
    let parts: Vec<i64> = value
        .split(':')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    let &[hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };
    Ok(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn assignments() -> BTreeMap<String, Assignment> {
        BTreeMap::from([(
            "hw1".to_string(),
            Assignment {
                name: "hw1".to_string(),
                category: "Homework".to_string(),
                points_possible: 10.0,
                weight: 1.0,
                slip_group: None,
            },
        )])
    }

    fn roster() -> BTreeMap<Sid, Student> {
        BTreeMap::from([(Sid(12345), Student::new(Sid(12345), "Ada Lovelace"))])
    }

    #[test]
    fn imports_scores_lateness_and_ceiling() {
        let csv = "SID,Name,hw1,hw1 - Max Points,hw1 - Lateness (H:M:S)\n\
12345,Ada Lovelace,8.5,10,26:00:00\n";
        let mut students = roster();
        let summary =
            from_reader(Cursor::new(csv), &mut students, &assignments()).expect("grades import");
        assert_eq!(summary.matched_rows, 1);
        let grade = students
            .get(&Sid(12345))
            .and_then(|student| student.grades.get("hw1"))
            .expect("hw1 grade");
        assert_eq!(grade.raw_score, 8.5);
        assert_eq!(grade.max_points, 10.0);
        assert_eq!(grade.lateness, Duration::hours(26));
    }

    #[test]
    fn skips_rows_without_numeric_sid() {
        let csv = "SID,Name,hw1,hw1 - Lateness (H:M:S)\n\
,Test Account,10,00:00:00\n\
12345,Ada Lovelace,9,00:00:00\n";
        let mut students = roster();
        let summary =
            from_reader(Cursor::new(csv), &mut students, &assignments()).expect("grades import");
        assert_eq!(summary.skipped_malformed, 1);
        assert_eq!(summary.matched_rows, 1);
    }

    #[test]
    fn skips_unrostered_students() {
        let csv = "SID,Name,hw1,hw1 - Lateness (H:M:S)\n99999,Dropout,10,00:00:00\n";
        let mut students = roster();
        let summary =
            from_reader(Cursor::new(csv), &mut students, &assignments()).expect("grades import");
        assert_eq!(summary.skipped_unrostered, 1);
        assert!(students.get(&Sid(12345)).expect("ada").grades.is_empty());
    }

    #[test]
    fn empty_score_cell_means_no_submission() {
        let csv = "SID,Name,hw1,hw1 - Lateness (H:M:S)\n12345,Ada Lovelace,,00:00:00\n";
        let mut students = roster();
        from_reader(Cursor::new(csv), &mut students, &assignments()).expect("grades import");
        assert!(students.get(&Sid(12345)).expect("ada").grades.is_empty());
    }

    #[test]
    fn unconfigured_columns_are_ignored() {
        let csv = "SID,Name,quiz9,quiz9 - Lateness (H:M:S)\n12345,Ada Lovelace,5,00:00:00\n";
        let mut students = roster();
        let summary =
            from_reader(Cursor::new(csv), &mut students, &assignments()).expect("grades import");
        assert_eq!(summary.matched_rows, 1);
        assert!(students.get(&Sid(12345)).expect("ada").grades.is_empty());
    }

    #[test]
    fn missing_lateness_column_fails_fast() {
        let csv = "SID,Name,hw1\n12345,Ada Lovelace,9\n";
        let mut students = roster();
        let error = from_reader(Cursor::new(csv), &mut students, &assignments())
            .expect_err("lateness column required");
        assert!(matches!(error, ImportError::MissingColumn { .. }));
    }

    #[test]
    fn malformed_lateness_fails_fast() {
        let csv = "SID,Name,hw1,hw1 - Lateness (H:M:S)\n12345,Ada Lovelace,9,soon\n";
        let mut students = roster();
        let error = from_reader(Cursor::new(csv), &mut students, &assignments())
            .expect_err("lateness must parse");
        assert!(matches!(error, ImportError::InvalidLateness { .. }));
    }
}
