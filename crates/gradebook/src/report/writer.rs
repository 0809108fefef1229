use super::{round_to, StudentGradeReport};
use std::io::Write;

/// Writes one row per student: identity, final grade, then per-category
/// score/drops/slip-days columns, then the annotation trail. The
/// category list comes from the grading configuration so every row has
/// the same shape.
pub fn write_csv<W: Write>(
    out: W,
    categories: &[String],
    reports: &[StudentGradeReport],
    round: u32,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["SID".to_string(), "Name".to_string(), "Grade".to_string()];
    for category in categories {
        header.push(format!("{category} Score"));
        header.push(format!("{category} Drops"));
        header.push(format!("{category} Slip Days"));
    }
    header.push("Notes".to_string());
    writer.write_record(&header)?;

    for report in reports {
        let mut row = vec![
            report.sid.to_string(),
            report.name.clone(),
            report.rounded_grade(round).to_string(),
        ];
        for category in categories {
            match report.category(category) {
                Some(outcome) => {
                    row.push(round_to(outcome.score, round).to_string());
                    row.push(outcome.dropped.join(" "));
                    row.push(
                        outcome
                            .slip_days_used
                            .values()
                            .sum::<u32>()
                            .to_string(),
                    );
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        row.push(report.annotations.join("; "));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Serializes the full report structures, annotations included, for
/// downstream tooling that wants more than the flat CSV.
pub fn write_json<W: Write>(
    out: W,
    reports: &[StudentGradeReport],
) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(out, reports)
}
