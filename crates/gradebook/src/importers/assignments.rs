use super::ImportError;
use crate::policy::{Assignment, Category};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AssignmentRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Possible")]
    points_possible: f64,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Slip Group", default)]
    slip_group: Option<String>,
}

pub fn from_path<P: AsRef<Path>>(
    path: P,
    categories: &BTreeMap<String, Category>,
) -> Result<BTreeMap<String, Assignment>, ImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file, categories)
}

pub fn from_reader<R: Read>(
    reader: R,
    categories: &BTreeMap<String, Category>,
) -> Result<BTreeMap<String, Assignment>, ImportError> {
    let mut assignments = BTreeMap::new();
    for row in super::csv_reader(reader).deserialize::<AssignmentRow>() {
        let row = row?;
        if !categories.contains_key(&row.category) {
            return Err(ImportError::UnknownCategory {
                assignment: row.name,
                category: row.category,
            });
        }
        let slip_group = row.slip_group.filter(|group| !group.is_empty());
        assignments.insert(
            row.name.clone(),
            Assignment {
                name: row.name,
                category: row.category,
                points_possible: row.points_possible,
                weight: row.weight,
                slip_group,
            },
        );
    }
    Ok(assignments)
}
