use super::ImportError;
use crate::policy::Category;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CategoryRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Drops")]
    drops: u32,
    #[serde(rename = "Slip Days")]
    slip_days: u32,
    #[serde(rename = "Has Late Multiplier")]
    has_late_multiplier: String,
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Category>, ImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<BTreeMap<String, Category>, ImportError> {
    let mut categories = BTreeMap::new();
    for row in super::csv_reader(reader).deserialize::<CategoryRow>() {
        let row = row?;
        categories.insert(
            row.name.clone(),
            Category {
                name: row.name,
                weight: row.weight,
                drops: row.drops,
                slip_days: row.slip_days,
                has_late_multiplier: parse_flag(&row.has_late_multiplier),
            },
        );
    }
    Ok(categories)
}

/// The flag column historically held free-form text; anything that
/// does not clearly read as false counts as true, except an empty
/// cell.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "no" | "0"
    )
}
