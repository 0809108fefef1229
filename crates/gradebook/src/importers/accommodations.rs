use super::ImportError;
use crate::policy::{Accommodation, Sid};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AccommodationRow {
    #[serde(rename = "SID")]
    sid: u64,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Extra Drops", default)]
    extra_drops: i64,
    #[serde(rename = "Extra Slip Days", default)]
    extra_slip_days: i64,
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Accommodation>, ImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Accommodation>, ImportError> {
    let mut accommodations = Vec::new();
    for row in super::csv_reader(reader).deserialize::<AccommodationRow>() {
        let row = row?;
        accommodations.push(Accommodation {
            sid: Sid(row.sid),
            category: row.category,
            extra_drops: row.extra_drops,
            extra_slip_days: row.extra_slip_days,
        });
    }
    Ok(accommodations)
}
