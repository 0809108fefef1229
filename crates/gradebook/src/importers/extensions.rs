use super::ImportError;
use crate::policy::{Extension, Sid};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ExtensionRow {
    #[serde(rename = "SID")]
    sid: u64,
    #[serde(rename = "Assignment")]
    assignment: String,
    #[serde(rename = "Days")]
    days: i64,
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Extension>, ImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Extension>, ImportError> {
    let mut extensions = Vec::new();
    for row in super::csv_reader(reader).deserialize::<ExtensionRow>() {
        let row = row?;
        extensions.push(Extension {
            sid: Sid(row.sid),
            assignment: row.assignment,
            days: row.days,
        });
    }
    Ok(extensions)
}
