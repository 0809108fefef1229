use super::ImportError;
use crate::policy::{Sid, Student};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Student ID")]
    sid: u64,
    #[serde(rename = "Name")]
    name: String,
}

/// Imports the registrar roster. Only students listed here appear in
/// the final report.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<BTreeMap<Sid, Student>, ImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<BTreeMap<Sid, Student>, ImportError> {
    let mut students = BTreeMap::new();
    for row in super::csv_reader(reader).deserialize::<RosterRow>() {
        let row = row?;
        let sid = Sid(row.sid);
        students.insert(sid, Student::new(sid, row.name));
    }
    Ok(students)
}
