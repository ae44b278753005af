use serde::Deserialize;
use std::fmt;

/// Record ids appear both as numbers and as strings in the wild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One species of the game dataset. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeciesRecord {
    pub id: RecordId,
    pub scientific_name: String,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

/// Parse a JSON array of species records.
///
/// ```
/// use phylodist::libs::dataset;
///
/// let records = dataset::from_str(r#"[{"id": 1, "scientific_name": "Felis catus"}]"#).unwrap();
/// assert_eq!(dataset::scientific_names(&records), vec!["Felis catus"]);
/// ```
pub fn from_str(json: &str) -> anyhow::Result<Vec<SpeciesRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read records from a file, `stdin` for standard input.
pub fn from_file(infile: &str) -> anyhow::Result<Vec<SpeciesRecord>> {
    let json = crate::libs::io::read_to_string(infile)?;
    from_str(&json).map_err(|e| anyhow::anyhow!("Invalid species dataset {}: {}", infile, e))
}

/// Names usable as an allowed-species list, blanks dropped.
pub fn scientific_names(records: &[SpeciesRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.scientific_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
