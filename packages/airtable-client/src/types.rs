use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column name to cell value.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    /// Text value of a column, `None` when absent or not a string.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub records: Vec<Record>,
    /// Present when more pages remain.
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    pub fields: Fields,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRecords {
    pub records: Vec<NewRecord>,
    pub typecast: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecord {
    pub fields: Fields,
    pub typecast: bool,
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Options for listing records.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filter_by_formula: Option<String>,
    pub max_records: Option<u32>,
    pub sort: Option<(String, Direction)>,
}
