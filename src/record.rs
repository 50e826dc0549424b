// ABOUTME: Record source for the slide-report application
// ABOUTME: Loads the ordered slide records from a JSON config document

use crate::errors::{ReportError, Result};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const TYPE_KEY: &str = "type";
pub const TITLE_KEY: &str = "title";
pub const CONTENT_KEY: &str = "content";
pub const CONFIGURATION_KEY: &str = "configuration";

/// One entry of a list slide
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(default)]
    pub level: u32,
}

/// Axis labels for a plot slide
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlotConfiguration {
    #[serde(rename = "x-label")]
    pub x_label: String,
    #[serde(rename = "y-label")]
    pub y_label: String,
}

/// A single slide description read from the config document.
///
/// Records are opaque key-value objects; renderers query the fields they need
/// by name and fail with [`ReportError::InvalidRecord`] when one is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    index: usize,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(index: usize, fields: Map<String, Value>) -> Self {
        Self { index, fields }
    }

    /// Build a record from any JSON value. Non-object values produce a record
    /// without fields, which the resolver reports as an unknown type.
    pub fn from_value(index: usize, value: Value) -> Self {
        match unwrap_record(value) {
            Value::Object(fields) => Self::new(index, fields),
            _ => Self::new(index, Map::new()),
        }
    }

    /// Position of the record in the source document
    pub fn index(&self) -> usize {
        self.index
    }

    /// The type tag, if present and a string
    pub fn type_tag(&self) -> Option<&str> {
        self.fields.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// The type field as it appeared in the document, for diagnostics
    pub fn raw_type(&self) -> String {
        match self.fields.get(TYPE_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "null".to_string(),
        }
    }

    pub fn str_field(&self, name: &str) -> Result<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ReportError::invalid_record(
                self.index,
                format!("field '{}' must be a string, found {}", name, other),
            )),
            None => Err(self.missing(name)),
        }
    }

    pub fn title(&self) -> Result<&str> {
        self.str_field(TITLE_KEY)
    }

    pub fn content_str(&self) -> Result<&str> {
        self.str_field(CONTENT_KEY)
    }

    pub fn list_items(&self) -> Result<Vec<ListItem>> {
        self.typed_field(CONTENT_KEY)
    }

    pub fn plot_configuration(&self) -> Result<PlotConfiguration> {
        self.typed_field(CONFIGURATION_KEY)
    }

    fn typed_field<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let value = self.fields.get(name).ok_or_else(|| self.missing(name))?;
        T::deserialize(value).map_err(|e| {
            ReportError::invalid_record(self.index, format!("field '{}': {}", name, e))
        })
    }

    fn missing(&self, name: &str) -> ReportError {
        ReportError::invalid_record(self.index, format!("missing field '{}'", name))
    }
}

/// Load all records from a config document, fully, before processing starts
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    info!("Reading config document: {:?}", path);
    if !path.exists() {
        return Err(ReportError::PathNotFoundError(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(ReportError::FileReadError)?;
    let records = parse_records(&text)?;
    info!("Loaded {} records", records.len());
    Ok(records)
}

/// Parse records from JSON text.
///
/// Accepts a top-level array, or an object holding exactly one array member
/// (e.g. `{"presentation": [...]}`).
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let document: Value = serde_json::from_str(text)?;
    let items = match document {
        Value::Array(items) => items,
        Value::Object(members) => {
            let mut arrays = members
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::Array(items) => Some((key, items)),
                    _ => None,
                })
                .collect::<Vec<_>>();
            if arrays.len() != 1 {
                return Err(ReportError::ConfigError(format!(
                    "expected exactly one list of records, found {}",
                    arrays.len()
                )));
            }
            let (key, items) = arrays.remove(0);
            debug!("Reading records from member '{}'", key);
            items
        }
        other => {
            return Err(ReportError::ConfigError(format!(
                "config document must be a list of records, found {}",
                json_kind(&other)
            )));
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, value)| Record::from_value(index, value))
        .collect())
}

// A row may wrap its record in a single key, e.g. {"slide": {"type": ...}}
fn unwrap_record(value: Value) -> Value {
    match value {
        Value::Object(mut members)
            if !members.contains_key(TYPE_KEY)
                && members.len() == 1
                && members.values().all(Value::is_object) =>
        {
            let key = members.keys().next().cloned().unwrap_or_default();
            members.remove(&key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
