//! The classification capability boundary.
//!
//! Models sit behind [`ClassificationCapability`]; the engines only see
//! labels, confidences and answer strings. Loading, training and transport
//! belong to the implementations.

use serde_json::{Map, Value as JsonValue};

use crate::result::{ClassificationError, ClassificationSignal, ModelDescriptor, TableAnswer};

/// A string table presented to a table question-answering model.
///
/// Every cell is text; rows have exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl RuleTable {
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells are padded with empty strings, extra cells dropped.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Column-oriented JSON (`{column: [cells...]}`), the shape table QA models take.
    pub fn to_column_map(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        for (idx, name) in self.columns.iter().enumerate() {
            let cells = self
                .rows
                .iter()
                .map(|r| JsonValue::String(r[idx].clone()))
                .collect();
            map.insert((*name).to_string(), JsonValue::Array(cells));
        }
        map
    }
}

/// External, opaque model access.
///
/// Implementations need not be reentrant: only `Send` is required, and shared
/// use goes through a serializing adapter.
pub trait ClassificationCapability: Send {
    fn descriptor(&self) -> ModelDescriptor;

    /// Classify free text into a label/confidence pair.
    fn classify(&self, text: &str) -> Result<ClassificationSignal, ClassificationError>;

    /// Answer a natural-language question over a table.
    fn answer_over_table(
        &self,
        table: &RuleTable,
        query: &str,
    ) -> Result<TableAnswer, ClassificationError> {
        let _ = (table, query);
        Err(ClassificationError::Unsupported("table question answering"))
    }
}

impl<T: ClassificationCapability + ?Sized> ClassificationCapability for Box<T> {
    fn descriptor(&self) -> ModelDescriptor {
        (**self).descriptor()
    }

    fn classify(&self, text: &str) -> Result<ClassificationSignal, ClassificationError> {
        (**self).classify(text)
    }

    fn answer_over_table(
        &self,
        table: &RuleTable,
        query: &str,
    ) -> Result<TableAnswer, ClassificationError> {
        (**self).answer_over_table(table, query)
    }
}

/// Stand-in used when no model is configured. Every call reports `Unavailable`,
/// so the engines take their degraded paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClassifier;

impl ClassificationCapability for UnavailableClassifier {
    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("unavailable")
    }

    fn classify(&self, _text: &str) -> Result<ClassificationSignal, ClassificationError> {
        Err(ClassificationError::Unavailable(
            "no classification model configured".to_string(),
        ))
    }

    fn answer_over_table(
        &self,
        _table: &RuleTable,
        _query: &str,
    ) -> Result<TableAnswer, ClassificationError> {
        Err(ClassificationError::Unavailable(
            "no table question-answering model configured".to_string(),
        ))
    }
}
