//! Result types for analysis runs

use quarry_domain::{ExtractionRecord, FieldSchema};

/// One analyzed entity and its extracted record
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Entity name as queried
    pub entity: String,

    /// Extracted values, one per schema field
    pub record: ExtractionRecord,
}

/// The tabular outcome of a batch analysis: one row per entity
///
/// Rows always have the full schema shape; a failed entity carries the
/// "ERROR" sentinel in every cell rather than being dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Schema shared by every row
    pub schema: FieldSchema,

    /// Per-entity results, in request order
    pub rows: Vec<EntityRecord>,
}

impl AnalysisReport {
    /// Create an empty report for the schema
    pub fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a row
    pub fn push(&mut self, row: EntityRecord) {
        self.rows.push(row);
    }

    /// Column headers: entity first, then the schema fields in order
    pub fn header(&self) -> Vec<String> {
        std::iter::once("Entity".to_string())
            .chain(self.schema.iter().map(str::to_string))
            .collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no entities have been analyzed
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
