//! Field schemas and extraction records - the fixed-shape output contract

use std::fmt;

/// Sentinel value for a field the model could not find in the context
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel value filling every field of an entity whose analysis failed
pub const EXTRACTION_ERROR: &str = "ERROR";

/// An ordered list of distinct field names to extract
///
/// Order is load-bearing: the prompt restates fields in this order and the
/// parser zips model output back onto it positionally. Construction rejects
/// empty schemas, blank names, and duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<String>,
}

impl FieldSchema {
    /// Build a schema from field names, validating shape
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::FieldSchema;
    ///
    /// let schema = FieldSchema::new(["Revenue", "CEO"]).unwrap();
    /// assert_eq!(schema.len(), 2);
    /// ```
    pub fn new<I, S>(fields: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields
            .into_iter()
            .map(|f| f.into().trim().to_string())
            .collect();

        if fields.is_empty() {
            return Err("Field schema must contain at least one field".to_string());
        }
        for (i, field) in fields.iter().enumerate() {
            if field.is_empty() {
                return Err(format!("Field {} is blank", i));
            }
            if fields[..i].contains(field) {
                return Err(format!("Duplicate field name: '{}'", field));
            }
        }

        Ok(Self { fields })
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema has no fields (unreachable via `new`)
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in caller order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Iterate field names in caller order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(", "))
    }
}

/// A fixed-shape mapping from each schema field to an extracted value
///
/// Always has exactly `schema.len()` entries, in schema order. Values are
/// either extracted text, [`NOT_AVAILABLE`], or [`EXTRACTION_ERROR`]; the
/// record is never partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    entries: Vec<(String, String)>,
}

impl ExtractionRecord {
    /// Zip values onto the schema positionally
    ///
    /// The caller (the response parser) guarantees `values.len()` equals the
    /// schema length; this is enforced here so a malformed record can never
    /// be constructed.
    pub fn from_values(schema: &FieldSchema, values: Vec<String>) -> Result<Self, String> {
        if values.len() != schema.len() {
            return Err(format!(
                "Expected {} values for schema, got {}",
                schema.len(),
                values.len()
            ));
        }
        Ok(Self {
            entries: schema
                .iter()
                .map(str::to_string)
                .zip(values)
                .collect(),
        })
    }

    /// A record with every field set to the same sentinel
    pub fn uniform(schema: &FieldSchema, value: &str) -> Self {
        Self {
            entries: schema
                .iter()
                .map(|f| (f.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// A record with every field set to [`NOT_AVAILABLE`]
    pub fn not_available(schema: &FieldSchema) -> Self {
        Self::uniform(schema, NOT_AVAILABLE)
    }

    /// A record with every field set to [`EXTRACTION_ERROR`]
    pub fn failed(schema: &FieldSchema) -> Self {
        Self::uniform(schema, EXTRACTION_ERROR)
    }

    /// Look up a field's value by name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Number of entries (always the schema length)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the record has no entries (unreachable in practice)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate (field, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Values in schema order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }
}
