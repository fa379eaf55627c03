//! Reconcile free-text model output into a fixed-shape record
//!
//! The model is instructed to answer with one pipe-delimited line in schema
//! order; this module turns whatever actually came back into an
//! [`ExtractionRecord`]. A length mismatch is genuinely ambiguous - an
//! under-produced answer is indistinguishable from "found nothing for the
//! trailing fields" - so both reconciliation policies are exposed instead of
//! hard-coding one.

use crate::error::AnalystError;
use quarry_domain::{ExtractionRecord, FieldSchema, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a response with the wrong number of values is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Pad short answers with "N/A", truncate long ones (logged, never fails)
    #[default]
    Lenient,

    /// Any length mismatch is an error for the affected query
    Strict,
}

/// Parse a raw model response against the schema
///
/// Splits on `|` and zips the trimmed values onto the schema positionally.
/// Under [`ParsePolicy::Lenient`] the result is always a complete,
/// correctly-shaped record; under [`ParsePolicy::Strict`] a mismatched
/// value count returns [`AnalystError::ResponseShape`].
pub fn parse_response(
    raw: &str,
    schema: &FieldSchema,
    policy: ParsePolicy,
) -> Result<ExtractionRecord, AnalystError> {
    let mut values: Vec<String> = raw
        .trim()
        .split('|')
        .map(|token| token.trim().to_string())
        .collect();

    let expected = schema.len();
    if values.len() != expected && policy == ParsePolicy::Strict {
        return Err(AnalystError::ResponseShape(format!(
            "Model returned {} values for {} fields",
            values.len(),
            expected
        )));
    }

    if values.len() < expected {
        warn!(
            "Model returned {} values for {} fields; padding with '{}'",
            values.len(),
            expected,
            NOT_AVAILABLE
        );
        values.resize(expected, NOT_AVAILABLE.to_string());
    } else if values.len() > expected {
        warn!(
            "Model returned {} values for {} fields; truncating extras",
            values.len(),
            expected
        );
        values.truncate(expected);
    }

    ExtractionRecord::from_values(schema, values).map_err(AnalystError::ResponseShape)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> FieldSchema {
        FieldSchema::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_exact_arity() {
        let record = parse_response(
            "$50 Million | Jane Doe | Churn",
            &schema(&["Revenue", "CEO", "Primary Risks"]),
            ParsePolicy::Lenient,
        )
        .unwrap();

        assert_eq!(record.get("Revenue"), Some("$50 Million"));
        assert_eq!(record.get("CEO"), Some("Jane Doe"));
        assert_eq!(record.get("Primary Risks"), Some("Churn"));
    }

    #[test]
    fn test_short_response_padded() {
        let record = parse_response("A|B", &schema(&["x", "y", "z"]), ParsePolicy::Lenient).unwrap();

        assert_eq!(record.get("x"), Some("A"));
        assert_eq!(record.get("y"), Some("B"));
        assert_eq!(record.get("z"), Some(NOT_AVAILABLE));
    }

    #[test]
    fn test_long_response_truncated() {
        let record =
            parse_response("A|B|C|D", &schema(&["x", "y"]), ParsePolicy::Lenient).unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("x"), Some("A"));
        assert_eq!(record.get("y"), Some("B"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        let record = parse_response(
            "  $50 Million  |  Jane Doe \n",
            &schema(&["Revenue", "CEO"]),
            ParsePolicy::Lenient,
        )
        .unwrap();

        assert_eq!(record.get("Revenue"), Some("$50 Million"));
        assert_eq!(record.get("CEO"), Some("Jane Doe"));
    }

    #[test]
    fn test_lenient_never_fails_on_garbage() {
        let record = parse_response(
            "the model wrote a paragraph instead",
            &schema(&["a", "b", "c"]),
            ParsePolicy::Lenient,
        )
        .unwrap();

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("a"), Some("the model wrote a paragraph instead"));
        assert_eq!(record.get("b"), Some(NOT_AVAILABLE));
        assert_eq!(record.get("c"), Some(NOT_AVAILABLE));
    }

    #[test]
    fn test_strict_rejects_short_response() {
        let result = parse_response("A|B", &schema(&["x", "y", "z"]), ParsePolicy::Strict);
        assert!(matches!(result, Err(AnalystError::ResponseShape(_))));
    }

    #[test]
    fn test_strict_rejects_long_response() {
        let result = parse_response("A|B|C|D", &schema(&["x", "y"]), ParsePolicy::Strict);
        assert!(matches!(result, Err(AnalystError::ResponseShape(_))));
    }

    #[test]
    fn test_strict_accepts_exact_arity() {
        let record = parse_response("A|B", &schema(&["x", "y"]), ParsePolicy::Strict).unwrap();
        assert_eq!(record.get("y"), Some("B"));
    }

    #[test]
    fn test_empty_response_pads_everything_after_first() {
        let record = parse_response("", &schema(&["x", "y"]), ParsePolicy::Lenient).unwrap();
        // An empty response still splits into one (empty) token
        assert_eq!(record.get("x"), Some(""));
        assert_eq!(record.get("y"), Some(NOT_AVAILABLE));
    }
}
