//! Prompt construction for field extraction
//!
//! The prompt and the parser share one positional contract: fields are
//! restated in caller order, and the model is told to answer with a single
//! pipe-delimited line in that exact order. That contract is what makes the
//! output parseable without structured-output support from the model.

use quarry_domain::FieldSchema;

/// Builds extraction prompts from a field schema and retrieved context
pub struct PromptBuilder<'a> {
    schema: &'a FieldSchema,
    context: &'a str,
    entity: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for the given schema and context
    pub fn new(schema: &'a FieldSchema, context: &'a str) -> Self {
        Self {
            schema,
            context,
            entity: None,
        }
    }

    /// Name the entity the extraction is about
    pub fn with_entity(mut self, entity: &'a str) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role and task
        match self.entity {
            Some(entity) => {
                prompt.push_str(&format!(
                    "You are an expert analyst. Extract the following data points about \
                     '{}' from the context provided below, and from nothing else.\n\n",
                    entity
                ));
            }
            None => {
                prompt.push_str(
                    "You are an expert analyst. Extract the following data points from \
                     the context provided below, and from nothing else.\n\n",
                );
            }
        }

        // 2. Numbered restatement of the fields, caller order
        for (i, field) in self.schema.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, field));
        }
        prompt.push('\n');

        // 3. Output format rules
        prompt.push_str(FORMAT_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 4. One worked example
        prompt.push_str(WORKED_EXAMPLE);
        prompt.push_str("\n\n");

        // 5. The retrieved context, verbatim
        prompt.push_str("Context:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.context);
        prompt.push_str("\n---\n\n");

        prompt.push_str("Analysis:\n");

        prompt
    }
}

const FORMAT_INSTRUCTIONS: &str = "\
--- INSTRUCTIONS ---
1. Return the values in a single line, separated by pipes (|).
2. Follow the exact order of the numbered list above.
3. If a piece of information is NOT in the context, write 'N/A' for that \
field. Do not fabricate a value and do not repeat a previous answer.
4. Do NOT write any introduction, explanation, or extra text. Output ONLY \
the values.
5. Do NOT format as Markdown.";

const WORKED_EXAMPLE: &str = "\
Example output for 3 fields:
$45 Billion | Tim Cook | Supply Chain Disruptions";
