/// System prompt for choosing the parent of a new term.
pub const PLACEMENT_SYSTEM_PROMPT: &str = r#"You maintain a taxonomy of knowledge areas. Every term has exactly one parent.

You will be given the current taxonomy as an indented outline (two spaces per level) and one new term.
Choose the single existing term that should become the new term's parent.

Rules:
- Answer with one label copied exactly from the outline.
- Prefer the most specific term that still contains the new term.
- If nothing fits, or you are unsure, answer NONE.

Only output the label, no additional text."#;

/// Reply meaning "no confident choice".
pub const NO_PARENT: &str = "NONE";

/// Builds the user prompt for placing `label`.
pub fn build_placement_prompt(label: &str, taxonomy: &str) -> String {
    format!(
        r#"## Taxonomy

{taxonomy}
## New term

{label}

Which existing term should be the parent of {label}?"#
    )
}
