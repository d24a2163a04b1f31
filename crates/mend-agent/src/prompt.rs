//! Prompt construction

/// Instruction sent as the user message for a rewrite.
///
/// The file content is embedded verbatim after a blank line.
pub fn build_prompt(improvement_type: &str, code: &str) -> String {
    format!(
        "Improve the following Python code with {} improvements:\n\n{}",
        improvement_type, code
    )
}
