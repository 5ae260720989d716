/*!
 * Prompt construction for caption translation.
 *
 * The system prompt is a configurable template; the user prompt wraps the
 * caption between its previous and next context sections and asks for the
 * translation only.
 */

/// System prompt template with `{source_language}` and `{target_language}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// Build the user message for one caption.
///
/// Empty context sections are still emitted so the model always sees the
/// same layout.
pub fn build_user_prompt(text: &str, target_language: &str, before: &[String], after: &[String]) -> String {
    format!(
        "TRANSLATE ONLY THE FOLLOWING TEXT INTO '{}'. \
         USE THE PREVIOUS AND NEXT CONTEXT TO IMPROVE ACCURACY \
         AND FIX ANY SPELLING MISTAKES. DO NOT INCLUDE ANYTHING ELSE.\n\n\
         === PREVIOUS CONTEXT ===\n{}\n\n\
         === TEXT TO TRANSLATE ===\n{}\n\n\
         === NEXT CONTEXT ===\n{}\n\n\
         REPLY WITH THE EXACT, CORRECTED TRANSLATION ONLY.",
        target_language.to_uppercase(),
        before.join("\n"),
        text,
        after.join("\n"),
    )
}
