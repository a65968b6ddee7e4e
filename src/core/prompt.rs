use crate::core::constants::{HTML_INSTRUCTION_SUFFIX, UI_TREE_INSTRUCTION_SUFFIX};
use crate::core::mode::UiMode;

/// Builds the text actually sent to the model for one turn.
///
/// Text-only turns send the prompt verbatim. Generative turns append the
/// rich-output instruction and, when a grounding lookup produced text, lead
/// with that context.
pub fn compose_prompt(
    prompt: &str,
    mode: UiMode,
    grounding_context: Option<&str>,
    ui_tree_blocks: bool,
) -> String {
    if !mode.is_generative() {
        return prompt.to_string();
    }

    let (artifact, suffix) = if ui_tree_blocks {
        ("a UI component tree", UI_TREE_INSTRUCTION_SUFFIX)
    } else {
        ("an HTML component", HTML_INSTRUCTION_SUFFIX)
    };

    match grounding_context.map(str::trim).filter(|ctx| !ctx.is_empty()) {
        Some(context) => format!(
            "Based on the following up-to-date information:\n\n{context}\n\nNow create {artifact} for the user's request: {prompt}\n{suffix}"
        ),
        None => format!("{prompt}\n{suffix}"),
    }
}
