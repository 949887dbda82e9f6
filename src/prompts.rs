//! Prompt construction for the refinement rounds

/// Wrap the previous deliverable in a request for concrete critique
pub(crate) fn review_prompt(previous: &str) -> String {
    format!(
        "Review the following deliverable and list concrete, constructive \
         suggestions for improving it.\n\nDeliverable:\n{previous}"
    )
}

/// Supply the prior deliverable plus the critique and ask for a full revision
pub(crate) fn improve_prompt(previous: &str, critique: &str) -> String {
    format!(
        "Revise the deliverable below by applying the reviewer's suggestions. \
         Return the complete revised deliverable, not a summary of changes.\n\n\
         Deliverable:\n{previous}\n\nSuggestions:\n{critique}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_prompt_embeds_deliverable() {
        let prompt = review_prompt("draft one");
        assert!(prompt.contains("draft one"));
        assert!(prompt.contains("suggestions"));
    }

    #[test]
    fn test_improve_prompt_embeds_both_inputs() {
        let prompt = improve_prompt("draft one", "tighten the intro");
        assert!(prompt.contains("draft one"));
        assert!(prompt.contains("tighten the intro"));
    }
}
