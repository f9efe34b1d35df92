/// Upper bound on drift items requested from the model. Not enforced on the
/// reply.
pub const MAX_DRIFT_ITEMS: usize = 5;

const INSTRUCTIONS: &str = "\
You compare a source text with its translation and report translation drift.

Respond ONLY with a JSON object. No markdown fences, no explanation, just raw JSON:
{
  \"source_language\": \"\",
  \"translation_language\": \"\",
  \"drift_items\": []
}

Each entry of drift_items is an object:
{
  \"category\": \"Meaning\" | \"Tone\" | \"Terminology\" | \"Grammar\" | \"Style\",
  \"severity\": \"High\" | \"Medium\" | \"Low\",
  \"description\": \"what drifted and why it matters\",
  \"source_snippet\": \"the affected words, copied exactly from the source text\",
  \"translation_snippet\": \"the affected words, copied exactly from the translation\"
}";

pub fn build_prompt(source: &str, translation: &str) -> String {
    format!(
        "{INSTRUCTIONS}\n\
         \n\
         Return at most {MAX_DRIFT_ITEMS} items, only the most important ones, \
         ordered by severity.\n\
         \n\
         Source text:\n\
         {source}\n\
         \n\
         Translation:\n\
         {translation}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_both_texts() {
        let prompt = build_prompt("The cat sat.", "Le chat était assis.");
        assert!(prompt.contains("Source text:\nThe cat sat."));
        assert!(prompt.ends_with("Translation:\nLe chat était assis."));
    }

    #[test]
    fn prompt_states_limit_and_schema() {
        let prompt = build_prompt("a", "b");
        assert!(prompt.contains("at most 5 items"));
        for field in ["source_language", "translation_language", "translation_snippet"] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }
}
