//! Prompt composition for dynamic-schema requests.

/// Formatting constraints appended after the schema block.
const OUTPUT_CONSTRAINTS: &str = "Respond ONLY with a JSON object matching this structure. \
Do not include markdown, code fences, or any explanation. Output raw JSON only.";

/// Combine caller prompt text with an optional rendered schema block.
///
/// Pure function, no side effects. Without a schema block the prompt is
/// returned unchanged; fixed-schema requests bypass this entirely and hand
/// the capability the caller prompt plus a target-type selector.
pub fn compose_prompt(prompt: &str, schema_block: Option<&str>) -> String {
    match schema_block {
        Some(block) => format!("{}\n\n{}\n{}", prompt, OUTPUT_CONSTRAINTS, block),
        None => prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_schema_the_prompt_is_unchanged() {
        assert_eq!(compose_prompt("Summarize this.", None), "Summarize this.");
    }

    #[test]
    fn with_schema_the_block_and_constraints_are_appended() {
        let block = "{\n  \"rating\": 0\n}";
        let composed = compose_prompt("Rate this album.", Some(block));
        assert!(composed.starts_with("Rate this album."));
        assert!(composed.contains("Respond ONLY with a JSON object"));
        assert!(composed.contains("code fences"));
        assert!(composed.ends_with(block));
    }

    #[test]
    fn composition_is_deterministic() {
        let block = "{\n  \"a\": \"\"\n}";
        assert_eq!(
            compose_prompt("p", Some(block)),
            compose_prompt("p", Some(block))
        );
    }
}
