use super::parser::{ANSWER, CONFIDENCE, SNIPPETS, SOURCES};

/// The single prompt template sent with every search.
pub fn build_search_prompt(query: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Based on the uploaded files, please answer the following query:\n\n");
    prompt.push_str(&format!("Query: {}\n\n", query.trim()));
    prompt.push_str("Provide a comprehensive answer with:\n");
    prompt.push_str("1. Direct answer to the query\n");
    prompt.push_str("2. Relevant excerpts or snippets from the files\n");
    prompt.push_str("3. File names where the information was found\n");
    prompt.push_str("4. A confidence score (Low/Medium/High) for the answer\n\n");
    prompt.push_str("Format your response as follows, one snippet or source per line:\n");
    prompt.push_str(&format!("{} [Your answer here]\n", ANSWER));
    prompt.push_str(&format!("{} [Relevant text excerpts]\n", SNIPPETS));
    prompt.push_str(&format!("{} [File names]\n", SOURCES));
    prompt.push_str(&format!("{} [Low/Medium/High]\n", CONFIDENCE));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_query_and_all_markers() {
        let prompt = build_search_prompt("  what does the file say?  ");
        assert!(prompt.contains("Query: what does the file say?\n"));
        for marker in [ANSWER, SNIPPETS, SOURCES, CONFIDENCE] {
            assert!(prompt.contains(marker), "missing {}", marker);
        }
        assert!(prompt.find(ANSWER).unwrap() < prompt.find(CONFIDENCE).unwrap());
    }
}
