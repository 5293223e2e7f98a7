//! Prompt assembly.
//!
//! Turns retrieved sources into a context block and wraps it, together with
//! the user question, into the prompt handed to the generator.

const NO_CONTEXT_MARKER: &str = "No relevant documents found.";

/// A rendered prompt plus the sources it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub text: String,
    pub sources: Vec<String>,
}

/// Joins sources with newlines, or yields the empty-context marker.
pub fn build_context(sources: &[String]) -> String {
    if sources.is_empty() {
        NO_CONTEXT_MARKER.to_string()
    } else {
        sources.join("\n")
    }
}

pub fn build_prompt(query: &str, sources: Vec<String>) -> Prompt {
    let context = build_context(&sources);
    let text = format!(
        "You are a helpful assistant.\n\
         Use the following context to answer the question.\n\n\
         Context:\n{}\n\n\
         Question: {}\n\
         Answer:",
        context, query
    );
    Prompt { text, sources }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_joins_sources_with_newlines() {
        let sources = vec!["first".to_string(), "second".to_string()];
        assert_eq!(build_context(&sources), "first\nsecond");
    }

    #[test]
    fn empty_context_uses_marker() {
        assert_eq!(build_context(&[]), "No relevant documents found.");
    }

    #[test]
    fn prompt_follows_template() {
        let prompt = build_prompt("Why is the sky blue?", vec!["Rayleigh scattering.".to_string()]);
        assert_eq!(
            prompt.text,
            "You are a helpful assistant.\n\
             Use the following context to answer the question.\n\n\
             Context:\nRayleigh scattering.\n\n\
             Question: Why is the sky blue?\n\
             Answer:"
        );
        assert_eq!(prompt.sources, vec!["Rayleigh scattering.".to_string()]);
    }
}
