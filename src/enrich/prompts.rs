//! Prompt construction for the inference API

use crate::enrich::PromptKind;

/// Builds the prompt for one derivation over the article text
pub fn build_prompt(kind: PromptKind, article_text: &str, categories: &[String]) -> String {
    match kind {
        PromptKind::Location => location_prompt(article_text),
        PromptKind::Categories => categories_prompt(article_text, categories),
    }
}

fn location_prompt(article_text: &str) -> String {
    format!(
        "Extract the location from the following text. If the text contains a specific \
         location, such as an address, intersection, or named building, return only that \
         location. If the location is somewhat vague but still refers to a specific place \
         (e.g., \"a garage on campus\" or \"the fountain in the park\"), return that phrase \
         as it appears. If the text does not refer to a specific location but is instead a \
         general notice (e.g., about an entire city, a university, or general event updates), \
         return \"N/A\". Do not return anything other than the extracted location or \"N/A\".\n\n\
         Text:\n\"{}\"\n\n\
         Output format:\n\n\
         If a specific location exists, return it exactly as stated.\n\
         If a vague but meaningful location exists, return it exactly as stated.\n\
         If no specific location is mentioned, return \"N/A\".",
        article_text
    )
}

fn categories_prompt(article_text: &str, categories: &[String]) -> String {
    format!(
        "Read the following blog post content and determine which category or categories \
         best describe its content. Choose from the following list of categories: {}\n\n\
         Please assign at least one category but no more than three in total. If multiple \
         categories apply, select the ones that capture the most critical aspects of the \
         post.\n\n\
         blog post content:\n\"{}\"\n\n\
         Output format:\n\n\
         Return your answer as a comma-separated list of categories.",
        categories.join(", "),
        article_text
    )
}
