//! Prompt construction.
//!
//! One system instruction plus one user message that embeds the site
//! identifier, the (already budgeted) site data and the question.

use sitesage_core::{Message, PageMap, Question};

/// Instruction restricting the model to the supplied site data.
pub const SYSTEM_INSTRUCTION: &str = "You are an AI assistant that answers questions using only the \
information provided from a crawled website. Answer as accurately as possible based solely on the \
content of the website data, without including any outside information. If the question cannot be \
answered from the provided data, say so clearly.";

/// The site data exactly as it is embedded in the prompt: a compact JSON object.
///
/// Its character count is what [`crate::budget::serialized_size`] measures.
pub fn render_site_data(pages: &PageMap) -> String {
    // A map of strings always serializes.
    serde_json::to_string(pages).unwrap_or_else(|_| String::from("{}"))
}

/// The user message for a question about `site`.
pub fn user_prompt(site: &str, site_data: &str, question: &Question) -> String {
    format!(
        "I have the following site data available, which is about the website '{site}'. \
         Please read through the data and answer the following question.\n\n\
         Website data:\n\n{site_data}\n\n\
         Question: {question}\n\
         Provide a clear and concise answer based on the information above."
    )
}

/// Build the full message list sent to the provider.
pub fn build_messages(site: &str, pages: &PageMap, question: &Question) -> Vec<Message> {
    let site_data = render_site_data(pages);
    vec![
        Message::system(SYSTEM_INSTRUCTION),
        Message::user(user_prompt(site, &site_data, question)),
    ]
}
