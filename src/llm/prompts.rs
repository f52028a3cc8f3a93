//! Fixed instructions sent with outline and chapter requests.

/// Collection of prompts used for story generation.
pub struct Prompts;

impl Prompts {
    /// System instruction for the outline request.
    pub fn outline_system() -> &'static str {
        "You are a creative writing assistant. Generate a story outline based on the given prompt. \
The outline should consist of 4-5 chapters, each with a title and a brief summary. \
Start every chapter with a line of the form \"Chapter N: Title\" followed by its summary."
    }

    /// System instruction for chapter expansion.
    pub fn chapter_system() -> &'static str {
        "You are a creative writing assistant. Generate a detailed chapter based on the given title and summary."
    }

    /// User message for chapter expansion.
    pub fn chapter_request(title: &str, summary: &str) -> String {
        format!(
            "Write a detailed chapter for the following:\nTitle: {}\nSummary: {}",
            title, summary
        )
    }
}
