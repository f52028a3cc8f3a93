//! Chapter expansion - turns a title and summary into full prose.

use crate::error::Result;
use crate::llm::{CompletionModel, Prompts};
use std::sync::Arc;

/// Options for chapter expansion requests.
#[derive(Debug, Clone)]
pub struct ExpanderOptions {
    /// Token limit per chapter.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ExpanderOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

/// Expands chapter stubs into prose.
#[derive(Clone)]
pub struct ChapterExpander {
    model: Arc<dyn CompletionModel>,
    options: ExpanderOptions,
}

impl ChapterExpander {
    /// Create a new expander.
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            options: ExpanderOptions::default(),
        }
    }

    /// Create with custom options.
    pub fn with_options(model: Arc<dyn CompletionModel>, options: ExpanderOptions) -> Self {
        Self { model, options }
    }

    /// Generate prose for one chapter.
    ///
    /// The model's text is returned verbatim; failures propagate unchanged.
    pub async fn expand(&self, title: &str, summary_or_prompt: &str) -> Result<String> {
        let request = Prompts::chapter_request(title, summary_or_prompt);

        let prose = self
            .model
            .complete(
                Prompts::chapter_system(),
                &request,
                self.options.max_tokens,
                self.options.temperature,
            )
            .await
            .inspect_err(|e| tracing::error!(chapter = title, error = %e, "chapter expansion failed"))?;

        tracing::debug!(chapter = title, chars = prose.len(), "chapter expanded");
        Ok(prose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply.
    struct EchoModel {
        reply: std::result::Result<String, u16>,
        seen: Mutex<Vec<(String, String, u32, f32)>>,
    }

    #[async_trait]
    impl CompletionModel for EchoModel {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            max_tokens: u32,
            temperature: f32,
        ) -> Result<String> {
            self.seen.lock().unwrap().push((
                system.to_string(),
                user.to_string(),
                max_tokens,
                temperature,
            ));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(StoryError::Transport {
                    status: *status,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_expand_returns_text_verbatim() {
        let model = Arc::new(EchoModel {
            reply: Ok("  It was a dark night.\n\n".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let expander = ChapterExpander::new(model.clone());

        let prose = tokio_test::block_on(expander.expand("Night", "It gets dark")).unwrap();
        assert_eq!(prose, "  It was a dark night.\n\n");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (system, user, max_tokens, temperature) = &seen[0];
        assert_eq!(system, Prompts::chapter_system());
        assert!(user.contains("Title: Night"));
        assert!(user.contains("Summary: It gets dark"));
        assert_eq!(*max_tokens, 2000);
        assert_eq!(*temperature, 0.7);
    }

    #[test]
    fn test_expand_uses_options() {
        let model = Arc::new(EchoModel {
            reply: Ok("prose".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let expander = ChapterExpander::with_options(
            model.clone(),
            ExpanderOptions {
                max_tokens: 321,
                temperature: 0.1,
            },
        );

        tokio_test::block_on(expander.expand("T", "S")).unwrap();
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].2, 321);
        assert_eq!(seen[0].3, 0.1);
    }

    #[test]
    fn test_expand_propagates_failure() {
        let model = Arc::new(EchoModel {
            reply: Err(503),
            seen: Mutex::new(Vec::new()),
        });
        let expander = ChapterExpander::new(model);

        let err = tokio_test::block_on(expander.expand("T", "S")).unwrap_err();
        assert!(matches!(err, StoryError::Transport { status: 503, .. }));
    }
}
