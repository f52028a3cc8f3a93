//! Story generation pipeline.
//!
//! prompt -> outline request -> [`parse_outline`] -> one expansion request
//! per chapter (issued concurrently) -> single save.
//!
//! A run is all-or-nothing: the store is written exactly once, after every
//! chapter has expanded. Any failure before that point leaves the
//! previously persisted story untouched.

use crate::config::GenerationConfig;
use crate::error::{Result, StoryError};
use crate::expander::{ChapterExpander, ExpanderOptions};
use crate::llm::{CompletionModel, Prompts};
use crate::outline::parse_outline;
use crate::store::StoryStore;
use crate::story::{Chapter, OutlineStub, Story};
use futures::future::try_join_all;
use std::sync::Arc;

/// Options for a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Token limit for the outline request.
    pub outline_max_tokens: u32,
    /// Sampling temperature for the outline request.
    pub temperature: f32,
    /// Title given to generated stories.
    pub story_title: String,
    /// Settings for each chapter expansion.
    pub expander: ExpanderOptions,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GeneratorOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            outline_max_tokens: config.outline_max_tokens,
            temperature: config.temperature,
            story_title: config.story_title.clone(),
            expander: ExpanderOptions {
                max_tokens: config.chapter_max_tokens,
                temperature: config.temperature,
            },
        }
    }
}

/// Drives outline and chapter generation against a completion model.
pub struct StoryGenerator {
    model: Arc<dyn CompletionModel>,
    expander: ChapterExpander,
    options: GeneratorOptions,
}

impl StoryGenerator {
    /// Create a new generator with default options.
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self::with_options(model, GeneratorOptions::default())
    }

    /// Create with custom options.
    pub fn with_options(model: Arc<dyn CompletionModel>, options: GeneratorOptions) -> Self {
        let expander = ChapterExpander::with_options(model.clone(), options.expander.clone());
        Self {
            model,
            expander,
            options,
        }
    }

    /// Request an outline for `prompt` and parse it into chapter stubs.
    pub async fn generate_outline(&self, prompt: &str) -> Result<Vec<OutlineStub>> {
        if prompt.trim().is_empty() {
            return Err(StoryError::InvalidInput(
                "story prompt must not be empty".to_string(),
            ));
        }

        let raw = self
            .model
            .complete(
                Prompts::outline_system(),
                prompt,
                self.options.outline_max_tokens,
                self.options.temperature,
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "outline request failed"))?;

        let stubs = parse_outline(&raw)?;
        tracing::info!(chapters = stubs.len(), "outline generated");
        Ok(stubs)
    }

    /// Expand one chapter into prose.
    pub async fn expand_chapter(&self, title: &str, summary_or_prompt: &str) -> Result<String> {
        self.expander.expand(title, summary_or_prompt).await
    }

    /// Expand every stub concurrently, keeping outline order.
    ///
    /// Fails as a whole on the first failed expansion.
    pub async fn expand_outline(&self, stubs: &[OutlineStub]) -> Result<Vec<Chapter>> {
        let expansions = stubs.iter().map(|stub| async move {
            let content = self.expander.expand(&stub.title, &stub.content).await?;
            Ok::<_, StoryError>(Chapter::new(stub.title.clone(), content))
        });

        try_join_all(expansions).await
    }

    /// Run the full pipeline and persist the result.
    pub async fn generate_story(&self, prompt: &str, store: &StoryStore) -> Result<Story> {
        let stubs = self.generate_outline(prompt).await?;
        let chapters = self.expand_outline(&stubs).await?;

        let story = Story::new(self.options.story_title.clone(), chapters);
        store.save(&story)?;

        tracing::info!(
            title = %story.title,
            chapters = story.chapter_count(),
            "story generated and saved"
        );
        Ok(story)
    }

    /// Rewrite the stored chapter at `index` (0-based) and persist it.
    ///
    /// The chapter keeps its title. `prompt` steers the rewrite; without one
    /// the chapter's current content is used as the summary.
    pub async fn regenerate_chapter(
        &self,
        store: &StoryStore,
        index: usize,
        prompt: Option<&str>,
    ) -> Result<Chapter> {
        if !store.exists() {
            return Err(StoryError::NotFound("Story".to_string()));
        }

        let story = store.load()?;
        let current = story
            .chapter(index)
            .ok_or(StoryError::IndexOutOfRange {
                index,
                len: story.chapter_count(),
            })?;

        let guidance = prompt.unwrap_or(current.content.as_str());
        let content = self.expander.expand(&current.title, guidance).await?;
        let chapter = Chapter::new(current.title.clone(), content);

        store.update_chapter(index, chapter.clone())?;
        tracing::info!(chapter = index + 1, "chapter regenerated");
        Ok(chapter)
    }
}
