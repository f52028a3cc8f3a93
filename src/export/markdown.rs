//! Single-chapter Markdown export.

use crate::error::{Result, StoryError};
use crate::story::Story;

/// Render the chapter at `index` (0-based) as `# {title}\n\n{content}`.
pub fn render_chapter(story: &Story, index: usize) -> Result<String> {
    story
        .chapter(index)
        .map(|chapter| chapter.to_markdown())
        .ok_or_else(|| {
            tracing::error!(index, chapters = story.chapter_count(), "chapter not found");
            StoryError::NotFound(format!("Chapter {}", index + 1))
        })
}
