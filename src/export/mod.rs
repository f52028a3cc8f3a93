//! Export renderers.
//!
//! Each format reads the current story from a [`StoryStore`]. Exports never
//! bootstrap the store: with no persisted story they fail with
//! [`StoryError::NotFound`], and ZIP/PDF refuse a story without chapters.

mod archive;
mod markdown;
mod pdf;

pub use archive::{entry_name, render_zip};
pub use markdown::render_chapter;
pub use pdf::{layout, render_pdf, render_pdf_with_layout, Block, LaidOutPage, PageLayout, PlacedLine};

use crate::error::{Result, StoryError};
use crate::store::StoryStore;
use crate::story::Story;

/// Output formats supported by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// A single chapter as Markdown text.
    Markdown,
    /// All chapters as Markdown files in a ZIP archive.
    Zip,
    /// All chapters in one PDF document.
    Pdf,
}

impl ExportFormat {
    /// MIME type of the exported bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Zip => "application/zip",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Suggested download name. `chapter` is 1-based and only used for Markdown.
    pub fn default_file_name(&self, chapter: usize) -> String {
        match self {
            ExportFormat::Markdown => entry_name(chapter),
            ExportFormat::Zip => "story_chapters.zip".to_string(),
            ExportFormat::Pdf => "story.pdf".to_string(),
        }
    }
}

fn persisted_story(store: &StoryStore) -> Result<Story> {
    if !store.exists() {
        tracing::error!(path = %store.path().display(), "no story to export");
        return Err(StoryError::NotFound("Story".to_string()));
    }
    store.load()
}

/// Export the chapter at `index` (0-based) as Markdown.
pub fn export_chapter_markdown(store: &StoryStore, index: usize) -> Result<String> {
    let story = persisted_story(store)?;
    render_chapter(&story, index)
}

/// Export every chapter as a ZIP of Markdown files.
pub fn export_zip(store: &StoryStore) -> Result<Vec<u8>> {
    let story = persisted_story(store)?;
    render_zip(&story)
}

/// Export every chapter as one PDF document.
pub fn export_pdf(store: &StoryStore) -> Result<Vec<u8>> {
    let story = persisted_story(store)?;
    render_pdf(&story)
}
