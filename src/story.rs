//! Story data model.
//!
//! A story is a title plus an ordered list of chapters. Chapters have no
//! identity beyond their position: index 0 is "Chapter 1" everywhere it
//! is displayed or exported.

use serde::{Deserialize, Serialize};

/// A single chapter of the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title (non-empty after trim).
    pub title: String,
    /// Chapter prose. Empty for a freshly created, unexpanded chapter.
    pub content: String,
}

impl Chapter {
    /// Create a new chapter.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Whether the chapter has any prose yet.
    pub fn is_expanded(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Render as a standalone Markdown document.
    pub fn to_markdown(&self) -> String {
        format!("# {}\n\n{}", self.title, self.content)
    }

    /// Short preview of the content for list views.
    ///
    /// Truncates on a character boundary and appends "..." when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// The single persisted story document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub chapters: Vec<Chapter>,
}

impl Story {
    /// Create a story with the given chapters.
    pub fn new(title: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        Self {
            title: title.into(),
            chapters,
        }
    }

    /// The bootstrap value: no title, no chapters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the story has no chapters.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Number of chapters.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Get a chapter by 0-based index.
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Iterate chapters with their 1-based display numbers.
    pub fn numbered_chapters(&self) -> impl Iterator<Item = (usize, &Chapter)> {
        self.chapters.iter().enumerate().map(|(i, c)| (i + 1, c))
    }
}

/// A not-yet-expanded chapter whose `content` holds the outline summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineStub {
    pub title: String,
    pub content: String,
}

impl OutlineStub {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Keep the stub as a chapter whose content is still the summary.
    pub fn into_chapter(self) -> Chapter {
        Chapter::new(self.title, self.content)
    }
}
