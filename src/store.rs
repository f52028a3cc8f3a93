//! File-backed storage for the current story.
//!
//! Exactly one story exists at a time. It is kept as pretty-printed JSON
//! at a single path and replaced wholesale on every save.
//!
//! There is no locking: two writers racing on the same file both succeed
//! and the later rename wins. Each individual save is atomic (temp file in
//! the same directory, then rename), so readers never see a torn record.

use crate::error::{Result, StoryError};
use crate::story::{Chapter, Story};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default filename for the story record.
pub const DEFAULT_STORY_FILENAME: &str = "story.json";

/// The single-record story store.
#[derive(Debug, Clone)]
pub struct StoryStore {
    path: PathBuf,
}

impl StoryStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store using the default filename inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_STORY_FILENAME))
    }

    /// Path of the story file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a story record has been persisted.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Durably replace the stored story.
    ///
    /// On failure the previous record, if any, is left as it was.
    pub fn save(&self, story: &Story) -> Result<()> {
        self.write_record(story)?;

        tracing::debug!(
            path = %self.path.display(),
            chapters = story.chapters.len(),
            "story saved"
        );
        Ok(())
    }

    /// Serialize `value` and atomically write it; any failure is a persistence error.
    fn write_record<T: Serialize>(&self, value: &T) -> Result<()> {
        serde_json::to_vec_pretty(value)
            .map_err(io::Error::other)
            .and_then(|data| self.write_atomic(&data))
            .map_err(|source| {
                tracing::error!(path = %self.path.display(), error = %source, "failed to save story");
                StoryError::persistence(&self.path, source)
            })
    }

    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Load the stored story, creating an empty one on first access.
    pub fn load(&self) -> Result<Story> {
        if !self.exists() {
            tracing::info!(path = %self.path.display(), "no story yet, creating an empty one");
            let story = Story::empty();
            self.save(&story)?;
            return Ok(story);
        }

        let data = fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "failed to read story");
            StoryError::persistence(&self.path, e)
        })?;

        serde_json::from_str(&data).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "story file is corrupt");
            StoryError::corruption(&self.path, e)
        })
    }

    /// Replace the chapter at `index` (0-based) and save.
    ///
    /// Indices past the end are rejected; the chapter list never grows here.
    pub fn update_chapter(&self, index: usize, chapter: Chapter) -> Result<Story> {
        if chapter.title.trim().is_empty() {
            return Err(StoryError::InvalidInput(
                "chapter title must not be empty".to_string(),
            ));
        }

        if !self.exists() {
            return Err(StoryError::NotFound("Story".to_string()));
        }

        let mut story = self.load()?;
        let len = story.chapters.len();
        let slot = story
            .chapters
            .get_mut(index)
            .ok_or(StoryError::IndexOutOfRange { index, len })?;
        *slot = chapter;

        self.save(&story)?;
        Ok(story)
    }

    /// Get the size of the story file in bytes.
    pub fn size(&self) -> Result<u64> {
        let metadata = fs::metadata(&self.path).map_err(|e| StoryError::persistence(&self.path, e))?;
        Ok(metadata.len())
    }
}
