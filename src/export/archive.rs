//! ZIP export: one Markdown file per chapter.

use crate::error::{Result, StoryError};
use crate::story::Story;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive entry name for a 1-based chapter number.
pub fn entry_name(number: usize) -> String {
    format!("chapter_{}.md", number)
}

/// Build a ZIP archive with `chapter_{n}.md` entries in chapter order.
pub fn render_zip(story: &Story) -> Result<Vec<u8>> {
    if story.is_empty() {
        tracing::error!("refusing to export an empty story as ZIP");
        return Err(StoryError::EmptyStory);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (number, chapter) in story.numbered_chapters() {
        writer.start_file(entry_name(number), options)?;
        writer
            .write_all(chapter.to_markdown().as_bytes())
            .map_err(|e| StoryError::Export(e.to_string()))?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
