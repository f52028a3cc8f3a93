//! PDF export.
//!
//! Rendering happens in two steps so the ordering rules can be checked
//! without parsing PDF bytes:
//! 1. [`layout`] flows chapters into pages of positioned lines
//! 2. [`render_pdf`] draws those lines with `printpdf`
//!
//! Chapters do not start on a fresh page; text flows onto a new page only
//! when the current one is full. Each chapter opens with a
//! "Chapter {n}: {title}" heading followed by one paragraph block per
//! newline-separated segment of its content, empty segments included.

use crate::error::{Result, StoryError};
use crate::story::Story;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

const PT_TO_MM: f32 = 0.352_778;

/// Average glyph advance in ems. Bold capitals run far wider than body text.
const BODY_EM: f32 = 0.55;
const HEADING_EM: f32 = 0.7;

/// Page geometry and typography. All lengths in millimetres, sizes in points.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub line_spacing: f32,
    /// Gap after each paragraph, in points.
    pub paragraph_gap: f32,
    /// Gap before each chapter heading except the first, in points.
    pub chapter_gap: f32,
}

impl Default for PageLayout {
    /// A4 with 30pt-ish margins, Helvetica 18/12.
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
            heading_size: 18.0,
            body_size: 12.0,
            line_spacing: 1.5,
            paragraph_gap: 10.0,
            chapter_gap: 20.0,
        }
    }
}

impl PageLayout {
    fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing * PT_TO_MM
    }

    /// Rough characters-per-line at `size` for glyphs `em` wide on average.
    fn chars_per_line(&self, size: f32, em: f32) -> usize {
        let usable_pt = (self.width - 2.0 * self.margin) / PT_TO_MM;
        ((usable_pt / (size * em)) as usize).max(1)
    }
}

/// Which block of the story a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Heading of a 1-based chapter.
    Heading { chapter: usize },
    /// 0-based paragraph within a 1-based chapter.
    Paragraph { chapter: usize, paragraph: usize },
}

/// A single line of text at a fixed position on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub block: Block,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Lines for one page, top to bottom.
#[derive(Debug, Clone, Default)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

struct Cursor<'a> {
    layout: &'a PageLayout,
    pages: Vec<LaidOutPage>,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(layout: &'a PageLayout) -> Self {
        Self {
            layout,
            pages: vec![LaidOutPage::default()],
            y: layout.height - layout.margin,
        }
    }

    fn top(&self) -> f32 {
        self.layout.height - self.layout.margin
    }

    fn new_page(&mut self) {
        self.pages.push(LaidOutPage::default());
        self.y = self.top();
    }

    /// Vertical gap that is dropped at the top of a page.
    fn gap(&mut self, points: f32) {
        if self.y < self.top() {
            self.y -= points * PT_TO_MM;
        }
    }

    fn place(&mut self, block: Block, text: String, size: f32) {
        let height = self.layout.line_height(size);
        if self.y - height < self.layout.margin && self.y < self.top() {
            self.new_page();
        }
        self.y -= height;
        let line = PlacedLine {
            block,
            text,
            x: self.layout.margin,
            y: self.y,
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
    }
}

/// Flow a story into pages.
pub fn layout(story: &Story, layout: &PageLayout) -> Result<Vec<LaidOutPage>> {
    if story.is_empty() {
        tracing::error!("refusing to export an empty story as PDF");
        return Err(StoryError::EmptyStory);
    }

    let mut cursor = Cursor::new(layout);
    let heading_width = layout.chars_per_line(layout.heading_size, HEADING_EM);
    let body_width = layout.chars_per_line(layout.body_size, BODY_EM);

    for (number, chapter) in story.numbered_chapters() {
        cursor.gap(layout.chapter_gap);

        let heading = format!("Chapter {}: {}", number, chapter.title);
        for line in wrap(&heading, heading_width) {
            cursor.place(Block::Heading { chapter: number }, line, layout.heading_size);
        }
        cursor.gap(layout.paragraph_gap);

        for (paragraph, segment) in chapter.content.split('\n').enumerate() {
            let block = Block::Paragraph {
                chapter: number,
                paragraph,
            };
            for line in wrap(segment, body_width) {
                cursor.place(block, line, layout.body_size);
            }
            cursor.gap(layout.paragraph_gap);
        }
    }

    Ok(cursor.pages)
}

/// Greedy word wrap. Always yields at least one (possibly empty) line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Hard-split words that can never fit
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Render a story as PDF bytes.
pub fn render_pdf(story: &Story) -> Result<Vec<u8>> {
    render_pdf_with_layout(story, &PageLayout::default())
}

/// Render with explicit page geometry.
pub fn render_pdf_with_layout(story: &Story, page_layout: &PageLayout) -> Result<Vec<u8>> {
    let pages = layout(story, page_layout)?;

    let doc_title = if story.title.is_empty() {
        "Story"
    } else {
        story.title.as_str()
    };
    let (doc, first_page, first_layer) = PdfDocument::new(
        doc_title,
        Mm(page_layout.width),
        Mm(page_layout.height),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| StoryError::Export(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| StoryError::Export(e.to_string()))?;

    let mut targets = vec![(first_page, first_layer)];
    for _ in 1..pages.len() {
        targets.push(doc.add_page(Mm(page_layout.width), Mm(page_layout.height), "Layer 1"));
    }

    for (page, (page_index, layer_index)) in pages.iter().zip(targets) {
        let canvas = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            if line.text.is_empty() {
                continue;
            }
            let (font, size): (&IndirectFontRef, f32) = match line.block {
                Block::Heading { .. } => (&bold, page_layout.heading_size),
                Block::Paragraph { .. } => (&regular, page_layout.body_size),
            };
            canvas.use_text(line.text.as_str(), size, Mm(line.x), Mm(line.y), font);
        }
    }

    tracing::debug!(pages = pages.len(), chapters = story.chapter_count(), "PDF rendered");

    doc.save_to_bytes().map_err(|e| {
        tracing::error!(error = %e, "failed to write PDF");
        StoryError::Export(e.to_string())
    })
}
