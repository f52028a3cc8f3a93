//! Story Composer - turns a one-line story prompt into a multi-chapter story.
//!
//! # Overview
//!
//! The pipeline:
//! 1. Asks an LLM for a short outline ("Chapter N: Title" + summary)
//! 2. Parses the free text into ordered chapter stubs
//! 3. Expands every stub into prose with concurrent LLM calls
//! 4. Persists the story as a single JSON record
//! 5. Exports it on demand as Markdown, a ZIP of Markdown files, or PDF
//!
//! # Quick Start
//!
//! ```no_run
//! use story_composer::{
//!     config::Config,
//!     export::export_zip,
//!     generator::{GeneratorOptions, StoryGenerator},
//!     llm::LlmClient,
//!     store::StoryStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     // Create LLM client and generator
//!     let client = Arc::new(LlmClient::new(config.llm.clone())?);
//!     let generator =
//!         StoryGenerator::with_options(client, GeneratorOptions::from(&config.generation));
//!
//!     // Generate and persist a story
//!     let store = StoryStore::new(&config.store.path);
//!     let story = generator
//!         .generate_story("A short story about a man who goes fishing", &store)
//!         .await?;
//!     println!("{} chapters", story.chapters.len());
//!
//!     // Export all chapters
//!     std::fs::write("story_chapters.zip", export_zip(&store)?)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **LlmClient**: OpenAI-compatible client behind the `CompletionModel` trait
//! - **parse_outline**: Tolerant "Chapter N:" splitter
//! - **ChapterExpander**: One prose request per chapter
//! - **StoryStore**: File-backed single-story persistence
//! - **export**: Markdown, ZIP and PDF renderers
//! - **StoryGenerator**: The end-to-end pipeline

pub mod config;
pub mod error;
pub mod expander;
pub mod export;
pub mod generator;
pub mod llm;
pub mod logging;
pub mod outline;
pub mod store;
pub mod story;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, StoryError};
pub use expander::ChapterExpander;
pub use export::{export_chapter_markdown, export_pdf, export_zip, ExportFormat};
pub use generator::StoryGenerator;
pub use llm::{CompletionModel, LlmClient};
pub use outline::parse_outline;
pub use store::StoryStore;
pub use story::{Chapter, OutlineStub, Story};
