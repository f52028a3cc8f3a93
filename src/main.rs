//! Story Composer CLI
//!
//! Generate, edit and export an LLM-written story from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use story_composer::{
    config::Config,
    export::{export_chapter_markdown, export_pdf, export_zip, ExportFormat},
    generator::{GeneratorOptions, StoryGenerator},
    llm::LlmClient,
    logging,
    store::StoryStore,
    story::{Chapter, Story},
};

const PREVIEW_CHARS: usize = 150;

/// Story Composer - turn a prompt into a multi-chapter story
#[derive(Parser)]
#[command(name = "story-composer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the story file (overrides config)
    #[arg(short, long, global = true)]
    story: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a full story from a prompt and save it
    Generate {
        /// Story idea, e.g. "a man who goes fishing"
        prompt: String,
    },

    /// Generate only the chapter outline
    Outline {
        /// Story idea
        prompt: String,

        /// Save the outline as the current story (chapters keep their summaries)
        #[arg(long)]
        save: bool,
    },

    /// Show the current story
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite one chapter with the LLM
    Expand {
        /// Chapter number (1-based)
        chapter: usize,

        /// Guidance for the rewrite (defaults to the chapter's current text)
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Replace a chapter's title and/or content
    Edit {
        /// Chapter number (1-based)
        chapter: usize,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// File containing the new content
        #[arg(short, long)]
        content_file: Option<PathBuf>,
    },

    /// Export the story
    Export {
        #[command(subcommand)]
        format: ExportCommand,
    },

    /// Test LLM connection
    Test,
}

#[derive(Subcommand)]
enum ExportCommand {
    /// One chapter as Markdown
    Markdown {
        /// Chapter number (1-based)
        chapter: usize,

        /// Output path (defaults to chapter_<n>.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// All chapters as a ZIP of Markdown files
    Zip {
        /// Output path (defaults to story_chapters.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// All chapters as a PDF
    Pdf {
        /// Output path (defaults to story.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(path) = cli.story {
        config.store.path = path;
    }
    let store = StoryStore::new(&config.store.path);

    match cli.command {
        Commands::Generate { prompt } => cmd_generate(&config, &store, &prompt).await,
        Commands::Outline { prompt, save } => cmd_outline(&config, &store, &prompt, save).await,
        Commands::Show { json } => cmd_show(&store, json),
        Commands::Expand { chapter, prompt } => {
            cmd_expand(&config, &store, chapter, prompt.as_deref()).await
        }
        Commands::Edit {
            chapter,
            title,
            content_file,
        } => cmd_edit(&store, chapter, title, content_file),
        Commands::Export { format } => cmd_export(&store, format),
        Commands::Test => cmd_test(&config).await,
    }
}

fn llm_client(config: &Config) -> Result<LlmClient> {
    config.validate().context("Invalid configuration")?;
    LlmClient::new(config.llm.clone()).context("Failed to create LLM client")
}

fn generator_for(config: &Config, client: LlmClient) -> StoryGenerator {
    StoryGenerator::with_options(Arc::new(client), GeneratorOptions::from(&config.generation))
}

fn generator(config: &Config) -> Result<StoryGenerator> {
    Ok(generator_for(config, llm_client(config)?))
}

/// Convert a 1-based CLI chapter number to an index.
fn chapter_index(chapter: usize) -> Result<usize> {
    chapter
        .checked_sub(1)
        .context("Chapter numbers start at 1")
}

async fn cmd_generate(config: &Config, store: &StoryStore, prompt: &str) -> Result<()> {
    let client = llm_client(config)?;

    println!("Generating story...");
    println!("Using model: {}", client.model());
    let generator = generator_for(config, client);

    let start = Instant::now();
    let story = generator
        .generate_story(prompt, store)
        .await
        .context("Story generation failed")?;

    println!();
    print_story_summary(&story);
    println!();
    println!(
        "Generated {} chapters in {:.2?}",
        story.chapter_count(),
        start.elapsed()
    );
    println!("Saved to: {}", store.path().display());

    Ok(())
}

async fn cmd_outline(config: &Config, store: &StoryStore, prompt: &str, save: bool) -> Result<()> {
    let generator = generator(config)?;

    let stubs = generator
        .generate_outline(prompt)
        .await
        .context("Outline generation failed")?;

    for (i, stub) in stubs.iter().enumerate() {
        println!("Chapter {}: {}", i + 1, stub.title);
        for line in stub.content.lines() {
            println!("    {}", line);
        }
        println!();
    }

    if save {
        let chapters: Vec<Chapter> = stubs.into_iter().map(|s| s.into_chapter()).collect();
        store
            .save(&Story::new(config.generation.story_title.clone(), chapters))
            .context("Failed to save outline")?;
        println!("Outline saved to: {}", store.path().display());
    }

    Ok(())
}

fn cmd_show(store: &StoryStore, json: bool) -> Result<()> {
    let story = store.load().context("Failed to load story")?;

    if json {
        let json_str = serde_json::to_string_pretty(&story).context("Failed to serialize story")?;
        println!("{}", json_str);
        return Ok(());
    }

    if story.is_empty() {
        println!("No story yet. Run 'generate' to create one.");
        return Ok(());
    }

    print_story_summary(&story);
    let size = store.size().context("Failed to read story file size")?;
    println!(
        "{} chapters, {:.1} KB at {}",
        story.chapter_count(),
        size as f64 / 1024.0,
        store.path().display()
    );
    Ok(())
}

fn print_story_summary(story: &Story) {
    if !story.title.is_empty() {
        println!("{}", story.title);
        println!("{}", "─".repeat(60));
    }
    for (number, chapter) in story.numbered_chapters() {
        println!("Chapter {}: {}", number, chapter.title);
        if chapter.is_expanded() {
            println!("    {}", chapter.preview(PREVIEW_CHARS).replace('\n', " "));
        } else {
            println!("    (no content yet)");
        }
        println!();
    }
}

async fn cmd_expand(
    config: &Config,
    store: &StoryStore,
    chapter: usize,
    prompt: Option<&str>,
) -> Result<()> {
    let index = chapter_index(chapter)?;
    let generator = generator(config)?;

    println!("Rewriting chapter {}...", chapter);
    let updated = generator
        .regenerate_chapter(store, index, prompt)
        .await
        .context("Chapter generation failed")?;

    println!("Chapter {}: {}", chapter, updated.title);
    println!("    {}", updated.preview(PREVIEW_CHARS).replace('\n', " "));
    Ok(())
}

fn cmd_edit(
    store: &StoryStore,
    chapter: usize,
    title: Option<String>,
    content_file: Option<PathBuf>,
) -> Result<()> {
    let index = chapter_index(chapter)?;

    if title.is_none() && content_file.is_none() {
        anyhow::bail!("Nothing to change: pass --title and/or --content-file");
    }

    if !store.exists() {
        anyhow::bail!("No story yet. Run 'generate' first.");
    }

    let story = store.load().context("Failed to load story")?;
    let current = story
        .chapter(index)
        .with_context(|| format!("Chapter {} not found", chapter))?;

    let content = match content_file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        None => current.content.clone(),
    };
    let updated = Chapter::new(title.unwrap_or_else(|| current.title.clone()), content);

    store
        .update_chapter(index, updated)
        .context("Failed to update chapter")?;
    println!("Chapter {} updated.", chapter);
    Ok(())
}

fn cmd_export(store: &StoryStore, format: ExportCommand) -> Result<()> {
    let (kind, bytes, output) = match format {
        ExportCommand::Markdown { chapter, output } => {
            let index = chapter_index(chapter)?;
            let markdown =
                export_chapter_markdown(store, index).context("Markdown export failed")?;
            let output =
                output.unwrap_or_else(|| ExportFormat::Markdown.default_file_name(chapter).into());
            (ExportFormat::Markdown, markdown.into_bytes(), output)
        }
        ExportCommand::Zip { output } => {
            let bytes = export_zip(store).context("ZIP export failed")?;
            let output = output.unwrap_or_else(|| ExportFormat::Zip.default_file_name(0).into());
            (ExportFormat::Zip, bytes, output)
        }
        ExportCommand::Pdf { output } => {
            let bytes = export_pdf(store).context("PDF export failed")?;
            let output = output.unwrap_or_else(|| ExportFormat::Pdf.default_file_name(0).into());
            (ExportFormat::Pdf, bytes, output)
        }
    };

    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    println!(
        "Wrote {} ({}, {:.1} KB)",
        output.display(),
        kind.mime_type(),
        bytes.len() as f64 / 1024.0
    );
    Ok(())
}

async fn cmd_test(config: &Config) -> Result<()> {
    println!("Testing LLM connection...\n");

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm.clone())?;

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
