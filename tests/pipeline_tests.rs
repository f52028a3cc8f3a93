//! End-to-end pipeline tests against a scripted completion model.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use story_composer::{
    export::{export_chapter_markdown, export_pdf, export_zip},
    generator::StoryGenerator,
    llm::{CompletionModel, Prompts},
    store::StoryStore,
    story::{Chapter, Story},
    Result, StoryError,
};
use tempfile::TempDir;

const OUTLINE: &str = "Here is the outline you asked for.\n\n\
Chapter 1: The Lake\nA man rows out at dawn.\n\n\
Chapter 2: The Catch\nSomething pulls back.\n\n\
Chapter 3: The Storm\nThe sky turns.\n\n\
Chapter 4: Home\nHe returns changed.\n";

/// Answers the outline request from a queue and chapter requests per title.
struct ScriptedModel {
    outlines: Mutex<VecDeque<Result<String>>>,
    /// Chapter titles whose expansion fails.
    failing: Vec<String>,
    /// Per-title delay, to shuffle completion order.
    delays: Vec<(String, u64)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(outline: &str) -> Self {
        Self {
            outlines: Mutex::new(VecDeque::from([Ok(outline.to_string())])),
            failing: Vec::new(),
            delays: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, title: &str) -> Self {
        self.failing.push(title.to_string());
        self
    }

    fn with_delay(mut self, title: &str, millis: u64) -> Self {
        self.delays.push((title.to_string(), millis));
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn title_of(user: &str) -> String {
    user.lines()
        .find_map(|l| l.strip_prefix("Title: "))
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(user.to_string());

        if system == Prompts::outline_system() {
            return self
                .outlines
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(StoryError::EmptyCompletion));
        }

        let title = title_of(user);
        if let Some((_, millis)) = self.delays.iter().find(|(t, _)| *t == title) {
            tokio::time::sleep(Duration::from_millis(*millis)).await;
        }
        if self.failing.contains(&title) {
            return Err(StoryError::Transport {
                status: 500,
                body: "server error".to_string(),
            });
        }
        Ok(format!("Prose for {}.\nSecond paragraph.", title))
    }
}

fn generator(model: &Arc<ScriptedModel>) -> StoryGenerator {
    StoryGenerator::new(model.clone())
}

#[tokio::test]
async fn test_generate_story_persists_all_chapters_in_order() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    let model = Arc::new(ScriptedModel::new(OUTLINE));

    let story = generator(&model)
        .generate_story("a man who goes fishing", &store)
        .await
        .unwrap();

    assert_eq!(story.title, "My Story");
    let titles: Vec<_> = story.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["The Lake", "The Catch", "The Storm", "Home"]);
    assert_eq!(
        story.chapters[1].content,
        "Prose for The Catch.\nSecond paragraph."
    );

    // One outline request plus one per chapter
    assert_eq!(model.call_count(), 5);
    assert_eq!(store.load().unwrap(), story);
}

#[tokio::test]
async fn test_expansion_order_restored_by_index() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    // Earlier chapters finish last
    let model = Arc::new(
        ScriptedModel::new(OUTLINE)
            .with_delay("The Lake", 60)
            .with_delay("The Catch", 40)
            .with_delay("The Storm", 20),
    );

    let story = generator(&model)
        .generate_story("fishing", &store)
        .await
        .unwrap();

    let titles: Vec<_> = story.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["The Lake", "The Catch", "The Storm", "Home"]);
    for chapter in &story.chapters {
        assert!(chapter.content.starts_with(&format!("Prose for {}.", chapter.title)));
    }
}

#[tokio::test]
async fn test_failed_expansion_leaves_previous_story() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    let previous = Story::new("Old", vec![Chapter::new("Kept", "untouched")]);
    store.save(&previous).unwrap();

    let model = Arc::new(ScriptedModel::new(OUTLINE).failing_on("The Storm"));
    let err = generator(&model)
        .generate_story("fishing", &store)
        .await
        .unwrap_err();

    assert!(matches!(err, StoryError::Transport { status: 500, .. }));
    assert_eq!(store.load().unwrap(), previous);
}

#[tokio::test]
async fn test_failed_expansion_without_previous_story_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());

    let model = Arc::new(ScriptedModel::new(OUTLINE).failing_on("The Lake"));
    assert!(generator(&model)
        .generate_story("fishing", &store)
        .await
        .is_err());
    assert!(!store.exists());
}

#[tokio::test]
async fn test_unparseable_outline_fails_without_expansion() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    let model = Arc::new(ScriptedModel::new("I'd rather write a poem."));

    let err = generator(&model)
        .generate_story("fishing", &store)
        .await
        .unwrap_err();

    assert!(matches!(err, StoryError::Parse(_)));
    assert_eq!(model.call_count(), 1);
    assert!(!store.exists());
}

#[tokio::test]
async fn test_outline_request_failure_propagates() {
    let model = Arc::new(ScriptedModel::new(OUTLINE));
    model.outlines.lock().unwrap().clear();
    model
        .outlines
        .lock()
        .unwrap()
        .push_back(Err(StoryError::Transport {
            status: 429,
            body: "rate limited".to_string(),
        }));

    let err = generator(&model).generate_outline("fishing").await.unwrap_err();
    assert!(matches!(err, StoryError::Transport { status: 429, .. }));
}

#[tokio::test]
async fn test_blank_prompt_rejected_before_request() {
    let model = Arc::new(ScriptedModel::new(OUTLINE));
    let err = generator(&model).generate_outline("   ").await.unwrap_err();

    assert!(matches!(err, StoryError::InvalidInput(_)));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_generate_outline_returns_stubs() {
    let model = Arc::new(ScriptedModel::new(OUTLINE));
    let stubs = generator(&model).generate_outline("fishing").await.unwrap();

    assert_eq!(stubs.len(), 4);
    assert_eq!(stubs[0].title, "The Lake");
    assert_eq!(stubs[0].content, "A man rows out at dawn.");
}

#[tokio::test]
async fn test_expand_chapter_embeds_title_and_summary() {
    let model = Arc::new(ScriptedModel::new(OUTLINE));
    let prose = generator(&model)
        .expand_chapter("Night", "It gets dark")
        .await
        .unwrap();

    assert_eq!(prose, "Prose for Night.\nSecond paragraph.");
    let calls = model.calls.lock().unwrap();
    assert!(calls[0].contains("Summary: It gets dark"));
}

#[tokio::test]
async fn test_regenerate_chapter_updates_only_that_chapter() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    let original = Story::new(
        "S",
        vec![
            Chapter::new("First", "one"),
            Chapter::new("Second", "two"),
            Chapter::new("Third", "three"),
        ],
    );
    store.save(&original).unwrap();

    let model = Arc::new(ScriptedModel::new(OUTLINE));
    let updated = generator(&model)
        .regenerate_chapter(&store, 1, Some("make it darker"))
        .await
        .unwrap();

    assert_eq!(updated.title, "Second");
    assert_eq!(updated.content, "Prose for Second.\nSecond paragraph.");
    assert!(model.calls.lock().unwrap()[0].contains("Summary: make it darker"));

    let loaded = store.load().unwrap();
    assert_eq!(loaded.chapters[1], updated);
    assert_eq!(loaded.chapters[0], original.chapters[0]);
    assert_eq!(loaded.chapters[2], original.chapters[2]);
}

#[tokio::test]
async fn test_regenerate_chapter_defaults_to_current_content() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    store
        .save(&Story::new("S", vec![Chapter::new("Only", "a short summary")]))
        .unwrap();

    let model = Arc::new(ScriptedModel::new(OUTLINE));
    generator(&model)
        .regenerate_chapter(&store, 0, None)
        .await
        .unwrap();

    assert!(model.calls.lock().unwrap()[0].contains("Summary: a short summary"));
}

#[tokio::test]
async fn test_regenerate_chapter_errors() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    let model = Arc::new(ScriptedModel::new(OUTLINE));
    let generator = generator(&model);

    assert!(matches!(
        generator.regenerate_chapter(&store, 0, None).await,
        Err(StoryError::NotFound(_))
    ));

    store
        .save(&Story::new("S", vec![Chapter::new("Only", "x")]))
        .unwrap();
    assert!(matches!(
        generator.regenerate_chapter(&store, 1, None).await,
        Err(StoryError::IndexOutOfRange { index: 1, len: 1 })
    ));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_generated_story_exports() {
    let dir = TempDir::new().unwrap();
    let store = StoryStore::in_dir(dir.path());
    let model = Arc::new(ScriptedModel::new(OUTLINE));
    generator(&model)
        .generate_story("fishing", &store)
        .await
        .unwrap();

    let markdown = export_chapter_markdown(&store, 3).unwrap();
    assert_eq!(markdown, "# Home\n\nProse for Home.\nSecond paragraph.");

    let zip_bytes = export_zip(&store).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(zip_bytes)).unwrap();
    assert_eq!(archive.len(), 4);
    let mut first = String::new();
    archive
        .by_name("chapter_1.md")
        .unwrap()
        .read_to_string(&mut first)
        .unwrap();
    assert_eq!(first, "# The Lake\n\nProse for The Lake.\nSecond paragraph.");

    let pdf = export_pdf(&store).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
