//! Outline parsing - turns free-form LLM text into chapter stubs.
//!
//! The model is asked for "Chapter N: Title" followed by a short summary.
//! Parsing is a tolerant delimiter split rather than a grammar:
//! 1. Split on every `Chapter <digits>:` marker
//! 2. Drop whatever precedes the first marker (model preamble)
//! 3. Drop fragments that are blank after trimming
//! 4. First non-blank line is the title, the remaining non-blank lines
//!    (trimmed, newline-joined) are the summary
//!
//! If no fragment survives, parsing fails with [`StoryError::Parse`].

use crate::error::{Result, StoryError};
use crate::story::OutlineStub;
use regex::Regex;
use std::sync::OnceLock;

/// Number of chapters the outline prompt asks for. Not enforced.
pub const EXPECTED_CHAPTERS: std::ops::RangeInclusive<usize> = 4..=5;

fn chapter_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"Chapter \d+:").expect("chapter marker regex is valid"))
}

/// Parse raw outline text into ordered chapter stubs.
pub fn parse_outline(raw_text: &str) -> Result<Vec<OutlineStub>> {
    let stubs: Vec<OutlineStub> = marked_fragments(raw_text)
        .filter_map(parse_fragment)
        .collect();

    if stubs.is_empty() {
        let preview: String = raw_text.chars().take(200).collect();
        tracing::error!(text = %preview, "outline contained no chapter markers");
        return Err(StoryError::Parse(if raw_text.trim().is_empty() {
            "outline text is empty".to_string()
        } else {
            format!("no \"Chapter N:\" markers found in: {}", preview)
        }));
    }

    if !EXPECTED_CHAPTERS.contains(&stubs.len()) {
        tracing::warn!(
            chapters = stubs.len(),
            "outline chapter count outside the requested range"
        );
    }

    Ok(stubs)
}

/// Fragments that follow a chapter marker, in source order.
fn marked_fragments(raw_text: &str) -> impl Iterator<Item = &str> {
    let marker = chapter_marker();
    let starts: Vec<usize> = marker.find_iter(raw_text).map(|m| m.end()).collect();
    let ends: Vec<usize> = marker
        .find_iter(raw_text)
        .skip(1)
        .map(|m| m.start())
        .chain(std::iter::once(raw_text.len()))
        .collect();

    starts
        .into_iter()
        .zip(ends)
        .map(move |(start, end)| &raw_text[start..end])
}

/// Title is the first non-blank line; the rest is the summary.
fn parse_fragment(fragment: &str) -> Option<OutlineStub> {
    let mut lines = fragment
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let title = lines.next()?;
    let content = lines.collect::<Vec<_>>().join("\n");

    Some(OutlineStub::new(title, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_outline() {
        let raw = "Chapter 1: The Lake\nA man rows out at dawn.\n\n\
                   Chapter 2: The Catch\nSomething pulls back.\nThe line snaps.\n\n\
                   Chapter 3: Home\nHe returns changed.";

        let stubs = parse_outline(raw).unwrap();
        assert_eq!(stubs.len(), 3);
        assert_eq!(stubs[0], OutlineStub::new("The Lake", "A man rows out at dawn."));
        assert_eq!(
            stubs[1],
            OutlineStub::new("The Catch", "Something pulls back.\nThe line snaps.")
        );
        assert_eq!(stubs[2].title, "Home");
    }

    #[test]
    fn test_preamble_is_dropped() {
        let raw = "Here is your outline:\n\nChapter 1: Start\nSummary one\nChapter 2: End\nSummary two";
        let stubs = parse_outline(raw).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].title, "Start");
        assert_eq!(stubs[1].content, "Summary two");
    }

    #[test]
    fn test_title_on_following_line() {
        let raw = "Chapter 1:\n\n  Arrival  \n  They land.  ";
        let stubs = parse_outline(raw).unwrap();
        assert_eq!(stubs, vec![OutlineStub::new("Arrival", "They land.")]);
    }

    #[test]
    fn test_blank_fragments_dropped() {
        let raw = "Chapter 1:   \n\nChapter 2: Real\nBody";
        let stubs = parse_outline(raw).unwrap();
        assert_eq!(stubs, vec![OutlineStub::new("Real", "Body")]);
    }

    #[test]
    fn test_title_without_summary() {
        let stubs = parse_outline("Chapter 10: Only a title").unwrap();
        assert_eq!(stubs, vec![OutlineStub::new("Only a title", "")]);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(parse_outline(""), Err(StoryError::Parse(_))));
        assert!(matches!(parse_outline("   \n\n"), Err(StoryError::Parse(_))));
    }

    #[test]
    fn test_no_markers_fails() {
        assert!(matches!(
            parse_outline("no markers here"),
            Err(StoryError::Parse(_))
        ));
        // Marker without a number or colon is not a marker
        assert!(parse_outline("Chapter One - The Start\nChapter 2 The End").is_err());
    }

    #[test]
    fn test_only_blank_marked_fragments_fails() {
        assert!(parse_outline("Chapter 1:\n\nChapter 2:   ").is_err());
    }

    #[test]
    fn test_order_follows_source_not_numbers() {
        let raw = "Chapter 2: Second\nb\nChapter 1: First\na";
        let titles: Vec<_> = parse_outline(raw)
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[test]
    fn test_n_markers_yield_n_stubs() {
        for n in 1..=8 {
            let raw: String = (1..=n)
                .map(|k| format!("Chapter {}: Title {}\nSummary {}\n\n", k, k, k))
                .collect();
            let stubs = parse_outline(&raw).unwrap();
            assert_eq!(stubs.len(), n);
            for (i, stub) in stubs.iter().enumerate() {
                assert_eq!(stub.title, format!("Title {}", i + 1));
                assert_eq!(stub.content, format!("Summary {}", i + 1));
            }
        }
    }
}
