//! Terminal formatting for files and search results.

use console::style;
use gfilesearch::files::FileState;
use gfilesearch::{Confidence, RemoteFileHandle, SearchResult};

/// Answers longer than this are cut in history listings.
const HISTORY_ANSWER_CHARS: usize = 200;

pub fn confidence_badge(confidence: Confidence) -> String {
    let label = confidence.as_str();
    match confidence {
        Confidence::High => style(label).green().bold().to_string(),
        Confidence::Medium => style(label).yellow().bold().to_string(),
        Confidence::Low => style(label).red().bold().to_string(),
        Confidence::Unknown => style(label).dim().to_string(),
    }
}

fn state_label(state: FileState) -> String {
    match state {
        FileState::Active => style(state).green().to_string(),
        FileState::Processing => style(state).yellow().to_string(),
        FileState::Failed => style(state).red().to_string(),
    }
}

/// `files/abc: notes.txt (11 bytes, ACTIVE)`
pub fn file_line(handle: &RemoteFileHandle) -> String {
    format!(
        "{}: {} ({} bytes, {})",
        handle.id,
        style(&handle.display_name).bold(),
        handle.size_bytes,
        state_label(handle.state)
    )
}

pub fn file_details(handle: &RemoteFileHandle) -> String {
    format!(
        "{}\n  name:     {}\n  uri:      {}\n  type:     {}\n  size:     {} bytes\n  state:    {}\n  uploaded: {}",
        style(&handle.display_name).bold(),
        handle.id,
        handle.uri,
        handle.mime_type,
        handle.size_bytes,
        state_label(handle.state),
        handle.uploaded_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Full result card: confidence, answer, excerpts, sources, time.
pub fn result_card(result: &SearchResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Confidence: {}\n\n",
        confidence_badge(result.confidence)
    ));
    out.push_str(&format!("{}\n{}\n", style("Answer").bold().underlined(), result.answer));

    if !result.snippets.is_empty() {
        out.push_str(&format!("\n{}\n", style("Relevant Excerpts").bold().underlined()));
        for snippet in &result.snippets {
            out.push_str(&format!("  > {}\n", snippet));
        }
    }
    if !result.sources.is_empty() {
        out.push_str(&format!("\n{}\n", style("Sources").bold().underlined()));
        for source in &result.sources {
            out.push_str(&format!("  - {}\n", source));
        }
    }
    out.push_str(&format!(
        "\n{}",
        style(format!(
            "Search performed at {}",
            result.timestamp.format("%Y-%m-%d %H:%M:%S")
        ))
        .dim()
    ));
    out
}

/// One-line history entry with a shortened answer.
pub fn history_line(result: &SearchResult) -> String {
    let answer: String = result.answer.chars().take(HISTORY_ANSWER_CHARS).collect();
    let ellipsis = if result.answer.chars().count() > HISTORY_ANSWER_CHARS {
        "..."
    } else {
        ""
    };
    let status = if result.is_error() {
        style("failed").red().bold().to_string()
    } else {
        confidence_badge(result.confidence)
    };
    format!(
        "[{}] {} ({})\n    {}{}",
        result.timestamp.format("%Y-%m-%d %H:%M:%S"),
        style(&result.query).bold(),
        status,
        answer.replace('\n', " "),
        ellipsis
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> SearchResult {
        SearchResult {
            query: "what does the file say?".into(),
            answer: "hi".into(),
            snippets: vec!["hello world".into()],
            sources: vec!["notes.txt".into()],
            confidence: Confidence::High,
            timestamp: Utc::now(),
            raw_response: String::new(),
            error: None,
        }
    }

    #[test]
    fn card_lists_every_section() {
        let card = console::strip_ansi_codes(&result_card(&sample())).to_string();
        assert!(card.starts_with("Confidence: High"));
        assert!(card.contains("Answer\nhi"));
        assert!(card.contains("  > hello world"));
        assert!(card.contains("  - notes.txt"));
        assert!(card.contains("Search performed at"));
    }

    #[test]
    fn card_omits_empty_sections() {
        let mut result = sample();
        result.snippets.clear();
        result.sources.clear();
        let card = console::strip_ansi_codes(&result_card(&result)).to_string();
        assert!(!card.contains("Relevant Excerpts"));
        assert!(!card.contains("Sources"));
    }

    #[test]
    fn history_line_truncates_long_answers() {
        let mut result = sample();
        result.answer = "x".repeat(500);
        let line = console::strip_ansi_codes(&history_line(&result)).to_string();
        assert!(line.ends_with(&format!("{}...", "x".repeat(HISTORY_ANSWER_CHARS))));
    }

    #[test]
    fn history_line_flags_failed_searches() {
        let failed = SearchResult::failed(
            "why?",
            "Error during search: quota".into(),
            Some("quota".into()),
        );
        let line = console::strip_ansi_codes(&history_line(&failed)).to_string();
        assert!(line.contains("why? (failed)"));

        let line = console::strip_ansi_codes(&history_line(&sample())).to_string();
        assert!(line.contains("(High)"));
    }

    #[test]
    fn file_line_shows_id_name_and_state() {
        let handle = RemoteFileHandle {
            id: "files/abc".into(),
            display_name: "notes.txt".into(),
            uri: "https://example.invalid/files/abc".into(),
            state: FileState::Active,
            size_bytes: 11,
            uploaded_at: Utc::now(),
            mime_type: "text/plain".into(),
        };
        let line = console::strip_ansi_codes(&file_line(&handle)).to_string();
        assert_eq!(line, "files/abc: notes.txt (11 bytes, ACTIVE)");
    }
}
