use tracing::{debug, info, warn};

use crate::api::models::{DetectResponse, DetectedEvent};
use crate::dates::{DateFinder, DateMatch};
use crate::error::Result;
use crate::summarizer::{Summarizer, SummaryLength};

// Placeholders for a blank window. `context_window` always includes the
// match, so only direct callers of `describe_context` can see these.
pub const UNKNOWN_EVENT_NAME: &str = "Unknown Event";
pub const NO_DESCRIPTION: &str = "No description available";
pub const EVENT_NAME_ERROR: &str = "Error summarizing event name";
pub const DESCRIPTION_ERROR: &str = "Error summarizing description";

/// Returns the text within `radius` characters of the match on either side,
/// clipped to the input.
pub fn context_window<'a>(text: &'a str, m: &DateMatch, radius: usize) -> &'a str {
    let start = text[..m.start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(m.start, |(i, _)| i);
    let end = text[m.end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| m.end + i);
    &text[start..end]
}

/// Finds every date in `text` and names and describes each one from the
/// surrounding context. Summarizer failures are reported in place of the
/// summaries and never abort the request.
pub async fn detect_events(
    text: &str,
    finder: &DateFinder,
    summarizer: &dyn Summarizer,
    radius: usize,
) -> DetectResponse {
    let matches = finder.find_dates(text);
    if matches.is_empty() {
        info!("No dates found in {} chars of input", text.chars().count());
        return DetectResponse::no_dates();
    }
    info!("Found {} date(s)", matches.len());

    let mut events = Vec::with_capacity(matches.len());
    for m in &matches {
        let date = m.formatted();
        let context = context_window(text, m, radius);
        debug!(%date, context_chars = context.chars().count(), "Summarizing context");

        let (event_name, event_description) = describe_context(summarizer, context).await;

        events.push(DetectedEvent {
            date,
            event_name,
            event_description,
        });
    }

    DetectResponse::Events { events }
}

/// Produces the event name and description for one context window, falling
/// back to placeholder text when the window is blank or the model fails.
pub async fn describe_context(summarizer: &dyn Summarizer, context: &str) -> (String, String) {
    if context.trim().is_empty() {
        return (UNKNOWN_EVENT_NAME.to_string(), NO_DESCRIPTION.to_string());
    }
    match summarize_context(summarizer, context).await {
        Ok(summaries) => summaries,
        Err(e) => {
            warn!(error = %e, "Summarization failed");
            (EVENT_NAME_ERROR.to_string(), DESCRIPTION_ERROR.to_string())
        }
    }
}

async fn summarize_context(summarizer: &dyn Summarizer, context: &str) -> Result<(String, String)> {
    let name = summarizer.summarize(context, SummaryLength::EVENT_NAME).await?;
    let description = summarizer.summarize(context, SummaryLength::EVENT_DESCRIPTION).await?;
    Ok((name, description))
}
