use crate::models::{Match, Snippet};

pub const DEFAULT_SNIPPET_RADIUS: usize = 250;

/// Clipped `[start - radius, end + radius)` character window around a match.
pub fn snippet_window(text_chars: usize, found: &Match, radius: usize) -> (usize, usize) {
    let start = found.start.saturating_sub(radius);
    let end = found.end.saturating_add(radius).min(text_chars);
    (start.min(end), end)
}

pub fn build_snippet(text: &str, found: &Match, radius: usize) -> Snippet {
    let (window_start, window_end) = snippet_window(text.chars().count(), found, radius);
    let piece = text
        .chars()
        .skip(window_start)
        .take(window_end - window_start)
        .collect::<String>();

    Snippet {
        text: piece.trim().to_string(),
        window_start,
        window_end,
    }
}

/// Builds one snippet per match, in match order, with a single pass to map
/// character offsets onto byte offsets.
pub fn build_snippets(text: &str, matches: &[Match], radius: usize) -> Vec<Snippet> {
    if matches.is_empty() {
        return Vec::new();
    }

    let mut boundaries = text.char_indices().map(|(byte, _)| byte).collect::<Vec<_>>();
    let text_chars = boundaries.len();
    boundaries.push(text.len());

    matches
        .iter()
        .map(|found| {
            let (window_start, window_end) = snippet_window(text_chars, found, radius);
            let piece = &text[boundaries[window_start]..boundaries[window_end]];
            Snippet {
                text: piece.trim().to_string(),
                window_start,
                window_end,
            }
        })
        .collect()
}
