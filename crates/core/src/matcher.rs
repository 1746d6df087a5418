use crate::models::{Document, DocumentHit, Match};
use crate::snippet::build_snippets;
use crate::traits::DocumentMatcher;
use std::sync::atomic::{AtomicBool, Ordering};

const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Folds one character for comparison. A character whose lowercase form
/// expands to several characters folds to itself so that offsets in the
/// folded view stay aligned with the original text.
pub fn fold_char(c: char) -> char {
    let mut lowered = c.to_lowercase();
    match (lowered.next(), lowered.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Finds every whole-word, case-insensitive occurrence of `term` in `text`.
///
/// Offsets are character positions, ascending and non-overlapping. A blank
/// term has no occurrences.
pub fn find_matches(text: &str, term: &str) -> Vec<Match> {
    scan(text, term, None).unwrap_or_default()
}

/// Like [`find_matches`], but gives up with `None` once `cancelled` is set.
/// The flag is checked every few thousand characters.
pub fn find_matches_until(text: &str, term: &str, cancelled: &AtomicBool) -> Option<Vec<Match>> {
    scan(text, term, Some(cancelled))
}

pub fn count_matches(text: &str, term: &str) -> usize {
    find_matches(text, term).len()
}

fn scan(text: &str, term: &str, cancelled: Option<&AtomicBool>) -> Option<Vec<Match>> {
    let pattern = term.trim().chars().map(fold_char).collect::<Vec<_>>();
    if pattern.is_empty() {
        return Some(Vec::new());
    }

    let chars = text.chars().collect::<Vec<_>>();
    if chars.len() < pattern.len() {
        return Some(Vec::new());
    }

    let failure = failure_table(&pattern);
    let mut matches = Vec::new();
    let mut matched = 0usize;

    for (index, &original) in chars.iter().enumerate() {
        if index % CANCEL_CHECK_INTERVAL == 0
            && cancelled.is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return None;
        }

        let c = fold_char(original);

        while matched > 0 && pattern[matched] != c {
            matched = failure[matched - 1];
        }
        if pattern[matched] == c {
            matched += 1;
        }

        if matched == pattern.len() {
            let start = index + 1 - pattern.len();
            let end = index + 1;

            if is_word_bounded(&chars, start, end) {
                matches.push(Match { start, end });
                matched = 0;
            } else {
                matched = failure[matched - 1];
            }
        }
    }

    Some(matches)
}

/// Whole-word, case-insensitive matching with one snippet per occurrence.
#[derive(Debug, Default, Clone, Copy)]
pub struct WholeWordMatcher;

impl DocumentMatcher for WholeWordMatcher {
    fn search(
        &self,
        document: &Document,
        term: &str,
        snippet_radius: usize,
        cancelled: &AtomicBool,
    ) -> Option<DocumentHit> {
        let matches = find_matches_until(&document.text, term, cancelled)?;
        if matches.is_empty() || cancelled.load(Ordering::Relaxed) {
            return None;
        }

        let snippets = build_snippets(&document.text, &matches, snippet_radius)
            .into_iter()
            .map(|snippet| snippet.text)
            .collect::<Vec<_>>();

        Some(DocumentHit {
            document_id: document.id.clone(),
            kind: document.kind,
            modified_at: document.modified_at,
            count: snippets.len(),
            snippets,
        })
    }
}

fn is_word_bounded(chars: &[char], start: usize, end: usize) -> bool {
    let before = start == 0 || !is_word_char(chars[start - 1]);
    let after = end == chars.len() || !is_word_char(chars[end]);
    before && after
}

fn failure_table(pattern: &[char]) -> Vec<usize> {
    let mut table = vec![0usize; pattern.len()];
    let mut prefix = 0usize;

    for index in 1..pattern.len() {
        while prefix > 0 && pattern[index] != pattern[prefix] {
            prefix = table[prefix - 1];
        }
        if pattern[index] == pattern[prefix] {
            prefix += 1;
        }
        table[index] = prefix;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_only() {
        let matches = find_matches("category cat scatter", "cat");
        assert_eq!(matches, vec![Match { start: 9, end: 12 }]);
    }

    #[test]
    fn case_insensitive_both_ways() {
        let text = "Cat, CAT and cat; but not cats.";
        let upper = find_matches(text, "Cat");
        let lower = find_matches(text, "cat");
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 3);
    }

    #[test]
    fn blank_term_has_no_matches() {
        assert!(find_matches("anything at all", "").is_empty());
        assert!(find_matches("anything at all", "   \t").is_empty());
    }

    #[test]
    fn surrounding_whitespace_in_term_is_ignored() {
        assert_eq!(count_matches("the cat sat", "  cat "), 1);
    }

    #[test]
    fn offsets_are_character_positions() {
        let text = "Ação e inspeção: válvula";
        let matches = find_matches(text, "VÁLVULA");
        assert_eq!(matches, vec![Match { start: 17, end: 24 }]);
        let found = text
            .chars()
            .skip(matches[0].start)
            .take(matches[0].len())
            .collect::<String>();
        assert_eq!(found, "válvula");
    }

    #[test]
    fn digits_and_underscores_are_word_characters() {
        assert_eq!(count_matches("cat2 _cat cat_ 2cat", "cat"), 0);
        assert_eq!(count_matches("(cat) cat. -cat-", "cat"), 3);
    }

    #[test]
    fn adjacent_occurrences_do_not_overlap() {
        let matches = find_matches("aa aa aaa", "aa");
        assert_eq!(
            matches,
            vec![Match { start: 0, end: 2 }, Match { start: 3, end: 5 }]
        );
    }

    #[test]
    fn rejected_candidates_do_not_hide_later_matches() {
        let matches = find_matches("ababab abab", "abab");
        assert_eq!(matches, vec![Match { start: 7, end: 11 }]);
    }

    #[test]
    fn term_at_text_edges_matches() {
        let matches = find_matches("cat", "cat");
        assert_eq!(matches, vec![Match { start: 0, end: 3 }]);
        assert!(find_matches("ca", "cat").is_empty());
    }

    #[test]
    fn document_hit_has_one_snippet_per_match() {
        let document = Document {
            id: "S1.pdf".to_string(),
            source_path: std::path::PathBuf::from("S1.pdf"),
            kind: crate::models::DocumentKind::Pdf,
            text: "Pump one. Another PUMP. pumping is not a pump".to_string(),
            checksum: String::new(),
            modified_at: None,
            loaded_at: chrono::Utc::now(),
        };

        let running = AtomicBool::new(false);
        let hit = WholeWordMatcher
            .search(&document, "pump", 4, &running)
            .expect("document mentions the term");
        assert_eq!(hit.count, 3);
        assert_eq!(hit.snippets.len(), hit.count);
        assert_eq!(hit.snippets[0], "Pump one");
        assert_eq!(hit.snippets[1], "her PUMP. pu");

        assert!(WholeWordMatcher.search(&document, "valve", 4, &running).is_none());
        assert!(WholeWordMatcher
            .search(&document, "pump", 4, &AtomicBool::new(true))
            .is_none());
    }

    #[test]
    fn cancelled_scan_stops_early() {
        let text = "cat ".repeat(10_000);
        assert!(find_matches_until(&text, "cat", &AtomicBool::new(true)).is_none());

        let finished = find_matches_until(&text, "cat", &AtomicBool::new(false));
        assert_eq!(finished.map(|matches| matches.len()), Some(10_000));
    }

    #[test]
    fn failure_table_tracks_borders() {
        let pattern = "abacab".chars().collect::<Vec<_>>();
        assert_eq!(failure_table(&pattern), vec![0, 0, 1, 0, 1, 2]);
    }
}
