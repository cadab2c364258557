//! Phrase location over indexed appearance streams
//!
//! A phrase matches where its word ids line up with a contiguous run of
//! appearances inside a single sentence. A phrase never spans a sentence
//! boundary, even when the word indices are adjacent across it.

use crate::records::{PhraseMatch, WordAppearance};

/// Find every position where `phrase` (ordered word ids) occurs in
/// `appearances` (one document's stream, ordered by `word_index`).
///
/// Left-to-right scan that resumes one position after each match start, so
/// overlapping matches are reported when the phrase's own ids repeat.
pub fn locate_phrase(phrase: &[i64], appearances: &[WordAppearance]) -> Vec<PhraseMatch> {
    let mut matches = Vec::new();

    if phrase.is_empty() || appearances.len() < phrase.len() {
        return matches;
    }

    for window in appearances.windows(phrase.len()) {
        let first = &window[0];
        let hit = window.iter().enumerate().all(|(offset, appearance)| {
            appearance.word_id == phrase[offset]
                && appearance.sentence == first.sentence
                && appearance.sentence_index == first.sentence_index + offset as u32
        });

        if hit {
            matches.push(PhraseMatch {
                sentence: first.sentence,
                start_index: first.sentence_index,
                end_index: first.sentence_index + phrase.len() as u32 - 1,
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appearance(word_id: i64, word_index: u32, sentence: u32, sentence_index: u32) -> WordAppearance {
        WordAppearance {
            document_id: 1,
            word_id,
            word_index,
            paragraph: 1,
            line: 1,
            line_index: word_index,
            line_offset: 0,
            sentence,
            sentence_index,
        }
    }

    #[test]
    fn test_single_match_in_sentence() {
        // the(1) quick(2) brown(3) fox(4)
        let stream = vec![
            appearance(1, 1, 1, 1),
            appearance(2, 2, 1, 2),
            appearance(3, 3, 1, 3),
            appearance(4, 4, 1, 4),
        ];
        let matches = locate_phrase(&[2, 3], &stream);
        assert_eq!(
            matches,
            [PhraseMatch { sentence: 1, start_index: 2, end_index: 3 }]
        );
    }

    #[test]
    fn test_no_match_across_sentence_boundary() {
        // Adjacent word indices, but the sentence changes between them.
        let stream = vec![
            appearance(1, 1, 1, 1),
            appearance(2, 2, 1, 2),
            appearance(3, 3, 2, 1),
            appearance(4, 4, 2, 2),
        ];
        assert!(locate_phrase(&[2, 3], &stream).is_empty());
    }

    #[test]
    fn test_overlapping_matches_with_repeated_ids() {
        // "a a a" searched for "a a" matches at 1-2 and 2-3.
        let stream = vec![
            appearance(7, 1, 1, 1),
            appearance(7, 2, 1, 2),
            appearance(7, 3, 1, 3),
        ];
        let matches = locate_phrase(&[7, 7], &stream);
        assert_eq!(
            matches,
            [
                PhraseMatch { sentence: 1, start_index: 1, end_index: 2 },
                PhraseMatch { sentence: 1, start_index: 2, end_index: 3 },
            ]
        );
    }

    #[test]
    fn test_multiple_sentences() {
        let stream = vec![
            appearance(5, 1, 1, 1),
            appearance(6, 2, 1, 2),
            appearance(5, 3, 2, 1),
            appearance(6, 4, 2, 2),
        ];
        let matches = locate_phrase(&[5, 6], &stream);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].sentence, 1);
        assert_eq!(matches[1].sentence, 2);
    }

    #[test]
    fn test_empty_phrase_matches_nothing() {
        let stream = vec![appearance(1, 1, 1, 1)];
        assert!(locate_phrase(&[], &stream).is_empty());
        assert!(locate_phrase(&[1, 2], &stream).is_empty());
    }
}
