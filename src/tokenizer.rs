//! Single-pass document scanner
//!
//! Turns raw document text into an ordered stream of word appearances with
//! full positional metadata (paragraph, sentence, line, offsets). The scan is
//! driven by mutable running counters, so a tokenizer is single-use: build a
//! fresh one per document.

use crate::words::WORD;
use regex::Regex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::LazyLock;

/// Characters that terminate a sentence and delimit line fragments.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '?', '!'];

/// Leading metadata header lines, skipped until the first word is emitted.
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:Title|Author): ").expect("header pattern"));

/// One word occurrence as emitted by the scanner. The owning document is not
/// known at this point; the caller stitches the document id in at insert
/// time. All fields are 1-based except `line_offset`, which is a 0-based
/// character offset within the line (for highlighting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAppearance<'a> {
    pub word: &'a str,
    pub word_index: u32,
    pub paragraph: u32,
    pub line: u32,
    pub line_index: u32,
    pub line_offset: u32,
    pub sentence: u32,
    pub sentence_index: u32,
}

/// Running counters threaded through the whole scan.
struct ScanState {
    /// Next document-wide word index.
    word_index: u32,
    paragraph: u32,
    sentence: u32,
    /// Words counted in the current sentence so far.
    words_in_sentence: u32,
    /// Last line number that contained a valid word.
    last_word_line: Option<u32>,
    /// Current physical line number.
    line: u32,
}

impl ScanState {
    fn new() -> Self {
        Self {
            word_index: 1,
            paragraph: 0,
            sentence: 0,
            words_in_sentence: 0,
            last_word_line: None,
            line: 0,
        }
    }
}

/// Lazy word-appearance iterator over `text`.
pub struct Tokenizer<'a> {
    lines: std::str::Lines<'a>,
    state: ScanState,
    pending: VecDeque<RawAppearance<'a>>,
}

/// Scan `text` into an ordered stream of word appearances.
pub fn tokenize(text: &str) -> Tokenizer<'_> {
    Tokenizer {
        lines: text.lines(),
        state: ScanState::new(),
        pending: VecDeque::new(),
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = RawAppearance<'a>;

    fn next(&mut self) -> Option<RawAppearance<'a>> {
        loop {
            if let Some(appearance) = self.pending.pop_front() {
                return Some(appearance);
            }
            let line = self.lines.next()?;
            self.scan_line(line);
        }
    }
}

impl<'a> Tokenizer<'a> {
    fn scan_line(&mut self, line: &'a str) {
        let state = &mut self.state;
        state.line += 1;

        // Title/Author headers before the first word are metadata, not text.
        if state.last_word_line.is_none() && HEADER.is_match(line) {
            return;
        }

        // Character offset of the current fragment within the line. Advanced
        // by len + 1 for every fragment, empty or not, to account for the
        // consumed terminator.
        let mut fragment_offset: u32 = 0;
        let mut line_index: u32 = 0;
        let mut first_fragment = true;

        for fragment in line.split(&SENTENCE_TERMINATORS[..]) {
            if fragment.is_empty() {
                fragment_offset += 1;
                continue;
            }

            // Every retained fragment after the first opens a new sentence,
            // whether or not it turns out to contain any words.
            if !first_fragment {
                state.words_in_sentence = 0;
                state.sentence += 1;
            }
            first_fragment = false;

            let matches: Vec<regex::Match<'a>> = WORD.find_iter(fragment).collect();

            if !matches.is_empty() {
                let gap = state
                    .last_word_line
                    .map_or(true, |prev| prev < state.line - 1);

                if gap {
                    state.paragraph += 1;

                    // A paragraph break lands mid-sentence when the previous
                    // fragment never saw a terminator; it also opens the very
                    // first sentence of the document.
                    if state.words_in_sentence > 0 || state.sentence == 0 {
                        state.words_in_sentence = 0;
                        state.sentence += 1;
                    }
                }

                state.last_word_line = Some(state.line);

                let mut chars_before = 0u32;
                let mut scanned = 0usize;
                for m in matches {
                    chars_before += fragment[scanned..m.start()].chars().count() as u32;
                    scanned = m.start();

                    state.words_in_sentence += 1;
                    line_index += 1;

                    self.pending.push_back(RawAppearance {
                        word: m.as_str(),
                        word_index: state.word_index,
                        paragraph: state.paragraph,
                        line: state.line,
                        line_index,
                        line_offset: fragment_offset + chars_before,
                        sentence: state.sentence,
                        sentence_index: state.words_in_sentence,
                    });

                    state.word_index += 1;
                }
            }

            fragment_offset += fragment.chars().count() as u32 + 1;
        }
    }
}
