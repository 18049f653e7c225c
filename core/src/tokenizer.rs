use crate::config::Normalizer;
use crate::lemma::{Lemmatizer, NounLemmatizer, StemmingLemmatizer};
use crate::stopwords::is_stopword;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref ASCII_WORD: Regex = Regex::new(r"^[a-zA-Z]+$").expect("valid regex");
    static ref DEFAULT: Tokenizer = Tokenizer::default();
}

// Fixed contractions split into two words, with the byte length of the first part.
const FIXED_CONTRACTIONS: &[(&str, usize)] = &[
    ("cannot", 3), ("gimme", 3), ("gonna", 3), ("gotta", 3), ("lemme", 3), ("wanna", 3),
];

const CLITICS: &[&str] = &["s", "m", "d", "ll", "re", "ve"];

/// Text normalizer shared by indexing and querying. Holds no mutable state.
#[derive(Clone)]
pub struct Tokenizer {
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl Default for Tokenizer {
    fn default() -> Self { Self::new(Arc::new(NounLemmatizer::new())) }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").field("lemmatizer", &self.lemmatizer.name()).finish()
    }
}

impl Tokenizer {
    pub fn new(lemmatizer: Arc<dyn Lemmatizer>) -> Self { Self { lemmatizer } }

    pub fn for_normalizer(normalizer: Normalizer) -> Self {
        match normalizer {
            Normalizer::Lemma => Self::default(),
            Normalizer::Stem => Self::new(Arc::new(StemmingLemmatizer::new())),
        }
    }

    /// Lowercase and segment `text`. Filtering and lemmatization happen lazily in [`Tokens::iter`].
    pub fn tokenize(&self, text: &str) -> Tokens {
        let buffer = text.to_lowercase();
        let spans = segment(&buffer);
        Tokens { buffer, spans, lemmatizer: Arc::clone(&self.lemmatizer) }
    }
}

/// Segmented text. Iterating is cheap and can be repeated.
pub struct Tokens {
    buffer: String,
    spans: Vec<(usize, usize)>,
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl Tokens {
    /// Normalized terms in text order.
    pub fn iter(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.spans
            .iter()
            .map(move |&(s, e)| &self.buffer[s..e])
            .filter(|w| is_alphabetic(w))
            .filter(|w| ASCII_WORD.is_match(w))
            .filter(|w| !is_stopword(w))
            .map(move |w| self.lemmatizer.lemmatize(w))
    }

    /// Raw word segments before filtering, mostly useful for debugging.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(move |&(s, e)| &self.buffer[s..e])
    }

    pub fn into_vec(self) -> Vec<String> {
        self.iter().map(Cow::into_owned).collect()
    }
}

fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

fn is_word(seg: &str) -> bool { seg.chars().any(char::is_alphanumeric) }

fn is_connector(seg: &str) -> bool { seg == "-" || seg == "/" }

// Curly single quotes are quote marks, not apostrophes: they become tokens of their own.
fn is_curly_quote(c: char) -> bool { c == '\u{2018}' || c == '\u{2019}' }

/// Unicode word segmentation adjusted to Penn Treebank conventions:
/// hyphen/slash compounds stay whole, colons and curly quotes inside a word
/// are split off, clitics and fixed contractions are split.
fn segment(buffer: &str) -> Vec<(usize, usize)> {
    let segs: Vec<(usize, &str)> = buffer.split_word_bound_indices().collect();
    let mut spans = Vec::with_capacity(segs.len());
    let mut i = 0;
    while i < segs.len() {
        let (start, seg) = segs[i];
        if !is_word(seg) {
            i += 1;
            continue;
        }
        let mut end = start + seg.len();
        let mut j = i + 1;
        while j + 1 < segs.len() && is_connector(segs[j].1) && is_word(segs[j + 1].1) {
            end = segs[j + 1].0 + segs[j + 1].1.len();
            j += 2;
        }
        split_punctuation(buffer, start, end, &mut spans);
        i = j;
    }
    spans
}

/// Split at curly quotes, and at `:` unless a digit follows.
fn split_punctuation(buffer: &str, start: usize, end: usize, out: &mut Vec<(usize, usize)>) {
    let mut piece = start;
    let mut chars = buffer[start..end].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let split = match c {
            ':' => !matches!(chars.peek(), Some((_, next)) if next.is_numeric()),
            c => is_curly_quote(c),
        };
        if split {
            let at = start + i;
            if piece < at {
                split_contractions(buffer, piece, at, out);
            }
            out.push((at, at + c.len_utf8()));
            piece = at + c.len_utf8();
        }
    }
    if piece < end {
        split_contractions(buffer, piece, end, out);
    }
}

fn split_contractions(buffer: &str, start: usize, end: usize, out: &mut Vec<(usize, usize)>) {
    let word = &buffer[start..end];
    if let Some(&(_, head)) = FIXED_CONTRACTIONS.iter().find(|(w, _)| *w == word) {
        out.push((start, start + head));
        out.push((start + head, end));
        return;
    }
    if let Some(pos) = word.rfind('\'') {
        let suffix = &word[pos + 1..];
        if suffix == "t" && pos > 1 && word[..pos].ends_with('n') {
            out.push((start, start + pos - 1));
            out.push((start + pos - 1, end));
            return;
        }
        if pos > 0 && CLITICS.contains(&suffix) {
            out.push((start, start + pos));
            out.push((start + pos, end));
            return;
        }
    }
    out.push((start, end));
}

/// Tokenize with the shared default tokenizer (noun lemmas).
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT.tokenize(text).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(text: &str) -> Vec<String> {
        let t = Tokenizer::default();
        let toks = t.tokenize(text);
        toks.segments().map(str::to_string).collect()
    }

    #[test]
    fn basic_tokenize() {
        assert_eq!(tokenize("The cat sat."), vec!["cat", "sat"]);
        assert_eq!(tokenize("The dog sat."), vec!["dog", "sat"]);
    }

    #[test]
    fn splits_clitics_like_treebank() {
        assert_eq!(segs("don't"), vec!["do", "n't"]);
        assert_eq!(segs("can't"), vec!["ca", "n't"]);
        assert_eq!(segs("the cat's toy"), vec!["the", "cat", "'s", "toy"]);
        assert_eq!(segs("we're"), vec!["we", "'re"]);
        assert_eq!(segs("cannot"), vec!["can", "not"]);
    }

    #[test]
    fn curly_quotes_are_separate_tokens() {
        assert_eq!(segs("don\u{2019}t"), vec!["don", "\u{2019}", "t"]);
        assert_eq!(segs("\u{2018}quoted\u{2019}"), vec!["quoted"]);
        assert_eq!(tokenize("we\u{2019}re students"), vec!["re", "student"]);
    }

    #[test]
    fn colons_split_joined_words() {
        assert_eq!(segs("topic:informatics"), vec!["topic", ":", "informatics"]);
        assert_eq!(tokenize("Topic:Informatics research"), vec!["topic", "informatics", "research"]);
    }

    #[test]
    fn keeps_compounds_whole() {
        assert_eq!(segs("well-known and/or"), vec!["well-known", "and/or"]);
        assert!(tokenize("a well-known fact").iter().all(|t| t != "well" && t != "known"));
    }

    #[test]
    fn contraction_heads_survive_when_not_stopwords() {
        // "ca" from "can't" is not in the stop list, "do" is
        assert_eq!(tokenize("I can't, don't"), vec!["ca"]);
    }

    #[test]
    fn alphabetic_filter_is_weaker_than_ascii_filter() {
        assert!(is_alphabetic("café"));
        assert!(!ASCII_WORD.is_match("café"));
        assert!(tokenize("café latte").contains(&"latte".to_string()));
        assert!(!tokenize("café latte").iter().any(|t| t.starts_with("caf")));
    }

    #[test]
    fn rejects_digits_and_mixed_tokens() {
        assert!(tokenize("route66 2024 v2 u.s.a").is_empty());
    }

    #[test]
    fn iteration_is_restartable() {
        let t = Tokenizer::default();
        let toks = t.tokenize("Searching engines rank documents");
        let first: Vec<_> = toks.iter().collect();
        let second: Vec<_> = toks.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["searching", "engine", "rank", "document"]);
    }

    #[test]
    fn stem_normalizer_uses_snowball() {
        let t = Tokenizer::for_normalizer(Normalizer::Stem);
        assert_eq!(t.tokenize("running runners").into_vec(), vec!["run", "runner"]);
    }
}
