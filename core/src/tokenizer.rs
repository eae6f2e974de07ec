//! Stock pipeline steps.

use crate::error::StepError;
use crate::pipeline::PipelineStep;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref PUNCTUATION_RE: Regex = Regex::new(r#"[,.:\-;"'!?()]"#).expect("valid regex");
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Lowercases every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl PipelineStep for Lowercase {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input.into_iter().map(|s| s.to_lowercase()).collect())
    }
}

/// Removes `, . : - ; " ' ! ? ( )` from every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripPunctuation;

impl PipelineStep for StripPunctuation {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input.into_iter().map(|s| PUNCTUATION_RE.replace_all(&s, "").into_owned()).collect())
    }
}

/// Splits every token on Unicode whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl PipelineStep for WhitespaceTokenizer {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input.iter().flat_map(|s| s.split_whitespace().map(str::to_string)).collect())
    }
}

/// Emits every match of a regex as a token.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    re: Regex,
}

impl RegexTokenizer {
    pub fn new(re: Regex) -> Self {
        Self { re }
    }

    /// Words starting with a letter, continuing with letters, digits, `_` or `'`.
    pub fn words() -> Self {
        Self { re: WORD_RE.clone() }
    }
}

impl PipelineStep for RegexTokenizer {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input
            .iter()
            .flat_map(|s| self.re.find_iter(s).map(|m| m.as_str().to_string()))
            .collect())
    }
}

/// NFKC-normalizes every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeNormalize;

impl PipelineStep for UnicodeNormalize {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input.into_iter().map(|s| s.nfkc().collect()).collect())
    }
}

/// Drops tokens found in a stop-word list. Matching is exact, so place it
/// after lowercasing.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    pub fn english() -> Self {
        Self::new(ENGLISH_STOPWORDS.iter().copied())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }
}

impl PipelineStep for StopWords {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input.into_iter().filter(|t| !self.contains(t)).collect())
    }
}

/// Snowball stemmer.
pub struct Stem {
    stemmer: Stemmer,
}

impl Stem {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { stemmer: Stemmer::create(algorithm) }
    }

    pub fn english() -> Self {
        Self::new(Algorithm::English)
    }
}

impl fmt::Debug for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stem").finish_non_exhaustive()
    }
}

impl Default for Stem {
    fn default() -> Self {
        Self::english()
    }
}

impl PipelineStep for Stem {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        Ok(input.iter().map(|t| self.stemmer.stem(t).into_owned()).collect())
    }
}
