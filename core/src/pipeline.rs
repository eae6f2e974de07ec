use crate::error::{PipelineStepError, StepError};
use crate::tokenizer::{Lowercase, RegexTokenizer, Stem, StopWords, StripPunctuation, UnicodeNormalize, WhitespaceTokenizer};
use std::fmt;
use std::sync::Arc;

/// One transformation in a text [`Pipeline`].
///
/// Closures of the shape `Fn(Vec<String>) -> Result<Vec<String>, StepError>`
/// are steps too.
pub trait PipelineStep: Send + Sync {
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError>;
}

impl<F> PipelineStep for F
where
    F: Fn(Vec<String>) -> Result<Vec<String>, StepError> + Send + Sync,
{
    fn process(&self, input: Vec<String>) -> Result<Vec<String>, StepError> {
        self(input)
    }
}

/// Ordered chain of steps turning raw text into index tokens.
///
/// The output of step `k` feeds step `k + 1`. A pipeline without steps returns
/// its input as the only token.
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Lowercase, strip punctuation, split on whitespace, then stem (English).
    pub fn standard() -> Self {
        Self::new()
            .with_step(Lowercase)
            .with_step(StripPunctuation)
            .with_step(WhitespaceTokenizer)
            .with_step(Stem::english())
    }

    /// Like [`Pipeline::standard`] without stemming, so indexed tokens stay
    /// literal words. Useful when autocomplete suggestions are shown to users.
    pub fn literal() -> Self {
        Self::new()
            .with_step(Lowercase)
            .with_step(StripPunctuation)
            .with_step(WhitespaceTokenizer)
    }

    /// NFKC normalization, lowercasing, word extraction, English stop-word
    /// removal and stemming.
    pub fn analyzed() -> Self {
        Self::new()
            .with_step(UnicodeNormalize)
            .with_step(Lowercase)
            .with_step(RegexTokenizer::words())
            .with_step(StopWords::english())
            .with_step(Stem::english())
    }

    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn len(&self) -> usize { self.steps.len() }

    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    /// Runs `input` through every step. Stops at the first failing step.
    pub fn process(&self, input: &str) -> Result<Vec<String>, PipelineStepError> {
        let mut tokens = vec![input.to_string()];
        for (step_index, step) in self.steps.iter().enumerate() {
            tokens = step
                .process(tokens)
                .map_err(|cause| PipelineStepError { step_index, cause })?;
        }
        Ok(tokens)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("steps", &self.steps.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_pipeline_is_identity() {
        let p = Pipeline::new();
        assert_eq!(p.process("Hello, World").unwrap(), vec!["Hello, World"]);
    }

    #[test]
    fn steps_run_in_order() {
        let p = Pipeline::new()
            .with_step(|input: Vec<String>| -> Result<Vec<String>, StepError> {
                Ok(input.into_iter().map(|s| format!("{s}a")).collect())
            })
            .with_step(|input: Vec<String>| -> Result<Vec<String>, StepError> {
                Ok(input.into_iter().map(|s| format!("{s}b")).collect())
            });
        assert_eq!(p.process("x").unwrap(), vec!["xab"]);
    }

    #[test]
    fn failing_step_reports_index_and_skips_the_rest() {
        static LATER_CALLS: AtomicUsize = AtomicUsize::new(0);
        let p = Pipeline::new()
            .with_step(Lowercase)
            .with_step(|_: Vec<String>| -> Result<Vec<String>, StepError> { Err("boom".into()) })
            .with_step(|input: Vec<String>| -> Result<Vec<String>, StepError> {
                LATER_CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(input)
            });
        let err = p.process("text").unwrap_err();
        assert_eq!(err.step_index, 1);
        assert_eq!(err.cause.to_string(), "boom");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(LATER_CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn standard_pipeline_stems_words() {
        let tokens = Pipeline::standard().process("Runners RUNNING!").unwrap();
        assert_eq!(tokens, vec!["runner", "run"]);
    }

    #[test]
    fn literal_pipeline_keeps_words() {
        let tokens = Pipeline::literal().process("Football, (foil)").unwrap();
        assert_eq!(tokens, vec!["football", "foil"]);
    }
}
