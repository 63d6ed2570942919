use hashbrown::HashMap;

use crate::errors::{HmmError, Result};
use crate::model::Model;
use crate::sentence::{align_path, Sentence};
use crate::utils::argmax;

// Scores and back-pointers of the Viterbi search, indexed by (position, tag).
struct Trellis {
    n_tags: usize,
    scores: Vec<f64>,
    preds: Vec<usize>,
}

impl Trellis {
    fn new(n_tags: usize, n_tokens: usize, origin: usize) -> Self {
        Self {
            n_tags,
            scores: vec![f64::NEG_INFINITY; n_tags * n_tokens],
            preds: vec![origin; n_tags * n_tokens],
        }
    }

    #[inline(always)]
    fn column(&self, pos: usize) -> &[f64] {
        &self.scores[pos * self.n_tags..(pos + 1) * self.n_tags]
    }

    #[inline(always)]
    fn set(&mut self, pos: usize, tag: usize, score: f64, pred: usize) {
        self.scores[pos * self.n_tags + tag] = score;
        self.preds[pos * self.n_tags + tag] = pred;
    }

    #[inline(always)]
    fn pred(&self, pos: usize, tag: usize) -> usize {
        self.preds[pos * self.n_tags + tag]
    }
}

/// Viterbi decoder over a trained [`Model`].
///
/// The model is never modified. Tokens that did not occur in training get a default emission
/// row giving every tag the same score; such rows are kept in a cache owned by the tagger, so
/// a tagger should be created per thread if sentences are tagged in parallel.
///
/// # Examples
///
/// ```
/// use hmmpos::{Sentence, TaggedSentence, Tagger, Trainer};
///
/// let mut trainer = Trainer::new();
/// for line in ["the/DET dog/NOUN runs/VERB", "a/DET cat/NOUN sleeps/VERB"] {
///     trainer.push_sentence(&TaggedSentence::from_tagged(line).unwrap());
/// }
/// let model = trainer.train().unwrap();
///
/// let mut tagger = Tagger::new(&model);
/// let s = Sentence::from_raw("the cat runs");
/// assert_eq!(vec!["DET", "NOUN", "VERB"], tagger.tag(&s));
/// ```
pub struct Tagger<'a> {
    model: &'a Model,
    unknown_score: f64,
    unseen: HashMap<String, Vec<f64>>,
}

impl<'a> Tagger<'a> {
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `model` - A trained model.
    ///
    /// # Returns
    ///
    /// A new tagger whose default emission score is `0.0`.
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            unknown_score: 0.0,
            unseen: HashMap::new(),
        }
    }

    /// Sets the emission log-score given to every tag for tokens not seen in training.
    ///
    /// # Arguments
    ///
    /// * `score` - A finite log-score. `0.0` treats the emission as certain, so the decision
    ///             is left to the transitions.
    ///
    /// # Errors
    ///
    /// If `score` is not finite, an error variant will be returned.
    pub fn unknown_score(mut self, score: f64) -> Result<Self> {
        if !score.is_finite() {
            return Err(HmmError::invalid_argument(
                "score",
                format!("must be finite, got {score}"),
            ));
        }
        self.unknown_score = score;
        self.unseen.clear();
        Ok(self)
    }

    /// Gets the number of distinct unseen tokens the tagger has synthesized rows for.
    pub fn n_unseen(&self) -> usize {
        self.unseen.len()
    }

    fn memoize_row(&mut self, token: &str) {
        if self.model.emission_row(token).is_some() || self.unseen.contains_key(token) {
            return;
        }
        log::trace!("synthesizing an emission row for `{}`", token);
        let row = (0..self.model.n_tags())
            .map(|tag| {
                if self.model.is_sentinel(tag) {
                    f64::NEG_INFINITY
                } else {
                    self.unknown_score
                }
            })
            .collect();
        self.unseen.insert(token.to_string(), row);
    }

    fn emission_row(&self, token: &str) -> &[f64] {
        self.model
            .emission_row(token)
            .or_else(|| self.unseen.get(token).map(Vec::as_slice))
            .expect("rows of all tokens are memoized before the search")
    }

    /// Finds the most probable tag sequence of the given tokens.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Token texts of a sentence.
    ///
    /// # Returns
    ///
    /// Tag ids of the best path. For `n` tokens the path has `n + 1` entries: entry `0` is the
    /// `START` origin and entry `i + 1` is the tag of the `i`-th token. An empty input yields an
    /// empty path.
    pub fn viterbi<S>(&mut self, tokens: &[S]) -> Vec<usize>
    where
        S: AsRef<str>,
    {
        if tokens.is_empty() {
            return vec![];
        }
        for token in tokens {
            self.memoize_row(token.as_ref());
        }

        let model = self.model;
        let n_tags = model.n_tags();
        let start = model.start_id();
        let end = model.end_id();
        let mut trellis = Trellis::new(n_tags, tokens.len(), start);

        let emissions = self.emission_row(tokens[0].as_ref());
        for tag in 0..n_tags {
            if model.is_sentinel(tag) || emissions[tag] == f64::NEG_INFINITY {
                continue;
            }
            trellis.set(0, tag, emissions[tag] + model.transition(start, tag), start);
        }

        for (pos, token) in tokens.iter().enumerate().skip(1) {
            let emissions = self.emission_row(token.as_ref());
            for tag in 0..n_tags {
                if model.is_sentinel(tag) || emissions[tag] == f64::NEG_INFINITY {
                    continue;
                }
                let candidates = trellis
                    .column(pos - 1)
                    .iter()
                    .enumerate()
                    .map(|(prev, &score)| score + model.transition(prev, tag));
                if let Some((prev, score)) = argmax(candidates, |prev| prev == end) {
                    trellis.set(pos, tag, score + emissions[tag], prev);
                }
            }
        }

        let last = tokens.len() - 1;
        let mut tag = argmax(trellis.column(last).iter().copied(), |tag| {
            model.is_sentinel(tag)
        })
        .map(|(tag, _)| tag)
        .unwrap_or_else(|| {
            // Unreachable with a trained model; falls back to the first tag to keep the output
            // aligned with the input.
            (0..n_tags).find(|&tag| !model.is_sentinel(tag)).unwrap_or(start)
        });

        let mut path = Vec::with_capacity(tokens.len() + 1);
        for pos in (0..tokens.len()).rev() {
            path.push(tag);
            tag = trellis.pred(pos, tag);
        }
        path.push(tag);
        path.reverse();
        path
    }

    /// Tags a sentence.
    ///
    /// # Arguments
    ///
    /// * `sentence` - A sentence of raw tokens.
    ///
    /// # Returns
    ///
    /// One tag name per token.
    pub fn tag(&mut self, sentence: &Sentence) -> Vec<&'a str> {
        let path = self.viterbi(sentence.words());
        align_path(&path, self.model.tags(), sentence.len())
            .expect("the path has one entry per token plus the origin")
    }
}
