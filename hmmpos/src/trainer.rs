use std::borrow::Borrow;
use std::hash::Hash;

use hashbrown::HashMap;

use crate::errors::{HmmError, Result};
use crate::model::{Model, END_TAG, START_TAG};
use crate::sentence::TaggedSentence;
use crate::utils::SerializableHashMap;

/// Assigns consecutive ids to keys in order of first appearance and counts their occurrences.
pub struct Indexer<K> {
    ids: HashMap<K, usize>,
    keys: Vec<K>,
    counts: Vec<u64>,
}

impl<K> Indexer<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            keys: vec![],
            counts: vec![],
        }
    }

    /// Gets the id of `key`, registering it if it is new, and counts one occurrence.
    pub fn count<Q: ?Sized>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + Eq + Hash,
    {
        let id = if let Some(&id) = self.ids.get(key) {
            id
        } else {
            let id = self.ids.len();
            self.keys.push(key.to_owned());
            self.ids.insert(key.to_owned(), id);
            self.counts.push(0);
            id
        };
        self.counts[id] += 1;
        id
    }

    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash,
    {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }
}

/// Trainer of a first-order HMM.
///
/// Transition counts start from one for every legal tag pair before the observed pairs are
/// added, so no legal transition ends up with zero probability. Emission counts get no such
/// prior; tokens missing from training are handled by the [`Tagger`](crate::Tagger) instead.
///
/// # Examples
///
/// ```
/// use hmmpos::{TaggedSentence, Trainer};
///
/// let mut trainer = Trainer::new();
/// for line in ["the/DET dog/NOUN runs/VERB", "a/DET cat/NOUN sleeps/VERB"] {
///     trainer.push_sentence(&TaggedSentence::from_tagged(line).unwrap());
/// }
/// let model = trainer.train().unwrap();
/// assert_eq!(&["START", "DET", "NOUN", "VERB", "END"], model.tags());
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    tag_ids: Indexer<String>,
    transition_counts: HashMap<(usize, usize), u64>,
    emission_counts: HashMap<String, HashMap<usize, u64>>,
    n_sentences: usize,
}

impl Trainer {
    /// Creates a new trainer without any sentence.
    pub fn new() -> Self {
        Self {
            tag_ids: Indexer::new(),
            transition_counts: HashMap::new(),
            emission_counts: HashMap::new(),
            n_sentences: 0,
        }
    }

    /// Adds a sentence to the dataset.
    ///
    /// The sentence is bracketed with the `START` and `END` sentinels, so its first and last
    /// transitions are counted as well.
    ///
    /// # Arguments
    ///
    /// * `s` - A tagged sentence.
    pub fn push_sentence(&mut self, s: &TaggedSentence) {
        let mut prev = None;
        for tag in s.tags_with_sentinels() {
            let id = self.tag_ids.count(tag);
            if let Some(prev) = prev {
                *self.transition_counts.entry((prev, id)).or_insert(0) += 1;
            }
            prev = Some(id);
        }
        for (word, tag) in s.iter_tokens() {
            let id = self
                .tag_ids
                .get(tag)
                .expect("tags are registered by the loop above");
            if let Some(row) = self.emission_counts.get_mut(word) {
                *row.entry(id).or_insert(0) += 1;
            } else {
                let mut row = HashMap::new();
                row.insert(id, 1);
                self.emission_counts.insert(word.to_string(), row);
            }
        }
        self.n_sentences += 1;
    }

    /// Gets the number of sentences added so far.
    pub fn n_sentences(&self) -> usize {
        self.n_sentences
    }

    /// Gets the number of tags discovered so far, sentinels included.
    pub fn n_tags(&self) -> usize {
        self.tag_ids.len()
    }

    /// Builds the transition and emission tables.
    ///
    /// # Returns
    ///
    /// A trained model.
    ///
    /// # Errors
    ///
    /// [`HmmError::InsufficientData`] will be returned if no sentence has been added.
    pub fn train(self) -> Result<Model> {
        if self.n_sentences == 0 {
            return Err(HmmError::insufficient_data(
                "no training sentence was given",
            ));
        }
        let n_tags = self.tag_ids.len();
        let start = self
            .tag_ids
            .get(START_TAG)
            .expect("every sentence starts with START");
        let end = self
            .tag_ids
            .get(END_TAG)
            .expect("every sentence ends with END");

        let transitions = self.transition_table(n_tags, start, end);
        log::debug!(
            "{} tags, {} distinct transitions observed",
            n_tags,
            self.transition_counts.len()
        );

        let mut emission_totals = vec![0u64; n_tags];
        for row in self.emission_counts.values() {
            for (&tag, &count) in row {
                emission_totals[tag] += count;
            }
        }
        let mut emissions = HashMap::with_capacity(self.emission_counts.len());
        for (word, row) in self.emission_counts {
            let mut probs = vec![f64::NEG_INFINITY; n_tags];
            for (tag, count) in row {
                probs[tag] = (count as f64 / emission_totals[tag] as f64).ln();
            }
            emissions.insert(word, probs);
        }
        log::debug!("{} distinct tokens", emissions.len());

        Model::new(
            self.tag_ids.keys().to_vec(),
            self.tag_ids.counts().to_vec(),
            emission_totals,
            transitions,
            SerializableHashMap(emissions),
        )
    }

    fn transition_table(&self, n_tags: usize, start: usize, end: usize) -> Vec<f64> {
        let mut counts = vec![0u64; n_tags * n_tags];
        for from in 0..n_tags {
            if from == end {
                continue;
            }
            for to in 0..n_tags {
                if to == start || (from == start && to == end) {
                    continue;
                }
                counts[from * n_tags + to] = 1;
            }
        }
        for (&(from, to), &count) in &self.transition_counts {
            counts[from * n_tags + to] += count;
        }

        // END terminates a sentence rather than competing with the other tags at each position,
        // so it is left out of the normalizer.
        let totals: Vec<u64> = counts
            .chunks(n_tags)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(to, _)| to != end)
                    .map(|(_, &count)| count)
                    .sum()
            })
            .collect();

        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                if count == 0 {
                    f64::NEG_INFINITY
                } else {
                    (count as f64 / totals[i / n_tags] as f64).ln()
                }
            })
            .collect()
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn train(lines: &[&str]) -> Model {
        let mut trainer = Trainer::new();
        for line in lines {
            trainer.push_sentence(&TaggedSentence::from_tagged(line).unwrap());
        }
        trainer.train().unwrap()
    }

    const CORPUS: &[&str] = &[
        "the/DET dog/NOUN runs/VERB",
        "a/DET cat/NOUN sleeps/VERB",
        "the/DET old/ADJ man/NOUN the/DET boat/NOUN",
        "time/NOUN flies/VERB like/ADP an/DET arrow/NOUN",
        "fruit/NOUN flies/NOUN like/VERB a/DET banana/NOUN",
    ];

    #[test]
    fn test_indexer_first_seen_order() {
        let mut indexer = Indexer::new();
        assert_eq!(0, indexer.count("b"));
        assert_eq!(1, indexer.count("a"));
        assert_eq!(0, indexer.count("b"));

        assert_eq!(&["b".to_string(), "a".to_string()], indexer.keys());
        assert_eq!(&[2, 1], indexer.counts());
        assert_eq!(Some(1), indexer.get("a"));
        assert_eq!(None, indexer.get("c"));
    }

    #[test]
    fn test_train_empty() {
        let result = Trainer::new().train();

        assert!(matches!(result, Err(HmmError::InsufficientData(_))));
        assert_eq!(
            "InsufficientDataError: no training sentence was given",
            result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_train_tag_set() {
        let model = train(&CORPUS[..2]);

        assert_eq!(&["START", "DET", "NOUN", "VERB", "END"], model.tags());
        assert_eq!(0, model.start_id());
        assert_eq!(4, model.end_id());
        assert_eq!(2, model.tag_frequency(model.tag_id("DET").unwrap()));
        assert_eq!(2, model.tag_frequency(model.start_id()));
        assert_eq!(6, model.n_tokens());
    }

    #[test]
    fn test_train_transition_values() {
        let model = train(&CORPUS[..2]);
        let start = model.start_id();
        let end = model.end_id();
        let det = model.tag_id("DET").unwrap();
        let noun = model.tag_id("NOUN").unwrap();
        let verb = model.tag_id("VERB").unwrap();

        // From DET: DET 1, NOUN 1 + 2, VERB 1, END 1 (excluded from the total).
        assert_relative_eq!((3f64 / 5.).ln(), model.transition(det, noun));
        assert_relative_eq!((1f64 / 5.).ln(), model.transition(det, verb));
        assert_relative_eq!((1f64 / 5.).ln(), model.transition(det, end));

        // From START: DET 1 + 2, NOUN 1, VERB 1.
        assert_relative_eq!((3f64 / 5.).ln(), model.transition(start, det));

        // From VERB: DET 1, NOUN 1, VERB 1, END 1 + 2.
        assert_relative_eq!((3f64 / 3.).ln(), model.transition(verb, end));
    }

    #[test]
    fn test_train_forbidden_transitions() {
        let model = train(CORPUS);
        let start = model.start_id();
        let end = model.end_id();

        assert_eq!(f64::NEG_INFINITY, model.transition(start, end));
        for tag in 0..model.n_tags() {
            assert_eq!(f64::NEG_INFINITY, model.transition(tag, start));
            assert_eq!(f64::NEG_INFINITY, model.transition(end, tag));
        }
    }

    #[test]
    fn test_train_transition_conservation() {
        let model = train(CORPUS);
        let end = model.end_id();

        for from in 0..model.n_tags() {
            if from == end {
                continue;
            }
            let total: f64 = (0..model.n_tags())
                .filter(|&to| to != end)
                .map(|to| model.transition(from, to).exp())
                .sum();
            assert_relative_eq!(1.0, total, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_train_every_legal_transition_is_finite() {
        let model = train(CORPUS);
        let start = model.start_id();
        let end = model.end_id();

        for from in 0..model.n_tags() {
            for to in 0..model.n_tags() {
                if from == end || to == start || (from == start && to == end) {
                    continue;
                }
                assert!(model.transition(from, to).is_finite());
            }
        }
    }

    #[test]
    fn test_train_emission_values() {
        let model = train(CORPUS);
        let noun = model.tag_id("NOUN").unwrap();
        let verb = model.tag_id("VERB").unwrap();

        // NOUN is emitted 9 times in the corpus, VERB 4 times.
        assert_eq!(9, model.emission_total(noun));
        assert_eq!(4, model.emission_total(verb));
        assert_relative_eq!((1f64 / 9.).ln(), model.emission("flies", noun).unwrap());
        assert_relative_eq!((1f64 / 4.).ln(), model.emission("flies", verb).unwrap());
        assert_eq!(
            f64::NEG_INFINITY,
            model.emission("the", noun).unwrap()
        );
        assert_eq!(None, model.emission("zebra", noun));
    }

    #[test]
    fn test_train_sentinels_emit_nothing() {
        let model = train(CORPUS);

        assert_eq!(0, model.emission_total(model.start_id()));
        assert_eq!(0, model.emission_total(model.end_id()));
        assert_eq!(None, model.emission_row("START"));
    }

    #[test]
    fn test_train_emission_conservation() {
        let model = train(CORPUS);
        let mut counts = HashMap::new();
        for line in CORPUS {
            let s = TaggedSentence::from_tagged(line).unwrap();
            for (word, tag) in s.iter_tokens() {
                *counts
                    .entry((word.to_string(), model.tag_id(tag).unwrap()))
                    .or_insert(0u64) += 1;
            }
        }

        for tag in 0..model.n_tags() {
            if model.is_sentinel(tag) {
                continue;
            }
            let total: f64 = model
                .iter_emissions()
                .map(|(_, row)| row[tag].exp())
                .sum();
            assert_relative_eq!(1.0, total, epsilon = 1e-12);
        }
        for ((word, tag), count) in counts {
            let derived = model.emission(&word, tag).unwrap().exp()
                * model.emission_total(tag) as f64;
            assert_relative_eq!(count as f64, derived, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_train_idempotent() {
        let model1 = train(CORPUS);
        let model2 = train(CORPUS);

        assert_eq!(model1, model2);
    }
}
