use std::io::{Read, Write};

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};

use crate::errors::{HmmError, Result};
use crate::utils::SerializableHashMap;

/// Sentinel tag preceding every training sentence.
pub const START_TAG: &str = "START";

/// Sentinel tag following every training sentence.
pub const END_TAG: &str = "END";

// The transition matrix is stored row-major:
//
//          to: tag0 tag1 tag2 ...
// from tag0     0    1    2
// from tag1     n   n+1  n+2
// ...
//
// Cells of forbidden transitions (from END, to START, START to END) hold -inf.

/// Trained first-order HMM.
///
/// Tags are identified by their position in [`Model::tags()`]. The same ids index the rows and
/// columns of the transition table and the entries of every emission row.
#[derive(Debug, PartialEq)]
pub struct Model {
    pub(crate) tags: Vec<String>,
    pub(crate) tag_counts: Vec<u64>,
    pub(crate) emission_totals: Vec<u64>,
    pub(crate) transitions: Vec<f64>,
    pub(crate) emissions: SerializableHashMap<String, Vec<f64>>,
    pub(crate) start_id: usize,
    pub(crate) end_id: usize,
}

impl Model {
    pub(crate) fn new(
        tags: Vec<String>,
        tag_counts: Vec<u64>,
        emission_totals: Vec<u64>,
        transitions: Vec<f64>,
        emissions: SerializableHashMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let n_tags = tags.len();
        let start_id = tags
            .iter()
            .position(|t| t == START_TAG)
            .ok_or_else(|| HmmError::invalid_model("the tag set has no START tag"))?;
        let end_id = tags
            .iter()
            .position(|t| t == END_TAG)
            .ok_or_else(|| HmmError::invalid_model("the tag set has no END tag"))?;
        if n_tags <= 2 {
            return Err(HmmError::invalid_model("the tag set has no tag to predict"));
        }
        if tag_counts.len() != n_tags || emission_totals.len() != n_tags {
            return Err(HmmError::invalid_model(
                "tag statistics do not match the tag set",
            ));
        }
        if transitions.len() != n_tags * n_tags {
            return Err(HmmError::invalid_model(format!(
                "the transition table must have {} cells, got {}",
                n_tags * n_tags,
                transitions.len()
            )));
        }
        if let Some((token, _)) = emissions.iter().find(|(_, row)| row.len() != n_tags) {
            return Err(HmmError::invalid_model(format!(
                "the emission row of `{token}` does not match the tag set"
            )));
        }
        Ok(Self {
            tags,
            tag_counts,
            emission_totals,
            transitions,
            emissions,
            start_id,
            end_id,
        })
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let config = bincode::config::standard();
        bincode::encode_into_std_write(self, wtr, config)?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is. If the tables read from `rdr`
    /// are inconsistent with each other, [`HmmError::InvalidModel`] will be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let config = bincode::config::standard();
        let raw: RawModel = bincode::decode_from_std_read(rdr, config)?;
        Self::new(
            raw.tags,
            raw.tag_counts,
            raw.emission_totals,
            raw.transitions,
            raw.emissions,
        )
    }

    /// Gets the tag names ordered by tag id.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Gets the number of tags including the sentinels.
    pub fn n_tags(&self) -> usize {
        self.tags.len()
    }

    /// Looks up the id of a tag.
    pub fn tag_id(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }

    /// Gets the id of the `START` sentinel.
    pub const fn start_id(&self) -> usize {
        self.start_id
    }

    /// Gets the id of the `END` sentinel.
    pub const fn end_id(&self) -> usize {
        self.end_id
    }

    /// Returns `true` if `tag_id` is one of the sentinels.
    #[inline(always)]
    pub const fn is_sentinel(&self, tag_id: usize) -> bool {
        tag_id == self.start_id || tag_id == self.end_id
    }

    /// Gets the log-probability of moving from tag `from` to tag `to`.
    ///
    /// Forbidden transitions return negative infinity.
    ///
    /// # Panics
    ///
    /// Panics if either id is out of range.
    #[inline(always)]
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transitions[from * self.tags.len() + to]
    }

    /// Gets the emission row of a token seen in training.
    ///
    /// # Returns
    ///
    /// Log-probabilities indexed by tag id, or `None` if the token never occurred in training.
    pub fn emission_row(&self, token: &str) -> Option<&[f64]> {
        self.emissions.get(token).map(Vec::as_slice)
    }

    /// Gets the log-probability of `tag_id` emitting `token`.
    ///
    /// # Returns
    ///
    /// `None` if the token never occurred in training. Negative infinity if the token never
    /// occurred with the tag.
    pub fn emission(&self, token: &str, tag_id: usize) -> Option<f64> {
        self.emission_row(token).map(|row| row[tag_id])
    }

    /// Gets the number of tokens emitted by `tag_id` in training, counted over all token types.
    pub fn emission_total(&self, tag_id: usize) -> u64 {
        self.emission_totals[tag_id]
    }

    /// Gets the number of occurrences of `tag_id` in training, sentinels included.
    pub fn tag_frequency(&self, tag_id: usize) -> u64 {
        self.tag_counts[tag_id]
    }

    /// Gets the number of distinct tokens seen in training.
    pub fn n_tokens(&self) -> usize {
        self.emissions.len()
    }

    /// Iterates the emission rows of all tokens seen in training, in arbitrary order.
    pub fn iter_emissions(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.emissions
            .iter()
            .map(|(token, row)| (token.as_str(), row.as_slice()))
    }
}

impl Encode for Model {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.tags, encoder)?;
        Encode::encode(&self.tag_counts, encoder)?;
        Encode::encode(&self.emission_totals, encoder)?;
        Encode::encode(&self.transitions, encoder)?;
        Encode::encode(&self.emissions, encoder)?;
        Ok(())
    }
}

// Decoded fields are checked by `Model::new()` before a model is handed out.
struct RawModel {
    tags: Vec<String>,
    tag_counts: Vec<u64>,
    emission_totals: Vec<u64>,
    transitions: Vec<f64>,
    emissions: SerializableHashMap<String, Vec<f64>>,
}

impl Decode for RawModel {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(Self {
            tags: Decode::decode(decoder)?,
            tag_counts: Decode::decode(decoder)?,
            emission_totals: Decode::decode(decoder)?,
            transitions: Decode::decode(decoder)?,
            emissions: Decode::decode(decoder)?,
        })
    }
}
