use std::io::Write;

use crate::errors::{HmmError, Result};
use crate::model::{END_TAG, START_TAG};

/// Delimiter between the surface and the tag of an annotated token.
pub const TAG_DELIMITER: char = '/';

/// Sentence with a tag annotated on each token.
///
/// The sentinel tags are not stored; [`TaggedSentence::tags_with_sentinels()`] brackets the
/// sequence with `START` and `END` when the trainer consumes it.
#[derive(Debug, PartialEq, Clone)]
pub struct TaggedSentence {
    pub(crate) words: Vec<String>,
    pub(crate) tags: Vec<String>,
}

impl TaggedSentence {
    /// Creates a new [`TaggedSentence`] from a line of a tagged corpus.
    ///
    /// # Arguments
    ///
    /// * `tagged_text` - Tokens formatted as `text/TAG` and separated by single spaces. The tag
    ///                   is the part after the last `/`, so the text itself may contain `/`.
    ///
    /// # Returns
    ///
    /// A new [`TaggedSentence`].
    ///
    /// # Errors
    ///
    /// This function will return [`HmmError::InvalidFormat`] when:
    ///
    /// * `tagged_text` is empty.
    /// * `tagged_text` contains consecutive whitespaces.
    /// * A token has no tag delimiter, or its text or tag is empty.
    /// * A token is tagged with one of the sentinel tags.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmmpos::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_tagged("the/DET dog/NOUN runs/VERB");
    /// assert!(s.is_ok());
    ///
    /// let s = TaggedSentence::from_tagged("the/DET dog runs/VERB");
    /// assert!(s.is_err());
    /// ```
    pub fn from_tagged<S>(tagged_text: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let tagged_text = tagged_text.as_ref().trim();

        if tagged_text.is_empty() {
            return Err(HmmError::invalid_format("`tagged_text` is empty"));
        }

        let mut words = vec![];
        let mut tags = vec![];
        for token in tagged_text.split(' ') {
            if token.is_empty() {
                return Err(HmmError::invalid_format(
                    "`tagged_text` contains consecutive whitespaces",
                ));
            }
            let (word, tag) = token.rsplit_once(TAG_DELIMITER).ok_or_else(|| {
                HmmError::invalid_format(format!("token `{token}` has no tag delimiter"))
            })?;
            if word.is_empty() {
                return Err(HmmError::invalid_format(format!(
                    "token `{token}` has an empty text"
                )));
            }
            if tag.is_empty() {
                return Err(HmmError::invalid_format(format!(
                    "token `{token}` has an empty tag"
                )));
            }
            if tag == START_TAG || tag == END_TAG {
                return Err(HmmError::invalid_format(format!(
                    "token `{token}` uses the reserved tag `{tag}`"
                )));
            }
            words.push(word.to_string());
            tags.push(tag.to_string());
        }

        Ok(Self { words, tags })
    }

    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the sentence contains no token.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Gets a reference to the token texts.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Gets a reference to the tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Iterates `(text, tag)` pairs of the sentence.
    pub fn iter_tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words
            .iter()
            .zip(&self.tags)
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }

    /// Iterates the tag sequence bracketed with the sentinel tags.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmmpos::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_tagged("the/DET dog/NOUN").unwrap();
    /// assert_eq!(
    ///     vec!["START", "DET", "NOUN", "END"],
    ///     s.tags_with_sentinels().collect::<Vec<_>>(),
    /// );
    /// ```
    pub fn tags_with_sentinels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(START_TAG)
            .chain(self.tags.iter().map(String::as_str))
            .chain(std::iter::once(END_TAG))
    }

    /// Drops the annotations.
    ///
    /// # Returns
    ///
    /// A [`Sentence`] with the same token texts.
    pub fn to_raw(&self) -> Sentence {
        Sentence {
            words: self.words.clone(),
        }
    }
}

/// Sentence of raw tokens to be tagged.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Sentence {
    pub(crate) words: Vec<String>,
}

impl Sentence {
    /// Creates a new [`Sentence`] from a line of a test corpus.
    ///
    /// Tokens are separated by whitespaces. A blank line yields an empty sentence.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmmpos::Sentence;
    ///
    /// let s = Sentence::from_raw("the cat  runs");
    /// assert_eq!(&["the", "cat", "runs"], s.words());
    ///
    /// assert!(Sentence::from_raw("").is_empty());
    /// ```
    pub fn from_raw<S>(text: S) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            words: text
                .as_ref()
                .split_whitespace()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the sentence contains no token.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Gets a reference to the token texts.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Generates a string of `text/TAG` tokens separated by single spaces.
    ///
    /// # Arguments
    ///
    /// * `tags` - One tag per token.
    ///
    /// # Errors
    ///
    /// If the number of tags differs from the number of tokens, an error variant will be
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmmpos::Sentence;
    ///
    /// let s = Sentence::from_raw("the cat runs");
    /// assert_eq!(
    ///     "the/DET cat/NOUN runs/VERB",
    ///     s.to_tagged_string(&["DET", "NOUN", "VERB"]).unwrap(),
    /// );
    /// ```
    pub fn to_tagged_string<S>(&self, tags: &[S]) -> Result<String>
    where
        S: AsRef<str>,
    {
        if tags.len() != self.words.len() {
            return Err(HmmError::invalid_argument(
                "tags",
                format!("expected {} tags, got {}", self.words.len(), tags.len()),
            ));
        }
        let mut result = String::new();
        for (i, (word, tag)) in self.words.iter().zip(tags).enumerate() {
            if i != 0 {
                result.push(' ');
            }
            result.push_str(word);
            result.push(TAG_DELIMITER);
            result.push_str(tag.as_ref());
        }
        Ok(result)
    }

    /// Writes the sentence tagged along a decoded tag path, followed by a newline.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    /// * `path` - Tag ids returned by [`Tagger::viterbi()`](crate::Tagger::viterbi). Entry `0` is
    ///            the `START` origin; the `i`-th token is tagged with entry `i + 1`.
    /// * `tag_names` - Tag names indexed by tag id.
    ///
    /// # Errors
    ///
    /// An error is returned if `path` does not match the sentence, or `wtr` fails.
    pub fn write_tagged<W>(&self, mut wtr: W, path: &[usize], tag_names: &[String]) -> Result<()>
    where
        W: Write,
    {
        let tags = align_path(path, tag_names, self.len())?;
        wtr.write_all(self.to_tagged_string(&tags[..])?.as_bytes())?;
        wtr.write_all(b"\n")?;
        Ok(())
    }
}

/// Maps a decoded tag path onto the tokens it was decoded from.
///
/// A path of an `n`-token sentence has `n + 1` entries whose first entry is the origin of the
/// predecessor chain. An empty sentence has an empty path.
pub(crate) fn align_path<'a>(
    path: &[usize],
    tag_names: &'a [String],
    n_tokens: usize,
) -> Result<Vec<&'a str>> {
    if n_tokens == 0 && path.is_empty() {
        return Ok(vec![]);
    }
    if path.len() != n_tokens + 1 {
        return Err(HmmError::invalid_argument(
            "path",
            format!(
                "a path of {} tokens must have {} entries, got {}",
                n_tokens,
                n_tokens + 1,
                path.len()
            ),
        ));
    }
    path[1..]
        .iter()
        .map(|&id| {
            tag_names.get(id).map(String::as_str).ok_or_else(|| {
                HmmError::invalid_argument("path", format!("unknown tag id: {id}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_sentence_from_tagged() {
        let s = TaggedSentence::from_tagged("the/DET dog/NOUN runs/VERB").unwrap();

        let expected = TaggedSentence {
            words: vec!["the".to_string(), "dog".to_string(), "runs".to_string()],
            tags: vec!["DET".to_string(), "NOUN".to_string(), "VERB".to_string()],
        };
        assert_eq!(expected, s);
    }

    #[test]
    fn test_tagged_sentence_from_tagged_slash_in_text() {
        let s = TaggedSentence::from_tagged("1/2/NUM and/CONJ/or/CONJ").unwrap();

        assert_eq!(&["1/2", "and/CONJ/or"], s.words());
        assert_eq!(&["NUM", "CONJ"], s.tags());
    }

    #[test]
    fn test_tagged_sentence_from_tagged_trims_line() {
        let s = TaggedSentence::from_tagged("  the/DET dog/NOUN\r").unwrap();

        assert_eq!(2, s.len());
    }

    #[test]
    fn test_tagged_sentence_from_tagged_empty() {
        let s = TaggedSentence::from_tagged("   ");

        assert!(s.is_err());
        assert_eq!(
            "FormatError: `tagged_text` is empty",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_from_tagged_no_delimiter() {
        let s = TaggedSentence::from_tagged("the/DET dog runs/VERB");

        assert!(matches!(s, Err(HmmError::InvalidFormat(_))));
        assert_eq!(
            "FormatError: token `dog` has no tag delimiter",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_from_tagged_empty_tag() {
        let s = TaggedSentence::from_tagged("the/DET dog/");

        assert_eq!(
            "FormatError: token `dog/` has an empty tag",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_from_tagged_empty_text() {
        let s = TaggedSentence::from_tagged("/DET dog/NOUN");

        assert_eq!(
            "FormatError: token `/DET` has an empty text",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_from_tagged_two_spaces() {
        let s = TaggedSentence::from_tagged("the/DET  dog/NOUN");

        assert_eq!(
            "FormatError: `tagged_text` contains consecutive whitespaces",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_from_tagged_reserved_tag() {
        let s = TaggedSentence::from_tagged("the/START dog/NOUN");

        assert_eq!(
            "FormatError: token `the/START` uses the reserved tag `START`",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_tagged_sentence_to_raw() {
        let s = TaggedSentence::from_tagged("a/DET cat/NOUN sleeps/VERB").unwrap();

        assert_eq!(Sentence::from_raw("a cat sleeps"), s.to_raw());
    }

    #[test]
    fn test_sentence_to_tagged_string_length_mismatch() {
        let s = Sentence::from_raw("the cat runs");
        let result = s.to_tagged_string(&["DET", "NOUN"]);

        assert_eq!(
            "InvalidArgumentError: tags: expected 3 tags, got 2",
            result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_write_tagged_skips_origin() {
        let tag_names: Vec<String> = ["START", "DET", "NOUN", "VERB", "END"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let s = Sentence::from_raw("the cat runs");
        let mut buf = vec![];
        s.write_tagged(&mut buf, &[0, 1, 2, 3], &tag_names).unwrap();

        assert_eq!("the/DET cat/NOUN runs/VERB\n", String::from_utf8(buf).unwrap());
    }

    #[test]
    fn test_sentence_write_tagged_empty() {
        let s = Sentence::from_raw("");
        let mut buf = vec![];
        s.write_tagged(&mut buf, &[], &[]).unwrap();

        assert_eq!("\n", String::from_utf8(buf).unwrap());
    }

    #[test]
    fn test_sentence_write_tagged_short_path() {
        let tag_names = vec!["START".to_string(), "DET".to_string()];
        let s = Sentence::from_raw("the cat");
        let result = s.write_tagged(vec![], &[1, 1], &tag_names);

        assert!(matches!(result, Err(HmmError::InvalidArgument(_))));
    }
}
