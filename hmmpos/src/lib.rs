#![cfg_attr(docsrs, feature(doc_cfg))]

//! # hmmpos
//!
//! hmmpos is a part-of-speech tagger based on a first-order hidden Markov model.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, stdin, stdout, BufReader};
//!
//! use hmmpos::{Model, Sentence, Tagger};
//!
//! let mut f = BufReader::new(File::open("model.bin").unwrap());
//! let model = Model::read(&mut f).unwrap();
//! let mut tagger = Tagger::new(&model);
//!
//! for line in stdin().lock().lines() {
//!     let s = Sentence::from_raw(line.unwrap());
//!     let path = tagger.viterbi(s.words());
//!     s.write_tagged(stdout().lock(), &path, model.tags()).unwrap();
//! }
//! ```
//!
//! Training requires **crate feature** `train`. For more details, see [`Trainer`].

mod utils;

pub mod errors;
mod model;
mod sentence;
mod tagger;

#[cfg(feature = "train")]
mod trainer;

pub use model::{Model, END_TAG, START_TAG};
pub use sentence::{Sentence, TaggedSentence, TAG_DELIMITER};
pub use tagger::Tagger;

#[cfg(feature = "train")]
pub use trainer::Trainer;
