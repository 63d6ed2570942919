use std::fs::File;
use std::io::{prelude::*, BufReader, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use hmmpos::{Sentence, TaggedSentence, Tagger, Trainer};
use log::info;

#[derive(Parser, Debug)]
#[command(about = "A program to train an HMM tagger and tag a test corpus in one run.")]
struct Args {
    /// A tagged training corpus with `text/TAG` tokens separated by spaces
    train: PathBuf,

    /// A test corpus with tokens separated by whitespaces
    test: PathBuf,

    /// The file to write tagged sentences to
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading {:?} ...", args.train);
    let mut trainer = Trainer::new();
    let f = BufReader::new(File::open(&args.train)?);
    for (i, line) in f.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let s = TaggedSentence::from_tagged(&line)
            .map_err(|e| format!("line {}: {}", i + 1, e))?;
        trainer.push_sentence(&s);
    }
    info!(
        "# of sentences: {}, # of tags: {}",
        trainer.n_sentences(),
        trainer.n_tags()
    );
    let model = trainer.train()?;
    info!("Finish training.");

    info!("Tagging {:?} into {:?} ...", args.test, args.output);
    let mut tagger = Tagger::new(&model);
    let f = BufReader::new(File::open(&args.test)?);
    let mut out = BufWriter::new(File::create(&args.output)?);
    for line in f.lines() {
        let s = Sentence::from_raw(line?);
        let path = tagger.viterbi(s.words());
        s.write_tagged(&mut out, &path, model.tags())?;
    }
    out.flush()?;
    info!("# of unseen tokens: {}", tagger.n_unseen());

    Ok(())
}
