use std::fs::File;
use std::io::{prelude::*, stdin, BufReader};
use std::path::PathBuf;

use clap::Parser;
use hmmpos::{Model, TaggedSentence, Tagger};
use log::info;

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of hmmpos.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// A tagged corpus with `text/TAG` tokens separated by spaces (default: stdin)
    #[arg(long)]
    gold: Option<PathBuf>,

    /// The emission log-score given to every tag for tokens not seen in training
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    unknown_score: f64,
}

#[derive(Default)]
struct Counter {
    n_cor: usize,
    n_all: usize,
}

impl Counter {
    fn add(&mut self, correct: bool) {
        self.n_all += 1;
        if correct {
            self.n_cor += 1;
        }
    }

    fn accuracy(&self) -> f64 {
        self.n_cor as f64 / self.n_all as f64
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let mut tagger = Tagger::new(&model).unknown_score(args.unknown_score)?;

    let gold: Box<dyn BufRead> = match args.gold {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(stdin().lock()),
    };

    info!("Start tagging");
    let mut tokens = Counter::default();
    let mut unseen_tokens = Counter::default();
    let mut sentences = Counter::default();
    for line in gold.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reference = TaggedSentence::from_tagged(&line)?;
        let s = reference.to_raw();
        let hypothesis = tagger.tag(&s);
        let mut matched = true;
        for ((word, r), h) in s.words().iter().zip(reference.tags()).zip(&hypothesis) {
            let correct = r == h;
            tokens.add(correct);
            if model.emission_row(word).is_none() {
                unseen_tokens.add(correct);
            }
            matched &= correct;
        }
        sentences.add(matched);
    }

    println!(
        "Token accuracy: {} ({}/{})",
        tokens.accuracy(),
        tokens.n_cor,
        tokens.n_all
    );
    println!(
        "Unseen token accuracy: {} ({}/{})",
        unseen_tokens.accuracy(),
        unseen_tokens.n_cor,
        unseen_tokens.n_all
    );
    println!(
        "Sentence accuracy: {} ({}/{})",
        sentences.accuracy(),
        sentences.n_cor,
        sentences.n_all
    );

    Ok(())
}
