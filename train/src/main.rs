use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::PathBuf;

use clap::Parser;
use hmmpos::{TaggedSentence, Trainer};
use log::info;

#[derive(Parser, Debug)]
#[command(about = "A program to train models of hmmpos.")]
struct Args {
    /// A tagged training corpus with `text/TAG` tokens separated by spaces
    #[arg(long, required = true)]
    tagged: Vec<PathBuf>,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// The compression level of zstd
    #[arg(long, default_value = "19")]
    zstd_level: i32,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading dataset...");
    let mut trainer = Trainer::new();
    for path in args.tagged {
        info!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for (i, line) in f.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let s = TaggedSentence::from_tagged(&line)
                .map_err(|e| format!("line {}: {}", i + 1, e))?;
            trainer.push_sentence(&s);
        }
        info!("# of sentences: {}", trainer.n_sentences());
    }
    info!("# of tags: {}", trainer.n_tags());

    info!("Start training...");
    let model = trainer.train()?;
    info!("Finish training. # of tokens: {}", model.n_tokens());

    let mut f = zstd::Encoder::new(File::create(args.model)?, args.zstd_level)?;
    f.multithread(args.zstd_workers)?;
    model.write(&mut f)?;
    f.finish()?;

    Ok(())
}
