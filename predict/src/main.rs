use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use hmmpos::{Model, Sentence, Tagger};
use log::info;

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// A file with tokens separated by whitespaces, one sentence per line (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// The file to write tagged sentences to (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// The emission log-score given to every tag for tokens not seen in training
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    unknown_score: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let mut tagger = Tagger::new(&model).unknown_score(args.unknown_score)?;

    let input: Box<dyn BufRead> = match args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(stdin().lock()),
    };
    let mut output: Box<dyn Write> = match args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    };

    info!("Start tagging");
    let mut n_tokens = 0;
    let start = Instant::now();
    for line in input.lines() {
        let s = Sentence::from_raw(line?);
        let path = tagger.viterbi(s.words());
        s.write_tagged(&mut output, &path, model.tags())?;
        n_tokens += s.len();
    }
    output.flush()?;
    let duration = start.elapsed();
    info!("Elapsed: {} [sec]", duration.as_secs_f64());
    info!(
        "Speed: {} [tokens/sec]",
        n_tokens as f64 / duration.as_secs_f64()
    );
    info!("# of unseen tokens: {}", tagger.n_unseen());

    Ok(())
}
