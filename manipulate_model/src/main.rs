use std::fs;
use std::path::PathBuf;

use clap::Parser;
use hmmpos::Model;
use log::info;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "A program to inspect trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output the transition table contained in the model.
    #[arg(long)]
    dump_transitions: Option<PathBuf>,

    /// Output the emission table contained in the model.
    #[arg(long)]
    dump_emissions: Option<PathBuf>,
}

#[derive(Serialize)]
struct TransitionRecord<'a> {
    from: &'a str,
    to: &'a str,
    log_prob: f64,
}

#[derive(Serialize)]
struct EmissionRecord<'a> {
    token: &'a str,
    tag: &'a str,
    log_prob: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let model = Model::read(&mut f)?;
    info!(
        "# of tags: {}, # of tokens: {}",
        model.n_tags(),
        model.n_tokens()
    );

    if let Some(path) = args.dump_transitions {
        info!("Saving transition file...");
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for (from_id, from) in model.tags().iter().enumerate() {
            for (to_id, to) in model.tags().iter().enumerate() {
                let log_prob = model.transition(from_id, to_id);
                if log_prob == f64::NEG_INFINITY {
                    continue;
                }
                wtr.serialize(TransitionRecord { from, to, log_prob })?;
            }
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_emissions {
        info!("Saving emission file...");
        let mut rows: Vec<_> = model.iter_emissions().collect();
        rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for (token, row) in rows {
            for (tag, &log_prob) in model.tags().iter().zip(row) {
                if log_prob == f64::NEG_INFINITY {
                    continue;
                }
                wtr.serialize(EmissionRecord {
                    token,
                    tag,
                    log_prob,
                })?;
            }
        }
        wtr.flush()?;
    }

    Ok(())
}
