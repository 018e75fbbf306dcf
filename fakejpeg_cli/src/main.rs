// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use fakejpeg::options::{DEFAULT_SCAN_LENGTH_SLACK_PERCENT, DEFAULT_SCAN_MASK};
use fakejpeg::{Generator, GeneratorOptions, TemplateStore};
use fakejpeg_cli::bench;
use fakejpeg_cli::files::{example_path, read_inputs, write_output_file};
use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

#[derive(Parser)]
#[command(name = "fakejpeg")]
#[command(about = "Build JPEG templates and generate fake JPEG files from them", long_about = None)]
struct Opt {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a template store from real JPEG files
    Build {
        /// Where to write the template store
        #[arg(short, long)]
        output: PathBuf,

        /// Source JPEG files; files that fail to parse are reported and skipped
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Generate one fake JPEG
    Generate {
        /// Template store built with `build`
        store: PathBuf,

        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        gen_args: GenArgs,
    },
    /// Write a directory of example files, named example0.jpg, example1.jpg, ...
    Examples {
        /// Template store built with `build`
        store: PathBuf,

        /// Output directory, created if missing
        dir: PathBuf,

        /// Number of files to write
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        #[command(flatten)]
        gen_args: GenArgs,
    },
    /// Measure generation speed, then emit one fake JPEG
    Bench {
        /// Template store built with `build`
        store: PathBuf,

        /// How long to generate for
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,

        /// Output file for the final JPEG; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        gen_args: GenArgs,
    },
}

#[derive(Args)]
struct GenArgs {
    /// Insert a COM segment with this text
    #[arg(long)]
    comment: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Mask ANDed into every scan byte (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_mask, default_value_t = DEFAULT_SCAN_MASK)]
    scan_mask: u8,

    /// Maximum growth of each scan over its template length, in percent
    #[arg(long, default_value_t = DEFAULT_SCAN_LENGTH_SLACK_PERCENT)]
    slack_percent: usize,
}

impl GenArgs {
    fn generator(&self) -> Result<Generator> {
        Generator::new(GeneratorOptions {
            scan_mask: self.scan_mask,
            scan_length_slack_percent: self.slack_percent,
        })
        .wrap_err("Invalid generator options")
    }

    fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(seed) => Box::new(XorShiftRng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        }
    }
}

fn parse_mask(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid mask {s:?}: {e}"))
}

fn load_store(path: &Path) -> Result<TemplateStore> {
    let bytes =
        fs::read(path).wrap_err_with(|| format!("Cannot read template store {}", path.display()))?;
    let store = TemplateStore::from_bytes(&bytes)
        .wrap_err_with(|| format!("Cannot load template store {}", path.display()))?;
    if store.is_empty() {
        return Err(eyre!("Template store {} is empty", path.display()));
    }
    Ok(store)
}

fn emit(output: Option<&Path>, jpeg: &[u8]) -> Result<()> {
    match output {
        Some(path) => write_output_file(path, jpeg),
        None => std::io::stdout()
            .lock()
            .write_all(jpeg)
            .wrap_err("Cannot write to stdout"),
    }
}

fn build(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let buffers = read_inputs(inputs, |path, err| {
        eprintln!("Failed to read {}: {err}", path.display());
    });
    let store = TemplateStore::from_buffers_parallel(&buffers, |id, err| {
        eprintln!("Failed to decode {id}: {err}");
    });
    eprintln!(
        "Built {} templates from {} files",
        store.len(),
        inputs.len()
    );
    write_output_file(output, &store.to_bytes()?)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    match Opt::parse().command {
        Command::Build { output, inputs } => build(&inputs, &output),
        Command::Generate {
            store,
            output,
            gen_args,
        } => {
            let store = load_store(&store)?;
            let generator = gen_args.generator()?;
            let mut rng = gen_args.rng();
            let jpeg = generator.generate(&store, gen_args.comment.as_deref(), &mut *rng)?;
            emit(output.as_deref(), &jpeg)
        }
        Command::Examples {
            store,
            dir,
            count,
            gen_args,
        } => {
            let store = load_store(&store)?;
            let generator = gen_args.generator()?;
            let mut rng = gen_args.rng();
            for i in 0..count {
                let jpeg = generator.generate(&store, gen_args.comment.as_deref(), &mut *rng)?;
                write_output_file(&example_path(&dir, i), &jpeg)?;
            }
            Ok(())
        }
        Command::Bench {
            store,
            seconds,
            output,
            gen_args,
        } => {
            let duration = Duration::try_from_secs_f64(seconds)
                .map_err(|e| eyre!("Invalid duration {seconds}: {e}"))?;
            let store = load_store(&store)?;
            let generator = gen_args.generator()?;
            let comment = gen_args.comment.as_deref();
            let mut rng = gen_args.rng();
            eprintln!("Benchmarking for {seconds} seconds");
            let stats = bench::run_for(&generator, &store, comment, &mut *rng, duration)?;
            eprintln!(
                "Average JPEG generation time: {:.3} ms",
                stats.millis_per_file()
            );
            eprintln!(
                "Average generation bandwidth: {:.1} MBytes/second",
                stats.mib_per_second()
            );
            let jpeg = generator.generate(&store, comment, &mut *rng)?;
            emit(output.as_deref(), &jpeg)
        }
    }
}
