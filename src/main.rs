//! Opencirc - boolean circuit toolbox
//!
//! Builds circuits from adders, Hamming codes or formulas, simplifies them
//! with the rewrite engine and evaluates them.
//!
//! # Usage
//!
//! ```bash
//! opencirc add 200 100 --width 8
//! opencirc eval "a & b" "a ^ b" --inputs 11
//! opencirc simplify "~~x & x" --dot out.dot
//! opencirc hamming 11 --flip 3
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use opencirc_core::{
    builders, dsl,
    error::Result,
    export::save_dot,
    Circuit, RewriteConfig,
};
use tracing::info;

/// Boolean circuit builder, simplifier and evaluator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Evaluate without running the rewrite engine first
    #[arg(long, global = true)]
    no_simplify: bool,

    /// Disable idempotence and absorption rules
    #[arg(long, global = true)]
    no_bonus: bool,

    /// Write the final circuit as a Graphviz file
    #[arg(long, global = true, value_name = "PATH")]
    dot: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add two integers with a ripple-carry adder
    Add {
        a: u64,
        b: u64,
        /// Register width in bits, rounded up to a power of two
        #[arg(short, long)]
        width: Option<usize>,
    },
    /// Evaluate formulas on the given input bits
    Eval {
        #[arg(required = true)]
        formulas: Vec<String>,
        /// One bit per variable, in order of first appearance
        #[arg(short, long, value_parser = parse_bits)]
        inputs: Option<Bits>,
    },
    /// Simplify formulas and report which rules fired
    Simplify {
        #[arg(required = true)]
        formulas: Vec<String>,
    },
    /// Encode a 4-bit message, flip bits, then decode it
    Hamming {
        message: u64,
        /// Codeword positions to flip, 0 being the leftmost
        #[arg(short, long, value_delimiter = ',')]
        flip: Vec<usize>,
    },
}

/// Input bits given as a string such as `0110`.
#[derive(Clone, Debug, Default)]
struct Bits(Vec<bool>);

fn parse_bits(text: &str) -> std::result::Result<Bits, String> {
    text.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(format!("expected 0 or 1, got {:?}", other)),
        })
        .collect::<std::result::Result<Vec<bool>, String>>()
        .map(Bits)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = RewriteConfig::new().with_bonus_rules(!args.no_bonus);

    match &args.command {
        Command::Add { a, b, width } => {
            let width = width.unwrap_or((u64::BITS - (a | b).leading_zeros()) as usize);
            let circuit = builders::bind_registers(*a, *b, width)?;
            println!("{}", prepare(circuit, &args, &config)?.evaluate()?);
        }
        Command::Eval { formulas, inputs } => {
            let refs: Vec<&str> = formulas.iter().map(String::as_str).collect();
            let (circuit, vars) = dsl::parse_formulas(&refs)?;
            info!(variables = ?vars, "parsed formulas");
            let bits = inputs.clone().unwrap_or_default().0;
            let bound = circuit.compose(&Circuit::register_bits(&bits)?)?;
            let bits = prepare(bound, &args, &config)?.evaluate_bits()?;
            for (formula, bit) in formulas.iter().zip(bits) {
                println!("{} = {}", formula, u8::from(bit));
            }
        }
        Command::Simplify { formulas } => {
            let refs: Vec<&str> = formulas.iter().map(String::as_str).collect();
            let (mut circuit, _) = dsl::parse_formulas(&refs)?;
            let before = circuit.len();
            let stats = circuit.simplify_with(&config);
            println!("nodes: {} -> {}", before, circuit.len());
            println!("{}", stats);
            write_dot(&circuit, args.dot.as_deref())?;
        }
        Command::Hamming { message, flip } => {
            let encoded = builders::hamming_encoder()?.compose(&Circuit::register(*message, 4)?)?;
            let noisy = builders::perturb(7, flip)?.compose(&encoded)?;
            println!("codeword: {}", Circuit::binary_string(noisy.evaluate()?, 7));
            let decoded = builders::hamming_decoder()?.compose(&noisy)?;
            println!("decoded:  {}", Circuit::binary_string(prepare(decoded, &args, &config)?.evaluate()?, 4));
        }
    }
    Ok(())
}

/// Simplify a bound circuit unless disabled, and dump it if asked.
fn prepare(mut circuit: Circuit, args: &Args, config: &RewriteConfig) -> Result<Circuit> {
    if !args.no_simplify {
        circuit.simplify_with(config);
    }
    write_dot(&circuit, args.dot.as_deref())?;
    Ok(circuit)
}

fn write_dot(circuit: &Circuit, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => save_dot(circuit.graph(), path, false),
        None => Ok(()),
    }
}
