mod calc;
mod lexer;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use lrkit::{Algorithm, Config};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The method used to construct the LR automaton.
    #[arg(long, value_enum, default_value_t = LRAlgorithm::Lalr1)]
    algorithm: LRAlgorithm,

    /// Print the grammar, the automaton and the parse table before evaluating.
    #[arg(long)]
    dump: bool,

    /// The arithmetic expression to evaluate.
    input: String,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum LRAlgorithm {
    Lr0,
    Slr1,
    Lalr1,
    Lr1,
}

impl From<LRAlgorithm> for Algorithm {
    fn from(algorithm: LRAlgorithm) -> Self {
        match algorithm {
            LRAlgorithm::Lr0 => Algorithm::LR0,
            LRAlgorithm::Slr1 => Algorithm::SLR1,
            LRAlgorithm::Lalr1 => Algorithm::LALR1,
            LRAlgorithm::Lr1 => Algorithm::LR1,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let mut config = Config::new();
    config.set_algorithm(args.algorithm.into());

    let calc = calc::Calculator::new(&config)?;
    if args.dump {
        let grammar = calc.grammar();
        println!("{}", grammar);
        println!("{}", config.automaton(grammar).display(grammar));
        println!("{}", calc.table().display(grammar));
    }

    let value = calc
        .eval(&args.input)
        .with_context(|| format!("failed to evaluate {:?}", args.input))?;
    println!("{}", value);

    Ok(())
}
