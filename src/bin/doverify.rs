// The doverify CLI.
// Loads a causal DAG and searches for a do-calculus proof between two
// probability expressions.

use std::collections::HashMap;
use std::fs;

use clap::Parser;
use doverify::dag::Dag;
use doverify::parser::parse_expression;

#[derive(Parser)]
struct Args {
    // Path to a YAML file mapping each variable to its children, e.g.
    // `X: [Y]` / `Y: []`.
    #[clap(long)]
    dag: String,

    // The starting probability expression, e.g. "P(Y | do(X))".
    #[clap(long)]
    start: String,

    // The target probability expression.
    #[clap(long)]
    target: String,

    // Maximum number of rewrite steps to search.
    #[clap(long, default_value_t = 12)]
    max_depth: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let contents = match fs::read_to_string(&args.dag) {
        Ok(c) => c,
        Err(e) => {
            println!("error reading {}: {}", args.dag, e);
            std::process::exit(1);
        }
    };
    let adjacency: HashMap<String, Vec<String>> = match serde_yaml::from_str(&contents) {
        Ok(a) => a,
        Err(e) => {
            println!("error parsing {}: {}", args.dag, e);
            std::process::exit(1);
        }
    };
    let (g, warnings) = Dag::build(&adjacency);
    for warning in &warnings {
        log::warn!(
            "cycle {:?} detected; removed edge {:?} to break it",
            warning.cycle,
            warning.edge_removed
        );
    }

    let start = match parse_expression(&args.start) {
        Ok(e) => e,
        Err(e) => {
            println!("error parsing start expression: {}", e);
            std::process::exit(1);
        }
    };
    let target = match parse_expression(&args.target) {
        Ok(e) => e,
        Err(e) => {
            println!("error parsing target expression: {}", e);
            std::process::exit(1);
        }
    };

    match doverify::search::find_proof(&g, &start, &target, args.max_depth) {
        Ok(Some(proof)) => {
            print!("{}", proof);
        }
        Ok(None) => {
            println!("no proof found within {} steps", args.max_depth);
            if let Some(start_term) = start.as_term() {
                for suggestion in doverify::suggest::suggest_fix(start_term, &g) {
                    println!("suggestion: {}", suggestion.message);
                }
            }
            std::process::exit(1);
        }
        Err(e) => {
            println!("{}", e);
            std::process::exit(1);
        }
    }
}
