// Enumerates every state reachable from a starting expression under the
// do-calculus rewrite rules, without searching for a particular target.

use std::collections::HashMap;
use std::fs;

use clap::Parser;
use doverify::dag::Dag;
use doverify::parser::parse_expression;

#[derive(Parser)]
struct Args {
    // Path to a YAML file mapping each variable to its children.
    #[clap(long)]
    dag: String,

    // The starting probability expression, e.g. "P(Y | do(X))".
    #[clap(long)]
    start: String,

    // Maximum number of rewrite steps to explore.
    #[clap(long, default_value_t = 6)]
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
    let Some(start_term) = start.as_term() else {
        println!("explore only supports a single term, not an ATE difference");
        std::process::exit(1);
    };

    for entry in doverify::search::explore(&g, start_term, args.max_depth) {
        println!("[depth {}] {} ({})", entry.depth, entry.term, entry.rule);
    }
}
