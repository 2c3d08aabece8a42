//! Command-line driver: compress the first line of a text file and verify
//! the written artifact by round-trip decoding.

use std::env;
use std::process;

use parhuff::{bits, pipeline, ExecutionMode, HuffmanConfig};

const DEFAULT_OUTPUT: &str = "output.bin";

fn usage(program: &str) -> ! {
    eprintln!(
        "usage: {program} <filename> <n_mappers> <n_reducers> <n_encoders> [threads|rayon]"
    );
    eprintln!("  n_reducers = 0 selects the direct-fold merge strategy");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("parhuff");
    if args.len() < 5 || args.len() > 6 {
        usage(program);
    }

    let filename = &args[1];
    let n_mappers: usize = args[2].parse().unwrap_or_else(|_| usage(program));
    let n_reducers: usize = args[3].parse().unwrap_or_else(|_| usage(program));
    let n_encoders: usize = args[4].parse().unwrap_or_else(|_| usage(program));
    let mode = match args.get(5).map(String::as_str) {
        None | Some("threads") => ExecutionMode::Threads,
        Some("rayon") => ExecutionMode::Rayon,
        Some(_) => usage(program),
    };

    let config = HuffmanConfig {
        n_mappers,
        n_reducers,
        n_encoders,
        mode,
    };

    let (compressed, timings) = match pipeline::compress_file(filename, DEFAULT_OUTPUT, &config) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("{program}: {err}");
            process::exit(1);
        }
    };

    println!("aggregation time:   {} us", timings.aggregation.as_micros());
    println!("tree+codebook time: {} us", timings.tree_codebook.as_micros());
    println!("encoding time:      {} us", timings.encoding.as_micros());
    println!("output: {DEFAULT_OUTPUT} ({} bytes)", compressed.packed.len());

    let original = match bits::read_input(filename) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("{program}: {err}");
            process::exit(1);
        }
    };
    match pipeline::verify(&compressed.packed, &compressed.tree, &original) {
        Ok(true) => println!("round-trip check: ok"),
        Ok(false) => {
            eprintln!("{program}: round-trip check failed");
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{program}: {err}");
            process::exit(1);
        }
    }
}
