//! Command-line entry point: `brawl <script>`.

use std::env;
use std::fs;
use std::process;
use std::thread;

use brawl::{run_script, RunConfig};

/// Stack reservation for the evaluation thread. Deep recursion in a
/// script consumes native stack frames, so the interpreter's own
/// call-depth limit must be the binding constraint, not the OS
/// default thread stack.
const EVAL_STACK_BYTES: usize = 512 * 1024 * 1024;

fn usage(program: &str) {
    println!("Usage: {} <script_file>", program);
    println!("  <script_file>: Path to the Brawl script to execute.");
    println!();
    println!("Diagnostics are controlled through RUST_LOG, e.g.");
    println!("  RUST_LOG=brawl=debug {} script.brawl", program);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("brawl");
    if args.len() < 2 {
        usage(program);
        process::exit(1);
    }

    let path = args[1].clone();
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading script '{}': {}", path, err);
            process::exit(1);
        }
    };

    let worker = {
        let path = path.clone();
        let source = source.clone();
        thread::Builder::new()
            .name("brawl-eval".to_string())
            .stack_size(EVAL_STACK_BYTES)
            .spawn(move || run_script(&path, &source, RunConfig::default()))
    };

    let result = match worker {
        Ok(handle) => match handle.join() {
            Ok(result) => result,
            Err(_) => {
                eprintln!("Error: evaluation thread panicked");
                process::exit(1);
            }
        },
        Err(err) => {
            eprintln!("Error spawning evaluation thread: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprint!("{}", err.render_report(&path, &source));
        process::exit(1);
    }
}
