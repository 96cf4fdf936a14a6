use abscm::{
    Environment, Error, ErrorKind, Object, Reader, create_global_environment, eval, parse_all,
    with_eval_stack,
};
use log::{info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

const HISTORY_FILE: &str = ".abscm_history";

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}

/// True while `buffer` ends inside an unfinished expression.
fn needs_more_input(buffer: &str) -> bool {
    matches!(parse_all(buffer), Err(e) if e.kind == ErrorKind::IncompleteInput)
}

fn describe(e: &Error) -> String {
    if e.is_parse_error() {
        format!("Parse error: {e}")
    } else {
        format!("Error: {e}")
    }
}

/// Evaluate every expression in `buffer`, printing each result. An
/// evaluation error skips to the next expression; a parse error drops the
/// rest of the buffer.
fn evaluate_buffer(buffer: &str, env: &Environment) {
    for expr in Reader::from_text(buffer) {
        match expr {
            Ok(expr) => match eval(&expr, env) {
                Ok(result) => println!("{result}"),
                Err(e) => eprintln!("{}", describe(&e)),
            },
            Err(e) => {
                eprintln!("{}", describe(&e));
                break;
            }
        }
    }
}

fn repl() -> rustyline::Result<()> {
    let env = create_global_environment();
    let mut editor = DefaultEditor::new()?;

    let history = history_path();
    if let Some(path) = &history {
        if editor.load_history(path).is_err() {
            info!("no history at {}", path.display());
        }
    }

    println!("and but scheme.");
    info!("session started with {} global bindings", env.global_len());

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "> " } else { ". " };
        match editor.readline(prompt) {
            Ok(line) => {
                buffer.push_str(&line);
                buffer.push('\n');
                if needs_more_input(&buffer) {
                    continue;
                }
                if !buffer.trim().is_empty() {
                    editor.add_history_entry(buffer.trim())?;
                    evaluate_buffer(&buffer, &env);
                }
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => buffer.clear(),
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            warn!("could not save history to {}: {e}", path.display());
        }
    }
    Ok(())
}

fn run_file(filename: &str) -> Result<(), String> {
    let contents = fs::read_to_string(filename)
        .map_err(|e| format!("Failed to read file '{filename}': {e}"))?;
    info!("running {filename}");

    let env = create_global_environment();
    let mut last_result: Option<Object> = None;
    for expr in Reader::from_text(&contents) {
        let expr = expr.map_err(|e| describe(&e))?;
        last_result = Some(eval(&expr, &env).map_err(|e| describe(&e))?);
    }

    if let Some(result) = last_result {
        println!("{result}");
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  abscm              Start interactive REPL");
    eprintln!("  abscm <file.scm>   Run a source file");
    eprintln!("  abscm --help       Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to trace definitions.");
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => {
            let outcome = with_eval_stack(|| repl().map_err(|e| e.to_string()));
            if let Err(e) = outcome.map_err(|e| e.to_string()).and_then(|r| r) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        2 => {
            let arg = args[1].clone();
            if arg == "--help" || arg == "-h" {
                print_usage();
                return;
            }
            let outcome = with_eval_stack(move || run_file(&arg));
            if let Err(e) = outcome.map_err(|e| e.to_string()).and_then(|r| r) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Error: Too many arguments");
            print_usage();
            process::exit(1);
        }
    }
}
