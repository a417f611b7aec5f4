use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use bumpalo::Bump;
use clap::Parser;
use common::{configure, LogConfig};
use weft_parser::{format_errors, format_match, match_to_string, BnfGrammar, Grammar};

/// Match text against a grammar written in BNF.
#[derive(Debug, Parser)]
#[command(name = "weft", version)]
struct Args {
    /// BNF file declaring the grammar
    grammar: PathBuf,

    /// Input to match (stdin when omitted)
    input: Option<PathBuf>,

    /// Rule to start from (defaults to the first rule in the file)
    #[arg(long, value_name = "RULE")]
    start: Option<String>,

    /// Succeed even when the input is not consumed to the end
    #[arg(long)]
    partial: bool,

    /// On failure, list literals that could continue the input
    #[arg(long)]
    suggest: bool,

    /// Print one capture per line with spans instead of an s-expression
    #[arg(long)]
    tree: bool,

    /// Enable debug loggers, e.g. `match,bnf` or `*` (overrides WEFT_LOG)
    #[arg(long, value_name = "LOGGERS")]
    log: Option<String>,

    /// Logger verbosity, 1 to 3
    #[arg(long, value_name = "N", requires = "log")]
    log_level: Option<u8>,
}

fn main() {
    let args = Args::parse();

    if let Some(spec) = &args.log {
        configure(LogConfig::parse(spec, args.log_level));
    }

    let bnf_text = read_file(&args.grammar);
    let mut grammar = build_grammar(&args, &bnf_text);
    grammar.set_allow_partial_match(args.partial);

    let (input_name, input) = match &args.input {
        Some(path) => (path.display().to_string(), read_file(path)),
        None => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            ("<stdin>".to_string(), buf)
        }
    };
    let input = input.trim_end_matches(['\n', '\r']);

    let arena = Bump::new();
    let m = grammar.parse(&arena, input);
    if m.success() {
        if args.tree {
            print!("{}", format_match(&m, 0));
        } else {
            println!("{}", match_to_string(&m));
        }
        return;
    }

    eprint!("{}", format_errors(&[m.error()], &input_name));
    if args.suggest {
        let possibilities = m.possibilities();
        if !possibilities.is_empty() {
            let quoted: Vec<String> = possibilities.iter().map(|p| format!("'{}'", p)).collect();
            eprintln!("possible continuations: {}", quoted.join(", "));
        }
    }
    process::exit(1);
}

fn build_grammar(args: &Args, text: &str) -> Grammar {
    let bnf = BnfGrammar::new();
    let built = match &args.start {
        Some(start) => bnf.build(text, start),
        None => bnf.build_from_first(text),
    };
    built.unwrap_or_else(|e| {
        eprintln!("{}: {}", args.grammar.display(), e);
        process::exit(1);
    })
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        process::exit(1);
    })
}
