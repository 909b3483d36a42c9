//! Interactive shell over a `PathTree` session.
//!
//! ```text
//! cargo run --example shell -- --state saved.txt --log-level debug
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use pathtree::{FsBackend, PathTree};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "In-memory file system shell")]
struct Args {
    /// State file to load before the first prompt
    #[arg(long)]
    state: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut fs = PathTree::new();
    if let Some(state) = &args.state {
        fs.load(state)?;
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}$ ", fs.cwd().display());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = tokens.split_first() else {
            continue;
        };
        if command == "exit" {
            break;
        }
        if let Err(message) = dispatch(&mut fs, command, rest) {
            println!("{message}");
        }
    }

    println!("Exiting the file system.");
    Ok(())
}

/// Runs one command. Usage mistakes and store errors both come back as the line to print.
fn dispatch(fs: &mut PathTree, command: &str, args: &[&str]) -> Result<(), String> {
    let result = match (command, args) {
        ("mkdir", [name]) => fs.mkdir(name),
        ("cd", [path]) => fs.cd(path),
        ("ls", []) | ("ls", [_]) => {
            let target = args.first().copied().unwrap_or(".");
            fs.ls(target).map(|names| names.for_each(|name| println!("{name}")))
        }
        ("touch", [name]) => fs.touch(name),
        ("cat", [name]) => fs.read(name).map(|content| println!("{content}")),
        ("echo", [content, name, ..]) => fs.write(name, content),
        ("rm", [path]) => fs.rm(path),
        ("cp", [from, to]) => fs.cp(from, to),
        ("mv", [from, to]) => fs.mv(from, to),
        ("save_state", [file]) => fs
            .save(file)
            .map(|_| println!("File system state saved to {file}")),
        ("load_state", [file]) => fs
            .load(file)
            .map(|_| println!("File system state loaded from {file}")),
        _ => return Err(usage(command)),
    };
    result.map_err(|e| e.to_string())
}

fn usage(command: &str) -> String {
    let usage = match command {
        "mkdir" => "mkdir <directory_name>",
        "cd" => "cd <path>",
        "ls" => "ls [path]",
        "touch" => "touch <file_name>",
        "cat" => "cat <file_name>",
        "echo" => "echo <content> <file_name>",
        "rm" => "rm <path>",
        "cp" => "cp <source> <destination>",
        "mv" => "mv <source> <destination>",
        "save_state" => "save_state <file_path>",
        "load_state" => "load_state <file_path>",
        _ => return format!("Invalid command: {command}"),
    };
    format!("Usage: {usage}")
}
