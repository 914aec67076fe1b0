//! socketz CLI Client
//!
//! Command-line interface for talking to a socketz server.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use socketz::client::Client;

/// socketz CLI
#[derive(Parser, Debug)]
#[command(name = "socketz-cli")]
#[command(about = "CLI for the socketz servers")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send lines and print each reply (reads stdin when no line is given)
    Line {
        /// Lines to send, e.g. "echo hello"
        lines: Vec<String>,
    },

    /// Fetch a page from an HTTP server
    Http {
        /// Request path
        #[arg(default_value = "/")]
        path: String,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> socketz::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Line { lines } if lines.is_empty() => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                if !expects_reply(&line) {
                    continue;
                }
                print_reply(client.send_line(&line)?);
            }
        }
        Commands::Line { lines } => {
            for line in lines.iter().filter(|line| expects_reply(line)) {
                print_reply(client.send_line(line)?);
            }
        }
        Commands::Http { path } => {
            let response = client.http_get(&path)?;
            io::stdout().write_all(&response)?;
            println!();
        }
    }

    Ok(())
}

/// Blank lines get no reply from the method server
fn expects_reply(line: &str) -> bool {
    !line.trim().is_empty()
}

fn print_reply(reply: String) {
    println!("[client]recv-message:{}", reply);
}
