//! Line-oriented terminal input.
//!
//! Lines are read on a spawned task and fed through an mpsc channel, so the
//! command loop only ever awaits `recv()`. Blank lines are skipped; an exit
//! command or EOF closes the channel.

use std::io::Write;

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Commands that end a session.
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

pub fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS.contains(&line)
}

/// Read trimmed, non-empty lines from `reader` until EOF or an exit command.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<io::Result<String>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if is_exit_command(&line) {
                        break;
                    }
                    if tx.send(Ok(line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    break;
                }
            }
        }
    });

    rx
}

pub fn stdin_lines() -> mpsc::Receiver<io::Result<String>> {
    spawn_line_reader(BufReader::new(io::stdin()))
}

pub fn banner(title: &str, details: &[(&str, String)]) {
    println!();
    println!("  ChatDeck — {title}");
    println!();
    for (label, value) in details {
        println!("  {label:<10} {value}");
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();
}

pub fn user_prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

pub fn assistant(text: &str) {
    println!();
    for line in text.lines() {
        println!("  Assistant > {line}");
    }
    println!();
}

pub fn thinking() {
    eprint!("  ...");
}

pub fn clear_thinking() {
    eprint!("\r     \r");
}

pub fn error(e: &dyn std::fmt::Display) {
    eprintln!("  [Error] {e}");
    println!();
}

pub fn goodbye() {
    println!();
    println!("  Goodbye!");
    println!();
}
