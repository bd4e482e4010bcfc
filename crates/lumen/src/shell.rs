// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lumen shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output,
//! and readline history. Every turn goes through the agent, so profile
//! facts and memories accumulate as the conversation goes on.

use std::io::Write;

use colored::Colorize;
use lumen_agent::AgentCore;
use lumen_config::LumenConfig;
use lumen_core::LumenError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// A line typed at the shell prompt.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Reset,
    Profile,
    Empty,
    Message(&'a str),
}

fn parse_input(line: &str) -> ShellInput<'_> {
    match line.trim() {
        "/quit" | "/exit" => ShellInput::Quit,
        "/reset" => ShellInput::Reset,
        "/profile" => ShellInput::Profile,
        "" => ShellInput::Empty,
        text => ShellInput::Message(text),
    }
}

/// Runs the `lumen shell` interactive REPL.
pub async fn run_shell(config: LumenConfig) -> Result<(), LumenError> {
    let agent = crate::build_agent(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| LumenError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "lumen shell".bold().green());
    println!(
        "Type {} to exit, {} to clear the conversation, {} to show what I know about you.\n",
        "/quit".yellow(),
        "/reset".yellow(),
        "/profile".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => match parse_input(&line) {
                ShellInput::Quit => break,
                ShellInput::Empty => continue,
                ShellInput::Reset => {
                    agent.reset_session().await;
                    println!("{}", "conversation cleared".dimmed());
                }
                ShellInput::Profile => match crate::render_profile(&agent.profile().await) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                },
                ShellInput::Message(text) => {
                    let _ = rl.add_history_entry(&line);
                    handle_message(&agent, config.agent.stream, text).await;
                }
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Sends one message to the agent and prints the reply.
async fn handle_message(agent: &AgentCore, stream: bool, text: &str) {
    if stream {
        agent
            .respond_stream(text, |chunk| {
                print!("{chunk}");
                std::io::stdout().flush().ok();
            })
            .await;
        println!();
    } else {
        let reply = agent.respond(text).await;
        println!("{reply}");
    }
    println!();
}
