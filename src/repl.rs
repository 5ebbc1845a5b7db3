//! Line-oriented interactive surface: question input, a web-search toggle,
//! the response panel with cited sources, and the chat-history panel.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use tracing::info;

use crate::groq::CompletionClient;
use crate::lang::Classification;
use crate::serp::{SearchProvider, SearchResult};
use crate::session::ChatSession;
use crate::translate::{Detector, Translator};
use crate::turn::{TurnError, run_turn};

const BANNER: &str = "Ask me anything in English or Thanglish. I'll answer with the LLaMA model \
and can search the web for up-to-date information.";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Ask(&'a str),
    SearchOn,
    SearchOff,
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed {
        "/quit" | "/exit" => Command::Quit,
        "/history" => Command::History,
        "/help" => Command::Help,
        "/search on" => Command::SearchOn,
        "/search off" => Command::SearchOff,
        _ if trimmed.starts_with('/') => Command::Unknown(trimmed),
        _ => Command::Ask(trimmed),
    }
}

fn help_text() -> String {
    [
        "/search on   enable web search for upcoming questions",
        "/search off  disable web search (default)",
        "/history     show the chat history",
        "/help        show this help",
        "/quit        exit",
    ]
    .join("\n")
}

/// Numbered source list shown under a search-augmented answer.
fn format_sources(results: &[SearchResult]) -> String {
    let mut out = String::from("Sources:\n");
    for (idx, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {}\n     {}\n     {}\n",
            idx + 1,
            result.title,
            result.snippet,
            result.link
        ));
    }
    out
}

/// Chronological history panel, oldest first.
fn format_history(session: &ChatSession) -> String {
    if session.is_empty() {
        return "No chat history yet.".to_string();
    }

    let mut out = String::from("Chat history\n");
    for turn in session.turns() {
        out.push_str(&format!("You: {}\n", turn.question));
        out.push_str(&format!("Assistant: {}\n", turn.response));
        if !turn.search_results.is_empty() {
            out.push_str("Web sources:\n");
            for (idx, result) in turn.search_results.iter().enumerate() {
                out.push_str(&format!("  {}. {} ({})\n", idx + 1, result.title, result.link));
            }
        }
        out.push_str("---\n");
    }
    out
}

/// Runs the interactive loop until `/quit` or end of input. One submission
/// at a time; the session log lives here for the whole run.
pub async fn run(
    detector: &impl Detector,
    translator: &impl Translator,
    search: &impl SearchProvider,
    completion: &impl CompletionClient,
) -> io::Result<()> {
    let mut session = ChatSession::new();
    let mut search_enabled = false;

    println!("{}", BANNER);
    println!("{}", "Type /help for commands.".dimmed());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", "you>".cyan().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_command(trimmed) {
            Command::Quit => break,
            Command::Help => println!("{}", help_text()),
            Command::History => println!("{}", format_history(&session)),
            Command::SearchOn => {
                search_enabled = true;
                info!("web search enabled");
                println!("{}", "Web search enabled.".green());
            }
            Command::SearchOff => {
                search_enabled = false;
                info!("web search disabled");
                println!("{}", "Web search disabled.".green());
            }
            Command::Unknown(cmd) => {
                println!("{}", format!("Unknown command: {cmd}. Type /help.").yellow());
            }
            Command::Ask(question) => {
                println!("{}", "Generating response...".dimmed());
                let outcome = run_turn(
                    detector,
                    translator,
                    search,
                    completion,
                    &mut session,
                    question,
                    search_enabled,
                )
                .await;

                match outcome {
                    Ok(outcome) => {
                        if outcome.classification == Classification::Mixed {
                            println!("{}", "Thanglish detected, replying in the same mix.".dimmed());
                        }
                        if let Some(warning) = &outcome.warning {
                            println!("{}", warning.yellow());
                        }
                        println!("\n{}", outcome.response);
                        if !outcome.search_results.is_empty() {
                            println!("\n{}", format_sources(&outcome.search_results).dimmed());
                        }
                    }
                    Err(TurnError::EmptyQuestion) => continue,
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
        }
    }

    println!("{}", "Bye.".dimmed());
    Ok(())
}
