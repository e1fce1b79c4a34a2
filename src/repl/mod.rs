use log::{ error, info };
use std::error::Error;
use std::io::{ self, Write };
use std::path::Path;
use tokio::io::{ AsyncBufReadExt, BufReader, Lines, Stdin };

use crate::session::{ ChatSession, LoadOutcome };

/// One dispatched line of input. Command keywords are matched
/// case-insensitively; a load filename keeps the case it was typed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save,
    Load(String),
    Say(String),
    Blank,
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Blank;
    }

    let lowered = trimmed.to_lowercase();
    if lowered == "exit" || lowered == "quit" {
        return Command::Quit;
    }
    if lowered == "save" {
        return Command::Save;
    }
    if lowered.starts_with("load ") {
        // "load " is ASCII, so slicing the original line at 5 is safe
        return Command::Load(trimmed[5..].trim().to_string());
    }

    Command::Say(trimmed.to_string())
}

enum ReadOutcome {
    Line(String),
    Interrupted,
    Eof,
}

type InputLines = Lines<BufReader<Stdin>>;

async fn read_line(lines: &mut InputLines) -> Result<ReadOutcome, io::Error> {
    tokio::select! {
        line = lines.next_line() => match line? {
            Some(line) => Ok(ReadOutcome::Line(line)),
            None => Ok(ReadOutcome::Eof),
        },
        interrupt = tokio::signal::ctrl_c() => {
            interrupt?;
            Ok(ReadOutcome::Interrupted)
        }
    }
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{}", text);
    io::stdout().flush()
}

fn report_save(session: &ChatSession) {
    match session.save(None) {
        Ok(path) => println!("\nChat history saved to {}", path.display()),
        Err(e) => println!("\nError: {}", e),
    }
}

async fn offer_save(
    session: &ChatSession,
    lines: &mut InputLines,
    question: &str
) -> Result<(), io::Error> {
    prompt(question)?;
    let answer = lines.next_line().await?.unwrap_or_default();
    if answer.trim().eq_ignore_ascii_case("y") {
        report_save(session);
    }
    Ok(())
}

fn print_banner() {
    println!("Welcome to the terminal chat client!");
    println!("Type 'exit' or 'quit' to end the chat");
    println!("Type 'save' to save the chat history");
    println!("Type 'load <filename>' to load a previous chat");
    println!("{}", "-".repeat(50));
}

/// The interactive loop: read one line, dispatch it, print the outcome, and
/// keep going. Every completion or file failure is reported and survived; the
/// only exits are quit commands, end of input, and a first interrupt signal,
/// all of which end the process cleanly after an optional save.
pub async fn run(session: &mut ChatSession) -> Result<(), Box<dyn Error + Send + Sync>> {
    print_banner();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt("\nYou: ")?;
        let line = match read_line(&mut lines).await? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted => {
                println!();
                offer_save(
                    session,
                    &mut lines,
                    "Chat interrupted. Would you like to save the history? (y/n): "
                ).await?;
                return Ok(());
            }
            ReadOutcome::Eof => {
                println!();
                return Ok(());
            }
        };

        match parse_command(&line) {
            Command::Quit => {
                offer_save(
                    session,
                    &mut lines,
                    "Would you like to save the chat history? (y/n): "
                ).await?;
                println!("Goodbye!");
                return Ok(());
            }
            Command::Save => {
                report_save(session);
            }
            Command::Load(filename) => {
                match session.load(Path::new(&filename)) {
                    Ok(LoadOutcome::Loaded(count)) => {
                        info!("restored {} messages from {}", count, filename);
                        println!("Loaded chat history from {}", filename);
                    }
                    Ok(LoadOutcome::FileMissing) => {
                        println!("No file named {}; starting with an empty history", filename);
                    }
                    Ok(LoadOutcome::InvalidJson(_)) => {
                        println!("Error: {} is not a valid JSON file", filename);
                    }
                    Err(e) => println!("\nError: {}", e),
                }
            }
            Command::Say(text) => {
                match session.submit(&text).await {
                    Ok(reply) => println!("\nBot: {}", reply),
                    Err(e) => {
                        error!("completion failed: {}", e);
                        println!("\nError: {}", e);
                        println!("Please try again or type 'exit' to quit");
                    }
                }
            }
            Command::Blank => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keywords_are_case_insensitive() {
        assert_eq!(parse_command("exit"), Command::Quit);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("  Exit  "), Command::Quit);
    }

    #[test]
    fn save_keyword_is_case_insensitive() {
        assert_eq!(parse_command("save"), Command::Save);
        assert_eq!(parse_command("SAVE"), Command::Save);
    }

    #[test]
    fn load_keeps_the_filename_as_typed() {
        assert_eq!(
            parse_command("load Notes.json"),
            Command::Load("Notes.json".to_string())
        );
        assert_eq!(
            parse_command("LOAD  old_chat.json "),
            Command::Load("old_chat.json".to_string())
        );
    }

    #[test]
    fn bare_load_is_a_message_not_a_command() {
        assert_eq!(parse_command("load"), Command::Say("load".to_string()));
    }

    #[test]
    fn anything_else_is_a_message() {
        assert_eq!(
            parse_command("  what is rust?  "),
            Command::Say("what is rust?".to_string())
        );
        assert_eq!(
            parse_command("saved you a seat"),
            Command::Say("saved you a seat".to_string())
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_command(""), Command::Blank);
        assert_eq!(parse_command("   "), Command::Blank);
    }
}
