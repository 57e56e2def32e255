//! One-shot and interactive question answering on top of the advocate.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use pakkibl_ai::CategoryClassifier;
use pakkibl_core::{Conversation, QueryError};
use pakkibl_llm::{Advocate, Answer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::display;

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Ask(&'a str),
    Attach(&'a str),
    Clear,
    Save,
    Stats,
    Reload,
    Help,
    Quit,
    Unknown(&'a str),
}

pub fn parse_line(line: &str) -> ChatCommand<'_> {
    let line = line.trim();
    let Some(cmd) = line.strip_prefix('/') else {
        return ChatCommand::Ask(line);
    };
    let (name, arg) = cmd.split_once(char::is_whitespace).unwrap_or((cmd, ""));
    match name {
        "attach" if !arg.trim().is_empty() => ChatCommand::Attach(arg.trim()),
        "clear" => ChatCommand::Clear,
        "save" => ChatCommand::Save,
        "stats" => ChatCommand::Stats,
        "reload" => ChatCommand::Reload,
        "help" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        _ => ChatCommand::Unknown(line),
    }
}

/// Media types accepted for attached documents.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// Record a document's metadata on the conversation.
pub async fn attach(conversation: &mut Conversation, path: &Path) -> anyhow::Result<()> {
    let media_type = media_type_for(path).with_context(|| {
        format!(
            "unsupported document type: {} (use pdf, txt or docx)",
            path.display()
        )
    })?;
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if conversation.attach_document(&name, media_type, meta.len(), chrono::Utc::now()) {
        println!("Attached {name} ({} bytes)", meta.len());
    } else {
        println!("{name} is already attached");
    }
    Ok(())
}

/// Answer one question, streaming the reply to stdout.
pub async fn ask(
    advocate: &Advocate,
    conversation: &mut Conversation,
    query: &str,
) -> Result<Answer, QueryError> {
    let mut streamed = String::new();
    let answer = advocate
        .answer_streaming(conversation, query, &mut |delta: &str| {
            print!("{delta}");
            let _ = std::io::stdout().flush();
            streamed.push_str(delta);
        })
        .await?;

    match &answer.failure {
        None => {
            // The disclaimer is appended after streaming finishes.
            if let Some(rest) = answer.text.strip_prefix(streamed.as_str()) {
                print!("{rest}");
            }
            println!();
        }
        Some(err) => eprintln!("{}  ({err})", answer.text),
    }
    println!("{}", display::citation_footer(&answer.routing));
    if let Some(err) = &answer.speech_failure {
        eprintln!("Speech unavailable: {err}");
    }
    Ok(answer)
}

/// Interactive loop over stdin.
///
/// `reload` rebuilds the classifier from its sources; the new model is
/// swapped in for subsequent questions.
pub async fn run_chat<F>(
    advocate: &Advocate,
    reload: F,
    transcript: Option<&Path>,
) -> anyhow::Result<()>
where
    F: Fn() -> anyhow::Result<Arc<dyn CategoryClassifier>>,
{
    let mut conversation = Conversation::new();
    println!("{}", conversation.messages()[0].content);
    println!("Type /help for commands.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Help => print_help(),
            ChatCommand::Clear => {
                conversation.clear();
                println!("Chat cleared.");
            }
            ChatCommand::Save => {
                let saved = conversation.save(chrono::Utc::now());
                println!(
                    "Conversation saved ({} messages at {}).",
                    saved.messages.len(),
                    saved.timestamp.to_rfc3339()
                );
            }
            ChatCommand::Stats => {
                display::print_stats(conversation.stats(), conversation.total_queries())
            }
            ChatCommand::Reload => match reload() {
                Ok(classifier) => {
                    let name = classifier.name().to_string();
                    advocate.classifier().swap(classifier);
                    println!("Reloaded {name} classifier.");
                }
                Err(err) => eprintln!("Reload failed, keeping current classifier: {err:#}"),
            },
            ChatCommand::Attach(path) => {
                if let Err(err) = attach(&mut conversation, Path::new(path)).await {
                    eprintln!("{err:#}");
                }
            }
            ChatCommand::Unknown(cmd) => eprintln!("Unknown command {cmd}; type /help"),
            ChatCommand::Ask(query) => match ask(advocate, &mut conversation, query).await {
                Ok(_) => println!(),
                Err(QueryError::Empty) => println!("Please describe your legal issue."),
                Err(err) => eprintln!("{err}"),
            },
        }
    }

    if let Some(path) = transcript {
        if conversation.saved().is_empty() {
            conversation.save(chrono::Utc::now());
        }
        let json = conversation
            .transcript_json()
            .context("serialising transcript")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing transcript to {}", path.display()))?;
        info!(path = %path.display(), snapshots = conversation.saved().len(), "wrote transcript");
        println!("Transcript written to {}", path.display());
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /attach <file>  attach a pdf, txt or docx document");
    println!("  /clear          start a fresh chat");
    println!("  /save           save a snapshot of this chat");
    println!("  /stats          show message counts");
    println!("  /reload         refit the classifier from its sources");
    println!("  /quit           leave");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_line("  My salary is unpaid "),
            ChatCommand::Ask("My salary is unpaid")
        );
        assert_eq!(parse_line("   "), ChatCommand::Ask(""));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_line("/clear"), ChatCommand::Clear);
        assert_eq!(parse_line("/save"), ChatCommand::Save);
        assert_eq!(parse_line("/stats"), ChatCommand::Stats);
        assert_eq!(parse_line("/reload"), ChatCommand::Reload);
        assert_eq!(parse_line("/exit"), ChatCommand::Quit);
        assert_eq!(parse_line("/attach  lease.pdf "), ChatCommand::Attach("lease.pdf"));
        assert_eq!(parse_line("/attach"), ChatCommand::Unknown("/attach"));
        assert_eq!(parse_line("/dance"), ChatCommand::Unknown("/dance"));
    }

    #[test]
    fn media_types() {
        assert_eq!(media_type_for(Path::new("lease.PDF")), Some("application/pdf"));
        assert_eq!(media_type_for(Path::new("notes.txt")), Some("text/plain"));
        assert!(media_type_for(Path::new("deed.docx")).is_some());
        assert_eq!(media_type_for(Path::new("photo.png")), None);
        assert_eq!(media_type_for(Path::new("README")), None);
    }
}
