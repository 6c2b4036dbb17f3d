//! Interactive chat handler
//!
//! Loads the user's sessions into a [`ChatView`], then either sends a single
//! message (`--message` / `--attach`) or runs a readline loop where plain
//! lines go to the assistant and `/` commands manage sessions.

use std::path::PathBuf;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{confirm, require_page};
use crate::app::{AppContext, Route};
use crate::error::{self, Result};
use crate::layout;
use crate::views::ChatView;

/// Start chat
///
/// # Arguments
///
/// * `ctx` - Application context
/// * `session` - Session id (or unique prefix) to open instead of the first
/// * `message` - Send this one message and exit
/// * `attach` - Document to send with `message`
pub async fn run_chat(
    ctx: &AppContext,
    session: Option<String>,
    message: Option<String>,
    attach: Option<PathBuf>,
) -> Result<()> {
    require_page(ctx, Route::Chat)?;
    let api = &ctx.api;

    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(api).await?;
    if let Some(query) = session {
        let id = view.find_session(&query)?;
        view.select_session(api, &id).await?;
    }

    if message.is_some() || attach.is_some() {
        if let Some(path) = attach {
            view.attach_file(&path)?;
        }
        view.input = message.unwrap_or_default();
        if let Some(reply) = view.send_message(api).await? {
            println!("{}", reply);
        }
        return Ok(());
    }

    let mut rl = DefaultEditor::new()?;
    print_welcome_banner(ctx, &view);

    loop {
        let prompt = format_prompt(&view);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e.to_string().red());
                        continue;
                    }
                };

                let outcome = match command {
                    SpecialCommand::Exit => break,
                    SpecialCommand::None => {
                        view.input = trimmed.to_string();
                        send(&mut view, ctx).await
                    }
                    other => handle_special(&mut view, ctx, other).await,
                };

                if let Err(e) = outcome {
                    if error::is_unauthorized(&e) {
                        // The session-expired hook already cleared credentials.
                        break;
                    }
                    let message = view
                        .error()
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string());
                    layout::print_error(&message);
                    view.clear_error();
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn send(view: &mut ChatView, ctx: &AppContext) -> Result<()> {
    if let Some(reply) = view.send_message(&ctx.api).await? {
        println!("\n{}: {}\n", "Assistant".magenta().bold(), reply);
    }
    Ok(())
}

async fn handle_special(view: &mut ChatView, ctx: &AppContext, command: SpecialCommand) -> Result<()> {
    let api = &ctx.api;
    match command {
        SpecialCommand::Help => print_help(),
        SpecialCommand::Sessions => {
            view.load_sessions(api).await?;
            layout::session_table(view.sessions(), view.active_session_id()).printstd();
            println!();
        }
        SpecialCommand::New(title) => {
            view.create_session(api, title.as_deref()).await?;
            layout::print_notice("Started a new conversation");
        }
        SpecialCommand::Switch(query) => {
            let id = view.find_session(&query)?;
            view.select_session(api, &id).await?;
            print_active(view);
        }
        SpecialCommand::Delete(query) => {
            let id = match query {
                Some(query) => view.find_session(&query)?,
                None => match view.active_session_id() {
                    Some(id) => id.to_string(),
                    None => return Ok(()),
                },
            };
            let confirmed = confirm("Delete this conversation?")?;
            if view.delete_session(api, &id, confirmed).await? {
                layout::print_notice("Conversation deleted");
                print_active(view);
            }
        }
        SpecialCommand::Attach(path) => {
            view.attach_file(&path)?;
            if let Some(file) = view.attachment() {
                layout::print_notice(&format!(
                    "Attached {} ({} bytes); it will be sent with your next message",
                    file.file_name,
                    file.size()
                ));
            }
        }
        SpecialCommand::Detach => {
            view.remove_attachment();
            println!("Attachment removed");
        }
        SpecialCommand::Clear => {
            if confirm("Clear all messages in this conversation?")? {
                view.clear_session(api).await?;
                layout::print_notice("Conversation cleared");
            }
        }
        SpecialCommand::History => print_active(view),
        SpecialCommand::Exit | SpecialCommand::None => {}
    }
    Ok(())
}

fn format_prompt(view: &ChatView) -> String {
    let title = view
        .active_session()
        .and_then(|s| s.title.as_deref())
        .unwrap_or("chat");
    let clip = if view.attachment().is_some() {
        " +file".yellow().to_string()
    } else {
        String::new()
    };
    format!("[{}{}] >> ", title.cyan(), clip)
}

fn print_active(view: &ChatView) {
    let title = view
        .active_session()
        .and_then(|s| s.title.as_deref())
        .unwrap_or("Untitled");
    println!("\n{}\n", title.bold().underline());
    layout::print_entries(view.entries());
}

fn print_welcome_banner(ctx: &AppContext, view: &ChatView) {
    layout::print_shell(ctx.auth.current_user().as_ref(), Route::Chat);
    println!("Type '/help' for available commands, 'exit' to quit");
    print_active(view);
}
