/*!
Command handlers for the CLI

Each handler drives one page's view model against the shared
[`AppContext`]:

- `auth`     : register, login, logout, whoami, verify
- `home`     : landing screen
- `summarize`: one-shot summarization
- `chat`     : interactive chat REPL or a single message
- `sessions` : chat session management
- `history`  : summaries and past conversations
- `ask`      : single-turn question without a session

Protected pages go through [`require_page`], which applies the route guard.
*/

use std::borrow::Cow;

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{DefaultEditor, Editor, Helper};

use crate::app::{AppContext, Route};
use crate::cli::Commands;
use crate::error::{Result, SynopsisError};

pub mod chat;
pub mod special_commands;

/// Run one parsed CLI command
pub async fn dispatch(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Home => {
            home::show(ctx);
            Ok(())
        }
        Commands::Register {
            email,
            username,
            full_name,
            password,
        } => auth::register(ctx, email, username, full_name, password).await,
        Commands::Login { username, password } => auth::login(ctx, username, password).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Whoami => auth::whoami(ctx),
        Commands::Verify => auth::verify(ctx).await,
        Commands::Summarize {
            text,
            url,
            file,
            length,
            output,
            raw,
        } => {
            let input = match (text, url, file) {
                (Some(text), _, _) => summarize::Input::Text(text),
                (None, Some(url), _) => summarize::Input::Url(url),
                (None, None, Some(file)) => summarize::Input::File(file),
                (None, None, None) => {
                    return Err(SynopsisError::Validation(
                        "Provide --text, --url or --file".to_string(),
                    )
                    .into())
                }
            };
            summarize::run(ctx, input, length.map(|l| l.as_str()), output, raw).await
        }
        Commands::Chat {
            session,
            message,
            attach,
        } => chat::run_chat(ctx, session, message, attach).await,
        Commands::Sessions { command } => sessions::handle(ctx, command).await,
        Commands::History { tab, command } => history::handle(ctx, tab, command).await,
        Commands::Ask { message, context } => ask::run(ctx, message, context).await,
    }
}

/// Enter a protected page, failing when the guard sends the user to login
pub fn require_page(ctx: &AppContext, route: Route) -> Result<()> {
    let shown = ctx.enter(route);
    if shown != route {
        return Err(SynopsisError::NotSignedIn.into());
    }
    Ok(())
}

/// Ask a yes/no question; anything but `y`/`yes` is a no
pub fn confirm(question: &str) -> Result<bool> {
    let mut rl = DefaultEditor::new()?;
    match rl.readline(&format!("{} [y/N] ", question)) {
        Ok(answer) => Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        )),
        Err(rustyline::error::ReadlineError::Interrupted)
        | Err(rustyline::error::ReadlineError::Eof) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Hides typed characters behind `*`
struct MaskingHelper;

impl Completer for MaskingHelper {
    type Candidate = String;
}

impl Hinter for MaskingHelper {
    type Hint = String;
}

impl Validator for MaskingHelper {}

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Helper for MaskingHelper {}

/// Read a password without echoing it
pub fn prompt_password(prompt: &str) -> Result<String> {
    let mut rl: Editor<MaskingHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(MaskingHelper));
    match rl.readline(prompt) {
        Ok(password) => Ok(password),
        Err(rustyline::error::ReadlineError::Interrupted)
        | Err(rustyline::error::ReadlineError::Eof) => {
            Err(SynopsisError::Validation("Password entry cancelled".to_string()).into())
        }
        Err(e) => Err(e.into()),
    }
}

pub mod auth {
    //! Account commands

    use super::*;
    use crate::layout;
    use crate::views::{LoginForm, RegisterForm};
    use colored::Colorize;

    pub async fn register(
        ctx: &AppContext,
        email: String,
        username: String,
        full_name: Option<String>,
        password: Option<String>,
    ) -> Result<()> {
        if ctx.enter(Route::Register) != Route::Register {
            return already_signed_in(ctx);
        }

        let (password, confirm_password) = match password {
            Some(password) => (password.clone(), password),
            None => (
                prompt_password("Password: ")?,
                prompt_password("Confirm password: ")?,
            ),
        };
        let mut form = RegisterForm::new(
            email,
            username,
            full_name.unwrap_or_default(),
            password,
            confirm_password,
        );

        let user = form.submit(&ctx.auth, &ctx.navigator).await?;
        tracing::debug!(user_id = user.id, "Account created");
        println!(
            "Run {} to sign in.",
            format!("synopsis login -u {}", user.username).cyan()
        );
        Ok(())
    }

    pub async fn login(ctx: &AppContext, username: String, password: Option<String>) -> Result<()> {
        if ctx.enter(Route::Login) != Route::Login {
            return already_signed_in(ctx);
        }

        let password = match password {
            Some(password) => password,
            None => prompt_password("Password: ")?,
        };
        let mut form = LoginForm::new(username, password);
        let user = form.submit(&ctx.auth, &ctx.navigator).await?;
        layout::print_notice(&format!("Signed in as {}", user.display_name()));
        Ok(())
    }

    fn already_signed_in(ctx: &AppContext) -> Result<()> {
        if let Some(user) = ctx.auth.current_user() {
            println!(
                "Already signed in as {}. Run {} first to switch accounts.",
                user.username.cyan(),
                "synopsis logout".cyan()
            );
        }
        Ok(())
    }

    pub fn logout(ctx: &AppContext) -> Result<()> {
        ctx.auth.logout()?;
        ctx.navigator.navigate(Route::Landing);
        layout::print_notice("Signed out");
        Ok(())
    }

    pub fn whoami(ctx: &AppContext) -> Result<()> {
        let user = ctx.auth.current_user().ok_or(SynopsisError::NotSignedIn)?;
        println!("{}", layout::header(Some(&user)));
        println!("  {:<10} {}", "Email:".dimmed(), user.email);
        if let Some(created) = &user.created_at {
            println!("  {:<10} {}", "Since:".dimmed(), created);
        }
        Ok(())
    }

    pub async fn verify(ctx: &AppContext) -> Result<()> {
        let response = ctx.auth.verify().await?;
        if response.valid {
            let who = response.username.as_deref().unwrap_or("unknown user");
            layout::print_notice(&format!("Token is valid ({})", who));
        } else {
            println!("{}", "Token is not valid".yellow());
        }
        Ok(())
    }
}

pub mod home {
    //! Landing screen

    use super::*;
    use crate::layout;
    use crate::views::LandingView;
    use colored::Colorize;

    pub fn show(ctx: &AppContext) {
        ctx.enter(Route::Landing);
        let landing = LandingView;
        println!("\n{}", layout::APP_NAME.bold());
        println!("Summarize anything, then talk it through.\n");
        for (title, description) in landing.features() {
            println!("  {} {}", format!("{:<10}", title).cyan().bold(), description);
        }
        println!();

        // Report where "get started" leads without leaving the landing page.
        let next = match landing.get_started_target(&ctx.auth) {
            Route::Register => "synopsis register --email <EMAIL> -u <USERNAME>",
            _ => "synopsis summarize --text \"...\"",
        };
        println!("Get started: {}", next.cyan());
        if !ctx.auth.is_authenticated() {
            println!("Have an account? {}", "synopsis login -u <USERNAME>".cyan());
        }
        println!();
    }
}

pub mod summarize {
    //! One-shot summarization

    use std::path::PathBuf;

    use super::*;
    use crate::layout;
    use crate::views::{SummarizeMode, SummarizeView};

    pub enum Input {
        Text(String),
        Url(String),
        File(PathBuf),
    }

    pub async fn run(
        ctx: &AppContext,
        input: Input,
        length: Option<&str>,
        output: Option<PathBuf>,
        raw: bool,
    ) -> Result<()> {
        require_page(ctx, Route::Summarize)?;
        let mut view = SummarizeView::new(&ctx.config);
        if let Some(length) = length {
            view.set_length(length)?;
        }

        match input {
            Input::Text(text) => {
                view.set_mode(SummarizeMode::Text);
                view.text = text;
            }
            Input::Url(url) => {
                view.set_mode(SummarizeMode::Url);
                view.url = url;
            }
            Input::File(path) => {
                view.set_mode(SummarizeMode::File);
                view.attach_file(&path)?;
            }
        }

        view.submit(&ctx.api).await?;

        if raw {
            if let Some(summary) = view.copy_text() {
                println!("{}", summary);
            }
        } else {
            layout::print_shell(ctx.auth.current_user().as_ref(), Route::Summarize);
            layout::print_summary(&view);
        }

        if let Some(path) = output {
            let written = view.download(Some(&path))?;
            if !raw {
                layout::print_notice(&format!("Saved to {}", written.display()));
            }
        }
        Ok(())
    }
}

pub mod sessions {
    //! Chat session management

    use super::*;
    use crate::api::types::CreateSessionRequest;
    use crate::cli::SessionCommand;
    use crate::layout;
    use crate::views::{ChatEntry, HistoryView};
    use colored::Colorize;

    pub async fn handle(ctx: &AppContext, command: SessionCommand) -> Result<()> {
        require_page(ctx, Route::Chat)?;
        let api = &ctx.api;

        match command {
            SessionCommand::List => {
                let sessions = api.list_sessions().await?;
                if sessions.is_empty() {
                    println!("{}", "No conversations yet.".yellow());
                    return Ok(());
                }
                println!("\nConversations:");
                layout::session_table(&sessions, None).printstd();
                println!();
            }
            SessionCommand::New { title } => {
                let request = CreateSessionRequest {
                    title: title.unwrap_or_else(|| ctx.config.chat.default_session_title.clone()),
                };
                let session = api.create_session(&request).await?;
                layout::print_notice(&format!("Created conversation {}", session.session_id));
            }
            SessionCommand::Delete { id, yes } => {
                let confirmed = yes || confirm("Delete this conversation?")?;
                let mut view = HistoryView::new();
                if view.delete_session(api, &id, confirmed).await? {
                    layout::print_notice(&format!("Deleted conversation {}", id));
                } else {
                    println!("Cancelled");
                }
            }
            SessionCommand::Show { id } => {
                let history = api.session_history(&id).await?;
                let entries: Vec<ChatEntry> = history
                    .messages
                    .into_iter()
                    .map(ChatEntry::settled)
                    .collect();
                println!("\n{} {}\n", "Conversation".bold(), history.session_id.cyan());
                layout::print_entries(&entries);
            }
            SessionCommand::Clear { id } => {
                api.clear_session(&id).await?;
                layout::print_notice(&format!("Cleared conversation {}", id));
            }
        }
        Ok(())
    }
}

pub mod history {
    //! Summaries and past conversations

    use super::*;
    use crate::cli::{HistoryCommand, HistoryTabArg};
    use crate::layout;
    use crate::views::{HistoryTab, HistoryView};
    use colored::Colorize;

    pub async fn handle(
        ctx: &AppContext,
        tab: HistoryTabArg,
        command: Option<HistoryCommand>,
    ) -> Result<()> {
        require_page(ctx, Route::History)?;
        let mut view = HistoryView::new();

        match command {
            None => {
                view.load(&ctx.api).await?;
                view.switch_tab(match tab {
                    HistoryTabArg::Chats => HistoryTab::Chats,
                    HistoryTabArg::Summaries => HistoryTab::Summaries,
                });
                layout::print_shell(ctx.auth.current_user().as_ref(), Route::History);
                print_tab(&view);
            }
            Some(HistoryCommand::Show { id }) => {
                let record = view.summary_detail(&ctx.api, id).await?;
                layout::print_summary_record(&record);
            }
            Some(HistoryCommand::Delete { id, yes }) => {
                let confirmed = yes || confirm("Delete this conversation?")?;
                if view.delete_session(&ctx.api, &id, confirmed).await? {
                    layout::print_notice(&format!("Deleted conversation {}", id));
                } else {
                    println!("Cancelled");
                }
            }
        }
        Ok(())
    }

    fn print_tab(view: &HistoryView) {
        let chats = format!("Chats ({})", view.sessions().len());
        let summaries = format!("Summaries ({})", view.summaries().len());
        match view.tab {
            HistoryTab::Chats => {
                println!("{}  {}\n", chats.green().bold(), summaries.dimmed());
                if view.sessions().is_empty() {
                    println!("{}", "No conversations yet.".yellow());
                } else {
                    layout::session_table(view.sessions(), None).printstd();
                    println!(
                        "\nUse {} to continue a conversation.\n",
                        "synopsis chat --session <ID>".cyan()
                    );
                }
            }
            HistoryTab::Summaries => {
                println!("{}  {}\n", chats.dimmed(), summaries.green().bold());
                if view.summaries().is_empty() {
                    println!("{}", "No summaries yet.".yellow());
                } else {
                    layout::summary_table(view.summaries()).printstd();
                    println!(
                        "\nUse {} to read a full summary.\n",
                        "synopsis history show <ID>".cyan()
                    );
                }
            }
        }
    }
}

pub mod ask {
    //! Single-turn question

    use super::*;
    use crate::api::types::LegacyChatRequest;
    use crate::validation;

    pub async fn run(ctx: &AppContext, message: String, context: Option<String>) -> Result<()> {
        require_page(ctx, Route::Chat)?;
        validation::require(&message, "Message")?;
        let request = LegacyChatRequest { message, context };
        let response = ctx.api.legacy_chat(&request).await?;
        println!("{}", response.response);
        Ok(())
    }
}
