//! Terminal layout shared by the signed-in pages
//!
//! Header with app name and user, a navigation bar marking the current
//! route, and renderers for the lists and results the pages show.

use colored::Colorize;
use prettytable::{format, Table};

use crate::api::types::{ChatSession, Role, SummaryRecord, User};
use crate::app::Route;
use crate::views::chat::ChatEntry;
use crate::views::history::preview;
use crate::views::summarize::SummarizeView;

pub const APP_NAME: &str = "Synopsis";

const NAV_ITEMS: [(Route, &str); 3] = [
    (Route::Summarize, "Summarize"),
    (Route::Chat, "Chat"),
    (Route::History, "History"),
];

pub fn header(user: Option<&User>) -> String {
    let who = match user {
        Some(user) => match user.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{} ({})", name, user.username.cyan()),
            _ => user.display_name().cyan().to_string(),
        },
        None => "not signed in".dimmed().to_string(),
    };
    format!("{}  {}  {}", APP_NAME.bold(), "|".dimmed(), who)
}

pub fn nav_bar(current: Route) -> String {
    NAV_ITEMS
        .iter()
        .map(|(route, label)| {
            if *route == current {
                format!("[{}]", label).green().bold().to_string()
            } else {
                format!(" {} ", label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Header and navigation for a protected page
pub fn print_shell(user: Option<&User>, current: Route) {
    println!("{}", header(user));
    println!("{}   {}", nav_bar(current), "synopsis logout".dimmed());
    println!();
}

pub fn print_notice(message: &str) {
    println!("{}", message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {}", message).red());
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > 40 {
        format!("{}...", title.chars().take(37).collect::<String>())
    } else {
        title.to_string()
    }
}

pub fn session_table(sessions: &[ChatSession], active: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "",
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Activity".bold()
    ]);

    for session in sessions {
        let marker = if Some(session.session_id.as_str()) == active {
            "*"
        } else {
            ""
        };
        let title = truncate_title(session.title.as_deref().unwrap_or("Untitled"));
        let count = session
            .message_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(prettytable::row![
            marker,
            short_id(&session.session_id).cyan(),
            title,
            count,
            format_time(session.last_activity())
        ]);
    }
    table
}

pub fn summary_table(summaries: &[SummaryRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Source".bold(),
        "Preview".bold(),
        "Length".bold(),
        "Created".bold()
    ]);

    for record in summaries {
        let length = record
            .summary_length
            .map(|l| format!("{} chars", l))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(prettytable::row![
            record.id.to_string().cyan(),
            record.source_type.as_deref().unwrap_or("-"),
            preview(&record.summary),
            length,
            format_time(record.created_at)
        ]);
    }
    table
}

pub fn print_summary(view: &SummarizeView) {
    if let Some(error) = view.error() {
        print_error(error);
    }
    let Some(summary) = view.copy_text() else {
        return;
    };
    println!("\n{}\n", "Summary".bold().underline());
    println!("{}\n", summary);
    for (label, value) in view.metadata() {
        println!("  {:<18} {}", format!("{}:", label).dimmed(), value);
    }
    println!();
}

pub fn print_summary_record(record: &SummaryRecord) {
    let title = record.title.as_deref().unwrap_or("Summary");
    println!("\n{} {}\n", format!("#{}", record.id).cyan(), title.bold());
    println!("{}\n", record.summary);
    if let Some(source) = &record.source_type {
        println!("  {:<18} {}", "Source:".dimmed(), source);
    }
    if let Some(original) = record.original_length {
        println!("  {:<18} {} characters", "Original length:".dimmed(), original);
    }
    if let Some(length) = record.summary_length {
        println!("  {:<18} {} characters", "Summary length:".dimmed(), length);
    }
    println!("  {:<18} {}\n", "Created:".dimmed(), format_time(record.created_at));
}

pub fn format_entry(entry: &ChatEntry) -> String {
    let message = &entry.message;
    let who = match message.role {
        Role::User => "You".blue().bold(),
        Role::Assistant => "Assistant".magenta().bold(),
    };
    let mut out = format!("{}: {}", who, message.content);
    if let Some(file) = &message.file {
        out.push_str(&format!("\n  {} {}", "attached:".dimmed(), file));
    }
    if entry.pending {
        out.push_str(&format!(" {}", "(sending...)".dimmed()));
    }
    out
}

pub fn print_entries(entries: &[ChatEntry]) {
    if entries.is_empty() {
        println!("{}", "No messages yet. Say hello!".dimmed());
        return;
    }
    for entry in entries {
        println!("{}\n", format_entry(entry));
    }
}
