use super::parse_fields;
use crate::output::print_json;
use crate::session::Session;
use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::Value;
use std::path::Path;

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show current settings and the week they put you in
    Show,
    /// Change settings; unnamed fields are kept
    Set {
        /// Date of week 1 (YYYY-MM-DD); pass "" to clear
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        theme: Option<String>,
        /// Extra settings as KEY=VALUE
        fields: Vec<String>,
    },
}

pub fn run(home: &Path, subcmd: SettingsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SettingsSubcommand::Show => show(home, json),
        SettingsSubcommand::Set {
            start_date,
            theme,
            fields,
        } => set(home, start_date, theme, &fields, json),
    }
}

fn show(home: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let settings = &session.store.plan().settings;

    if json {
        print_json(settings)?;
        return Ok(());
    }

    match settings.start_date {
        Some(date) => println!("startDate: {date}"),
        None => println!("startDate: (not set)"),
    }
    println!("theme:     {}", settings.theme.as_deref().unwrap_or("(default)"));
    for (key, value) in &settings.extra {
        println!("{key}: {value}");
    }
    println!("week:      {} of 52", session.store.current_week());
    Ok(())
}

fn set(
    home: &Path,
    start_date: Option<String>,
    theme: Option<String>,
    fields: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let mut patch = parse_fields(fields)?;
    if let Some(raw) = start_date {
        if !raw.is_empty() {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("invalid --start-date '{raw}': {e}"))?;
        }
        patch.insert("startDate".to_string(), Value::String(raw));
    }
    if let Some(theme) = theme {
        patch.insert("theme".to_string(), Value::String(theme));
    }
    if patch.is_empty() {
        anyhow::bail!("nothing to set: pass --start-date, --theme or KEY=VALUE");
    }

    let mut session = Session::open(home)?;
    let applied = session.apply(blueprint_core::command::Command::UpdateSettings(patch));
    let settings = applied.plan.settings.clone();
    let week = session.store.current_week();
    session.close();

    if json {
        print_json(&settings)?;
    } else if applied.changed {
        println!("Settings updated (week {week} of 52)");
    } else {
        println!("Settings unchanged");
    }
    Ok(())
}
