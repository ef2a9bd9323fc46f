use super::parse_fields;
use crate::output::print_json;
use crate::session::Session;
use blueprint_core::command::Command;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum MetaSubcommand {
    /// Show plan metadata
    Show,
    /// Merge KEY=VALUE pairs into plan metadata (e.g. goal="Lead the AI org")
    Set {
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

pub fn run(home: &Path, subcmd: MetaSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MetaSubcommand::Show => show(home, json),
        MetaSubcommand::Set { fields } => set(home, &fields, json),
    }
}

fn show(home: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let meta = &session.store.plan().meta;

    if json {
        print_json(meta)?;
    } else {
        println!("goal:    {}", meta.goal.as_deref().unwrap_or("-"));
        println!("version: {}", meta.version.as_deref().unwrap_or("-"));
        for (key, value) in &meta.extra {
            println!("{key}: {value}");
        }
    }
    Ok(())
}

fn set(home: &Path, fields: &[String], json: bool) -> anyhow::Result<()> {
    let patch = parse_fields(fields)?;
    let mut session = Session::open(home)?;
    let applied = session.apply(Command::UpdateMeta(patch));
    let meta = applied.plan.meta.clone();
    session.close();

    if json {
        print_json(&meta)?;
    } else if applied.changed {
        println!("Metadata updated");
    } else {
        println!("Metadata unchanged");
    }
    Ok(())
}
