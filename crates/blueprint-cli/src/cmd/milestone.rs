use crate::output::{print_json, print_table};
use crate::session::Session;
use blueprint_core::command::Command;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum MilestoneSubcommand {
    /// List milestones for every quarter
    List,
    /// Flip a milestone between done and not done
    Toggle {
        quarter_id: String,
        milestone_id: String,
    },
}

pub fn run(home: &Path, subcmd: MilestoneSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MilestoneSubcommand::List => list(home, json),
        MilestoneSubcommand::Toggle {
            quarter_id,
            milestone_id,
        } => toggle(home, &quarter_id, &milestone_id, json),
    }
}

fn list(home: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let plan = session.store.plan();

    if json {
        let quarters: Vec<_> = plan
            .quarters
            .iter()
            .map(|q| serde_json::json!({ "quarter_id": q.id, "milestones": q.milestones }))
            .collect();
        print_json(&quarters)?;
        return Ok(());
    }

    let rows = plan
        .quarters
        .iter()
        .flat_map(|q| {
            q.milestones.iter().map(move |m| {
                vec![
                    q.id.clone(),
                    m.id.clone(),
                    if m.completed { "x" } else { " " }.to_string(),
                    m.text.clone(),
                ]
            })
        })
        .collect();
    print_table(&["QUARTER", "ID", "DONE", "MILESTONE"], rows);
    Ok(())
}

fn toggle(home: &Path, quarter_id: &str, milestone_id: &str, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(home)?;
    let applied = session.apply(Command::ToggleMilestone {
        quarter_id: quarter_id.to_string(),
        milestone_id: milestone_id.to_string(),
    });
    if !applied.changed {
        anyhow::bail!("milestone '{milestone_id}' not found in quarter '{quarter_id}'");
    }
    let completed = applied
        .plan
        .quarters
        .iter()
        .find(|q| q.id == quarter_id)
        .and_then(|q| q.milestones.iter().find(|m| m.id == milestone_id))
        .is_some_and(|m| m.completed);
    session.close();

    if json {
        print_json(&serde_json::json!({
            "quarter_id": quarter_id,
            "milestone_id": milestone_id,
            "completed": completed,
        }))?;
    } else if completed {
        println!("Milestone [{milestone_id}] done");
    } else {
        println!("Milestone [{milestone_id}] reopened");
    }
    Ok(())
}
