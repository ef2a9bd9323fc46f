use crate::output::print_json;
use crate::session::Session;
use anyhow::Context;
use blueprint_core::{
    command::Command,
    io::atomic_write,
    paths,
    persist::{export_document, import_document},
};
use std::path::Path;

pub fn export(home: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let document = export_document(session.store.plan()).context("failed to serialize plan")?;

    if out == Some(Path::new("-")) {
        println!("{document}");
        return Ok(());
    }

    let path = match out {
        Some(p) => p.to_path_buf(),
        None => session
            .config
            .exports_path(home)
            .join(paths::export_file_name(session.store.now().date_naive())),
    };
    atomic_write(&path, document.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "plan exported");

    if json {
        print_json(&serde_json::json!({ "exported": path }))?;
    } else {
        println!("Exported plan to {}", path.display());
    }
    Ok(())
}

pub fn import(home: &Path, file: &Path, yes: bool, json: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("import replaces all current data; re-run with --yes to confirm");
    }
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let plan = import_document(&raw)
        .with_context(|| format!("{} is not a valid plan document", file.display()))?;
    let tasks = plan.tasks().count();

    let mut session = Session::open(home)?;
    session.apply(Command::ImportState(Box::new(plan)));
    session.close();

    if json {
        print_json(&serde_json::json!({ "imported": file, "tasks": tasks }))?;
    } else {
        println!("Imported {} ({tasks} tasks)", file.display());
    }
    Ok(())
}

pub fn reset(home: &Path, yes: bool, json: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!(
            "reset discards all progress, notes, and changes; re-run with --yes to confirm"
        );
    }
    let mut session = Session::open(home)?;
    session.apply(Command::Reset);
    let tasks = session.store.plan().tasks().count();
    session.close();

    if json {
        print_json(&serde_json::json!({ "reset": true, "tasks": tasks }))?;
    } else {
        println!("Plan reset to the original 52-week blueprint ({tasks} tasks)");
    }
    Ok(())
}
