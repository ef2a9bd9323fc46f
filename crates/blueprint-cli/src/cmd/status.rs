use crate::output::{bar, print_json, print_table};
use crate::session::Session;
use blueprint_core::{dashboard::Dashboard, task::Task, weeks};
use std::path::Path;

pub fn run(home: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let dashboard = Dashboard::build(session.store.plan(), session.store.now());

    if json {
        print_json(&dashboard)?;
        return Ok(());
    }

    if let Some(goal) = &dashboard.goal {
        println!("{goal}");
        println!();
    }
    println!(
        "Week {} of 52  {} {}% of the year elapsed",
        dashboard.current_week,
        bar(dashboard.year_progress),
        dashboard.year_progress
    );
    println!(
        "Overall       {} {}% ({}/{} tasks)",
        bar(dashboard.overall.percentage),
        dashboard.overall.percentage,
        dashboard.overall.completed,
        dashboard.overall.total
    );
    println!();

    let quarter_rows = dashboard
        .quarters
        .iter()
        .map(|q| {
            vec![
                q.name.clone(),
                bar(q.stats.percentage),
                format!("{}%", q.stats.percentage),
                format!("{}/{}", q.stats.completed, q.stats.total),
            ]
        })
        .collect();
    print_table(&["QUARTER", "", "DONE", "TASKS"], quarter_rows);
    println!();

    let domain_rows = dashboard
        .domains
        .iter()
        .map(|d| {
            vec![
                d.domain.label().to_string(),
                bar(d.stats.percentage),
                format!("{}%", d.stats.percentage),
            ]
        })
        .collect();
    print_table(&["DOMAIN", "", "DONE"], domain_rows);

    println!();
    println!("This week ({}):", dashboard.this_week.len());
    print_task_lines(&dashboard.this_week);

    println!();
    println!("Overdue ({}):", dashboard.overdue.len());
    print_task_lines(&dashboard.overdue);

    session.close();
    Ok(())
}

pub fn week(home: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let start = session.store.plan().settings.start_date;
    let current = session.store.current_week();
    let starts = weeks::week_date(start, current);

    if json {
        print_json(&serde_json::json!({
            "current_week": current,
            "start_date": start,
            "week_starts": starts,
            "year_progress": weeks::year_progress(current),
        }))?;
    } else {
        match starts {
            Some(date) => println!("Week {current} of 52 (started {date})"),
            None => println!("Week {current} of 52 (no start date set)"),
        }
    }
    session.close();
    Ok(())
}

fn print_task_lines(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("  (none)");
    }
    for t in tasks {
        println!(
            "  [{}] w{:<2} {:<11} {} ({})",
            t.id,
            t.due_week,
            t.status.as_str(),
            t.title,
            t.domain
        );
    }
}
