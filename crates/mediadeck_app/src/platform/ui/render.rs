use std::fmt::Write;

use mediadeck_core::{
    AppViewModel, JobPanelView, JobState, ListPanelView, NoticeLevel, TablePanelView,
};

/// Renders the whole view model as plain text for the terminal.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    for list in &view.lists {
        render_list(&mut out, list);
    }
    for table in &view.tables {
        render_table(&mut out, table);
        for job in view.jobs.iter().filter(|job| job.kind.owner() == table.view) {
            render_job(&mut out, job);
        }
    }
    if !view.watch_list.is_empty() {
        let _ = writeln!(out, "== watch list ({}) ==", view.watch_list.len());
        for (n, entry) in view.watch_list.iter().enumerate() {
            let _ = writeln!(out, "  {:>3}. {entry}", n + 1);
        }
    }
    if let Some(notice) = &view.notice {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", notice.text);
    }
    out
}

fn render_list(out: &mut String, list: &ListPanelView) {
    let title = match &list.query {
        Some(query) => format!("{} \"{query}\"", list.list),
        None => list.list.to_string(),
    };
    let _ = writeln!(out, "== {title} ({} items) ==", list.rows.len());
    for (n, row) in list.rows.iter().enumerate() {
        let _ = writeln!(out, "  {:>3}. {} [{}]", n + 1, row.title, row.kind);
    }
    let footer = if list.is_fetching {
        format!("  loading page {}...", list.next_page)
    } else if let Some(error) = &list.error {
        format!("  failed: {error}")
    } else if list.has_more {
        format!("  `more {}` for page {}", list.list, list.next_page)
    } else {
        "  end of list".to_string()
    };
    let _ = writeln!(out, "{footer}");
}

fn render_table(out: &mut String, table: &TablePanelView) {
    let _ = writeln!(out, "== {} ==", table.view);
    if table.loading {
        let _ = writeln!(out, "  loading...");
    }
    if let Some(error) = &table.error {
        let _ = writeln!(out, "  failed: {error}");
    }
    for (n, row) in table.rows.iter().enumerate() {
        let mark = if row.selected { "x" } else { " " };
        let _ = writeln!(out, "  [{mark}] {:>3}. {}  {}", n + 1, row.name, row.path);
    }
}

fn render_job(out: &mut String, job: &JobPanelView) {
    if job.state == JobState::Idle {
        return;
    }
    let mut line = format!("  {}: {:?}", job.kind, job.state);
    if let Some(percent) = job.percent {
        let _ = write!(line, " {percent:.0}%");
    }
    if let Some(stage) = &job.stage {
        let _ = write!(line, " {stage}");
    }
    if let Some(subject) = &job.subject {
        let _ = write!(line, " ({subject})");
    }
    if let Some(items) = job.items {
        let _ = write!(line, " [{} of {}]", items.current, items.total);
    }
    if let Some(message) = &job.message {
        let _ = write!(line, ": {message}");
    }
    if let Some(error) = &job.error {
        let _ = write!(line, " - {error}");
    }
    let _ = writeln!(out, "{line}");
}
