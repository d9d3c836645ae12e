use crate::{
    AdminView, AppState, ItemCount, ItemKey, JobKind, JobState, ListKind, MediaKind, Notice,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub lists: Vec<ListPanelView>,
    pub tables: Vec<TablePanelView>,
    pub jobs: Vec<JobPanelView>,
    pub watch_list: Vec<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRowView {
    pub id: ItemKey,
    pub title: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPanelView {
    pub list: ListKind,
    pub query: Option<String>,
    pub rows: Vec<MediaRowView>,
    pub next_page: u32,
    pub has_more: bool,
    pub is_fetching: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowView {
    pub name: String,
    pub path: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePanelView {
    pub view: AdminView,
    pub rows: Vec<TableRowView>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobPanelView {
    pub kind: JobKind,
    pub state: JobState,
    pub task_id: Option<String>,
    pub percent: Option<f64>,
    pub stage: Option<String>,
    pub subject: Option<String>,
    /// Sub-count within the task, e.g. playlist 2 of 5.
    pub items: Option<ItemCount>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let lists = state
            .lists()
            .map(|(list, view)| ListPanelView {
                list,
                query: view.profile().query.clone(),
                rows: view
                    .items()
                    .iter()
                    .map(|item| MediaRowView {
                        id: item.id.clone(),
                        title: item.title(),
                        kind: item.kind,
                    })
                    .collect(),
                next_page: view.cursor().page_index(),
                has_more: view.cursor().has_more(),
                is_fetching: view.cursor().is_fetching(),
                error: view.last_error().map(ToOwned::to_owned),
            })
            .collect();

        let mut tables = Vec::new();
        let mut jobs = Vec::new();
        for (view, panel) in state.panels() {
            let table = panel.table();
            tables.push(TablePanelView {
                view,
                rows: table
                    .rows()
                    .iter()
                    .enumerate()
                    .map(|(index, row)| TableRowView {
                        name: row.name.clone(),
                        path: row.path.clone(),
                        selected: table.is_selected(index),
                    })
                    .collect(),
                loading: table.is_loading(),
                error: table.last_error().map(ToOwned::to_owned),
            });
            for &kind in view.jobs() {
                let Some(slot) = panel.job(kind) else {
                    continue;
                };
                let handle = slot.handle();
                let snapshot = handle.last_snapshot.as_ref();
                jobs.push(JobPanelView {
                    kind,
                    state: handle.state,
                    task_id: handle.correlation_id.clone(),
                    percent: snapshot.and_then(|s| s.percent()),
                    stage: snapshot.and_then(|s| s.stage()).map(ToOwned::to_owned),
                    subject: snapshot.and_then(|s| s.subject.clone()),
                    items: snapshot.and_then(|s| s.items),
                    message: snapshot.and_then(|s| s.message.clone()),
                    error: handle.error.clone(),
                });
            }
        }

        Self {
            lists,
            tables,
            jobs,
            watch_list: state
                .watch_list()
                .entries()
                .iter()
                .map(|entry| format!("{} ({})", entry.display_name(), entry.kind))
                .collect(),
            notice: state.notice().cloned(),
        }
    }
}
