use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ListOpened { list, query } => state.open_list(list, query),
        Msg::ListClosed(list) => state.close_list(list),
        Msg::LoadMoreRequested(list) => state.load_more(list).into_iter().collect(),
        Msg::PageLoaded {
            list,
            ticket,
            result,
        } => {
            state.apply_page(list, ticket, result);
            Vec::new()
        }
        Msg::AdminOpened(view) => state.open_admin(view),
        Msg::AdminClosed(view) => state.close_admin(view),
        Msg::TableLoaded {
            view,
            ticket,
            result,
        } => {
            state.apply_table(view, ticket, result);
            Vec::new()
        }
        Msg::RowToggled { view, index } => {
            state.toggle_row(view, index);
            Vec::new()
        }
        Msg::IngestRequested(files) => state.submit_job(crate::JobKind::Ingest, Some(files)),
        Msg::JobRequested(kind) => state.submit_job(kind, None),
        Msg::JobAccepted {
            kind,
            ticket,
            task_id,
        } => state.job_accepted(kind, ticket, task_id),
        Msg::JobRejected {
            kind,
            ticket,
            reason,
        } => {
            state.job_rejected(kind, ticket, reason);
            Vec::new()
        }
        Msg::JobProgress {
            kind,
            ticket,
            snapshot,
        } => state.job_progress(kind, ticket, snapshot),
        Msg::JobTransportFailed {
            kind,
            ticket,
            reason,
        } => state.job_transport_failed(kind, ticket, reason),
        Msg::GraceElapsed { kind, ticket } => {
            state.grace_elapsed(kind, ticket);
            Vec::new()
        }
        Msg::WatchListRestored(entries) => {
            state.restore_watch_list(entries);
            Vec::new()
        }
        Msg::WatchListAdd(entry) => state.add_to_watch_list(entry),
        Msg::WatchListAddFromList { list, index } => state.add_from_list(list, index),
        Msg::WatchListRemove(index) => state.remove_from_watch_list(index),
        Msg::WatchListCleared => state.clear_watch_list(),
        Msg::WatchListSubmitRequested => state.request_watch_list_submit(),
        Msg::WatchListSubmitted(result) => state.watch_list_submitted(result),
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
