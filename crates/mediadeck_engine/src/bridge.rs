use mediadeck_core::{Effect, Msg};

use crate::engine::EngineCommand;
use crate::{EngineEvent, EngineHandle};

impl EngineHandle {
    /// Starts the I/O an effect asks for.
    ///
    /// Effects the engine does not own (local persistence) are handed back
    /// to the caller.
    pub fn apply(&self, effect: Effect) -> Option<Effect> {
        let command = match effect {
            Effect::FetchPage {
                list,
                ticket,
                path,
                request,
            } => EngineCommand::FetchPage {
                list,
                ticket,
                path,
                request,
            },
            Effect::FetchTable { view, ticket } => EngineCommand::FetchTable { view, ticket },
            Effect::SubmitJob {
                kind,
                ticket,
                payload,
            } => EngineCommand::SubmitJob {
                kind,
                ticket,
                payload,
            },
            Effect::WatchProgress {
                kind,
                ticket,
                task_id,
            } => EngineCommand::WatchProgress {
                kind,
                ticket,
                task_id,
            },
            Effect::StopProgress { kind } => EngineCommand::StopProgress { kind },
            Effect::ScheduleGrace {
                kind,
                ticket,
                delay,
            } => EngineCommand::ScheduleGrace {
                kind,
                ticket,
                delay,
            },
            Effect::CancelScope(scope) => EngineCommand::CancelScope(scope),
            Effect::SubmitWatchList(entries) => EngineCommand::SubmitWatchList(entries),
            local @ Effect::PersistWatchList(_) => return Some(local),
        };
        self.send(command);
        None
    }
}

impl From<EngineEvent> for Msg {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::PageFetched {
                list,
                ticket,
                result,
            } => Msg::PageLoaded {
                list,
                ticket,
                result: result.map_err(|err| err.to_string()),
            },
            EngineEvent::TableFetched {
                view,
                ticket,
                result,
            } => Msg::TableLoaded {
                view,
                ticket,
                result: result.map_err(|err| err.to_string()),
            },
            EngineEvent::JobSubmitted {
                kind,
                ticket,
                result,
            } => match result {
                Ok(task_id) => Msg::JobAccepted {
                    kind,
                    ticket,
                    task_id,
                },
                Err(err) => Msg::JobRejected {
                    kind,
                    ticket,
                    reason: format!("failed to start {kind}: {err}"),
                },
            },
            EngineEvent::Progress {
                kind,
                ticket,
                snapshot,
            } => Msg::JobProgress {
                kind,
                ticket,
                snapshot,
            },
            EngineEvent::ProgressFailed {
                kind,
                ticket,
                error,
            } => Msg::JobTransportFailed {
                kind,
                ticket,
                reason: format!("lost track of {kind}: {error}"),
            },
            EngineEvent::GraceElapsed { kind, ticket } => Msg::GraceElapsed { kind, ticket },
            EngineEvent::WatchListSubmitted(result) => {
                Msg::WatchListSubmitted(result.map_err(|err| err.to_string()))
            }
        }
    }
}
