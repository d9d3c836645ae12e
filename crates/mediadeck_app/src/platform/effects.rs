use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use deck_logging::{deck_debug, deck_warn};
use mediadeck_core::Effect;
use mediadeck_engine::{EngineEvents, EngineHandle, FileStore};

use super::app::AppEvent;
use super::persistence;

/// Routes core effects to the engine, and local ones to the store.
pub struct EffectRunner {
    engine: EngineHandle,
    store: FileStore,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, store: FileStore, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { engine, store };
        runner.spawn_event_loop(event_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            deck_debug!("effect {:?}", effect);
            if let Some(local) = self.engine.apply(effect) {
                self.run_local(local);
            }
        }
    }

    fn run_local(&self, effect: Effect) {
        match effect {
            Effect::PersistWatchList(entries) => {
                persistence::save_watch_list(&self.store, &entries);
            }
            other => deck_warn!("No handler for effect {:?}", other),
        }
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let events = self.engine.events();
        thread::spawn(move || {
            forward_events(&events, &event_tx);
            deck_debug!("engine event forwarding stopped");
        });
    }
}

/// Forwards engine events until either side hangs up.
fn forward_events(events: &EngineEvents, event_tx: &mpsc::Sender<AppEvent>) {
    loop {
        match events.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => {
                if event_tx.send(AppEvent::Core(event.into())).is_err() {
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediadeck_engine::ApiSettings;

    #[test]
    fn forwarding_ends_when_the_engine_shuts_down() {
        let engine = EngineHandle::new(ApiSettings::default()).unwrap();
        let events = engine.events();
        let (event_tx, event_rx) = mpsc::channel();
        drop(engine);

        forward_events(&events, &event_tx);
        assert!(event_rx.try_recv().is_err());
    }
}
