use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use deck_logging::{deck_info, deck_warn};
use mediadeck_core::{update, AppState, Msg, UploadFile};
use mediadeck_engine::{EngineHandle, FileStore};

use super::commands::{self, Command};
use super::config::{ClientConfig, DEFAULT_CONFIG_PATH};
use super::effects::EffectRunner;
use super::{logging, persistence, ui};

/// Everything the main loop reacts to.
pub enum AppEvent {
    Core(Msg),
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = ClientConfig::load(&config_path)?;
    logging::initialize(config.log_destination, config.level());
    deck_info!("mediadeck starting against {}", config.base_url);

    let engine = EngineHandle::new(config.api_settings()).context("starting engine")?;
    let store = FileStore::new(&config.store_dir);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(engine, store.clone(), event_tx.clone());

    let mut state = AppState::with_settings(config.core_settings());
    let restored = persistence::load_watch_list(&store);
    let _ = event_tx.send(AppEvent::Core(Msg::WatchListRestored(restored)));
    spawn_input_thread(event_tx);

    println!("{}", commands::HELP);
    for event in event_rx {
        let msg = match event {
            AppEvent::Core(msg) => msg,
            AppEvent::Quit => break,
        };
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);
        if state.consume_dirty() {
            print!("{}", ui::render::render(&state.view()));
        }
    }

    deck_info!("mediadeck shutting down");
    Ok(())
}

/// Reads stdin line by line; end of input counts as `quit`.
fn spawn_input_thread(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let event = match commands::parse(&line) {
                Ok(Command::Send(msg)) => AppEvent::Core(msg),
                Ok(Command::Upload(paths)) => match read_uploads(&paths) {
                    Ok(files) => AppEvent::Core(Msg::IngestRequested(files)),
                    Err(err) => {
                        eprintln!("{err:#}");
                        continue;
                    }
                },
                Ok(Command::Help) => {
                    println!("{}", commands::HELP);
                    continue;
                }
                Ok(Command::Quit) => break,
                Err(reason) => {
                    eprintln!("{reason}");
                    continue;
                }
            };
            if event_tx.send(event).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::Quit);
    });
}

fn read_uploads(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| {
                    deck_warn!("upload path {} has no file name", path.display());
                    path.display().to_string()
                });
            Ok(UploadFile { name, bytes })
        })
        .collect()
}
