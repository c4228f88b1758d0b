//! Command runners wiring config, adapters, and the coordinator

use std::process::ExitCode;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::application::ports::{ClipPlayer, ConfigStore, DropStore, StoreError};
use crate::application::{Command, DropCoordinator, ViewState};
use crate::domain::config::AppConfig;
use crate::domain::geo::{Coordinate, Region, DEFAULT_REGION_CENTER};
use crate::domain::status::{Status, StatusIcon};
use crate::infrastructure::{
    CpalClipRecorder, FixedLocationProvider, FsDropStore, RodioClipPlayer, XdgConfigStore,
};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How long to wait for a coordinator state transition before giving up
const STATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for the record command
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub owner: Option<String>,
    pub note: Option<String>,
    pub position_override: Option<Coordinate>,
}

/// Load and merge configuration: defaults < file < cli
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Open the drop store at the configured directory
async fn open_store(config: &AppConfig) -> Result<FsDropStore, StoreError> {
    let dir = config
        .data_dir
        .as_ref()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(FsDropStore::default_dir);
    FsDropStore::new(dir).await
}

/// Wait until the published state satisfies `pred`, or time out
async fn wait_for_state<F>(
    state_rx: &mut watch::Receiver<ViewState>,
    pred: F,
) -> Option<ViewState>
where
    F: Fn(&ViewState) -> bool,
{
    let wait = async {
        loop {
            {
                let state = state_rx.borrow_and_update();
                if pred(&state) {
                    return state.clone();
                }
            }
            if state_rx.changed().await.is_err() {
                return state_rx.borrow().clone();
            }
        }
    };
    tokio::time::timeout(STATE_TIMEOUT, wait).await.ok()
}

/// Run the interactive record flow
pub async fn run_record(options: RecordOptions, config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let position = options.position_override.or_else(|| config.fixed_position());
    if position.is_none() {
        presenter.error(
            "No position available. Pass --lat/--lon or set latitude/longitude in the config.",
        );
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let location = FixedLocationProvider::new(position, config.location_enabled_or_default());
    let recorder = CpalClipRecorder::new();
    let player = RodioClipPlayer::new();

    let region = Region::new(
        position.unwrap_or(DEFAULT_REGION_CENTER),
        config.map_span_or_default(),
    );

    let (mut coordinator, mut state_rx) =
        DropCoordinator::new(location, recorder, player, store, region);

    let owner = options
        .owner
        .unwrap_or_else(|| config.owner_or_default().to_string());
    coordinator.set_draft_owner(owner);
    if let Some(note) = options.note {
        coordinator.set_draft_notes(note);
    }

    coordinator.start().await;

    // Preflight: refuse to record without the capabilities in place
    {
        let state = state_rx.borrow().clone();
        if matches!(state.status.icon, StatusIcon::MicOff | StatusIcon::LocationOff) {
            presenter.error(&state.status.message);
            return ExitCode::from(EXIT_ERROR);
        }
        if state.fix.is_none() {
            presenter.error(&Status::waiting_for_location().message);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let runner = tokio::spawn(coordinator.run(cmd_rx));

    if cmd_tx.send(Command::ToggleRecording).await.is_err() {
        presenter.error("Coordinator stopped unexpectedly");
        return ExitCode::from(EXIT_ERROR);
    }

    let started = wait_for_state(&mut state_rx, |s| {
        s.is_recording
            || matches!(
                s.status.icon,
                StatusIcon::Warning | StatusIcon::MicOff | StatusIcon::LocationSearch
            )
    })
    .await;

    match started {
        Some(state) if state.is_recording => {}
        Some(state) => {
            presenter.error(&state.status.message);
            let _ = cmd_tx.send(Command::Shutdown).await;
            let _ = runner.await;
            return ExitCode::from(EXIT_ERROR);
        }
        None => {
            presenter.error("Timed out waiting for recording to start");
            let _ = cmd_tx.send(Command::Shutdown).await;
            let _ = runner.await;
            return ExitCode::from(EXIT_ERROR);
        }
    }

    presenter.start_spinner("Recording... press Enter to stop, Ctrl-C to cancel");

    let stdin_wait = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    });

    let mut exit = EXIT_SUCCESS;
    tokio::select! {
        _ = stdin_wait => {
            let _ = cmd_tx.send(Command::ToggleRecording).await;
            let finished = wait_for_state(&mut state_rx, |s| !s.is_recording).await;
            presenter.stop_spinner();

            match finished {
                Some(state) if state.status.icon == StatusIcon::Pin => {
                    presenter.success(&state.status.message);
                    if let Some(drop) = state.drops.first() {
                        presenter.info(&format!(
                            "Saved drop {} at {}",
                            drop.short_id(),
                            drop.coordinate
                        ));
                    }
                }
                Some(state) => {
                    presenter.error(&state.status.message);
                    exit = EXIT_ERROR;
                }
                None => {
                    presenter.error("Timed out waiting for the drop to be saved");
                    exit = EXIT_ERROR;
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            presenter.stop_spinner();
            presenter.warn("Recording cancelled");
        }
    }

    let _ = cmd_tx.send(Command::Shutdown).await;
    let _ = runner.await;

    ExitCode::from(exit)
}

/// List all stored drops
pub async fn run_list(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let drops = store.drops().await;
    if drops.is_empty() {
        presenter.info("No drops yet");
        return ExitCode::from(EXIT_SUCCESS);
    }

    // Show distances when the config pins a position
    let position = config.fixed_position();
    for drop in &drops {
        presenter.drop_row(drop, position.map(|p| drop.distance_from(&p)));
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Play one drop through the default output device, waiting for it to finish
pub async fn run_play(id_prefix: &str, config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let drops = store.drops().await;
    let prefix = id_prefix.to_lowercase();
    let matches: Vec<_> = drops
        .iter()
        .filter(|d| d.id.to_string().starts_with(&prefix))
        .collect();

    let drop = match matches.as_slice() {
        [] => {
            presenter.error(&format!("No drop matching '{}'", id_prefix));
            return ExitCode::from(EXIT_ERROR);
        }
        [single] => *single,
        _ => {
            presenter.error(&format!(
                "'{}' matches {} drops; use a longer prefix",
                id_prefix,
                matches.len()
            ));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let player = RodioClipPlayer::new();
    let mut playing_rx = player.playing();

    if let Err(e) = player.play(&store.clip_path(drop)).await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.status(&Status::playing(drop.title()));

    // Block until the clip runs out
    while *playing_rx.borrow_and_update() {
        if playing_rx.changed().await.is_err() {
            break;
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// List drops within `radius_m` of a position, closest first
pub async fn run_nearby(position: Coordinate, radius_m: f64, config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    if radius_m <= 0.0 {
        presenter.error("Radius must be positive");
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut nearby: Vec<_> = store
        .drops()
        .await
        .into_iter()
        .map(|drop| {
            let distance = drop.distance_from(&position);
            (drop, distance)
        })
        .filter(|(_, distance)| *distance <= radius_m)
        .collect();
    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));

    if nearby.is_empty() {
        presenter.info(&format!("No drops within {:.0}m of {}", radius_m, position));
        return ExitCode::from(EXIT_SUCCESS);
    }

    for (drop, distance) in &nearby {
        presenter.drop_row(drop, Some(*distance));
    }

    ExitCode::from(EXIT_SUCCESS)
}
