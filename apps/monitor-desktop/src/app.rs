//! Application orchestrator: wires the monitor to the tray.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regwatch_monitor::{ChangeEvent, ChangeFn, Monitor};
use regwatch_tray::{TrayConfig, TrayEvent, TrayHandle};
use tokio::sync::mpsc;

use crate::config::Settings;

/// How often pending tray events are drained.
const TRAY_POLL: Duration = Duration::from_millis(100);

/// What the control loop should do after handling a tray event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Probes the configured device once and prints the outcome.
pub async fn test_connection(settings: &Settings) -> anyhow::Result<bool> {
    let config = settings.poll_config()?;
    let target = config.target();

    let reachable = regwatch_probe::probe(target, config.timeout()).await;
    if reachable {
        println!("Connected to {} at {target}", settings.device_name);
    } else {
        println!("Cannot reach {} at {target}", settings.device_name);
    }
    Ok(reachable)
}

/// Runs the monitor until shutdown is requested.
pub async fn run(settings: Settings, config_path: PathBuf) -> anyhow::Result<()> {
    let poll_config = settings.poll_config()?;

    // -- Monitor --
    let (change_tx, mut change_rx) = mpsc::unbounded_channel();
    let monitor = Monitor::new(poll_config, forward_changes(change_tx));

    // -- Tray --
    let tray_config = TrayConfig {
        device_name: settings.device_name.clone(),
        target: monitor.config().target().to_string(),
    };
    // The event sender and update receiver belong to the tray backend.
    let (mut tray, _event_tx, _update_rx) = TrayHandle::new(tray_config);

    // -- Start monitoring --
    monitor.start().await;
    tray.set_running(true);
    tracing::info!(tooltip = %tray.state().tooltip(), "monitor ready");

    // -- Main loop --
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut tray_poll = tokio::time::interval(TRAY_POLL);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("SIGINT received, shutting down");
                break;
            }
            Some(event) = change_rx.recv() => {
                on_status_change(&mut tray, event);
            }
            _ = tray_poll.tick() => {
                if drain_tray_events(&monitor, &mut tray, &config_path) == Flow::Quit {
                    tracing::info!("quit requested via tray");
                    break;
                }
            }
        }
    }

    // -- Graceful shutdown --
    tracing::info!("stopping services...");
    monitor.stop().await;
    tray.set_running(false);
    tray.shutdown();

    Ok(())
}

/// Hands every change announcement to the control loop; none are dropped.
fn forward_changes(tx: mpsc::UnboundedSender<ChangeEvent>) -> ChangeFn {
    Box::new(move |event| {
        if tx.send(event).is_err() {
            tracing::debug!(connected = event.connected, "control loop gone, change not delivered");
        }
    })
}

fn on_status_change(tray: &mut TrayHandle, event: ChangeEvent) {
    tray.status_changed(event.connected, event.timestamp);
    tracing::info!(
        connected = event.connected,
        icon = tray.icon().colour_name(),
        tooltip = %tray.state().tooltip(),
        "device status changed"
    );
}

fn drain_tray_events(monitor: &Monitor, tray: &mut TrayHandle, config_path: &Path) -> Flow {
    while let Some(event) = tray.try_recv_event() {
        if handle_tray_event(event, monitor, tray, config_path) == Flow::Quit {
            return Flow::Quit;
        }
    }
    Flow::Continue
}

fn handle_tray_event(
    event: TrayEvent,
    monitor: &Monitor,
    tray: &mut TrayHandle,
    config_path: &Path,
) -> Flow {
    match event {
        TrayEvent::StatusRequested => {
            tracing::info!("{}", tray.state().status_message());
            Flow::Continue
        }
        TrayEvent::SettingsRequested => {
            if let Err(e) = apply_settings_file(monitor, tray, config_path) {
                tracing::error!(path = %config_path.display(), "settings not applied: {e:#}");
            }
            Flow::Continue
        }
        TrayEvent::QuitRequested => Flow::Quit,
    }
}

/// Reloads the settings file and hands the result to the running monitor.
fn apply_settings_file(monitor: &Monitor, tray: &mut TrayHandle, path: &Path) -> anyhow::Result<()> {
    let settings = Settings::load_or_create(path)?;
    let config = settings.poll_config()?;

    let target = config.target().to_string();
    monitor.replace_config(config);
    if tray.state().target != target {
        tray.target_changed(target);
    }
    Ok(())
}
