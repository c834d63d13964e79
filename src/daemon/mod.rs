//! Daemon module for the dashboard timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: shared stopwatch/countdown engine
//! - `registry`: independent multi-timer list
//! - `pomodoro`: work/break cycling policy
//! - `dashboard`: single owner of all timer state
//! - `ipc`: Unix socket server and request dispatch

pub mod dashboard;
pub mod ipc;
pub mod pomodoro;
pub mod registry;
pub mod timer;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::clock::IntervalClock;
use crate::config::ServiceConfig;
use crate::notification::{DesktopNotificationSender, NotificationEmitter, NotificationSender};
use crate::sound::{try_create_player, SoundPlayer};

pub use dashboard::{run_clock, Dashboard, SharedDashboard};
pub use ipc::{IpcServer, RequestHandler};
pub use pomodoro::{PomodoroCycle, PomodoroPolicy, SessionKind};
pub use registry::MultiTimerRegistry;
pub use timer::TimerEngine;

/// Builds the notification emitter described by the configuration.
pub fn build_emitter(config: &ServiceConfig) -> NotificationEmitter {
    let sender = DesktopNotificationSender::new_with_fallback(config.notifications)
        .map(|s| Arc::new(s) as Arc<dyn NotificationSender>);
    let player = try_create_player(!config.sound_enabled).map(|p| p as Arc<dyn SoundPlayer>);
    NotificationEmitter::new(sender, player, config.sound)
}

/// Runs the daemon until interrupted.
///
/// Binds the IPC socket, starts the one-second clock and serves each
/// client connection on its own task.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound.
pub async fn run_daemon(config: ServiceConfig) -> Result<()> {
    let socket_path = config.resolved_socket_path()?;
    let server = IpcServer::new(&socket_path).context("IPCサーバーの起動に失敗しました")?;

    let emitter = Arc::new(build_emitter(&config));
    let dashboard = Dashboard::new(emitter, config.pomodoro).into_shared();
    let handler = RequestHandler::new(Arc::clone(&dashboard));

    let clock = tokio::spawn(run_clock(Arc::clone(&dashboard), IntervalClock::new()));

    info!("Daemon listening on {:?}", server.socket_path());

    loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.serve(stream).await {
                            debug!("Connection ended with error: {:#}", e);
                        }
                    });
                }
                Err(e) => warn!("Failed to accept connection: {:#}", e),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    clock.abort();
    Ok(())
}
