//! IPC server for the dashboard daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for dashboard commands
//! - Streaming timer snapshots to `watch` clients

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::types::{
    IpcRequest, IpcResponse, ResponseData, SoundType, StartMode, StartParams, TimerState,
};

use super::dashboard::SharedDashboard;

// ============================================================================
// Constants
// ============================================================================

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "~/.focusdeck/focusdeck.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket binding error
    #[error("Failed to bind socket: {0}")]
    BindError(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Write error
    #[error("Failed to write response: {0}")]
    WriteError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .map_err(|e| IpcError::BindError(e.to_string()))
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| IpcError::ConnectionError(e.to_string()))?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .map_err(|e| IpcError::WriteError(e.to_string()))?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Writes one timer snapshot as a JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if the client has gone away.
    pub async fn send_state_line(stream: &mut UnixStream, state: &TimerState) -> Result<()> {
        let mut line = serde_json::to_vec(state).context("Failed to serialize timer state")?;
        line.push(b'\n');

        stream
            .write_all(&line)
            .await
            .map_err(|e| IpcError::WriteError(e.to_string()))?;
        stream.flush().await.context("Failed to flush state line")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the dashboard.
#[derive(Clone)]
pub struct RequestHandler {
    /// Shared reference to the dashboard
    dashboard: SharedDashboard,
}

impl RequestHandler {
    /// Creates a new request handler for the given dashboard.
    pub fn new(dashboard: SharedDashboard) -> Self {
        Self { dashboard }
    }

    /// Serves one client connection.
    ///
    /// A `watch` request keeps the connection open and streams snapshots;
    /// every other request gets exactly one response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be read or the response
    /// cannot be written.
    pub async fn serve(&self, mut stream: UnixStream) -> Result<()> {
        let request = match IpcServer::receive_request(&mut stream).await {
            Ok(request) => request,
            Err(e) => {
                let response = IpcResponse::error(format!("不正なリクエストです: {}", e));
                IpcServer::send_response(&mut stream, &response).await?;
                return Err(e);
            }
        };

        if matches!(request, IpcRequest::Watch) {
            return self.stream_updates(stream).await;
        }

        let response = self.handle(request).await;
        IpcServer::send_response(&mut stream, &response).await
    }

    /// Streams a snapshot line on every timer change until the client leaves.
    async fn stream_updates(&self, mut stream: UnixStream) -> Result<()> {
        let mut rx = self.dashboard.lock().await.subscribe();
        debug!("Watch client connected");

        let mut scratch = [0u8; 64];
        'stream: loop {
            let state = rx.borrow_and_update().clone();
            if IpcServer::send_state_line(&mut stream, &state).await.is_err() {
                break;
            }

            // Watch clients send nothing after the request; EOF means they left.
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break 'stream;
                        }
                        break;
                    }
                    read = stream.read(&mut scratch) => match read {
                        Ok(0) | Err(_) => break 'stream,
                        Ok(_) => continue,
                    },
                }
            }
        }

        debug!("Watch client disconnected");
        Ok(())
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start { params } => self.handle_start(params).await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Resume => self.handle_resume().await,
            IpcRequest::Stop => self.handle_stop().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Status | IpcRequest::Watch => self.handle_status().await,
            IpcRequest::Lap => self.handle_lap().await,
            IpcRequest::SetVisible { visible } => self.handle_set_visible(visible).await,
            IpcRequest::MultiAdd { name, seconds } => self.handle_multi_add(&name, seconds).await,
            IpcRequest::MultiList => self.handle_multi_list().await,
            IpcRequest::MultiToggle { id } => self.handle_multi_toggle(&id).await,
            IpcRequest::MultiReset { id } => self.handle_multi_reset(&id).await,
            IpcRequest::MultiRemove { id } => self.handle_multi_remove(&id).await,
            IpcRequest::PresetList => self.handle_preset_list().await,
            IpcRequest::PresetAdd {
                name,
                seconds,
                sound_type,
            } => self.handle_preset_add(&name, seconds, sound_type).await,
            IpcRequest::PresetRemove { id } => self.handle_preset_remove(&id).await,
            IpcRequest::PresetApply { id } => self.handle_preset_apply(&id).await,
            IpcRequest::SetSound { sound_type, volume } => {
                self.handle_set_sound(sound_type, volume).await
            }
        }
    }

    /// Handles the start command.
    async fn handle_start(&self, params: StartParams) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;

        let message = match params.mode {
            StartMode::Stopwatch => "ストップウォッチを開始しました",
            StartMode::Timer => "タイマーを開始しました",
            StartMode::Pomodoro => "ポモドーロを開始しました",
        };
        dashboard.start(params);

        IpcResponse::success(message, Some(dashboard.snapshot()))
    }

    /// Handles the pause command.
    async fn handle_pause(&self) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        dashboard.pause();
        IpcResponse::success("タイマーを一時停止しました", Some(dashboard.snapshot()))
    }

    /// Handles the resume command.
    async fn handle_resume(&self) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        dashboard.resume();
        IpcResponse::success("タイマーを再開しました", Some(dashboard.snapshot()))
    }

    /// Handles the stop command.
    async fn handle_stop(&self) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        dashboard.stop();
        IpcResponse::success("タイマーを停止しました", Some(dashboard.snapshot()))
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        dashboard.reset();
        IpcResponse::success("タイマーをリセットしました", Some(dashboard.snapshot()))
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let dashboard = self.dashboard.lock().await;
        IpcResponse::success("", Some(dashboard.snapshot()))
    }

    /// Handles the lap command.
    async fn handle_lap(&self) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        match dashboard.lap() {
            Some(_) => IpcResponse::success("ラップを記録しました", Some(dashboard.snapshot())),
            None => IpcResponse::error("タイマーが動作していません"),
        }
    }

    /// Handles the show/hide command.
    async fn handle_set_visible(&self, visible: bool) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        dashboard.set_visible(visible);
        let message = if visible {
            "タイマーを表示しました"
        } else {
            "タイマーを非表示にしました"
        };
        IpcResponse::success(message, Some(dashboard.snapshot()))
    }

    /// Handles the multi-timer add command.
    async fn handle_multi_add(&self, name: &str, seconds: i64) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        let id = dashboard.multi_add(name, seconds);
        IpcResponse::success(
            "マルチタイマーを追加しました",
            Some(ResponseData {
                id: Some(id),
                timers: Some(dashboard.multi_list()),
                ..ResponseData::default()
            }),
        )
    }

    /// Handles the multi-timer list command.
    async fn handle_multi_list(&self) -> IpcResponse {
        let dashboard = self.dashboard.lock().await;
        IpcResponse::success("", Some(Self::timers_data(dashboard.multi_list())))
    }

    /// Handles the multi-timer toggle command.
    async fn handle_multi_toggle(&self, id: &str) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        if !dashboard.multi_toggle(id) {
            return Self::timer_not_found(id);
        }
        IpcResponse::success(
            "マルチタイマーを切り替えました",
            Some(Self::timers_data(dashboard.multi_list())),
        )
    }

    /// Handles the multi-timer reset command.
    async fn handle_multi_reset(&self, id: &str) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        if !dashboard.multi_reset(id) {
            return Self::timer_not_found(id);
        }
        IpcResponse::success(
            "マルチタイマーをリセットしました",
            Some(Self::timers_data(dashboard.multi_list())),
        )
    }

    /// Handles the multi-timer remove command.
    async fn handle_multi_remove(&self, id: &str) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        if !dashboard.multi_remove(id) {
            return Self::timer_not_found(id);
        }
        IpcResponse::success(
            "マルチタイマーを削除しました",
            Some(Self::timers_data(dashboard.multi_list())),
        )
    }

    /// Handles the preset list command.
    async fn handle_preset_list(&self) -> IpcResponse {
        let dashboard = self.dashboard.lock().await;
        IpcResponse::success(
            "",
            Some(ResponseData {
                presets: Some(dashboard.presets().to_vec()),
                ..ResponseData::default()
            }),
        )
    }

    /// Handles the preset add command.
    async fn handle_preset_add(
        &self,
        name: &str,
        seconds: i64,
        sound_type: Option<SoundType>,
    ) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        match dashboard.preset_add(name, seconds, sound_type) {
            Ok(preset) => IpcResponse::success(
                "プリセットを追加しました",
                Some(ResponseData {
                    id: Some(preset.id),
                    presets: Some(dashboard.presets().to_vec()),
                    ..ResponseData::default()
                }),
            ),
            Err(e) => IpcResponse::error(e),
        }
    }

    /// Handles the preset remove command.
    async fn handle_preset_remove(&self, id: &str) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        if !dashboard.preset_remove(id) {
            return IpcResponse::error(format!("プリセットが見つかりません: {}", id));
        }
        IpcResponse::success(
            "プリセットを削除しました",
            Some(ResponseData {
                presets: Some(dashboard.presets().to_vec()),
                ..ResponseData::default()
            }),
        )
    }

    /// Handles the preset use command.
    async fn handle_preset_apply(&self, id: &str) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        match dashboard.preset_apply(id) {
            Some(_) => IpcResponse::success(
                "プリセットでタイマーを開始しました",
                Some(dashboard.snapshot()),
            ),
            None => IpcResponse::error(format!("プリセットが見つかりません: {}", id)),
        }
    }

    /// Handles the sound settings command.
    async fn handle_set_sound(
        &self,
        sound_type: Option<SoundType>,
        volume: Option<f32>,
    ) -> IpcResponse {
        let mut dashboard = self.dashboard.lock().await;
        match dashboard.set_sound(sound_type, volume) {
            Ok(settings) => IpcResponse::success(
                "サウンド設定を更新しました",
                Some(ResponseData {
                    sound: Some(settings),
                    ..ResponseData::default()
                }),
            ),
            Err(e) => IpcResponse::error(e),
        }
    }

    fn timers_data(timers: Vec<crate::types::SingleTimer>) -> ResponseData {
        ResponseData {
            timers: Some(timers),
            ..ResponseData::default()
        }
    }

    fn timer_not_found(id: &str) -> IpcResponse {
        IpcResponse::error(format!("マルチタイマーが見つかりません: {}", id))
    }
}

// ============================================================================
// Tests
// ============================================================================
