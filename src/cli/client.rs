//! IPC Client for communicating with the focusdeck daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling
//! - Line-delimited snapshot streaming for `watch`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::cli::commands::{SoundArgs, StartArgs};
use crate::config::default_socket_path;
use crate::types::{IpcRequest, IpcResponse, SoundType, TimerState};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: u64 = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_socket_path(default_socket_path()?))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Creates a client for an optional override path.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is given and the home directory cannot be
    /// determined.
    pub fn from_option(socket_path: Option<PathBuf>) -> Result<Self> {
        match socket_path {
            Some(path) => Ok(Self::with_socket_path(path)),
            None => Self::new(),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self, args: &StartArgs) -> Result<IpcResponse> {
        let request = IpcRequest::Start {
            params: args.to_params(),
        };
        self.send_request_with_retry(&request).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a resume command to the daemon.
    pub async fn resume(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Resume).await
    }

    /// Sends a stop command to the daemon.
    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Stop).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Records a lap.
    pub async fn lap(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Lap).await
    }

    /// Shows or hides the timer.
    pub async fn set_visible(&self, visible: bool) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SetVisible { visible })
            .await
    }

    /// Adds a multi-timer.
    pub async fn multi_add(&self, name: Option<&str>, seconds: u32) -> Result<IpcResponse> {
        let request = IpcRequest::MultiAdd {
            name: name.unwrap_or_default().to_string(),
            seconds: i64::from(seconds),
        };
        self.send_request_with_retry(&request).await
    }

    /// Lists multi-timers.
    pub async fn multi_list(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::MultiList).await
    }

    /// Starts or pauses a multi-timer.
    pub async fn multi_toggle(&self, id: &str) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::MultiToggle { id: id.to_string() })
            .await
    }

    /// Rewinds a multi-timer.
    pub async fn multi_reset(&self, id: &str) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::MultiReset { id: id.to_string() })
            .await
    }

    /// Deletes a multi-timer.
    pub async fn multi_remove(&self, id: &str) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::MultiRemove { id: id.to_string() })
            .await
    }

    /// Lists presets.
    pub async fn preset_list(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::PresetList).await
    }

    /// Saves a preset.
    pub async fn preset_add(
        &self,
        name: &str,
        seconds: u32,
        sound_type: Option<SoundType>,
    ) -> Result<IpcResponse> {
        let request = IpcRequest::PresetAdd {
            name: name.to_string(),
            seconds: i64::from(seconds),
            sound_type,
        };
        self.send_request_with_retry(&request).await
    }

    /// Deletes a preset.
    pub async fn preset_remove(&self, id: &str) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::PresetRemove { id: id.to_string() })
            .await
    }

    /// Starts a countdown from a preset.
    pub async fn preset_apply(&self, id: &str) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::PresetApply { id: id.to_string() })
            .await
    }

    /// Updates the completion sound.
    pub async fn set_sound(&self, args: &SoundArgs) -> Result<IpcResponse> {
        let request = IpcRequest::SetSound {
            sound_type: args.sound_type,
            volume: args.volume,
        };
        self.send_request_with_retry(&request).await
    }

    /// Streams timer snapshots until the daemon closes the connection.
    ///
    /// `on_state` is called once immediately and then on every change.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable or sends malformed data.
    pub async fn watch<F>(&self, mut on_state: F) -> Result<()>
    where
        F: FnMut(&TimerState),
    {
        let mut stream = self.connect().await?;
        Self::write_request(&mut stream, &IpcRequest::Watch).await?;

        let mut lines = BufReader::new(stream).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("レスポンスの受信に失敗しました")?
        {
            let state: TimerState =
                serde_json::from_str(&line).context("レスポンスのパースに失敗しました")?;
            on_state(&state);
        }

        Ok(())
    }

    /// Sends a request to the daemon, retrying transport failures.
    ///
    /// Error responses from the daemon are returned immediately.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_request(request).await {
                Ok(response) => {
                    if response.is_error() {
                        anyhow::bail!("{}", response.message);
                    }
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!("リクエスト失敗 (試行 {}/{}): {}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("リクエストに失敗しました")))
    }

    /// Connects to the daemon socket.
    async fn connect(&self) -> Result<UnixStream> {
        timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("接続がタイムアウトしました")?
            .context("Daemonに接続できません。'focusdeck daemon' を起動してください")
    }

    /// Writes a request and flushes it.
    async fn write_request(stream: &mut UnixStream, request: &IpcRequest) -> Result<()> {
        let request_json =
            serde_json::to_string(request).context("リクエストのシリアライズに失敗しました")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("書き込みがタイムアウトしました")?
        .context("リクエストの送信に失敗しました")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("フラッシュがタイムアウトしました")?
            .context("フラッシュに失敗しました")?;

        Ok(())
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = self.connect().await?;
        Self::write_request(&mut stream, request).await?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("シャットダウンに失敗しました")?;

        let mut buffer = Vec::new();
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream).take(MAX_RESPONSE_SIZE).read_to_end(&mut buffer),
        )
        .await
        .context("読み込みがタイムアウトしました")?
        .context("レスポンスの受信に失敗しました")?;

        if buffer.is_empty() {
            anyhow::bail!("Daemonからの応答がありませんでした");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("レスポンスのパースに失敗しました")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
