//! IPC Server
//!
//! This module provides the Unix socket server and a matching client.
//!
//! Connections are served strictly one at a time: accept, read one request,
//! dispatch, write one response, close. The next connection is accepted only
//! after the previous one is finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use super::handler::IpcHandler;
use super::protocol::{decode_message, read_frame, write_frame, Message, Response, MAX_MESSAGE_SIZE};
use crate::config::IpcConfig;
use crate::error::IpcError;

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// IPC server answering queries over a Unix socket
pub struct IpcServer {
    /// Configuration
    config: IpcConfig,

    /// Command handler
    handler: Arc<IpcHandler>,
}

impl IpcServer {
    /// Create a new IPC server
    ///
    /// The server stops when the token in the handler's
    /// [`ServerControl`](super::ServerControl) is cancelled.
    pub fn new(config: IpcConfig, handler: Arc<IpcHandler>) -> Self {
        Self { config, handler }
    }

    /// Create the listening socket
    ///
    /// Removes a stale socket file, creates the parent directory and applies
    /// the configured permission mode.
    ///
    /// # Errors
    ///
    /// Returns `IpcError::BindError` if any step fails.
    pub fn bind(&self) -> Result<UnixListener, IpcError> {
        let socket_path = &self.config.socket_path;
        let path_str = socket_path.display().to_string();

        // Remove existing socket file if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).map_err(|e| {
                IpcError::bind(&path_str, format!("Failed to remove existing socket: {e}"))
            })?;
        }

        if let Some(parent) = socket_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    IpcError::bind(&path_str, format!("Failed to create parent directory: {e}"))
                })?;
            }
        }

        let listener =
            UnixListener::bind(socket_path).map_err(|e| IpcError::bind(&path_str, e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(self.config.socket_mode);
            std::fs::set_permissions(socket_path, permissions).map_err(|e| {
                IpcError::bind(&path_str, format!("Failed to set permissions: {e}"))
            })?;
        }

        info!("IPC server listening on {:?}", socket_path);
        Ok(listener)
    }

    /// Serve connections on `listener` until shut down, then remove the socket
    pub async fn serve(&self, listener: UnixListener) {
        let control = self.handler.control();
        let token = control.token().clone();
        let max_size = self.config.max_message_size;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("IPC server shutting down");
                    break;
                }
                result = listener.accept() => {
                    match result {
                        Ok((stream, _addr)) => {
                            // Awaited before the next accept; a panic only ends this connection
                            let handler = Arc::clone(&self.handler);
                            let task = tokio::spawn(handle_connection(stream, handler, max_size));
                            match task.await {
                                Ok(Ok(())) => {}
                                Ok(Err(e)) => log_connection_error(&e),
                                Err(e) => error!("IPC connection task failed: {}", e),
                            }
                        }
                        Err(e) => {
                            error!("IPC accept error: {}", e);
                            tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                            continue;
                        }
                    }

                    if control.take_shutdown_request() {
                        info!(grace_ms = control.grace().as_millis() as u64, "Shutdown requested over IPC");
                        tokio::time::sleep(control.grace()).await;
                        token.cancel();
                    }
                }
            }
        }

        drop(listener);
        let socket_path = &self.config.socket_path;
        if socket_path.exists() {
            if let Err(e) = std::fs::remove_file(socket_path) {
                warn!("Failed to remove IPC socket {:?}: {}", socket_path, e);
            }
        }
        info!("IPC server stopped");
    }

    /// Initiate shutdown
    pub fn shutdown(&self) {
        self.handler.control().token().cancel();
    }
}

fn log_connection_error(e: &IpcError) {
    match e {
        IpcError::ProtocolError(_) | IpcError::FrameTooLarge { .. } => {
            warn!("Dropping IPC connection: {}", e);
        }
        _ if e.is_recoverable() => debug!("IPC connection error: {}", e),
        _ => error!("IPC connection error: {}", e),
    }
}

/// Serve one request on `stream`
///
/// Any framing or decoding error ends the connection without a response.
async fn handle_connection(
    mut stream: UnixStream,
    handler: Arc<IpcHandler>,
    max_message_size: usize,
) -> Result<(), IpcError> {
    let payload = read_frame(&mut stream, max_message_size).await?;
    let message: Message = decode_message(&payload)?;

    debug!(service = %message.service, command = %message.command, "Received IPC request");

    let response = handler.handle(&message);
    write_frame(&mut stream, &response).await
}

/// IPC client for connecting to the server
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// Create a new IPC client
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    /// Send a request and receive the response
    ///
    /// # Errors
    ///
    /// Returns `IpcError::ConnectionError` if the server is not reachable,
    /// or a protocol error if the response is malformed.
    pub async fn send(&self, message: &Message) -> Result<Response, IpcError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| IpcError::ConnectionError(e.to_string()))?;

        write_frame(&mut stream, message).await?;

        let payload = read_frame(&mut stream, MAX_MESSAGE_SIZE).await?;
        decode_message(&payload)
    }

    /// Send a parameterless `(service, command)` request
    ///
    /// # Errors
    ///
    /// See [`IpcClient::send`].
    pub async fn request(&self, service: &str, command: &str) -> Result<Response, IpcError> {
        self.send(&Message::new(service, command)).await
    }
}
