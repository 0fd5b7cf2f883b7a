//! TCP client for the controller's streaming protocol.
//!
//! A [`StreamingClient`] holds at most one connection. Each successful
//! [`connect`](StreamingClient::connect) spawns a receive loop thread that
//! reads messages until the peer closes, an I/O error occurs, or
//! [`disconnect`](StreamingClient::disconnect) is called. Everything the
//! loop learns is published as a [`ClientEvent`] on a channel, in arrival
//! order.
//!
//! `disconnect` shuts the socket down, which wakes the blocked read right
//! away on common platforms. In the worst case the loop notices on its next
//! read timeout (`read_timeout_ms`, 5 seconds by default).

pub mod commands;
mod events;
mod receiver;
mod session;

pub use events::ClientEvent;

use crate::config::ConnectionConfig;
use crate::error::{AppError, ConnectionError, Result};
use crate::protocol::encode_command;
use crossbeam_channel::{unbounded, Receiver};
use events::EventSink;
use log::{debug, error, info, warn};
use receiver::ReceiveLoop;
use serde::Serialize;
use session::{Session, SessionRegistry};
use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

pub struct StreamingClient {
    config: ConnectionConfig,
    sessions: Arc<SessionRegistry>,
    events: EventSink,
    subscriber: Receiver<ClientEvent>,
    receiver_thread: Mutex<Option<JoinHandle<()>>>,
    send_lock: Mutex<()>,
}

impl Default for StreamingClient {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl StreamingClient {
    pub fn new(config: ConnectionConfig) -> Self {
        let (sender, subscriber) = unbounded();
        Self {
            config,
            sessions: Arc::new(SessionRegistry::default()),
            events: EventSink::new(sender),
            subscriber,
            receiver_thread: Mutex::new(None),
            send_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// A handle on the event channel. Every clone drains the same queue,
    /// so each event is delivered to exactly one holder.
    pub fn events(&self) -> Receiver<ClientEvent> {
        self.subscriber.clone()
    }

    /// Connects to the host and port from the configuration.
    pub fn connect_default(&self) -> Result<()> {
        let host = self.config.host.clone();
        self.connect(&host, self.config.port)
    }

    /// Opens a connection and starts the receive loop.
    ///
    /// If a connection is already open it is closed first. Failures are
    /// returned and also published once as [`ClientEvent::ErrorOccurred`].
    pub fn connect(&self, host: &str, port: u16) -> Result<()> {
        if self.is_connected() {
            info!("Already connected, closing the current connection first");
            self.disconnect();
        }
        self.reap_receiver();

        let result = self.open_session(host, port);
        if let Err(e) = &result {
            error!("Connect to {}:{} failed: {}", host, port, e);
            self.events.error(e.to_string());
        }
        result
    }

    fn open_session(&self, host: &str, port: u16) -> Result<()> {
        if host.trim().is_empty() {
            return Err(ConnectionError::invalid_address("host cannot be empty").into());
        }
        if port == 0 {
            return Err(ConnectionError::invalid_address("port must be greater than 0").into());
        }

        info!("Connecting to {}:{}...", host, port);
        let stream = self.open_stream(host, port)?;

        stream
            .set_read_timeout(Some(self.config.read_timeout()))
            .map_err(|e| ConnectionError::failed(e.to_string()))?;
        stream
            .set_write_timeout(self.config.send_timeout())
            .map_err(|e| ConnectionError::failed(e.to_string()))?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to disable Nagle's algorithm: {}", e);
        }

        let id = self.sessions.next_id();
        let stream = Arc::new(stream);
        let running = Arc::new(AtomicBool::new(true));
        let session = Session {
            id,
            stream: Arc::clone(&stream),
            running: Arc::clone(&running),
            peer: stream.peer_addr().ok(),
        };
        if let Some(stale) = self.sessions.install(session) {
            warn!("Replaced stale session {}", stale.id);
            let _ = stale.stream.shutdown(std::net::Shutdown::Both);
        }

        info!("Connected to {}:{} (session {})", host, port, id);
        self.events.connection_changed(true);

        let receive_loop = ReceiveLoop {
            session_id: id,
            stream,
            running,
            max_payload_len: self.config.max_payload_len,
            events: self.events.clone(),
            sessions: Arc::clone(&self.sessions),
        };

        let handle = thread::Builder::new()
            .name("sira-receiver".to_string())
            .spawn(move || receive_loop.run());

        match handle {
            Ok(handle) => {
                *self
                    .receiver_thread
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.sessions.teardown(Some(id), &self.events);
                let reason = format!("could not start receiver thread: {}", e);
                Err(ConnectionError::failed(reason).into())
            }
        }
    }

    fn open_stream(
        &self,
        host: &str,
        port: u16,
    ) -> std::result::Result<TcpStream, ConnectionError> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| ConnectionError::failed(e.to_string()))?
            .collect();

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout()) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => ConnectionError::from_io(&e),
            None => ConnectionError::invalid_address(format!("{} did not resolve", host)),
        })
    }

    /// Closes the connection. Safe to call at any time and any number of
    /// times; `ConnectionChanged(false)` is published only when a live
    /// connection was actually closed. Does not wait for the receive loop.
    pub fn disconnect(&self) {
        debug!("Disconnecting...");
        self.sessions.teardown(None, &self.events);
    }

    pub fn is_connected(&self) -> bool {
        self.sessions.is_connected()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.sessions.peer_addr()
    }

    /// Serializes `command` as a JSON object and writes it as a COMMAND
    /// message on the caller's thread.
    ///
    /// Nothing is retried, and a failed write does not close the connection;
    /// the receive loop notices a dead socket on its own.
    pub fn send_command<T: Serialize + ?Sized>(&self, command: &T) -> Result<()> {
        let result = self.write_command(command);
        if let Err(e) = &result {
            warn!("{}", e);
            self.events.error(e.to_string());
        }
        result
    }

    fn write_command<T: Serialize + ?Sized>(&self, command: &T) -> Result<()> {
        let stream = self.sessions.writer().ok_or(AppError::NotConnected)?;

        let value = serde_json::to_value(command)?;
        if !value.is_object() {
            return Err(AppError::invalid_command("command must serialize to a JSON object"));
        }
        let bytes = encode_command(&value)?;

        let _guard = self.send_lock.lock().unwrap_or_else(PoisonError::into_inner);
        (&*stream)
            .write_all(&bytes)
            .and_then(|_| (&*stream).flush())
            .map_err(|e| AppError::send(e.to_string()))?;

        debug!("Sent command ({} bytes)", bytes.len());
        Ok(())
    }

    /// Joins a receive loop left over from an earlier connection.
    fn reap_receiver(&self) {
        let handle = self
            .receiver_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Receiver thread panicked");
            }
        }
    }
}

impl Drop for StreamingClient {
    fn drop(&mut self) {
        self.disconnect();
        self.reap_receiver();
    }
}
