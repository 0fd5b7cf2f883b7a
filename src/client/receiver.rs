use super::events::EventSink;
use super::session::SessionRegistry;
use crate::error::{AppError, Result};
use crate::frame::FrameDecoder;
use crate::protocol::{Message, MessageReader, MessageType};
use crate::telemetry::Telemetry;
use log::{debug, error, info, warn};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Body of the background thread spawned by a successful `connect`.
pub(crate) struct ReceiveLoop {
    pub(crate) session_id: u64,
    pub(crate) stream: Arc<TcpStream>,
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) max_payload_len: usize,
    pub(crate) events: EventSink,
    pub(crate) sessions: Arc<SessionRegistry>,
}

impl ReceiveLoop {
    pub(crate) fn run(self) {
        info!("Receiver thread started for session {}", self.session_id);

        if let Err(e) = self.pump() {
            if self.running.load(Ordering::Acquire) {
                let cause = match e {
                    AppError::Io(io) => io.to_string(),
                    other => other.to_string(),
                };
                error!("Receive error: {}", cause);
                self.events.error(AppError::receive(cause).to_string());
            } else {
                debug!("Read failed after stop was requested: {}", e);
            }
        }

        info!("Receiver thread stopped for session {}", self.session_id);
        self.sessions.teardown(Some(self.session_id), &self.events);
    }

    fn pump(&self) -> Result<()> {
        let mut reader = MessageReader::new(&*self.stream, Arc::clone(&self.running))
            .with_max_payload_len(self.max_payload_len);
        let mut dispatcher = Dispatcher::new(self.events.clone());

        while self.running.load(Ordering::Acquire) {
            match reader.read_message()? {
                Some(message) => dispatcher.dispatch(message),
                None => {
                    debug!("Connection closed by peer");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Turns whole messages into events. Decode failures drop one message only.
pub(crate) struct Dispatcher {
    events: EventSink,
    frames_decoded: u64,
}

impl Dispatcher {
    pub(crate) fn new(events: EventSink) -> Self {
        Self {
            events,
            frames_decoded: 0,
        }
    }

    pub(crate) fn dispatch(&mut self, message: Message) {
        match message.kind {
            MessageType::Frame => {
                match FrameDecoder::decode(&message.payload, self.frames_decoded) {
                    Ok(frame) => {
                        self.frames_decoded += 1;
                        self.events.frame(frame);
                    }
                    Err(e) => warn!("Dropping frame: {}", e),
                }
            }
            MessageType::Telemetry => match Telemetry::decode(&message.payload) {
                Ok(telemetry) => self.events.telemetry(telemetry),
                Err(e) => warn!("Dropping telemetry: {}", e),
            },
            MessageType::Unknown(tag) => {
                warn!(
                    "Unknown message type {:#04x} ({} bytes), skipping",
                    tag,
                    message.payload.len()
                );
            }
            other => {
                debug!(
                    "Ignoring {} message ({} bytes)",
                    other,
                    message.payload.len()
                );
            }
        }
    }
}
