use crate::frame::Frame;
use crate::telemetry::Telemetry;
use crossbeam_channel::Sender;
use log::trace;

/// Notifications published by the client, in the order they happened.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    FrameReceived(Frame),
    TelemetryReceived(Telemetry),
    ConnectionChanged(bool),
    ErrorOccurred(String),
}

/// Producer side of the event channel, shared by the caller and the receive loop.
#[derive(Clone)]
pub(crate) struct EventSink {
    sender: Sender<ClientEvent>,
}

impl EventSink {
    pub(crate) fn new(sender: Sender<ClientEvent>) -> Self {
        Self { sender }
    }

    fn emit(&self, event: ClientEvent) {
        if let Err(e) = self.sender.send(event) {
            trace!("No subscriber for {:?}", e.into_inner());
        }
    }

    pub(crate) fn frame(&self, frame: Frame) {
        self.emit(ClientEvent::FrameReceived(frame));
    }

    pub(crate) fn telemetry(&self, telemetry: Telemetry) {
        self.emit(ClientEvent::TelemetryReceived(telemetry));
    }

    pub(crate) fn connection_changed(&self, connected: bool) {
        self.emit(ClientEvent::ConnectionChanged(connected));
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.emit(ClientEvent::ErrorOccurred(message.into()));
    }
}
