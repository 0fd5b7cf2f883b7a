use super::codec::{decode_header, Message, HEADER_LEN};
use crate::error::{AppError, Result};
use log::{debug, trace};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default upper bound on a declared payload length (64 MiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// Reads exactly `len` bytes, accumulating across short reads.
///
/// Returns `Ok(None)` when the peer closes the stream before `len` bytes
/// arrived, or when `running` was cleared while waiting out a read timeout.
/// Timeouts and interrupts are retried; any other error is returned.
pub fn read_exact_or_eof<R: Read>(
    reader: &mut R,
    len: usize,
    running: &AtomicBool,
) -> io::Result<Option<Vec<u8>>> {
    let mut buffer = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => {
                trace!("Stream closed after {} of {} bytes", filled, len);
                return Ok(None);
            }
            Ok(n) => filled += n,
            Err(e) if is_transient(&e) => {
                if !running.load(Ordering::Acquire) {
                    trace!("Read timed out after stop was requested");
                    return Ok(None);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(Some(buffer))
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Pulls whole messages off a byte stream.
pub struct MessageReader<R> {
    inner: R,
    running: Arc<AtomicBool>,
    max_payload_len: usize,
}

impl<R: Read> MessageReader<R> {
    pub fn new(inner: R, running: Arc<AtomicBool>) -> Self {
        Self {
            inner,
            running,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    pub fn with_max_payload_len(mut self, max_payload_len: usize) -> Self {
        self.max_payload_len = max_payload_len;
        self
    }

    /// Next complete message, or `None` on end of stream.
    pub fn read_message(&mut self) -> Result<Option<Message>> {
        let header = match read_exact_or_eof(&mut self.inner, HEADER_LEN, &self.running)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let mut raw = [0u8; HEADER_LEN];
        raw.copy_from_slice(&header);
        let (kind, length) = decode_header(&raw);
        let length = length as usize;

        if length > self.max_payload_len {
            return Err(AppError::protocol(format!(
                "{} message declares {} bytes, limit is {}",
                kind, length, self.max_payload_len
            )));
        }

        debug!("Reading {} message with {} byte payload", kind, length);

        match read_exact_or_eof(&mut self.inner, length, &self.running)? {
            Some(payload) => Ok(Some(Message::new(kind, payload))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MessageType;
    use rand::Rng;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Hands out at most `chunk` bytes per read, with optional timeouts in between.
    struct ChunkedReader {
        data: VecDeque<u8>,
        chunk: usize,
        timeout_every: Option<usize>,
        calls: usize,
    }

    impl ChunkedReader {
        fn new(data: Vec<u8>, chunk: usize) -> Self {
            Self {
                data: data.into(),
                chunk,
                timeout_every: None,
                calls: 0,
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            if let Some(every) = self.timeout_every {
                if self.calls % every == 0 {
                    return Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"));
                }
            }
            let n = self.chunk.min(buf.len()).min(self.data.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.data.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
        }
    }

    fn running() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    fn wire(kind: MessageType, payload: &[u8]) -> Vec<u8> {
        Message::new(kind, payload.to_vec()).encode().unwrap()
    }

    #[test]
    fn test_round_trip_sizes() {
        for len in [0usize, 1, 65_535, 10_000_000] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let bytes = wire(MessageType::Unknown(0x42), &payload);

            let mut reader = MessageReader::new(Cursor::new(bytes), running());
            let message = reader.read_message().unwrap().expect("message");
            assert_eq!(message.kind, MessageType::Unknown(0x42));
            assert_eq!(message.payload.len(), len);
            assert_eq!(message.payload, payload);
            assert!(reader.read_message().unwrap().is_none());
        }
    }

    #[test]
    fn test_one_byte_at_a_time() {
        let mut bytes = wire(MessageType::Telemetry, br#"{"battery": 11.9}"#);
        bytes.extend(wire(MessageType::Frame, &[9, 8, 7]));

        let mut reader = MessageReader::new(ChunkedReader::new(bytes, 1), running());
        let first = reader.read_message().unwrap().unwrap();
        assert_eq!(first.kind, MessageType::Telemetry);
        assert_eq!(first.payload, br#"{"battery": 11.9}"#.to_vec());

        let second = reader.read_message().unwrap().unwrap();
        assert_eq!(second.kind, MessageType::Frame);
        assert_eq!(second.payload, vec![9, 8, 7]);
    }

    #[test]
    fn test_random_chunks_with_timeouts() {
        let mut rng = rand::thread_rng();
        let payload: Vec<u8> = (0..4096).map(|_| rng.gen()).collect();
        let bytes = wire(MessageType::Frame, &payload);

        let mut source = ChunkedReader::new(bytes, rng.gen_range(1..64));
        source.timeout_every = Some(3);

        let mut reader = MessageReader::new(source, running());
        let message = reader.read_message().unwrap().unwrap();
        assert_eq!(message.payload, payload);
    }

    #[test]
    fn test_eof_at_boundary_is_graceful() {
        let mut reader = MessageReader::new(Cursor::new(Vec::new()), running());
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn test_eof_mid_payload_is_graceful() {
        let mut bytes = encode_header_for(MessageType::Telemetry, 10);
        bytes.extend_from_slice(b"abc");

        let mut reader = MessageReader::new(Cursor::new(bytes), running());
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn test_eof_mid_header_is_graceful() {
        let mut reader = MessageReader::new(Cursor::new(vec![0x01, 0x00]), running());
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn test_hard_error_is_propagated() {
        let mut reader = MessageReader::new(FailingReader, running());
        assert!(matches!(reader.read_message(), Err(AppError::Io(_))));
    }

    #[test]
    fn test_timeout_after_stop_ends_read() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut source = ChunkedReader::new(Vec::new(), 1);
        source.timeout_every = Some(1);

        let mut reader = MessageReader::new(source, stopped);
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let bytes = encode_header_for(MessageType::Frame, 1024);
        let mut reader = MessageReader::new(Cursor::new(bytes), running()).with_max_payload_len(16);
        assert!(matches!(reader.read_message(), Err(AppError::Protocol(_))));
    }

    #[test]
    fn test_unknown_tag_does_not_desync() {
        let mut bytes = wire(MessageType::Unknown(0x7E), b"ignored payload");
        bytes.extend(wire(MessageType::Telemetry, b"{}"));

        let mut reader = MessageReader::new(ChunkedReader::new(bytes, 3), running());
        let first = reader.read_message().unwrap().unwrap();
        assert_eq!(first.kind, MessageType::Unknown(0x7E));
        let second = reader.read_message().unwrap().unwrap();
        assert_eq!(second.kind, MessageType::Telemetry);
        assert_eq!(second.payload, b"{}".to_vec());
    }

    fn encode_header_for(kind: MessageType, len: usize) -> Vec<u8> {
        crate::protocol::encode_header(kind, len).unwrap().to_vec()
    }
}
