#![allow(non_snake_case)]

use super::*;
use jrpc_json::Format;
use std::collections::VecDeque;

/// Writer that accepts a fixed number of bytes per call, then blocks
struct ThrottledWriter {
    accepted: Vec<u8>,
    chunks: VecDeque<io::Result<usize>>,
}

impl ThrottledWriter {
    fn new(chunks: Vec<io::Result<usize>>) -> Self {
        Self {
            accepted: Vec::new(),
            chunks: chunks.into(),
        }
    }
}

impl Write for ThrottledWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.chunks.pop_front() {
            Some(Ok(limit)) => {
                let count = limit.min(buf.len());
                self.accepted.extend_from_slice(&buf[..count]);
                Ok(count)
            }
            Some(Err(e)) => Err(e),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// ByteBuffer
// ============================================================================

#[test]
fn ByteBuffer___new___is_empty_and_nul_terminated() {
    let buf = ByteBuffer::new(8);

    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), 8);
    assert_eq!(buf.remaining(), 7);
}

#[test]
fn ByteBuffer___spare___doubles_when_one_byte_from_full() {
    let mut buf = ByteBuffer::new(4);
    buf.extend(b"abc").unwrap();
    assert_eq!(buf.remaining(), 0);

    let spare = buf.spare().unwrap().len();

    assert_eq!(buf.capacity(), 8);
    assert_eq!(spare, 4);
    assert_eq!(buf.as_slice(), b"abc");
}

#[test]
fn ByteBuffer___extend___grows_to_fit_large_input() {
    let mut buf = ByteBuffer::new(4);

    buf.extend(&[b'x'; 100]).unwrap();

    assert_eq!(buf.len(), 100);
    assert!(buf.capacity() > 100);
}

#[test]
fn ByteBuffer___consume___shifts_tail_to_front() {
    let mut buf = ByteBuffer::new(16);
    buf.extend(b"hello world").unwrap();

    buf.consume(6);

    assert_eq!(buf.as_slice(), b"world");
}

#[test]
fn ByteBuffer___consume___more_than_filled_empties() {
    let mut buf = ByteBuffer::new(16);
    buf.extend(b"abc").unwrap();

    buf.consume(10);

    assert!(buf.is_empty());
}

#[test]
fn ByteBuffer___read_from___appends_reader_bytes() {
    let mut buf = ByteBuffer::new(4);
    let mut reader: &[u8] = b"abcdefgh";

    let mut total = 0;
    loop {
        let n = buf.read_from(&mut reader).unwrap();
        if n == 0 {
            break;
        }
        total += n;
    }

    assert_eq!(total, 8);
    assert_eq!(buf.as_slice(), b"abcdefgh");
}

// ============================================================================
// Frame extraction
// ============================================================================

#[test]
fn ConnectionBuffers___try_extract_frame___compacts_remaining_bytes() {
    let mut doc = Document::new();
    let mut bufs = ConnectionBuffers::new(16);
    bufs.append_inbound(b"{\"id\":1}\n{\"id\":2}\n").unwrap();

    let first = bufs.try_extract_frame(&mut doc).unwrap().unwrap();

    assert_eq!(doc.render(first, Format::Compact).unwrap(), r#"{"id":1}"#);
    assert_eq!(bufs.inbound().as_slice(), b"\n{\"id\":2}\n");

    let second = bufs.try_extract_frame(&mut doc).unwrap().unwrap();
    assert_eq!(doc.render(second, Format::Compact).unwrap(), r#"{"id":2}"#);
    assert!(bufs.try_extract_frame(&mut doc).unwrap().is_none());
}

#[test]
fn ConnectionBuffers___try_extract_frame___incomplete_keeps_buffer() {
    let mut doc = Document::new();
    let mut bufs = ConnectionBuffers::default();
    bufs.append_inbound(b"{\"method\":\"fo").unwrap();

    let frame = bufs.try_extract_frame(&mut doc).unwrap();

    assert!(frame.is_none());
    assert_eq!(bufs.pending_inbound(), 13);

    bufs.append_inbound(b"o\"}").unwrap();
    let root = bufs.try_extract_frame(&mut doc).unwrap().unwrap();
    let method = doc.object_item(root, "method").unwrap();
    assert_eq!(doc.as_str(method), Some("foo"));
    assert_eq!(bufs.pending_inbound(), 0);
}

#[test]
fn ConnectionBuffers___try_extract_frame___syntax_error_is_fatal() {
    let mut doc = Document::new();
    let mut bufs = ConnectionBuffers::default();
    bufs.append_inbound(b"{\"method\" 1}").unwrap();

    let err = bufs.try_extract_frame(&mut doc).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, RpcError::Parse { offset: 10 }));
}

// ============================================================================
// Outbound queue
// ============================================================================

#[test]
fn ConnectionBuffers___enqueue_outbound___writes_everything_when_possible() {
    let mut bufs = ConnectionBuffers::new(4);
    let mut writer = ThrottledWriter::new(vec![Ok(1024)]);

    let remaining = bufs.enqueue_outbound(b"{\"id\":1}\n", &mut writer).unwrap();

    assert_eq!(remaining, 0);
    assert_eq!(writer.accepted, b"{\"id\":1}\n");
}

#[test]
fn ConnectionBuffers___flush_outbound___would_block_keeps_tail() {
    let mut bufs = ConnectionBuffers::new(64);
    let mut writer = ThrottledWriter::new(vec![Ok(3)]);

    let remaining = bufs.enqueue_outbound(b"abcdefgh", &mut writer).unwrap();

    assert_eq!(remaining, 5);
    assert_eq!(bufs.outbound().as_slice(), b"defgh");

    let mut writer = ThrottledWriter::new(vec![Ok(2), Ok(10)]);
    let remaining = bufs.flush_outbound(&mut writer).unwrap();
    assert_eq!(remaining, 0);
    assert_eq!(writer.accepted, b"defgh");
}

#[test]
fn ConnectionBuffers___flush_outbound___retries_interrupted() {
    let mut bufs = ConnectionBuffers::new(64);
    bufs.queue_outbound(b"xyz").unwrap();
    let mut writer = ThrottledWriter::new(vec![Err(io::ErrorKind::Interrupted.into()), Ok(8)]);

    let remaining = bufs.flush_outbound(&mut writer).unwrap();

    assert_eq!(remaining, 0);
    assert_eq!(writer.accepted, b"xyz");
}

#[test]
fn ConnectionBuffers___flush_outbound___other_errors_are_fatal() {
    let mut bufs = ConnectionBuffers::new(64);
    bufs.queue_outbound(b"xyz").unwrap();
    let mut writer = ThrottledWriter::new(vec![Err(io::ErrorKind::BrokenPipe.into())]);

    let err = bufs.flush_outbound(&mut writer).unwrap_err();

    assert!(matches!(err, RpcError::Transport(_)));
    assert!(err.is_fatal());
}
