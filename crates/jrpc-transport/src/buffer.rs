//! Growable connection buffers and frame extraction

use std::io::{self, Read, Write};

use jrpc_core::{RpcError, RpcResult};
use jrpc_json::{Document, NodeId};

use crate::codec::LineCodec;

/// Smallest capacity a buffer is created with
const MIN_CAPACITY: usize = 2;

/// Growable byte region with a write cursor
///
/// The byte at the cursor is always NUL, so the filled region can be
/// scanned as text without a length. Capacity doubles whenever the buffer
/// is within one byte of full.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl ByteBuffer {
    /// Create an empty buffer with `capacity` bytes (including the NUL)
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(MIN_CAPACITY)],
            pos: 0,
        }
    }

    /// Filled bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.pos]
    }

    /// Number of filled bytes
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Current capacity, including the byte reserved for the NUL
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes that can be filled before the buffer must grow
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos - 1
    }

    /// Double the capacity if the buffer is full and return the free region
    pub fn spare(&mut self) -> RpcResult<&mut [u8]> {
        if self.remaining() == 0 {
            self.grow_to(self.data.len() * 2)?;
        }
        let end = self.data.len() - 1;
        Ok(&mut self.data[self.pos..end])
    }

    /// Mark `count` bytes of the spare region as filled
    pub fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.data.len() - 1);
        self.data[self.pos] = 0;
    }

    /// Append `bytes`, growing to fit
    pub fn extend(&mut self, bytes: &[u8]) -> RpcResult<()> {
        if bytes.len() > self.remaining() {
            let needed = self.pos + bytes.len() + 1;
            self.grow_to(needed.max(self.data.len() * 2))?;
        }
        self.data[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.advance(bytes.len());
        Ok(())
    }

    /// Drop the first `count` bytes and shift the rest to the front
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.pos);
        self.data.copy_within(count..self.pos, 0);
        self.pos -= count;
        self.data[self.pos] = 0;
    }

    /// Discard all filled bytes, keeping the capacity
    pub fn clear(&mut self) {
        self.pos = 0;
        self.data[0] = 0;
    }

    /// Read once from `reader` into the spare region
    ///
    /// Returns the number of bytes read; 0 means end of stream.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> io::Result<usize> {
        let spare = self.spare().map_err(|err| io::Error::new(io::ErrorKind::OutOfMemory, err))?;
        let count = reader.read(spare)?;
        self.advance(count);
        Ok(count)
    }

    fn grow_to(&mut self, capacity: usize) -> RpcResult<()> {
        let additional = capacity.saturating_sub(self.data.len());
        self.data.try_reserve_exact(additional).map_err(|_| {
            RpcError::ResourceExhausted(format!("buffer growth to {capacity} bytes failed"))
        })?;
        self.data.resize(capacity, 0);
        Ok(())
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new(1500)
    }
}

/// Inbound and outbound buffers owned by one connection
#[derive(Debug, Clone)]
pub struct ConnectionBuffers {
    inbound: ByteBuffer,
    outbound: ByteBuffer,
}

impl ConnectionBuffers {
    /// Create both buffers with `capacity` bytes each
    pub fn new(capacity: usize) -> Self {
        Self {
            inbound: ByteBuffer::new(capacity),
            outbound: ByteBuffer::new(capacity),
        }
    }

    pub fn inbound(&self) -> &ByteBuffer {
        &self.inbound
    }

    pub fn outbound(&self) -> &ByteBuffer {
        &self.outbound
    }

    /// Copy bytes received from the peer into the inbound buffer
    pub fn append_inbound(&mut self, bytes: &[u8]) -> RpcResult<()> {
        self.inbound.extend(bytes)
    }

    /// Read once from `reader` into the inbound buffer
    pub fn read_inbound<R: Read>(&mut self, reader: &mut R) -> io::Result<usize> {
        self.inbound.read_from(reader)
    }

    /// Parse one value from the front of the inbound buffer
    ///
    /// - `Ok(Some(root))`: a complete value; its bytes have been removed
    ///   from the buffer and the tree is owned by the caller
    /// - `Ok(None)`: the buffer holds a valid prefix (or nothing); wait for
    ///   more bytes
    /// - `Err(RpcError::Parse { .. })`: the stream is corrupt and the
    ///   connection cannot recover
    ///
    /// The whole buffer is re-parsed from offset 0 on every call.
    pub fn try_extract_frame(&mut self, doc: &mut Document) -> RpcResult<Option<NodeId>> {
        match LineCodec::decode(doc, self.inbound.as_slice())? {
            Some(frame) => {
                self.inbound.consume(frame.consumed);
                Ok(Some(frame.root))
            }
            None => Ok(None),
        }
    }

    /// Queue bytes for the peer without writing
    pub fn queue_outbound(&mut self, bytes: &[u8]) -> RpcResult<()> {
        self.outbound.extend(bytes)
    }

    /// Queue bytes for the peer and try to write them right away
    ///
    /// Returns the number of bytes still queued.
    pub fn enqueue_outbound<W: Write>(&mut self, bytes: &[u8], writer: &mut W) -> RpcResult<usize> {
        self.queue_outbound(bytes)?;
        self.flush_outbound(writer)
    }

    /// Write as much of the outbound buffer as `writer` accepts
    ///
    /// Stops at `WouldBlock` and returns the number of bytes still queued.
    /// Any other error except `Interrupted` is fatal for the connection.
    pub fn flush_outbound<W: Write>(&mut self, writer: &mut W) -> RpcResult<usize> {
        let mut written = 0;
        let result = loop {
            let pending = &self.outbound.as_slice()[written..];
            if pending.is_empty() {
                break Ok(());
            }
            match writer.write(pending) {
                Ok(0) => break Err(RpcError::Transport(io::ErrorKind::WriteZero.into())),
                Ok(count) => written += count,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(e) => break Err(RpcError::Transport(e)),
            }
        };
        self.outbound.consume(written);
        result.map(|()| self.outbound.len())
    }

    /// Bytes waiting to be written
    pub fn pending_outbound(&self) -> usize {
        self.outbound.len()
    }

    /// Bytes received but not yet framed
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }
}

impl Default for ConnectionBuffers {
    fn default() -> Self {
        Self::new(1500)
    }
}

#[cfg(test)]
#[path = "buffer/buffer_tests.rs"]
mod buffer_tests;
