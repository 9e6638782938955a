//! Byte streams used by the raw codec.

use std::io::{Read, Write};

use crate::config::CodecConfig;
use crate::error::Result;

use super::varint::{read_varint32, write_varint32};

/// Encoding side of the raw codec.
pub struct Packer<W: Write> {
    writer: W,
    config: CodecConfig,
}

impl<W: Write> Packer<W> {
    /// Creates a packer with the default limits.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, CodecConfig::default())
    }

    /// Creates a packer with explicit limits.
    pub fn with_config(writer: W, config: CodecConfig) -> Self {
        Self { writer, config }
    }

    /// Returns the limits in effect.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.write_bytes(&[byte])
    }

    /// Writes a container length prefix after checking it against the limit.
    pub fn write_count(&mut self, what: &'static str, count: usize) -> Result<()> {
        self.config.check_count(what, count as u64)?;
        let count = u32::try_from(count).map_err(|_| crate::FcError::BoundViolation {
            what,
            count: count as u64,
            max: u32::MAX as usize,
        })?;
        write_varint32(self, count)
    }

    /// Consumes the packer, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Decoding side of the raw codec.
pub struct Unpacker<R: Read> {
    reader: R,
    config: CodecConfig,
}

impl<R: Read> Unpacker<R> {
    /// Creates an unpacker with the default limits.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, CodecConfig::default())
    }

    /// Creates an unpacker with explicit limits.
    pub fn with_config(reader: R, config: CodecConfig) -> Self {
        Self { reader, config }
    }

    /// Returns the limits in effect.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Fills `buf` completely or fails with `UnexpectedEof`.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf)?;
        Ok(())
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Reads exactly `N` bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Reads a length-prefixed byte run, bounding the length before allocating.
    pub fn read_blob(&mut self, what: &'static str) -> Result<Vec<u8>> {
        let len = self.read_count(what)?;
        let mut buf = vec![0u8; len];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Reads a container length prefix and checks it against the limit.
    pub fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let count = read_varint32(self, "unsigned_int")?;
        self.config.check_count(what, count as u64).inspect_err(|_| {
            tracing::debug!(
                what,
                count,
                max = self.config.max_num_array_elements,
                "Rejected oversized count"
            );
        })
    }

    /// Consumes the unpacker, returning the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl Unpacker<&[u8]> {
    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.reader.len()
    }
}

/// Writer that only counts bytes, used by [`pack_size`](super::pack_size).
#[derive(Debug, Default)]
pub(crate) struct SizeCounter {
    pub(crate) size: usize,
}

impl Write for SizeCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.size += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
