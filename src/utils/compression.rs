use crate::config::MAX_PAYLOAD_SIZE;
use crate::error::{ProtocolError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compression formats available to compressed codec sections.
///
/// `Gzip` is the interoperable default: its stream is self-delimiting and is
/// written inline. The block formats need a length prefix on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CompressionKind {
    #[default]
    Gzip,
    Lz4,
    Zstd,
}

impl CompressionKind {
    /// Whether a compressed stream of this kind marks its own end.
    pub fn is_self_delimiting(self) -> bool {
        matches!(self, CompressionKind::Gzip)
    }
}

/// Maximum output size for decompression (align with MAX_PAYLOAD_SIZE to prevent DoS)
const MAX_DECOMPRESSION_SIZE: usize = MAX_PAYLOAD_SIZE;

/// Compresses data using the specified compression algorithm
///
/// # Errors
/// Returns `ProtocolError::CompressionFailure` if compression fails
pub fn compress(data: &[u8], kind: &CompressionKind) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder
                .write_all(data)
                .map_err(|_| ProtocolError::CompressionFailure)?;
            encoder.finish().map_err(|_| ProtocolError::CompressionFailure)
        }
        CompressionKind::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            zstd::stream::copy_encode(data, &mut out, 1)
                .map_err(|_| ProtocolError::CompressionFailure)?;
            Ok(out)
        }
    }
}

/// Read a decoder to its end, refusing to produce more than MAX_DECOMPRESSION_SIZE bytes.
fn read_limited<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .take(MAX_DECOMPRESSION_SIZE as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|_| ProtocolError::DecompressionFailure)?;
    if out.len() > MAX_DECOMPRESSION_SIZE {
        return Err(ProtocolError::DecompressionFailure);
    }
    Ok(out)
}

/// Decompress one gzip member from the front of `data`.
///
/// Returns the inflated bytes and the number of input bytes the member
/// occupied, so the caller can continue reading whatever follows it.
///
/// # Errors
/// Returns `ProtocolError::DecompressionFailure` if the member is malformed,
/// truncated, fails its CRC check, or inflates past MAX_DECOMPRESSION_SIZE.
pub fn gunzip_prefix(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut decoder = flate2::bufread::GzDecoder::new(data);
    let out = read_limited(&mut decoder)?;
    let consumed = data.len() - decoder.into_inner().len();
    Ok((out, consumed))
}

/// Decompresses data that was compressed with the specified algorithm
///
/// Enforces a maximum output size limit to prevent decompression bombs (DoS attacks).
/// The limit is set to MAX_PAYLOAD_SIZE to align with protocol message limits.
///
/// # Errors
/// Returns `ProtocolError::DecompressionFailure` if:
/// - Decompression fails
/// - Output size exceeds MAX_DECOMPRESSION_SIZE
pub fn decompress(data: &[u8], kind: &CompressionKind) -> Result<Vec<u8>> {
    match *kind {
        CompressionKind::Gzip => gunzip_prefix(data).map(|(out, _)| out),
        CompressionKind::Lz4 => {
            // lz4_flex prepends the uncompressed size as 4-byte little-endian;
            // check it before lz4_flex allocates.
            if data.len() < 4 {
                return Err(ProtocolError::DecompressionFailure);
            }

            let claimed_size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
            if claimed_size > MAX_DECOMPRESSION_SIZE {
                return Err(ProtocolError::DecompressionFailure);
            }

            lz4_flex::decompress_size_prepended(data)
                .map_err(|_| ProtocolError::DecompressionFailure)
        }
        CompressionKind::Zstd => {
            let mut reader = zstd::stream::Decoder::new(data)
                .map_err(|_| ProtocolError::DecompressionFailure)?;
            read_limited(&mut reader)
        }
    }
}
