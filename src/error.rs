//! # Error Types
//!
//! Error handling for the plugin-message protocol.
//!
//! Every failure that can occur while decoding a single message is scoped to
//! that message: callers log it, drop the message and carry on. Nothing here
//! is fatal to the hosting process.
//!
//! ## Error Categories
//! - **Decode Errors**: Truncated input, invalid UTF-8, impossible counts
//! - **Compression Errors**: Inflate/deflate failures, size limit violations
//! - **Registry Errors**: Writing a payload whose tag was never registered
//! - **Configuration Errors**: Unreadable or invalid configuration
//!
//! Unknown payload tags and protocol version skew are *not* errors; they are
//! routed to fallback handlers and reported through `tracing`.
//!
//! ## Example Usage
//! ```rust
//! use skin_channel_protocol::core::builtin::STRING;
//! use skin_channel_protocol::core::io::Reader;
//! use skin_channel_protocol::error::ProtocolError;
//! use tracing::warn;
//!
//! let mut reader = Reader::new(vec![0, 0, 0, 9, b'h', b'i']);
//! match STRING.read(&mut reader) {
//!     Ok(value) => println!("{value}"),
//!     Err(ProtocolError::UnexpectedEof { needed, remaining }) => {
//!         warn!(needed, remaining, "Dropping truncated message")
//!     }
//!     Err(e) => warn!(error = %e, "Dropping malformed message"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Endpoint registry lock errors
    pub const ERR_ENDPOINTS_WRITE_LOCK: &str = "Failed to acquire write lock on endpoint registry";
    pub const ERR_ENDPOINTS_READ_LOCK: &str = "Failed to acquire read lock on endpoint registry";

    /// Transport errors
    pub const ERR_UNKNOWN_ENDPOINT: &str = "No route to endpoint";
    pub const ERR_ENDPOINT_QUEUE_FULL: &str = "Endpoint queue is full";
}

/// ProtocolError is the primary error type for all codec and protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unexpected end of message: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("Negative length or count on the wire: {0}")]
    NegativeLength(i32),

    #[error("Collection of {count} entries cannot fit in {remaining} remaining bytes")]
    CollectionTooLarge { count: usize, remaining: usize },

    #[error("Compression failed")]
    CompressionFailure,

    #[error("Decompression failed")]
    DecompressionFailure,

    #[error("Payload variant '{0}' is not registered")]
    UnregisteredVariant(String),

    #[error("Codec for '{0}' received a different payload variant")]
    VariantMismatch(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Whether this error was produced by malformed bytes of a single message.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnexpectedEof { .. }
                | ProtocolError::InvalidUtf8
                | ProtocolError::NegativeLength(_)
                | ProtocolError::CollectionTooLarge { .. }
                | ProtocolError::DecompressionFailure
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
