//! # Utility Modules
//!
//! Supporting utilities shared by the codec and the handshake layer.
//!
//! ## Components
//! - **Compression**: Gzip, LZ4 and Zstd with a decompressed size ceiling
//! - **Ack Cache**: TTL-bounded map from issued ack ids to endpoints
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe observability counters
//!
//! ## Security
//! - Decompression bomb protection (16MB limit)
//! - Bounded ack id memory with FIFO eviction

pub mod ack_cache;
pub mod compression;
pub mod logging;
pub mod metrics;

pub use ack_cache::PendingAcks;
pub use compression::CompressionKind;
