//! # Core Protocol Components
//!
//! Byte-level I/O, composable codecs and the tagged-union registry.
//!
//! ## Components
//! - **io**: Big-endian cursor over outgoing and incoming buffers
//! - **codec**: `NetworkCodec<T>` and its combinators
//! - **builtin**: Primitive codecs (int, long, boolean, string, uuid)
//! - **registry**: Wire tag to variant codec resolution with unknown fallback
//!
//! ## Wire Format
//! ```text
//! i32/i64:  big-endian two's complement
//! boolean:  1 byte, nonzero is true
//! string:   [i32 len] [utf8 bytes]
//! uuid:     [i64 high] [i64 low]
//! envelope: [string tag] [variant body]
//! ```
//!
//! ## Security
//! - Lengths and counts are checked against the remaining input before allocation
//! - Decompressed sections are capped at 16MB

pub mod builtin;
pub mod codec;
pub mod io;
pub mod registry;
