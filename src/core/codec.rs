//! # Codec Combinators
//!
//! A [`NetworkCodec<T>`] is a paired writer and reader for one type. Codecs
//! are stateless, cheap to clone, and compose: a list of optional strings is
//! `STRING.optional().list()`, and a domain record is assembled from the
//! codecs of its fields with one of the `record1`..`record6` builders.
//!
//! Every codec obeys the round-trip law `read(write(x)) == x`.
//!
//! ## Wire Layout
//! ```text
//! optional:  [bool present] [value if present]
//! list:      [i32 count] [value]*
//! map:       [i32 count] ([key] [value])*
//! gzip:      [gzip member containing the inner encoding]
//! lz4/zstd:  [i32 len] [compressed block containing the inner encoding]
//! ```
//!
//! Counts are validated against the bytes that remain before anything is
//! allocated, using each codec's minimum encoded size.

use crate::config::MAX_PAYLOAD_SIZE;
use crate::core::io::{Reader, Writer};
use crate::core::registry::NetworkId;
use crate::error::{ProtocolError, Result};
use crate::utils::compression::{self, CompressionKind};
use bytes::Bytes;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

type WriteFn<T> = dyn Fn(&mut Writer, &T) -> Result<()> + Send + Sync;
type ReadFn<T> = dyn Fn(&mut Reader) -> Result<T> + Send + Sync;

/// Upper bound on speculative preallocation while decoding collections.
const MAX_PREALLOCATED_ENTRIES: usize = 1024;

/// Smallest possible gzip member: 10-byte header, empty block, 8-byte trailer.
const MIN_GZIP_MEMBER: usize = 20;

/// Paired encoder/decoder for values of type `T`.
pub struct NetworkCodec<T> {
    writer: Arc<WriteFn<T>>,
    reader: Arc<ReadFn<T>>,
    min_size: usize,
}

impl<T> Clone for NetworkCodec<T> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            reader: Arc::clone(&self.reader),
            min_size: self.min_size,
        }
    }
}

impl<T> fmt::Debug for NetworkCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkCodec")
            .field("type", &std::any::type_name::<T>())
            .field("min_size", &self.min_size)
            .finish_non_exhaustive()
    }
}

/// Read a collection count and reject it if the remaining bytes cannot hold it.
fn read_count(input: &mut Reader, element_size: usize) -> Result<usize> {
    let count = input.read_len()?;
    let remaining = input.remaining();
    let too_large = if element_size == 0 {
        count > MAX_PAYLOAD_SIZE
    } else {
        count
            .checked_mul(element_size)
            .map_or(true, |needed| needed > remaining)
    };
    if too_large {
        return Err(ProtocolError::CollectionTooLarge { count, remaining });
    }
    Ok(count)
}

impl<T: 'static> NetworkCodec<T> {
    /// Build a codec from a writer and a reader.
    pub fn of<W, R>(writer: W, reader: R) -> Self
    where
        W: Fn(&mut Writer, &T) -> Result<()> + Send + Sync + 'static,
        R: Fn(&mut Reader) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_min_size(0, writer, reader)
    }

    /// Build a codec whose encoding never takes fewer than `min_size` bytes.
    pub fn with_min_size<W, R>(min_size: usize, writer: W, reader: R) -> Self
    where
        W: Fn(&mut Writer, &T) -> Result<()> + Send + Sync + 'static,
        R: Fn(&mut Reader) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            writer: Arc::new(writer),
            reader: Arc::new(reader),
            min_size,
        }
    }

    /// Lower bound on the number of bytes one encoded value occupies.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    #[inline]
    pub fn write(&self, out: &mut Writer, value: &T) -> Result<()> {
        (self.writer)(out, value)
    }

    #[inline]
    pub fn read(&self, input: &mut Reader) -> Result<T> {
        (self.reader)(input)
    }

    /// Encode a single value into a fresh buffer.
    pub fn encode(&self, value: &T) -> Result<Bytes> {
        let mut out = Writer::new();
        self.write(&mut out, value)?;
        Ok(out.freeze())
    }

    /// Decode a single value from the front of `data`.
    pub fn decode(&self, data: impl Into<Bytes>) -> Result<T> {
        self.read(&mut Reader::new(data))
    }

    /// Codec that writes nothing and always reads `value`.
    pub fn unit(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::of(|_, _| Ok(()), move |_| Ok(value.clone()))
    }

    /// Project this codec onto another type.
    pub fn map_to<O: 'static>(
        &self,
        to: impl Fn(&O) -> T + Send + Sync + 'static,
        from: impl Fn(T) -> O + Send + Sync + 'static,
    ) -> NetworkCodec<O> {
        let write_inner = self.clone();
        let read_inner = self.clone();
        NetworkCodec::<O>::with_min_size(
            self.min_size,
            move |out, value| write_inner.write(out, &to(value)),
            move |input| read_inner.read(input).map(&from),
        )
    }

    /// Presence flag followed by the value when present.
    pub fn optional(&self) -> NetworkCodec<Option<T>> {
        let write_inner = self.clone();
        let read_inner = self.clone();
        NetworkCodec::<Option<T>>::with_min_size(
            1,
            move |out, value: &Option<T>| {
                out.write_bool(value.is_some());
                match value {
                    Some(inner) => write_inner.write(out, inner),
                    None => Ok(()),
                }
            },
            move |input| {
                if input.read_bool()? {
                    read_inner.read(input).map(Some)
                } else {
                    Ok(None)
                }
            },
        )
    }

    /// Element count followed by each element in order.
    pub fn list(&self) -> NetworkCodec<Vec<T>> {
        let write_inner = self.clone();
        let read_inner = self.clone();
        NetworkCodec::<Vec<T>>::with_min_size(
            4,
            move |out, values: &Vec<T>| {
                out.write_len(values.len());
                values
                    .iter()
                    .try_for_each(|value| write_inner.write(out, value))
            },
            move |input| {
                let count = read_count(input, read_inner.min_size)?;
                let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED_ENTRIES));
                for _ in 0..count {
                    values.push(read_inner.read(input)?);
                }
                Ok(values)
            },
        )
    }

    /// Entry count followed by key/value pairs in iteration order, using this
    /// codec for keys.
    ///
    /// A key repeated on the wire keeps its first position and takes the last
    /// value written for it.
    pub fn map_of<V: 'static>(&self, values: &NetworkCodec<V>) -> NetworkCodec<IndexMap<T, V>>
    where
        T: Hash + Eq,
    {
        let write_keys = self.clone();
        let read_keys = self.clone();
        let write_values = values.clone();
        let read_values = values.clone();
        let entry_size = self.min_size + values.min_size;
        NetworkCodec::<IndexMap<T, V>>::with_min_size(
            4,
            move |out, map: &IndexMap<T, V>| {
                out.write_len(map.len());
                for (key, value) in map {
                    write_keys.write(out, key)?;
                    write_values.write(out, value)?;
                }
                Ok(())
            },
            move |input| {
                let count = read_count(input, entry_size)?;
                let mut map = IndexMap::with_capacity(count.min(MAX_PREALLOCATED_ENTRIES));
                for _ in 0..count {
                    let key = read_keys.read(input)?;
                    let value = read_values.read(input)?;
                    map.insert(key, value);
                }
                Ok(map)
            },
        )
    }

    /// Wrap the encoding in an inline gzip member.
    pub fn compressed(&self) -> Self {
        self.compressed_with(CompressionKind::Gzip)
    }

    /// Wrap the encoding in the given compression format.
    ///
    /// Decompressed output is capped at `MAX_PAYLOAD_SIZE`.
    pub fn compressed_with(&self, kind: CompressionKind) -> Self {
        let write_inner = self.clone();
        let read_inner = self.clone();
        let min_size = if kind.is_self_delimiting() {
            MIN_GZIP_MEMBER
        } else {
            4
        };
        Self::with_min_size(
            min_size,
            move |out, value| {
                let plain = write_inner.encode(value)?;
                let packed = compression::compress(&plain, &kind)?;
                if !kind.is_self_delimiting() {
                    out.write_len(packed.len());
                }
                out.write_bytes(&packed);
                Ok(())
            },
            move |input| {
                let plain = if kind.is_self_delimiting() {
                    let (plain, consumed) = compression::gunzip_prefix(input.remaining_slice())?;
                    input.advance(consumed)?;
                    plain
                } else {
                    let len = input.read_len()?;
                    let packed = input.read_exact(len)?;
                    compression::decompress(&packed, &kind)?
                };
                read_inner.decode(plain)
            },
        )
    }

    /// String-keyed codec over a closed set of values.
    ///
    /// Each member is written as `projection(member)`; strings that match no
    /// member decode to `default`.
    pub fn of_enum_dynamic(
        values: &[T],
        projection: impl Fn(&T) -> String + Send + Sync + 'static,
        default: T,
    ) -> Self
    where
        T: Clone + Send + Sync,
    {
        let by_id: HashMap<String, T> = values
            .iter()
            .map(|value| (projection(value), value.clone()))
            .collect();
        Self::with_min_size(
            4,
            move |out, value| {
                out.write_string(&projection(value));
                Ok(())
            },
            move |input| {
                let id = input.read_string()?;
                Ok(by_id.get(&id).cloned().unwrap_or_else(|| default.clone()))
            },
        )
    }

    /// [`of_enum_dynamic`](Self::of_enum_dynamic) keyed by each member's network id.
    pub fn of_enum(values: &[T], default: T) -> Self
    where
        T: NetworkId + Clone + Send + Sync,
    {
        Self::of_enum_dynamic(values, |value| value.network_id().to_owned(), default)
    }
}

macro_rules! record_codec {
    ($(#[$meta:meta])* $name:ident => $(($codec:ident, $getter:ident, $field:ident: $F:ident)),+) => {
        $(#[$meta])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T, $($F),+>(
            $($codec: NetworkCodec<$F>, $getter: impl Fn(&T) -> &$F + Send + Sync + 'static,)+
            constructor: impl Fn($($F),+) -> T + Send + Sync + 'static,
        ) -> NetworkCodec<T>
        where
            T: 'static,
            $($F: 'static,)+
        {
            let min_size = 0 $(+ $codec.min_size())+;
            $(let $field = $codec.clone();)+
            NetworkCodec::<T>::with_min_size(
                min_size,
                move |out, value| {
                    $($codec.write(out, $getter(value))?;)+
                    Ok(())
                },
                move |input| {
                    $(let $field = $field.read(input)?;)+
                    Ok(constructor($($field),+))
                },
            )
        }
    };
}

record_codec!(
    /// Single-field record.
    record1 => (c1, get1, f1: F1)
);
record_codec!(
    /// Two-field record, fields written in declaration order.
    record2 => (c1, get1, f1: F1), (c2, get2, f2: F2)
);
record_codec!(
    /// Three-field record.
    record3 => (c1, get1, f1: F1), (c2, get2, f2: F2), (c3, get3, f3: F3)
);
record_codec!(
    record4 => (c1, get1, f1: F1), (c2, get2, f2: F2), (c3, get3, f3: F3), (c4, get4, f4: F4)
);
record_codec!(
    record5 => (c1, get1, f1: F1), (c2, get2, f2: F2), (c3, get3, f3: F3), (c4, get4, f4: F4),
        (c5, get5, f5: F5)
);
record_codec!(
    /// Six-field record, the widest shape on the wire.
    record6 => (c1, get1, f1: F1), (c2, get2, f2: F2), (c3, get3, f3: F3), (c4, get4, f4: F4),
        (c5, get5, f5: F5), (c6, get6, f6: F6)
);
