//! # Dynamic Type Registry
//!
//! Maps the wire tag of each variant of a closed payload union to the codec
//! for that variant's body. A registry is assembled once, at startup, by a
//! [`TypeRegistryBuilder`] and is immutable afterwards, so any number of
//! threads can read it without synchronization.
//!
//! Forward compatibility comes from the designated *unknown* descriptor: a tag
//! this process has never heard of resolves to it, its codec reads zero bytes,
//! and the caller receives the union's "ignore" sentinel instead of an error.
//!
//! ## Envelope Layout
//! ```text
//! [string tag] [variant body]
//! ```

use crate::core::codec::NetworkCodec;
use crate::core::io::{Reader, Writer};
use crate::error::{ProtocolError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A type that carries a stable wire identifier.
pub trait NetworkId {
    fn network_id(&self) -> &str;
}

/// Channel tags are plain ASCII alphanumerics; no dashes or underscores.
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// One registered variant: its wire tag and the codec for its body.
pub struct TypeDescriptor<P> {
    id: &'static str,
    codec: NetworkCodec<P>,
}

impl<P> Clone for TypeDescriptor<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            codec: self.codec.clone(),
        }
    }
}

impl<P> fmt::Debug for TypeDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor").field("id", &self.id).finish()
    }
}

impl<P> NetworkId for TypeDescriptor<P> {
    fn network_id(&self) -> &str {
        self.id
    }
}

impl<P: 'static> TypeDescriptor<P> {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn codec(&self) -> &NetworkCodec<P> {
        &self.codec
    }
}

/// Collects variant registrations for one payload union.
pub struct TypeRegistryBuilder<P> {
    name: &'static str,
    entries: Vec<TypeDescriptor<P>>,
}

impl<P: NetworkId + 'static> TypeRegistryBuilder<P> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    fn assert_unused(&self, id: &'static str) {
        assert!(
            is_valid_identifier(id),
            "invalid identifier '{id}' in registry '{}'",
            self.name
        );
        assert!(
            self.entries.iter().all(|entry| entry.id != id),
            "identifier '{id}' registered twice in registry '{}'",
            self.name
        );
    }

    /// Register the variant `V` of the union `P` under `id`.
    ///
    /// `wrap` lifts a decoded body into the union, `unwrap` borrows the body
    /// back out of it for writing.
    ///
    /// # Panics
    /// Panics if `id` is not a valid identifier or is already registered.
    /// Registration happens once at startup, so this is a programming error.
    pub fn register<V: 'static>(
        &mut self,
        id: &'static str,
        codec: NetworkCodec<V>,
        wrap: fn(V) -> P,
        unwrap: fn(&P) -> Option<&V>,
    ) -> TypeDescriptor<P> {
        self.assert_unused(id);
        let write_codec = codec.clone();
        let read_codec = codec.clone();
        let descriptor = TypeDescriptor {
            id,
            codec: NetworkCodec::<P>::with_min_size(
                codec.min_size(),
                move |out, payload| match unwrap(payload) {
                    Some(body) => write_codec.write(out, body),
                    None => Err(ProtocolError::VariantMismatch(id.to_string())),
                },
                move |input| read_codec.read(input).map(wrap),
            ),
        };
        self.entries.push(descriptor.clone());
        descriptor
    }

    /// Finish the registry with its designated unknown variant.
    ///
    /// The unknown descriptor is registered under `unknown_id` as well, so a
    /// peer that echoes it back is understood.
    ///
    /// # Panics
    /// Panics if `unknown_id` is invalid or already registered.
    pub fn build(mut self, unknown_id: &'static str, unknown: P) -> TypeRegistry<P>
    where
        P: Clone + Send + Sync,
    {
        self.assert_unused(unknown_id);
        let unknown = TypeDescriptor {
            id: unknown_id,
            codec: NetworkCodec::unit(unknown),
        };
        self.entries.push(unknown.clone());

        let index = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.id, position))
            .collect();

        debug!(
            registry = self.name,
            variants = self.entries.len(),
            "Payload registry initialised"
        );

        TypeRegistry {
            inner: Arc::new(RegistryInner {
                name: self.name,
                entries: self.entries,
                index,
                unknown,
            }),
        }
    }
}

struct RegistryInner<P> {
    name: &'static str,
    entries: Vec<TypeDescriptor<P>>,
    index: HashMap<&'static str, usize>,
    unknown: TypeDescriptor<P>,
}

/// Immutable tag-to-codec table for one payload union.
pub struct TypeRegistry<P> {
    inner: Arc<RegistryInner<P>>,
}

impl<P> Clone for TypeRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for TypeRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("name", &self.inner.name)
            .field("entries", &self.inner.entries)
            .finish()
    }
}

impl<P: NetworkId + 'static> TypeRegistry<P> {
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Exact lookup; `None` for tags that were never registered.
    pub fn get(&self, id: &str) -> Option<&TypeDescriptor<P>> {
        self.inner
            .index
            .get(id)
            .map(|&position| &self.inner.entries[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.index.contains_key(id)
    }

    /// Lookup that falls back to the unknown descriptor.
    pub fn resolve(&self, id: &str) -> &TypeDescriptor<P> {
        match self.get(id) {
            Some(descriptor) => descriptor,
            None => {
                debug!(registry = self.inner.name, tag = id, "Unrecognised payload tag");
                &self.inner.unknown
            }
        }
    }

    pub fn unknown(&self) -> &TypeDescriptor<P> {
        &self.inner.unknown
    }

    /// Registered tags in registration order, unknown last.
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.entries.iter().map(|entry| entry.id)
    }

    /// Write `[tag][body]` for one payload.
    pub fn write_payload(&self, out: &mut Writer, payload: &P) -> Result<()> {
        let tag = payload.network_id();
        let descriptor = self
            .get(tag)
            .ok_or_else(|| ProtocolError::UnregisteredVariant(tag.to_string()))?;
        out.write_string(descriptor.id);
        descriptor.codec.write(out, payload)
    }

    /// Read `[tag][body]`, resolving unknown tags to the unknown variant.
    pub fn read_payload(&self, input: &mut Reader) -> Result<P> {
        let tag = input.read_string()?;
        self.resolve(&tag).codec.read(input)
    }

    /// Codec for the whole tagged union.
    pub fn envelope_codec(&self) -> NetworkCodec<P> {
        let writer = self.clone();
        let reader = self.clone();
        NetworkCodec::<P>::with_min_size(
            4,
            move |out, payload| writer.write_payload(out, payload),
            move |input| reader.read_payload(input),
        )
    }
}
