//! Primitive codecs shared by every payload.

use crate::core::codec::NetworkCodec;
use std::sync::LazyLock;
use uuid::Uuid;

/// 4-byte big-endian signed integer.
pub static INT: LazyLock<NetworkCodec<i32>> = LazyLock::new(|| {
    NetworkCodec::<i32>::with_min_size(
        4,
        |out, value| {
            out.write_i32(*value);
            Ok(())
        },
        |input| input.read_i32(),
    )
});

/// 8-byte big-endian signed integer.
pub static LONG: LazyLock<NetworkCodec<i64>> = LazyLock::new(|| {
    NetworkCodec::<i64>::with_min_size(
        8,
        |out, value| {
            out.write_i64(*value);
            Ok(())
        },
        |input| input.read_i64(),
    )
});

/// Single byte, zero is false.
pub static BOOLEAN: LazyLock<NetworkCodec<bool>> = LazyLock::new(|| {
    NetworkCodec::<bool>::with_min_size(
        1,
        |out, value| {
            out.write_bool(*value);
            Ok(())
        },
        |input| input.read_bool(),
    )
});

/// Length-prefixed UTF-8.
pub static STRING: LazyLock<NetworkCodec<String>> = LazyLock::new(|| {
    NetworkCodec::<String>::with_min_size(
        4,
        |out, value: &String| {
            out.write_string(value);
            Ok(())
        },
        |input| input.read_string(),
    )
});

/// Two 8-byte halves, most significant first.
pub static UUID: LazyLock<NetworkCodec<Uuid>> = LazyLock::new(|| {
    NetworkCodec::<Uuid>::with_min_size(
        16,
        |out, value: &Uuid| {
            let (high, low) = value.as_u64_pair();
            out.write_i64(high as i64);
            out.write_i64(low as i64);
            Ok(())
        },
        |input| {
            let high = input.read_i64()? as u64;
            let low = input.read_i64()? as u64;
            Ok(Uuid::from_u64_pair(high, low))
        },
    )
});
