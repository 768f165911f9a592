#![no_main]

use libfuzzer_sys::fuzz_target;
use skin_channel_protocol::utils::compression::{compress, decompress, gunzip_prefix, CompressionKind};

fuzz_target!(|data: &[u8]| {
    for kind in [CompressionKind::Gzip, CompressionKind::Lz4, CompressionKind::Zstd] {
        if let Ok(compressed) = compress(data, &kind) {
            let _ = decompress(&compressed, &kind);
        }
        // Raw input exercises the size limits with malformed streams
        let _ = decompress(data, &kind);
    }

    // Inline gzip sections report how much input they consumed
    if let Ok((_, consumed)) = gunzip_prefix(data) {
        assert!(consumed <= data.len());
    }
});
