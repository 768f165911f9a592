#![no_main]

use libfuzzer_sys::fuzz_target;
use skin_channel_protocol::protocol::{ProxyBoundPayload, ServerBoundPayload};

fuzz_target!(|data: &[u8]| {
    // Envelope decoding must fail cleanly, never panic or over-allocate
    if let Ok(payload) = ServerBoundPayload::decode(data.to_vec()) {
        // Anything that decodes must survive a re-encode
        if let Ok(encoded) = payload.encode() {
            let _ = ServerBoundPayload::decode(encoded);
        }
    }

    if let Ok(payload) = ProxyBoundPayload::decode(data.to_vec()) {
        if let Ok(encoded) = payload.encode() {
            let _ = ProxyBoundPayload::decode(encoded);
        }
    }
});
