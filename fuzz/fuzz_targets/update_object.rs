#![no_main]

use codec::{CaptureTime, DecoderSession, NullSink, RawPacket, SessionConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let session = DecoderSession::with_builtin_schema(SessionConfig::default());
    let packet = RawPacket::new(0x1725, CaptureTime::from_millis(0), data.to_vec());

    // Arbitrary bytes must never panic; whatever decodes must apply cleanly.
    if let Ok(decoded) = session.decode(&packet) {
        assert!(decoded.entry_bytes + decoded.trailing_bytes <= data.len());
        let _ = session.apply(&packet, &decoded, &mut NullSink);
    }
});
