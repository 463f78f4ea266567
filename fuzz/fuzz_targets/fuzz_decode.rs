#![no_main]

use libfuzzer_sys::fuzz_target;
use png_scrub::{codec, DecodeMode};

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic, only return errors or fewer chunks
    let lenient = codec::decode(data, DecodeMode::Lenient).expect("lenient decode never fails");

    // Strict mode agrees with lenient mode whenever it succeeds
    if let Ok(strict) = codec::decode(data, DecodeMode::Strict) {
        assert_eq!(strict, lenient);
    }

    // Re-encoding what was decoded gives back a prefix of the input
    let encoded = codec::encode(&lenient);
    assert_eq!(&encoded[8..], &data[..encoded.len() - 8]);
});
