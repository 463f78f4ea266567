#![no_main]

use libfuzzer_sys::fuzz_target;
use png_scrub::{Chunk, ChunkType, ItxtMode, Rewriter};

fuzz_target!(|data: &[u8]| {
    // First byte picks the removal string length, the rest is the payload
    let Some((&n, rest)) = data.split_first() else {
        return;
    };
    let split = (n as usize).min(rest.len());
    let (needle, payload) = rest.split_at(split);

    for mode in [ItxtMode::Simple, ItxtMode::Structured] {
        let rewriter = Rewriter::new([needle]).with_itxt_mode(mode);
        for chunk_type in [ChunkType::TEXT, ChunkType::ITXT] {
            let once = rewriter.rewrite(Chunk::new(chunk_type, payload.to_vec()));
            assert!(once.is_consistent());

            // A second pass only changes something if removal exposed a new occurrence
            let twice = rewriter.rewrite(once.clone());
            if twice != once {
                assert!(!needle.is_empty());
                assert!(once.data.windows(needle.len()).any(|w| w == needle));
            }
        }
    }
});
