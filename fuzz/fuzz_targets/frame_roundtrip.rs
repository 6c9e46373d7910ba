#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the level, the rest is the content.
    let Some((&selector, content)) = data.split_first() else {
        return;
    };
    if content.is_empty() {
        assert!(zframe::compress(content, 3).is_err());
        return;
    }
    let level = (selector % 30) as i32 - 7;

    let frame = zframe::compress(content, level).expect("compression of non-empty input failed");
    assert!(frame.len() <= zframe::compress_bound(content.len()));

    let recovered = zframe::decompress(&frame).unwrap_or_else(|e| {
        panic!(
            "frame round-trip: own frame rejected at level {level} ({} bytes in, {} bytes framed): {e}",
            content.len(),
            frame.len()
        )
    });
    assert_eq!(recovered, content, "frame round-trip mismatch at level {level}");
});
