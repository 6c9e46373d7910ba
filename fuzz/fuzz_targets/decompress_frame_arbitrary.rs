#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must produce an error or content, never a panic.
    let size = zframe::decompressed_size(data);
    match zframe::decompress(data) {
        Ok(out) => {
            if let Ok(size) = size {
                assert_eq!(out.len(), size);
            }
        }
        Err(e) => assert!(!e.to_string().is_empty()),
    }
    let _ = zframe::frame_info(data);
});
