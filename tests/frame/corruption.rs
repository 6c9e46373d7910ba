// Integration tests for decoder robustness: every malformed frame must come
// back as an error value, never a panic.

use zframe::{compress, decompress, Error};

fn sample() -> Vec<u8> {
    let mut v = Vec::new();
    for i in 0..4_000u32 {
        v.extend_from_slice(format!("{{\"id\":{i},\"tag\":\"t{}\"}}\n", i % 17).as_bytes());
    }
    v
}

#[test]
fn every_truncation_fails() {
    let frame = compress(&sample(), 6).unwrap();
    for cut in 0..frame.len() {
        assert!(decompress(&frame[..cut]).is_err(), "prefix of {cut} bytes decoded");
    }
}

#[test]
fn single_bit_flips_are_detected_or_harmless() {
    let data = sample();
    let frame = compress(&data, 6).unwrap();
    // Stride keeps the test quick while still touching every region.
    for pos in (0..frame.len()).step_by(3) {
        for bit in [0, 3, 7] {
            let mut f = frame.clone();
            f[pos] ^= 1 << bit;
            match decompress(&f) {
                Err(e) => assert!(e.is_data_error(), "unexpected error kind {e:?}"),
                // e.g. a larger window log still decodes the same content
                Ok(out) => assert_eq!(out, data, "flip at {pos}:{bit} returned wrong bytes"),
            }
        }
    }
}

#[test]
fn appended_garbage_rejected() {
    let mut frame = compress(&sample(), 3).unwrap();
    frame.extend_from_slice(&[0xA8, 0xB5, 0x2F, 0xFD]);
    assert_eq!(decompress(&frame), Err(Error::CorruptFrame("trailing bytes after frame")));
}

#[test]
fn random_bytes_rejected() {
    let mut x = 0xDEAD_BEEFu32;
    for len in [1usize, 4, 5, 6, 64, 1000] {
        let junk: Vec<u8> = (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (x >> 16) as u8
            })
            .collect();
        assert!(decompress(&junk).is_err());
    }
}
