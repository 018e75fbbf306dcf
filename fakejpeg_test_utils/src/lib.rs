// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Helpers for assembling JPEG-shaped byte streams in tests and benchmarks.

/// Scan header for a single-component baseline scan: Ns=1, Cs=1, Td/Ta=0,
/// Ss=0, Se=63, Ah/Al=0.
pub const BASELINE_SCAN_HEADER: [u8; 6] = [1, 1, 0x00, 0, 63, 0];

/// Appends marker segments to a byte buffer.
#[derive(Debug, Default, Clone)]
pub struct JpegBuilder {
    bytes: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn soi(self) -> Self {
        self.raw(&[0xff, 0xd8])
    }

    pub fn eoi(self) -> Self {
        self.raw(&[0xff, 0xd9])
    }

    /// Any length-bearing segment. The length field is computed from
    /// `payload`.
    pub fn segment(mut self, marker: u16, payload: &[u8]) -> Self {
        let length = u16::try_from(payload.len() + 2).expect("segment payload too large");
        self.bytes.extend_from_slice(&marker.to_be_bytes());
        self.bytes.extend_from_slice(&length.to_be_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    /// JFIF `APP0` with a `width` x `height` RGB thumbnail.
    pub fn jfif(self, width: u8, height: u8) -> Self {
        let mut payload = b"JFIF\0".to_vec();
        payload.extend_from_slice(&[1, 1, 1, 0, 72, 0, 72, width, height]);
        payload.extend(std::iter::repeat_n(0x80, 3 * width as usize * height as usize));
        self.segment(0xffe0, &payload)
    }

    /// EXIF `APP1`.
    pub fn exif(self, body: &[u8]) -> Self {
        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(body);
        self.segment(0xffe1, &payload)
    }

    pub fn app(self, n: u8, payload: &[u8]) -> Self {
        assert!(n < 16);
        self.segment(0xffe0 + n as u16, payload)
    }

    pub fn comment(self, text: &str) -> Self {
        self.segment(0xfffe, text.as_bytes())
    }

    /// 8-bit quantization table 0 filled with ones.
    pub fn dqt(self) -> Self {
        let mut payload = vec![0u8];
        payload.extend_from_slice(&[1u8; 64]);
        self.segment(0xffdb, &payload)
    }

    /// Baseline frame header for a single-component image.
    pub fn sof0(self, width: u16, height: u16) -> Self {
        let mut payload = vec![8];
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.extend_from_slice(&[1, 1, 0x11, 0]);
        self.segment(0xffc0, &payload)
    }

    /// A trivial DC Huffman table with a single 1-bit code.
    pub fn dht(self) -> Self {
        let mut payload = vec![0x00, 1];
        payload.extend_from_slice(&[0u8; 15]);
        payload.push(0);
        self.segment(0xffc4, &payload)
    }

    /// SOS segment followed by `data`, which must already be byte-stuffed.
    pub fn scan(self, header: &[u8], data: &[u8]) -> Self {
        self.segment(0xffda, header).raw(data)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Deterministic pseudo-random entropy-coded data of exactly `len` bytes,
/// with every `0xff` stuffed as `0xff 0x00` and never ending in a bare `0xff`.
pub fn stuffed_scan_data(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let byte = (state >> 56) as u8;
        if byte != 0xff {
            out.push(byte);
        } else if out.len() + 2 <= len {
            out.extend_from_slice(&[0xff, 0x00]);
        } else {
            out.push(0x00);
        }
    }
    out
}

/// A baseline JPEG with a thumbnail, EXIF and a comment, holding one scan of
/// `scan_len` bytes.
pub fn baseline_jpeg(scan_len: usize) -> Vec<u8> {
    JpegBuilder::new()
        .soi()
        .jfif(2, 2)
        .exif(b"MM\0*fake exif body")
        .comment("made by a camera")
        .dqt()
        .sof0(16, 16)
        .dht()
        .scan(&BASELINE_SCAN_HEADER, &stuffed_scan_data(scan_len, scan_len as u64))
        .eoi()
        .build()
}

/// A progressive-style JPEG: several scans with Huffman tables in between.
pub fn progressive_jpeg(scan_lens: &[usize]) -> Vec<u8> {
    let mut builder = JpegBuilder::new()
        .soi()
        .jfif(0, 0)
        .app(2, b"ICC_PROFILE\0\x01\x01")
        .dqt()
        .segment(0xffc2, &[8, 0, 16, 0, 16, 1, 1, 0x11, 0]);
    for (i, &len) in scan_lens.iter().enumerate() {
        builder = builder
            .dht()
            .scan(&BASELINE_SCAN_HEADER, &stuffed_scan_data(len, i as u64));
    }
    builder.eoi().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stuffed_data_has_no_markers() {
        for len in [0, 1, 2, 17, 1000] {
            let data = stuffed_scan_data(len, 3);
            assert_eq!(data.len(), len);
            for i in 0..data.len() {
                if data[i] == 0xff {
                    assert_eq!(data.get(i + 1), Some(&0x00));
                }
            }
        }
    }

    #[test]
    fn segment_length_counts_itself() {
        let bytes = JpegBuilder::new().segment(0xffdb, &[1, 2, 3]).build();
        assert_eq!(bytes, vec![0xff, 0xdb, 0x00, 0x05, 1, 2, 3]);
    }

    #[test]
    fn jfif_thumbnail_size() {
        let bytes = JpegBuilder::new().jfif(2, 3).build();
        assert_eq!(bytes.len(), 18 + 18);
        assert_eq!(&bytes[2..4], &[0x00, 0x22]);
    }
}
