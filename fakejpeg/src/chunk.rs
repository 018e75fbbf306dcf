// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use crate::marker::Marker;

/// One marker segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A segment reproduced byte for byte: marker, length field (if any)
    /// and payload.
    Opaque { marker: Marker, bytes: Vec<u8> },
    /// An SOS segment. `preamble` holds the marker, length field and scan
    /// header; `scan_len` is the number of entropy-coded bytes that followed
    /// it in the source file.
    Scan { preamble: Vec<u8>, scan_len: usize },
}

impl Chunk {
    pub fn marker(&self) -> Marker {
        match self {
            Chunk::Opaque { marker, .. } => *marker,
            Chunk::Scan { .. } => Marker::Sos,
        }
    }

    /// Stored bytes, excluding any scan payload.
    pub fn stored_bytes(&self) -> &[u8] {
        match self {
            Chunk::Opaque { bytes, .. } => bytes,
            Chunk::Scan { preamble, .. } => preamble,
        }
    }
}

/// The structural skeleton of one JPEG file.
///
/// Always starts with SOI and ends with EOI, and never contains `APP1..=APP15`
/// or COM segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    chunks: Vec<Chunk>,
}

impl Template {
    /// Checks the template invariants and wraps `chunks`.
    pub fn from_chunks(chunks: Vec<Chunk>) -> Result<Template> {
        if chunks.len() < 2 {
            return Err(Error::MalformedTemplate("fewer than two chunks"));
        }
        if chunks[0].marker() != Marker::Soi {
            return Err(Error::MalformedTemplate("first chunk is not SOI"));
        }
        if chunks[chunks.len() - 1].marker() != Marker::Eoi {
            return Err(Error::MalformedTemplate("last chunk is not EOI"));
        }
        for chunk in &chunks {
            match chunk {
                Chunk::Opaque { marker, bytes } => {
                    if matches!(marker, Marker::App(16..)) {
                        return Err(Error::MalformedTemplate("APPn marker out of range"));
                    }
                    if marker.is_dropped() {
                        return Err(Error::MalformedTemplate("metadata segment in template"));
                    }
                    if *marker == Marker::Sos {
                        return Err(Error::MalformedTemplate("SOS stored as opaque chunk"));
                    }
                    if bytes.get(..2) != Some(&marker.to_be_bytes()[..]) {
                        return Err(Error::MalformedTemplate("chunk bytes do not start with marker"));
                    }
                }
                Chunk::Scan { preamble, .. } => {
                    if preamble.get(..2) != Some(&Marker::Sos.to_be_bytes()[..]) {
                        return Err(Error::MalformedTemplate("scan preamble without SOS marker"));
                    }
                }
            }
        }
        Ok(Template { chunks })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }

    /// Recorded scan lengths, in stream order.
    pub fn scan_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.chunks.iter().filter_map(|c| match c {
            Chunk::Scan { scan_len, .. } => Some(*scan_len),
            Chunk::Opaque { .. } => None,
        })
    }

    /// Number of bytes the template contributes before any scan payload is
    /// added.
    pub fn skeleton_len(&self) -> usize {
        self.chunks.iter().map(|c| c.stored_bytes().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn soi() -> Chunk {
        Chunk::Opaque {
            marker: Marker::Soi,
            bytes: vec![0xff, 0xd8],
        }
    }

    fn eoi() -> Chunk {
        Chunk::Opaque {
            marker: Marker::Eoi,
            bytes: vec![0xff, 0xd9],
        }
    }

    fn scan(scan_len: usize) -> Chunk {
        Chunk::Scan {
            preamble: vec![0xff, 0xda, 0x00, 0x08, 1, 1, 0, 0, 63, 0],
            scan_len,
        }
    }

    #[test]
    fn accepts_minimal_template() {
        let t = Template::from_chunks(vec![soi(), scan(12), scan(3), eoi()]).unwrap();
        assert_eq!(t.chunks().len(), 4);
        assert_eq!(t.scan_lengths().collect::<Vec<_>>(), vec![12, 3]);
        assert_eq!(t.skeleton_len(), 2 + 10 + 10 + 2);
        assert_eq!(t.chunks()[1].marker(), Marker::Sos);
    }

    #[test]
    fn rejects_broken_templates() {
        assert!(Template::from_chunks(vec![]).is_err());
        assert!(Template::from_chunks(vec![soi()]).is_err());
        assert!(Template::from_chunks(vec![eoi(), soi()]).is_err());
        assert!(Template::from_chunks(vec![soi(), scan(1)]).is_err());
        let com = Chunk::Opaque {
            marker: Marker::Com,
            bytes: vec![0xff, 0xfe, 0x00, 0x02],
        };
        assert!(matches!(
            Template::from_chunks(vec![soi(), com, eoi()]),
            Err(Error::MalformedTemplate(_))
        ));
        let mislabeled = Chunk::Opaque {
            marker: Marker::Other(0xffdb),
            bytes: vec![0xff, 0xc4, 0x00, 0x02],
        };
        assert!(Template::from_chunks(vec![soi(), mislabeled, eoi()]).is_err());
        let bad_scan = Chunk::Scan {
            preamble: vec![0xff, 0xdb, 0x00, 0x02],
            scan_len: 0,
        };
        assert!(Template::from_chunks(vec![soi(), bad_scan, eoi()]).is_err());
    }

    #[test]
    fn rejects_out_of_range_app_marker() {
        let app16 = Chunk::Opaque {
            marker: Marker::App(16),
            bytes: vec![0xff, 0xe0, 0x00, 0x02],
        };
        assert!(matches!(
            Template::from_chunks(vec![soi(), app16, eoi()]),
            Err(Error::MalformedTemplate(_))
        ));
        let app0 = Chunk::Opaque {
            marker: Marker::App(0),
            bytes: vec![0xff, 0xe0, 0x00, 0x02],
        };
        assert!(Template::from_chunks(vec![soi(), app0, eoi()]).is_ok());
    }
}
