// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! JFIF (`APP0`) header handling.
//!
//! A JFIF segment may carry an uncompressed thumbnail after its fixed header.
//! Templates keep only the fixed header, rebuilt with the thumbnail
//! dimensions set to zero.

use byteorder::{BigEndian, ByteOrder};

use crate::marker::APP0;

/// Size of a thumbnail-less JFIF segment, marker included.
pub const JFIF_SEGMENT_SIZE: usize = 18;
/// Value of the length field of a thumbnail-less JFIF segment.
pub const JFIF_SEGMENT_LENGTH: u16 = (JFIF_SEGMENT_SIZE - 2) as u16;

/// Fixed fields of a JFIF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfifHeader {
    /// `"JFIF\0"` in conforming files; kept as found.
    pub identifier: [u8; 5],
    pub version: [u8; 2],
    pub units: u8,
    pub x_density: u16,
    pub y_density: u16,
}

impl JfifHeader {
    /// Reads the header fields of an `APP0` segment, starting at its marker.
    /// Returns `None` if the segment is shorter than the fixed header.
    pub fn from_segment(segment: &[u8]) -> Option<JfifHeader> {
        if segment.len() < JFIF_SEGMENT_SIZE {
            return None;
        }
        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(&segment[4..9]);
        Some(JfifHeader {
            identifier,
            version: [segment[9], segment[10]],
            units: segment[11],
            x_density: BigEndian::read_u16(&segment[12..14]),
            y_density: BigEndian::read_u16(&segment[14..16]),
        })
    }

    /// Builds a complete `APP0` segment with no thumbnail.
    pub fn to_segment(&self) -> [u8; JFIF_SEGMENT_SIZE] {
        let mut out = [0u8; JFIF_SEGMENT_SIZE];
        BigEndian::write_u16(&mut out[0..2], APP0);
        BigEndian::write_u16(&mut out[2..4], JFIF_SEGMENT_LENGTH);
        out[4..9].copy_from_slice(&self.identifier);
        out[9..11].copy_from_slice(&self.version);
        out[11] = self.units;
        BigEndian::write_u16(&mut out[12..14], self.x_density);
        BigEndian::write_u16(&mut out[14..16], self.y_density);
        // out[16..18], thumbnail width and height, stay zero.
        out
    }
}

/// Returns the segment unchanged if it has no room for a thumbnail, or a
/// rebuilt thumbnail-less header otherwise.
pub fn strip_thumbnail(segment: &[u8]) -> Vec<u8> {
    match JfifHeader::from_segment(segment) {
        Some(header) if segment.len() > JFIF_SEGMENT_SIZE => header.to_segment().to_vec(),
        _ => segment.to_vec(),
    }
}
