// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decomposition of a JPEG byte stream into a [`Template`].

use byteorder::{BigEndian, ByteOrder};

use crate::chunk::{Chunk, Template};
use crate::error::{Error, Result};
use crate::jfif::strip_thumbnail;
use crate::marker::{MARKER_PREFIX, Marker};
use crate::util::tracing_wrappers::*;

/// Parses a complete JPEG file into its template.
///
/// Metadata segments (`APP1..=APP15`, COM) are dropped, the JFIF thumbnail
/// is stripped and each scan keeps only its header and the length of its
/// entropy-coded data. Parsing stops at the first EOI; anything after it is
/// ignored.
pub fn parse(data: &[u8]) -> Result<Template> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    loop {
        let marker = read_marker(data, pos)?;
        if chunks.is_empty() && marker != Marker::Soi {
            return Err(Error::MissingStartOfImage(marker));
        }
        trace!(%marker, pos, "segment");
        match marker {
            Marker::Soi => {
                chunks.push(Chunk::Opaque {
                    marker,
                    bytes: data[pos..pos + 2].to_vec(),
                });
                pos += 2;
            }
            Marker::Eoi => {
                chunks.push(Chunk::Opaque {
                    marker,
                    bytes: data[pos..pos + 2].to_vec(),
                });
                break;
            }
            Marker::Sos => {
                let header_end = segment_end(data, pos, marker)?;
                let scan_end = find_scan_end(data, header_end)?;
                chunks.push(Chunk::Scan {
                    preamble: data[pos..header_end].to_vec(),
                    scan_len: scan_end - header_end,
                });
                pos = scan_end;
            }
            Marker::App(0) => {
                let end = segment_end(data, pos, marker)?;
                chunks.push(Chunk::Opaque {
                    marker,
                    bytes: strip_thumbnail(&data[pos..end]),
                });
                pos = end;
            }
            _ => {
                let end = segment_end(data, pos, marker)?;
                if !marker.is_dropped() {
                    chunks.push(Chunk::Opaque {
                        marker,
                        bytes: data[pos..end].to_vec(),
                    });
                }
                pos = end;
            }
        }
        if pos >= data.len() {
            return Err(Error::UnexpectedEndOfData);
        }
    }
    debug!(chunks = chunks.len(), consumed = pos + 2, "parsed template");
    Template::from_chunks(chunks)
}

fn read_marker(data: &[u8], pos: usize) -> Result<Marker> {
    let bytes = data.get(pos..pos + 2).ok_or(Error::UnexpectedEndOfData)?;
    Marker::from_code(BigEndian::read_u16(bytes))
}

/// Returns the offset one past the end of the length-bearing segment whose
/// marker starts at `pos`.
fn segment_end(data: &[u8], pos: usize, marker: Marker) -> Result<usize> {
    let length_field = data
        .get(pos + 2..pos + 4)
        .ok_or(Error::UnexpectedEndOfData)?;
    let length = BigEndian::read_u16(length_field);
    if length < 2 {
        return Err(Error::InvalidSegmentLength { marker, length });
    }
    let end = pos + 2 + length as usize;
    if end > data.len() {
        return Err(Error::UnexpectedEndOfData);
    }
    Ok(end)
}

/// Finds the marker that ends the entropy-coded data starting at `start`.
/// `0xff 0x00` is a stuffed data byte; any other byte after `0xff` starts a
/// marker.
fn find_scan_end(data: &[u8], start: usize) -> Result<usize> {
    data[start..]
        .windows(2)
        .position(|w| w[0] == MARKER_PREFIX && w[1] != 0x00)
        .map(|offset| start + offset)
        .ok_or(Error::UnexpectedEndOfData)
}
