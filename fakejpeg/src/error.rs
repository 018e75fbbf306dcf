// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::marker::Marker;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid marker {0:04x}, expected ffxx")]
    InvalidMarker(u16),
    #[error("Unexpected end of data before EOI")]
    UnexpectedEndOfData,
    #[error("Invalid length {length} for {marker} segment")]
    InvalidSegmentLength { marker: Marker, length: u16 },
    #[error("Stream starts with {0} instead of SOI")]
    MissingStartOfImage(Marker),
    #[error("Template set is empty")]
    EmptyTemplateSet,
    #[error("Malformed template: {0}")]
    MalformedTemplate(&'static str),
    #[error("Comment of {0} bytes does not fit in a COM segment")]
    CommentTooLong(usize),
    #[error("Scan mask {0:#04x} can produce unescaped 0xff bytes")]
    InvalidScanMask(u8),
    // Template store format errors
    #[error("Invalid template store signature {0:02x?}")]
    InvalidStoreSignature([u8; 4]),
    #[error("Unsupported template store version {0}")]
    UnsupportedStoreVersion(u16),
    #[error("Invalid chunk tag {0} in template store")]
    InvalidChunkTag(u8),
    #[error("Segment of {0} bytes is larger than any JPEG segment")]
    SegmentTooLarge(u64),
    #[error("Too many entries to store: {0}")]
    StoreTooLarge(usize),
    #[error("Generated file would exceed the address space")]
    OutputTooLarge,
    #[error("Template store truncated")]
    StoreTruncated,
    #[error("Unexpected data after the last template")]
    TrailingStoreData,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
