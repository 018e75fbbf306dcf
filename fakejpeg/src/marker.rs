// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;

use crate::error::{Error, Result};

/// Byte that introduces every marker.
pub const MARKER_PREFIX: u8 = 0xff;

pub const SOI: u16 = 0xffd8;
pub const EOI: u16 = 0xffd9;
pub const SOS: u16 = 0xffda;
pub const APP0: u16 = 0xffe0;
pub const APP15: u16 = 0xffef;
pub const COM: u16 = 0xfffe;

/// A JPEG marker, i.e. the 16-bit tag that starts a segment.
///
/// Only the markers that the extractor treats specially get their own
/// variant. Everything else (DQT, DHT, SOFn, DRI, ...) is carried as
/// [`Marker::Other`] and copied through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Start of image.
    Soi,
    /// End of image.
    Eoi,
    /// Start of scan.
    Sos,
    /// Application segment `APPn`. `n` must be in `0..=15`; [`Marker::code`]
    /// only keeps its low four bits.
    App(u8),
    /// Comment.
    Com,
    /// Any other marker, stored as its full 16-bit code.
    Other(u16),
}

impl Marker {
    /// Classifies a 16-bit big-endian marker code.
    /// ```
    /// # use fakejpeg::Marker;
    /// assert_eq!(Marker::from_code(0xffd8)?, Marker::Soi);
    /// assert_eq!(Marker::from_code(0xffe1)?, Marker::App(1));
    /// assert_eq!(Marker::from_code(0xffdb)?, Marker::Other(0xffdb));
    /// assert!(Marker::from_code(0x1234).is_err());
    /// # Ok::<(), fakejpeg::error::Error>(())
    /// ```
    pub fn from_code(code: u16) -> Result<Marker> {
        if code >> 8 != MARKER_PREFIX as u16 {
            return Err(Error::InvalidMarker(code));
        }
        Ok(match code {
            SOI => Marker::Soi,
            EOI => Marker::Eoi,
            SOS => Marker::Sos,
            APP0..=APP15 => Marker::App((code - APP0) as u8),
            COM => Marker::Com,
            _ => Marker::Other(code),
        })
    }

    pub fn code(self) -> u16 {
        match self {
            Marker::Soi => SOI,
            Marker::Eoi => EOI,
            Marker::Sos => SOS,
            Marker::App(n) => APP0 + (n & 0xf) as u16,
            Marker::Com => COM,
            Marker::Other(code) => code,
        }
    }

    pub fn to_be_bytes(self) -> [u8; 2] {
        self.code().to_be_bytes()
    }

    /// Whether a 2-byte length field follows the marker.
    pub fn has_length(self) -> bool {
        !matches!(self, Marker::Soi | Marker::Eoi)
    }

    /// Metadata segments that never make it into a template: `APP1..=APP15`
    /// (EXIF, XMP, ICC, ...) and comments.
    pub fn is_dropped(self) -> bool {
        matches!(self, Marker::App(1..=15) | Marker::Com)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Soi => write!(f, "SOI"),
            Marker::Eoi => write!(f, "EOI"),
            Marker::Sos => write!(f, "SOS"),
            Marker::App(n) => write!(f, "APP{n}"),
            Marker::Com => write!(f, "COM"),
            Marker::Other(code) => write!(f, "{code:04X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn named_markers() {
        for (code, marker) in [
            (0xffd8, Marker::Soi),
            (0xffd9, Marker::Eoi),
            (0xffda, Marker::Sos),
            (0xffe0, Marker::App(0)),
            (0xffef, Marker::App(15)),
            (0xfffe, Marker::Com),
        ] {
            assert_eq!(Marker::from_code(code).unwrap(), marker);
            assert_eq!(marker.code(), code);
        }
    }

    #[test]
    fn generic_markers_keep_their_code() {
        for code in [0xffc0, 0xffc4, 0xffdb, 0xffdd, 0xffd0, 0xff01, 0xffff] {
            let marker = Marker::from_code(code).unwrap();
            assert_eq!(marker, Marker::Other(code));
            assert_eq!(marker.code(), code);
            assert!(marker.has_length());
            assert!(!marker.is_dropped());
        }
    }

    #[test]
    fn rejects_non_ff_prefix() {
        assert!(matches!(
            Marker::from_code(0x1234),
            Err(Error::InvalidMarker(0x1234))
        ));
        assert!(matches!(
            Marker::from_code(0x00d8),
            Err(Error::InvalidMarker(0x00d8))
        ));
    }

    #[test]
    fn dropped_markers() {
        assert!(!Marker::App(0).is_dropped());
        for n in 1..=15 {
            assert!(Marker::App(n).is_dropped());
        }
        assert!(Marker::Com.is_dropped());
        assert!(!Marker::Sos.is_dropped());
        assert!(!Marker::Soi.has_length());
        assert!(!Marker::Eoi.has_length());
    }

    #[test]
    fn code_round_trip_arb() {
        arbtest::arbtest(|u| {
            let low: u8 = u.arbitrary()?;
            let code = 0xff00 | low as u16;
            let marker = Marker::from_code(code).unwrap();
            assert_eq!(marker.code(), code);
            assert_eq!(marker.to_be_bytes(), [0xff, low]);
            Ok(())
        });
    }

    #[test]
    fn display_names() {
        assert_eq!(Marker::App(14).to_string(), "APP14");
        assert_eq!(Marker::Other(0xffdb).to_string(), "FFDB");
        assert_eq!(Marker::Sos.to_string(), "SOS");
    }
}
