// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};

/// Mask applied to every synthesized scan byte. It clears bits 1, 4 and 7,
/// so long runs of ones (and `0xff` bytes) never occur in the scan.
pub const DEFAULT_SCAN_MASK: u8 = 0x6d;

/// Synthesized scans are between the template's scan length and this much
/// longer, in percent.
pub const DEFAULT_SCAN_LENGTH_SLACK_PERCENT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Bitmask ANDed into every random scan byte. Must not be `0xff`.
    pub scan_mask: u8,
    /// A scan recorded as `L` bytes is refilled with `n` bytes,
    /// `L <= n <= L + floor(L * scan_length_slack_percent / 100)`.
    pub scan_length_slack_percent: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            scan_mask: DEFAULT_SCAN_MASK,
            scan_length_slack_percent: DEFAULT_SCAN_LENGTH_SLACK_PERCENT,
        }
    }
}

impl GeneratorOptions {
    pub fn validate(&self) -> Result<()> {
        if self.scan_mask == 0xff {
            return Err(Error::InvalidScanMask(self.scan_mask));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = GeneratorOptions::default();
        assert_eq!(options.scan_mask, 0x6d);
        assert_eq!(options.scan_length_slack_percent, 10);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn full_mask_is_rejected() {
        let options = GeneratorOptions {
            scan_mask: 0xff,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidScanMask(0xff))
        ));
    }
}
