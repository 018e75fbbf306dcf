// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Synthesis of JPEG-shaped byte streams from templates.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::chunk::{Chunk, Template};
use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::options::GeneratorOptions;
use crate::store::TemplateStore;
use crate::util::tracing_wrappers::*;

/// Number of template chunks written before an optional comment segment.
const COMMENT_POSITION: usize = 2;

/// Range of lengths a scan recorded as `scan_len` bytes may be refilled with:
/// `scan_len ..= scan_len + floor(scan_len * slack_percent / 100)`.
/// ```
/// # use fakejpeg::generate::scan_length_range;
/// assert_eq!(scan_length_range(4, 10), 4..=4);
/// assert_eq!(scan_length_range(1000, 10), 1000..=1100);
/// ```
pub fn scan_length_range(scan_len: usize, slack_percent: usize) -> RangeInclusive<usize> {
    let slack = scan_len as u128 * slack_percent as u128 / 100;
    let slack = usize::try_from(slack).unwrap_or(usize::MAX);
    scan_len..=scan_len.saturating_add(slack)
}

/// ANDs `mask` into every byte.
pub fn mask_scan_bytes(bytes: &mut [u8], mask: u8) {
    for b in bytes.iter_mut() {
        *b &= mask;
    }
}

/// Builds a complete COM segment holding `comment` as UTF-8.
pub fn comment_segment(comment: &str) -> Result<Vec<u8>> {
    let text = comment.as_bytes();
    let length = u16::try_from(text.len() + 2).map_err(|_| Error::CommentTooLong(text.len()))?;
    let mut segment = Vec::with_capacity(text.len() + 4);
    segment.extend_from_slice(&Marker::Com.to_be_bytes());
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(text);
    Ok(segment)
}

/// Produces fake JPEG files from a [`TemplateStore`].
///
/// The generator holds no state besides its options; all randomness comes
/// from the `rng` passed to each call, so a seeded generator gives
/// reproducible output.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Picks a template from `store` and synthesizes a file from it.
    /// If `comment` is given, a COM segment holding it is inserted after the
    /// first two template chunks.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        store: &TemplateStore,
        comment: Option<&str>,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.generate_into(store, comment, rng, &mut out)?;
        Ok(out)
    }

    /// Like [`Generator::generate`], but appends to `out`.
    pub fn generate_into<R: Rng + ?Sized>(
        &self,
        store: &TemplateStore,
        comment: Option<&str>,
        rng: &mut R,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let comment = comment.map(comment_segment).transpose()?;
        let template = store.choose(rng)?;
        self.write_template(template, comment.as_deref(), rng, out)
    }

    /// Synthesizes a file from a specific template. `comment` is a complete
    /// COM segment, as built by [`comment_segment`].
    ///
    /// Room for the largest possible output is reserved up front; scan
    /// lengths too large to allocate give [`Error::OutputTooLarge`] or
    /// [`Error::OutOfMemory`] and leave `out` untouched.
    pub fn write_template<R: Rng + ?Sized>(
        &self,
        template: &Template,
        comment: Option<&[u8]>,
        rng: &mut R,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let max_len = self.max_output_len(template, comment.map_or(0, <[u8]>::len))?;
        out.try_reserve(max_len)?;

        for (i, chunk) in template.chunks().iter().enumerate() {
            match chunk {
                Chunk::Opaque { bytes, .. } => out.extend_from_slice(bytes),
                Chunk::Scan { preamble, scan_len } => {
                    out.extend_from_slice(preamble);
                    let n = rng.random_range(self.scan_range(*scan_len));
                    trace!(scan_len, n, "synthesizing scan");
                    let start = out.len();
                    out.resize(start + n, 0);
                    rng.fill_bytes(&mut out[start..]);
                    mask_scan_bytes(&mut out[start..], self.options.scan_mask);
                }
            }
            if i + 1 == COMMENT_POSITION {
                if let Some(segment) = comment {
                    out.extend_from_slice(segment);
                }
            }
        }
        Ok(())
    }

    /// Upper bound on the bytes [`Generator::write_template`] appends.
    fn max_output_len(&self, template: &Template, comment_len: usize) -> Result<usize> {
        template
            .scan_lengths()
            .map(|len| *self.scan_range(len).end())
            .try_fold(template.skeleton_len(), usize::checked_add)
            .and_then(|len| len.checked_add(comment_len))
            .ok_or(Error::OutputTooLarge)
    }

    fn scan_range(&self, scan_len: usize) -> RangeInclusive<usize> {
        scan_length_range(scan_len, self.options.scan_length_slack_percent)
    }
}

/// Generates one file with the default options.
pub fn generate<R: Rng + ?Sized>(
    store: &TemplateStore,
    comment: Option<&str>,
    rng: &mut R,
) -> Result<Vec<u8>> {
    Generator::default().generate(store, comment, rng)
}
