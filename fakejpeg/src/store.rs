// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Collections of templates: batch construction, random selection and the
//! on-disk format.
//!
//! The persisted form is a versioned, length-prefixed big-endian record
//! stream:
//!
//! ```text
//! signature   "FJTS"
//! version     u16
//! templates   u32
//!   chunks    u32
//!     tag     u8      0 = opaque, 1 = scan
//!     opaque: marker u16, length u32, bytes
//!     scan:   length u32, preamble bytes, scan length u64
//! ```

use std::fmt::Display;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use rand::Rng;

use crate::MAX_SEGMENT_SIZE;
use crate::chunk::{Chunk, Template};
use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::parse::parse;
use crate::util::try_with_capacity;
use crate::util::tracing_wrappers::*;

pub const STORE_SIGNATURE: [u8; 4] = *b"FJTS";
pub const STORE_VERSION: u16 = 1;

// Upper bound on up-front allocations driven by counts read from a store.
const MAX_PREALLOCATED_ENTRIES: usize = 1024;

#[repr(u8)]
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq)]
enum ChunkTag {
    Opaque = 0,
    Scan = 1,
}

impl TryFrom<u8> for ChunkTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(Error::InvalidChunkTag(value))
    }
}

/// An ordered set of templates.
///
/// Built once, then only read; it can be shared between threads that each
/// generate with their own random number generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Picks a template uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Template> {
        if self.templates.is_empty() {
            return Err(Error::EmptyTemplateSet);
        }
        Ok(&self.templates[rng.random_range(0..self.templates.len())])
    }

    /// Builds a store from `(id, bytes)` pairs, silently skipping inputs
    /// that fail to parse. See [`TemplateStore::from_buffers_with_reporter`].
    pub fn from_buffers<I, K, B>(inputs: I) -> Self
    where
        I: IntoIterator<Item = (K, B)>,
        K: Display,
        B: AsRef<[u8]>,
    {
        Self::from_buffers_with_reporter(inputs, |_, _| {})
    }

    /// Builds a store from `(id, bytes)` pairs.
    ///
    /// Every input is parsed independently. An input that fails to parse is
    /// handed to `reporter` together with the error and contributes nothing;
    /// the remaining inputs are still processed. Templates keep input order.
    pub fn from_buffers_with_reporter<I, K, B, F>(inputs: I, mut reporter: F) -> Self
    where
        I: IntoIterator<Item = (K, B)>,
        K: Display,
        B: AsRef<[u8]>,
        F: FnMut(&K, &Error),
    {
        let mut store = Self::new();
        for (id, bytes) in inputs {
            debug!(%id, "loading");
            let result = parse(bytes.as_ref());
            store.add_result(&id, result, &mut reporter);
        }
        store
    }

    /// Same as [`TemplateStore::from_buffers_with_reporter`], but parses on
    /// the rayon thread pool. Failures are reported after parsing, in input
    /// order, and the resulting store is identical to the sequential one.
    #[cfg(feature = "parallel")]
    pub fn from_buffers_parallel<K, B, F>(inputs: &[(K, B)], mut reporter: F) -> Self
    where
        K: Display + Sync,
        B: AsRef<[u8]> + Sync,
        F: FnMut(&K, &Error),
    {
        use rayon::prelude::*;

        let results: Vec<Result<Template>> = inputs
            .par_iter()
            .map(|(_, bytes)| parse(bytes.as_ref()))
            .collect();
        let mut store = Self::new();
        for ((id, _), result) in inputs.iter().zip(results) {
            store.add_result(id, result, &mut reporter);
        }
        store
    }

    fn add_result<K: Display>(
        &mut self,
        id: &K,
        result: Result<Template>,
        reporter: &mut impl FnMut(&K, &Error),
    ) {
        match result {
            Ok(template) => self.push(template),
            Err(err) => {
                warn!(%id, %err, "failed to parse");
                reporter(id, &err);
            }
        }
    }

    /// Serializes the store.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&STORE_SIGNATURE)?;
        w.write_u16::<BigEndian>(STORE_VERSION)?;
        write_count(w, self.templates.len())?;
        for template in &self.templates {
            write_count(w, template.chunks().len())?;
            for chunk in template.chunks() {
                match chunk {
                    Chunk::Opaque { marker, bytes } => {
                        w.write_u8(ChunkTag::Opaque as u8)?;
                        w.write_u16::<BigEndian>(marker.code())?;
                        write_count(w, bytes.len())?;
                        w.write_all(bytes)?;
                    }
                    Chunk::Scan { preamble, scan_len } => {
                        w.write_u8(ChunkTag::Scan as u8)?;
                        write_count(w, preamble.len())?;
                        w.write_all(preamble)?;
                        w.write_u64::<BigEndian>(*scan_len as u64)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Reads one serialized store. Bytes after it are left in `r`.
    pub fn read_from<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut signature = [0u8; 4];
        r.read_exact(&mut signature).map_err(truncated)?;
        if signature != STORE_SIGNATURE {
            return Err(Error::InvalidStoreSignature(signature));
        }
        let version = r.read_u16::<BigEndian>().map_err(truncated)?;
        if version != STORE_VERSION {
            return Err(Error::UnsupportedStoreVersion(version));
        }
        let num_templates = r.read_u32::<BigEndian>().map_err(truncated)? as usize;
        let mut templates = try_with_capacity(num_templates.min(MAX_PREALLOCATED_ENTRIES))?;
        for _ in 0..num_templates {
            templates.push(read_template(r)?);
        }
        debug!(templates = templates.len(), "loaded template store");
        Ok(Self { templates })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Deserializes a store that occupies all of `data`.
    pub fn from_bytes(mut data: &[u8]) -> Result<Self> {
        let store = Self::read_from(&mut data)?;
        if !data.is_empty() {
            return Err(Error::TrailingStoreData);
        }
        Ok(store)
    }
}

impl FromIterator<Template> for TemplateStore {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        Self {
            templates: iter.into_iter().collect(),
        }
    }
}

impl Extend<Template> for TemplateStore {
    fn extend<I: IntoIterator<Item = Template>>(&mut self, iter: I) {
        self.templates.extend(iter);
    }
}

fn truncated(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::StoreTruncated
    } else {
        Error::Io(err)
    }
}

fn write_count<W: Write + ?Sized>(w: &mut W, count: usize) -> Result<()> {
    let count = u32::try_from(count).map_err(|_| Error::StoreTooLarge(count))?;
    w.write_u32::<BigEndian>(count)?;
    Ok(())
}

fn read_segment_bytes<R: Read + ?Sized>(r: &mut R) -> Result<Vec<u8>> {
    let len = r.read_u32::<BigEndian>().map_err(truncated)? as u64;
    if len > MAX_SEGMENT_SIZE as u64 {
        return Err(Error::SegmentTooLarge(len));
    }
    let mut bytes = try_with_capacity(len as usize)?;
    Read::take(&mut *r, len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(Error::StoreTruncated);
    }
    Ok(bytes)
}

fn read_template<R: Read + ?Sized>(r: &mut R) -> Result<Template> {
    let num_chunks = r.read_u32::<BigEndian>().map_err(truncated)? as usize;
    let mut chunks = try_with_capacity(num_chunks.min(MAX_PREALLOCATED_ENTRIES))?;
    for _ in 0..num_chunks {
        let tag = ChunkTag::try_from(r.read_u8().map_err(truncated)?)?;
        let chunk = match tag {
            ChunkTag::Opaque => {
                let marker = Marker::from_code(r.read_u16::<BigEndian>().map_err(truncated)?)?;
                let bytes = read_segment_bytes(r)?;
                Chunk::Opaque { marker, bytes }
            }
            ChunkTag::Scan => {
                let preamble = read_segment_bytes(r)?;
                let scan_len = r.read_u64::<BigEndian>().map_err(truncated)?;
                let scan_len =
                    usize::try_from(scan_len).map_err(|_| Error::SegmentTooLarge(scan_len))?;
                Chunk::Scan { preamble, scan_len }
            }
        };
        chunks.push(chunk);
    }
    Template::from_chunks(chunks)
}
