// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Structural JPEG templates and fast synthesis of look-alike JPEG files.
//!
//! [`parse`] reduces a real JPEG to a [`Template`]: its marker segments in
//! order, with metadata segments dropped, the JFIF thumbnail stripped and the
//! entropy-coded scan data replaced by its length. A [`TemplateStore`] collects
//! templates from a batch of files and can be persisted. A [`Generator`] picks
//! a template and refills every scan with masked random bytes.
//!
//! The output is *not* guaranteed to hold valid Huffman codes; it is meant
//! as bulk test data that decoders will accept without crashing.
//!
//! ```
//! use fakejpeg::{TemplateStore, generate};
//! use rand::SeedableRng;
//!
//! let jpeg = [
//!     0xff, 0xd8, // SOI
//!     0xff, 0xda, 0x00, 0x08, 1, 1, 0, 0, 63, 0, // SOS
//!     0x12, 0x34, 0xff, 0x00, // scan data
//!     0xff, 0xd9, // EOI
//! ];
//! let store = TemplateStore::from_buffers([("tiny.jpg", &jpeg[..])]);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let fake = generate(&store, Some("hello"), &mut rng)?;
//! assert_eq!(&fake[..2], &[0xff, 0xd8]);
//! # Ok::<(), fakejpeg::error::Error>(())
//! ```

#![deny(unsafe_code)]
pub mod chunk;
pub mod error;
pub mod generate;
pub mod jfif;
pub mod marker;
pub mod options;
pub mod parse;
pub mod store;
pub mod util;

pub use chunk::{Chunk, Template};
pub use error::{Error, Result};
pub use generate::{Generator, generate};
pub use marker::Marker;
pub use options::GeneratorOptions;
pub use parse::parse;
pub use store::TemplateStore;

/// Largest possible marker segment: marker plus a maximal 16-bit length.
pub const MAX_SEGMENT_SIZE: usize = 2 + u16::MAX as usize;
