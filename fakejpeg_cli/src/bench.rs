// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::time::{Duration, Instant};

use fakejpeg::{Generator, TemplateStore};
use rand::Rng;

/// Throughput of a generation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchStats {
    pub files: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl BenchStats {
    pub fn millis_per_file(&self) -> f64 {
        if self.files == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() * 1000.0 / self.files as f64
    }

    pub fn mib_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs / (1024.0 * 1024.0)
    }
}

/// Generates files back to back until `duration` has passed. Always
/// generates at least one file.
pub fn run_for<R: Rng + ?Sized>(
    generator: &Generator,
    store: &TemplateStore,
    comment: Option<&str>,
    rng: &mut R,
    duration: Duration,
) -> fakejpeg::Result<BenchStats> {
    let start = Instant::now();
    let mut files = 0u64;
    let mut bytes = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        generator.generate_into(store, comment, rng, &mut buf)?;
        files += 1;
        bytes += buf.len() as u64;
        if start.elapsed() >= duration {
            break;
        }
    }
    Ok(BenchStats {
        files,
        bytes,
        elapsed: start.elapsed(),
    })
}
