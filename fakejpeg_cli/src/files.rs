// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::{Path, PathBuf};
use std::{fs, io};

use color_eyre::eyre::{Result, WrapErr};

/// Convenience function which does what std::fs::write does, but also
/// creates the full directory path if it does not exist.
pub fn write_output_file(output_filename: &Path, output_bytes: &[u8]) -> Result<()> {
    if let Some(parent) = output_filename.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Cannot create directory {}", parent.display()))?;
    }
    fs::write(output_filename, output_bytes)
        .wrap_err_with(|| format!("Cannot write {}", output_filename.display()))
}

/// Reads every input file. Files that cannot be read are handed to
/// `on_error` and left out.
pub fn read_inputs(
    paths: &[PathBuf],
    mut on_error: impl FnMut(&Path, &io::Error),
) -> Vec<(String, Vec<u8>)> {
    paths
        .iter()
        .filter_map(|path| match fs::read(path) {
            Ok(bytes) => Some((path.display().to_string(), bytes)),
            Err(err) => {
                on_error(path, &err);
                None
            }
        })
        .collect()
}

/// Path of the `index`-th example file in `dir`.
pub fn example_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("example{index}.jpg"))
}
