// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

/// Like `Vec::with_capacity`, but reports allocation failure instead of
/// aborting.
pub fn try_with_capacity<T>(capacity: usize) -> Result<Vec<T>, TryReserveError> {
    let mut vec = Vec::new();
    vec.try_reserve(capacity)?;
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::try_with_capacity;

    #[test]
    fn reserves_requested_capacity() {
        let v = try_with_capacity::<u8>(100).unwrap();
        assert!(v.capacity() >= 100);
        assert!(v.is_empty());
    }

    #[test]
    fn impossible_reservation_fails() {
        assert!(try_with_capacity::<u64>(usize::MAX).is_err());
    }
}
