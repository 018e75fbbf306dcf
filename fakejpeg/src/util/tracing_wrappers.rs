// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Logging macros that forward to `tracing` when the `tracing` feature is
//! enabled and compile to nothing otherwise.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

// The no-op macros get distinct names so that `warn` is not resolved
// against the built-in `#[warn]` attribute.
#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! noop_debug {
        ($($tt:tt)*) => {};
    }
    macro_rules! noop_trace {
        ($($tt:tt)*) => {};
    }
    macro_rules! noop_warn {
        ($($tt:tt)*) => {};
    }
    pub(crate) use noop_debug as debug;
    pub(crate) use noop_trace as trace;
    pub(crate) use noop_warn as warn;
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_accept_tracing_syntax() {
        let id = "input.jpg";
        let n = 3;
        debug!(%id, n, "debug");
        trace!(?id, count = n + 1, "trace");
        warn!(%id, err = %"broken", "warn");
        assert_eq!((id, n), ("input.jpg", 3));
    }
}
