//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use bitflags::bitflags;

bitflags! {
    /// Flags controlling how [`crate::extract`] materializes an archive.
    /// New options are always added as new bits; existing bits never change
    /// meaning.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
    pub struct ExtractOptions: u32 {
        /// Write every sub-resource, including scripts.
        const NONE = 0;
        /// Skip writing sub-resources whose MIME type is
        /// `text/javascript`, `application/javascript`, or
        /// `application/x-javascript`, and blank out references to them
        /// in the rewritten document.
        const IGNORE_JAVASCRIPT_FILES = 1 << 0;
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions::NONE
    }
}
