//! Ownership options fixed at table construction.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Combinable flags deciding whether the table releases a key and/or a
/// value when it destroys an entry.
///
/// A part whose flag is set is dropped by the table. A part whose flag is
/// clear is handed back to the caller inside a
/// [`Detached`](crate::Detached) record instead.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Options(u32);

impl Options {
    pub const NONE: Options = Options(0);
    /// Release key memory on entry destruction.
    pub const FREE_KEY: Options = Options(1 << 0);
    /// Release value memory on entry destruction.
    pub const FREE_VALUE: Options = Options(1 << 1);

    const ALL: u32 = Self::FREE_KEY.0 | Self::FREE_VALUE.0;

    /// Builds options from raw bits; unknown bits are ignored.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Options(bits & Self::ALL)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn frees_key(self) -> bool {
        self.contains(Self::FREE_KEY)
    }

    pub fn frees_value(self) -> bool {
        self.contains(Self::FREE_VALUE)
    }
}

impl BitOr for Options {
    type Output = Options;
    fn bitor(self, rhs: Options) -> Options {
        Options(self.0 | rhs.0)
    }
}

impl BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.frees_key(), self.frees_value()) {
            (false, false) => f.write_str("NONE"),
            (true, false) => f.write_str("FREE_KEY"),
            (false, true) => f.write_str("FREE_VALUE"),
            (true, true) => f.write_str("FREE_KEY | FREE_VALUE"),
        }
    }
}
