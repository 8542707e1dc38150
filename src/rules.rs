#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rules {
    /// A side that can jump must jump.
    pub forced_jumps: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self::standard()
    }
}

impl Rules {
    #[inline]
    pub const fn new(forced_jumps: bool) -> Self {
        Self { forced_jumps }
    }

    /// American checkers: jumps are mandatory.
    #[inline]
    pub const fn standard() -> Self {
        Self { forced_jumps: true }
    }

    /// Jumps are optional.
    #[inline]
    pub const fn casual() -> Self {
        Self {
            forced_jumps: false,
        }
    }
}
