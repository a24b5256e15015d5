use tinyvec::ArrayVec;

use crate::config::FRAME_CAPACITY;

pub mod assembler;
pub mod coord;
pub mod parser;

pub use assembler::FrameAssembler;
pub use coord::CoordError;
pub use parser::{FixStatus, ParseError, ParsedFields};

/// One completed sentence, `$` through the terminating `\n`, possibly
/// truncated at [`FRAME_CAPACITY`] bytes.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct RawSentence(pub ArrayVec<[u8; FRAME_CAPACITY]>);

impl RawSentence {
    /// Copies at most [`FRAME_CAPACITY`] bytes out of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut s = Self::default();
        for &b in bytes.iter().take(FRAME_CAPACITY) {
            s.0.push(b);
        }
        s
    }

    /// Whether the sentence was cut short by the frame capacity.
    pub fn is_full(&self) -> bool {
        self.0.len() == FRAME_CAPACITY
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawSentence {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=[u8]:a}", self.0.as_slice())
    }
}

impl core::ops::Deref for RawSentence {
    type Target = ArrayVec<[u8; FRAME_CAPACITY]>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::ops::DerefMut for RawSentence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Bounded copy of one sentence field; longer input is cut to `N` bytes.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldText<const N: usize>(pub ArrayVec<[u8; N]>);

impl<const N: usize> FieldText<N> {
    pub fn set(&mut self, value: &[u8]) {
        self.0.clear();
        for &b in value.iter().take(N) {
            self.0.push(b);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn first_char(&self) -> Option<char> {
        self.0.first().map(|&b| char::from(b))
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for FieldText<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=[u8]:a}", self.0.as_slice())
    }
}
