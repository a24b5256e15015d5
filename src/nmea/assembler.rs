use super::RawSentence;
use crate::config::FRAME_CAPACITY;

// Offsets of the last two identifier characters in `$ttRMC`
const ID_M_OFFSET: usize = 4;
const ID_C_OFFSET: usize = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssemblerState {
    /// Waiting for a `$`
    Idle,
    /// Bytes of a started sentence are being appended
    Accumulating,
}
use AssemblerState::*;

/// Rebuilds RMC sentences out of a byte stream, one byte at a time.
///
/// Every call to [`FrameAssembler::push`] is O(1) apart from the final copy
/// out of a completed sentence, and never blocks, so it can run directly in
/// a receive interrupt.
pub struct FrameAssembler {
    state: AssemblerState,
    buf: [u8; FRAME_CAPACITY],
    len: usize,
    overflowed: bool,
    completed: usize,
    truncated: usize,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub const fn new() -> Self {
        Self {
            state: Idle,
            buf: [0; FRAME_CAPACITY],
            len: 0,
            overflowed: false,
            completed: 0,
            truncated: 0,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Write index into the working buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sentences handed out so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Frames that hit the capacity before their terminator.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Feeds one byte; returns the sentence it completes, if any.
    pub fn push(&mut self, b: u8) -> Option<RawSentence> {
        if b == b'$' {
            // A new start always wins over whatever was in progress
            self.len = 0;
            self.overflowed = false;
            self.state = Accumulating;
        }

        if self.state == Idle {
            return None;
        }

        if self.len < FRAME_CAPACITY {
            self.buf[self.len] = b;
            self.len += 1;
        } else if !self.overflowed {
            // Index stays clamped at capacity; the rest of the frame is dropped
            self.overflowed = true;
            self.truncated += 1;
            trace!("frame exceeded {} bytes, truncating", FRAME_CAPACITY);
        }

        if b == b'\n' && self.is_rmc() {
            let sentence = RawSentence::from_bytes(&self.buf[..self.len]);
            self.buf = [0; FRAME_CAPACITY];
            self.len = 0;
            self.overflowed = false;
            self.state = Idle;
            self.completed += 1;
            trace!("sentence complete, {} bytes", sentence.len());
            Some(sentence)
        } else {
            None
        }
    }

    /// Feeds a run of bytes, returning the last sentence completed by them.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Option<RawSentence> {
        bytes.iter().fold(None, |last, &b| self.push(b).or(last))
    }

    fn is_rmc(&self) -> bool {
        self.len > ID_C_OFFSET
            && self.buf[0] == b'$'
            && self.buf[ID_M_OFFSET] == b'M'
            && self.buf[ID_C_OFFSET] == b'C'
    }
}

#[cfg(test)]
mod tests;
