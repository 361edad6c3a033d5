use std::sync::atomic::{AtomicUsize, Ordering};

/// Remembers the offset of the last mirror that answered successfully.
///
/// A mirror that succeeded once is likely to succeed again, so cascades
/// start from it and wrap through the rest of the list. Process-local;
/// resets to 0 on start. Atomic so concurrent fetches cannot lose an
/// update.
#[derive(Debug, Default)]
pub struct RotationCursor {
    cursor: AtomicUsize,
}

impl RotationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next cascade should start at.
    pub fn start_offset(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Pin the cursor to the offset that just produced a success.
    pub fn record_success(&self, offset: usize) {
        self.cursor.store(offset, Ordering::Relaxed);
    }

    /// Offsets for one full pass over a list of `len` mirrors, starting
    /// at the cursor and wrapping around once.
    pub fn offsets(&self, len: usize) -> impl Iterator<Item = usize> {
        let start = self.start_offset();
        (0..len).map(move |i| (start + i) % len)
    }
}
