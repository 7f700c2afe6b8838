
//! Specialized binary input and output.
//! The chunk reader and writer only ever need whole byte runs,
//! so sources and destinations are simpler than `Read` and `Write`.

pub use ::std::io::{Read, Write};
use lebe::prelude::*;


/// Something that the chunk reader can take bytes from.
pub trait Source {

    /// Take exactly `count` bytes.
    /// Returns `None` if fewer than `count` bytes are available.
    /// The reader always treats `None` as a truncated file.
    fn read(&mut self, count: usize) -> Option<Vec<u8>>;
}

/// Something that the chunk writer can put bytes into.
pub trait Destination {

    /// Accept all of the bytes. Returns `None` if that was not possible.
    fn write(&mut self, bytes: &[u8]) -> Option<()>;
}

impl<R: Read> Source for R {
    fn read(&mut self, count: usize) -> Option<Vec<u8>> {
        // do not trust the count for the allocation, the stream may be much shorter
        let mut bytes = Vec::with_capacity(count.min(1024 * 64));
        let read_count = self.by_ref().take(count as u64).read_to_end(&mut bytes).ok()?;

        if read_count == count { Some(bytes) }
        else { None }
    }
}

impl<W: Write> Destination for W {
    fn write(&mut self, bytes: &[u8]) -> Option<()> {
        self.write_all(bytes).ok()
    }
}


/// Keep track of what byte we are at.
/// Used to report how much of the file was consumed or produced.
#[derive(Debug)]
pub struct Tracking<T> {

    /// Do not expose to prevent reading without updating position.
    inner: T,

    position: usize,
}

impl<T> Tracking<T> {

    /// Start counting at zero.
    pub fn new(inner: T) -> Self {
        Tracking { inner, position: 0 }
    }

    /// Current number of bytes written or read.
    pub fn byte_position(&self) -> usize {
        self.position
    }

    /// Stop counting and return the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Source> Tracking<T> {
    pub(crate) fn read(&mut self, count: usize) -> Option<Vec<u8>> {
        let bytes = self.inner.read(count)?;
        self.position += count;
        Some(bytes)
    }
}

impl<T: Destination> Tracking<T> {
    pub(crate) fn write(&mut self, bytes: &[u8]) -> Option<()> {
        self.inner.write(bytes)?;
        self.position += bytes.len();
        Some(())
    }
}


/// Take a big-endian `u32` from the front of the bytes.
/// Returns `None` if fewer than four bytes are left.
#[inline]
pub(crate) fn take_u32(bytes: &mut &[u8]) -> Option<u32> {
    u32::read_from_big_endian(bytes).ok()
}

/// Append a big-endian `u32`.
#[inline]
pub(crate) fn put_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.write_as_big_endian(&value).expect("writing to a vec failed");
}


/// A byte buffer that the compression engines write into directly.
///
/// Only the committed bytes are visible. The storage behind them is zeroed once
/// when it first grows and then reused, as this crate does not use unsafe code,
/// so repeated pulls never initialize the same bytes twice.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    storage: Vec<u8>,
    committed: usize,
}

impl OutputBuffer {

    /// An empty buffer without any storage.
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    /// The committed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[.. self.committed]
    }

    /// Number of committed bytes.
    pub fn len(&self) -> usize {
        self.committed
    }

    /// Whether no bytes are committed.
    pub fn is_empty(&self) -> bool {
        self.committed == 0
    }

    /// Forget the committed bytes, but keep the storage for the next fill.
    pub fn clear(&mut self) {
        self.committed = 0;
    }

    /// Return exactly the committed bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.storage.truncate(self.committed);
        self.storage
    }

    /// Number of bytes that were initialized so far, committed or not.
    pub(crate) fn initialized(&self) -> usize {
        self.storage.len()
    }

    /// Let `fill` write into the storage between the committed bytes and `capacity`.
    /// `fill` returns how many of the offered bytes it produced, and only those are committed.
    /// The storage is only extended where it is shorter than `capacity`.
    pub(crate) fn fill_spare<T>(&mut self, capacity: usize, fill: impl FnOnce(&mut [u8]) -> (usize, T)) -> T {
        if capacity <= self.committed {
            return fill(&mut []).1;
        }

        if self.storage.len() < capacity {
            self.storage.resize(capacity, 0);
        }

        let (produced, result) = fill(&mut self.storage[self.committed .. capacity]);

        debug_assert!(produced <= capacity - self.committed, "fill reported more bytes than offered");
        self.committed += produced;
        result
    }
}

impl AsRef<[u8]> for OutputBuffer {
    fn as_ref(&self) -> &[u8] { self.as_slice() }
}

impl PartialEq for OutputBuffer {
    fn eq(&self, other: &Self) -> bool { self.as_slice() == other.as_slice() }
}

impl Eq for OutputBuffer {}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("OutputBuffer")
            .field("committed", &self.committed)
            .field("initialized", &self.storage.len())
            .finish()
    }
}
