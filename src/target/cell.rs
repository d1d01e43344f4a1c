use std::fmt::Display;
use std::ptr;

use super::parse::FALLBACK_VALUE;

#[repr(C, align(4))]
#[derive(Debug)]
struct Storage([u8; 4]);

/// Four bytes of heap storage read as one native-endian `u32`.
///
/// The bytes are boxed so their address never changes after construction, which is what a
/// memory scanner looks for. All access is volatile: the value may be rewritten from outside the
/// process at any time, and the compiler must not keep a stale copy around.
#[derive(Debug)]
pub struct Cell {
    bytes: Box<Storage>,
}

impl Cell {
    pub fn new(value: u32) -> Self {
        Cell {
            bytes: Box::new(Storage(value.to_ne_bytes())),
        }
    }

    pub fn get(&self) -> u32 {
        // SAFETY: `bytes` is a live, aligned, initialized allocation owned by `self`.
        let raw = unsafe { ptr::read_volatile(&raw const self.bytes.0) };
        u32::from_ne_bytes(raw)
    }

    pub fn set(&mut self, value: u32) {
        // SAFETY: `bytes` is a live, aligned allocation and we hold the only reference.
        unsafe { ptr::write_volatile(&raw mut self.bytes.0, value.to_ne_bytes()) };
    }

    /// Writes a parse result; `None` stores the fallback value.
    pub fn store(&mut self, parsed: Option<u32>) {
        self.set(parsed.unwrap_or(FALLBACK_VALUE));
    }

    pub fn address(&self) -> usize {
        self.bytes.0.as_ptr() as usize
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut cell = Cell::new(31337);
        assert_eq!(cell.get(), 31337);
        cell.set(u32::MAX);
        assert_eq!(cell.get(), u32::MAX);
        assert_eq!(cell.to_string(), "4294967295");
    }

    #[test]
    fn test_store_fallback() {
        let mut cell = Cell::new(5);
        cell.store(None);
        assert_eq!(cell.get(), 0);
        cell.store(Some(12));
        assert_eq!(cell.get(), 12);
    }

    #[test]
    fn test_address_is_stable() {
        let mut cell = Cell::new(1);
        let before = cell.address();
        cell.set(2);
        let moved = cell;
        assert_eq!(moved.address(), before);
        assert_eq!(before % 4, 0);
    }

    #[test]
    fn test_native_endian_bytes() {
        let cell = Cell::new(0x0102_0304);
        // SAFETY: the address points at the cell's live four-byte storage
        let bytes = unsafe { ptr::read_volatile(cell.address() as *const [u8; 4]) };
        assert_eq!(bytes, 0x0102_0304_u32.to_ne_bytes());
    }
}
