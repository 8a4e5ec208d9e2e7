pub mod file;
pub mod scanner;

pub use file::FitsFile;
pub use scanner::{find_hdus, verify, HduLocation};

use std::io::{self, Read};

pub const BLOCK_SIZE: u64 = 2880;

/// Bytes needed to pad `size` up to a whole number of blocks.
pub fn pad_length(size: u64) -> u64 {
    (BLOCK_SIZE - size % BLOCK_SIZE) % BLOCK_SIZE
}

/// Reads until `buf` is full or the stream is exhausted, returning the
/// number of bytes read. Unlike `read_exact`, a short read is not an error.
pub(crate) fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
