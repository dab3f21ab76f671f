//! Bounded stream copy

use super::error::{PupError, PupResult};
use std::io::{ErrorKind, Read, Write};

/// Size of the intermediate copy buffer (1 MiB)
pub const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Copy exactly `size` bytes from `input` to `output`
///
/// Fails with [`PupError::UnexpectedEof`] as soon as `input` runs dry; the bytes
/// copied up to that point have already been written.
pub fn copy_exact<R: Read + ?Sized, W: Write + ?Sized>(
    input: &mut R,
    output: &mut W,
    size: u64,
) -> PupResult<()> {
    let capacity = usize::try_from(size).map_or(COPY_BUFFER_SIZE, |s| s.min(COPY_BUFFER_SIZE));
    let mut buffer = vec![0u8; capacity];
    let mut left = size;

    while left > 0 {
        let chunk = usize::try_from(left).map_or(buffer.len(), |l| l.min(buffer.len()));
        let filled = fill(input, &mut buffer[..chunk])?;
        if filled != chunk {
            output.write_all(&buffer[..filled])?;
            return Err(PupError::UnexpectedEof {
                expected: size,
                copied: size - left + filled as u64,
            });
        }
        output.write_all(&buffer[..chunk])?;
        left -= chunk as u64;
    }

    Ok(())
}

/// Read into `buf` until it is full or the stream ends, returning bytes read
pub(crate) fn fill<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> PupResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Read exactly `size` bytes into a new buffer
pub(crate) fn read_exact_vec<R: Read + ?Sized>(input: &mut R, size: u64) -> PupResult<Vec<u8>> {
    let len = usize::try_from(size).map_err(|_| PupError::SizeOutOfRange(size))?;
    let mut data = vec![0u8; len];
    let filled = fill(input, &mut data)?;
    if filled != len {
        return Err(PupError::UnexpectedEof {
            expected: size,
            copied: filled as u64,
        });
    }
    Ok(data)
}
