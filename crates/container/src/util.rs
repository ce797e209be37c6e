use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{ErrorKind as IoErrorKind, Read};

/// Read until `buf` is full or the stream ends, returning the number of bytes
/// read. Unlike [`Read::read_exact`], a short read is not an error; callers
/// decide whether "no bytes at all" means a clean end of input.
pub(crate) fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
        }
    }
    Ok(filled)
}

/// Fill `buf` completely, or fail with [`ErrorKind::Truncated`] naming `what`.
pub(crate) fn fill_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    if fill(reader, buf)? < buf.len() {
        exn::bail!(ErrorKind::Truncated(what));
    }
    Ok(())
}
