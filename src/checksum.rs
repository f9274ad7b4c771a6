use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("count must be positive, was 0")]
    EmptyRange,

    #[error("range out of bounds: offset {offset} + count {count} > buffer length {len}")]
    RangeOutOfBounds {
        offset: usize,
        count: usize,
        len: usize,
    },
}

/// Mod-256 sum of `buf[offset..offset + count]`. Overflow wraps; the device
/// compares exactly this truncated sum.
pub fn checksum(buf: &[u8], offset: usize, count: usize) -> Result<u8, ChecksumError> {
    if count == 0 {
        return Err(ChecksumError::EmptyRange);
    }
    let end = offset
        .checked_add(count)
        .filter(|&end| end <= buf.len())
        .ok_or(ChecksumError::RangeOutOfBounds {
            offset,
            count,
            len: buf.len(),
        })?;

    Ok(buf[offset..end]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b)))
}
