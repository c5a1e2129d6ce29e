pub mod crypto;
pub mod hash;

/// Removes `std::mem::size_of<T>()` bytes from the front of `bytes` and returns it as a `T`.
///
/// Returns `None` and leaves `bytes` unchanged if it isn't long enough.
pub fn read_from_bytes<T: zerocopy::FromBytes>(bytes: &mut &[u8]) -> Option<T> {
    let front = T::read_from_prefix(bytes)?;
    *bytes = &bytes[std::mem::size_of::<T>()..];
    Some(front)
}

/// Removes a slice of `N` from the front of `bytes` and copies
/// it into an owned `[u8; N]`
///
/// Returns `None` and leaves `bytes` unchanged if it isn't long enough.
pub fn read_array<const N: usize>(bytes: &mut &[u8]) -> Option<[u8; N]> {
    let front = read_bytes(bytes, N)?;
    let mut res = [0u8; N];
    res.copy_from_slice(front);
    Some(res)
}

/// Removes a slice of `size` from the front of `bytes` and returns it
///
/// Returns `None` and leaves `bytes` unchanged if it isn't long enough.
pub fn read_bytes<'a>(bytes: &mut &'a [u8], size: usize) -> Option<&'a [u8]> {
    if bytes.len() < size {
        return None;
    }
    let (front, rest) = bytes.split_at(size);
    *bytes = rest;
    Some(front)
}

/// Copies as much of `src` as fits into `dst`, leaving the remainder of `dst` untouched.
pub fn copy_prefix(dst: &mut [u8], src: &[u8]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

pub fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::little_endian;

    #[test]
    fn read_helpers_advance_the_cursor() {
        let data = [1u8, 0, 2, 3, 4, 5];
        let mut cursor = &data[..];

        let len = read_from_bytes::<little_endian::U16>(&mut cursor).unwrap();
        assert_eq!(len.get(), 1);
        assert_eq!(read_array::<2>(&mut cursor), Some([2, 3]));
        assert_eq!(read_bytes(&mut cursor, 2), Some(&[4u8, 5][..]));
        assert!(cursor.is_empty());
    }

    #[test]
    fn short_reads_leave_cursor_unchanged() {
        let data = [1u8, 2, 3];
        let mut cursor = &data[..];

        assert_eq!(read_array::<4>(&mut cursor), None);
        assert_eq!(read_bytes(&mut cursor, 5), None);
        assert!(read_from_bytes::<little_endian::U32>(&mut cursor).is_none());
        assert_eq!(cursor.len(), 3);
    }

    #[test]
    fn copy_prefix_truncates_and_pads() {
        let mut short = [0u8; 2];
        copy_prefix(&mut short, &[9, 8, 7]);
        assert_eq!(short, [9, 8]);

        let mut long = [0u8; 4];
        copy_prefix(&mut long, &[9]);
        assert_eq!(long, [9, 0, 0, 0]);
    }
}
