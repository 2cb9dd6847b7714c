//! Fixed-width big-endian integer access over byte slices.
//!
//! The codec bounds-checks every field before touching it, so these accessors
//! keep the plain slice-indexing contract: out-of-range offsets panic exactly
//! like `buf[offset]` would.

/// Big-endian reads at a byte offset.
pub trait OctetsExt {
    /// Reads a `u16` from `offset..offset + 2`.
    fn get_u16_be(&self, offset: usize) -> u16;

    /// Reads 3 octets from `offset..offset + 3`, zero-extended to a `u32`.
    fn get_u24_be(&self, offset: usize) -> u32;

    /// Reads a `u32` from `offset..offset + 4`.
    fn get_u32_be(&self, offset: usize) -> u32;

    /// Reads a `u64` from `offset..offset + 8`.
    fn get_u64_be(&self, offset: usize) -> u64;
}

/// Big-endian writes at a byte offset.
pub trait OctetsMutExt {
    /// Writes `value` into `offset..offset + 2`.
    fn put_u16_be(&mut self, value: u16, offset: usize);

    /// Writes the low `width` octets of `value`, most significant first,
    /// into `offset..offset + width`. `width` must be at most 8.
    fn put_uint_be(&mut self, value: u64, width: usize, offset: usize);
}

impl OctetsExt for [u8] {
    fn get_u16_be(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self[offset], self[offset + 1]])
    }

    fn get_u24_be(&self, offset: usize) -> u32 {
        u32::from_be_bytes([0, self[offset], self[offset + 1], self[offset + 2]])
    }

    fn get_u32_be(&self, offset: usize) -> u32 {
        u32::from_be_bytes([
            self[offset],
            self[offset + 1],
            self[offset + 2],
            self[offset + 3],
        ])
    }

    fn get_u64_be(&self, offset: usize) -> u64 {
        let mut octets = [0u8; 8];
        octets.copy_from_slice(&self[offset..offset + 8]);
        u64::from_be_bytes(octets)
    }
}

impl OctetsMutExt for [u8] {
    fn put_u16_be(&mut self, value: u16, offset: usize) {
        self[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    fn put_uint_be(&mut self, value: u64, width: usize, offset: usize) {
        let octets = value.to_be_bytes();
        self[offset..offset + width].copy_from_slice(&octets[octets.len() - width..]);
    }
}
