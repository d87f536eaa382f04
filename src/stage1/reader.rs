/*!
Fixed-size block reading.

The classifier and scanner only ever see exactly [`STEP_SIZE`] bytes at a
time. The final partial block is copied into a space-padded scratch buffer,
so none of the downstream bit tricks need a bounds check and the caller's
buffer needs no trailing slack (and is never written to).
*/

/// The number of bytes processed per block.
pub(crate) const STEP_SIZE: usize = 64;

pub(crate) struct BlockReader<'a> {
    input: &'a [u8],
    idx: usize,
}

impl<'a> BlockReader<'a> {
    #[inline]
    pub(crate) fn new(input: &'a [u8]) -> Self {
        BlockReader { input, idx: 0 }
    }

    #[inline]
    pub(crate) fn has_full_block(&self) -> bool {
        self.idx + STEP_SIZE <= self.input.len()
    }

    /**
    The current full block.

    Callers must check [`has_full_block`](Self::has_full_block) first.
    */
    #[inline]
    pub(crate) fn full_block(&self) -> &'a [u8; STEP_SIZE] {
        test_assert!(self.has_full_block());

        // SAFETY: `has_full_block` guarantees `STEP_SIZE` bytes from `idx`
        unsafe { &*(self.input.as_ptr().add(self.idx) as *const [u8; STEP_SIZE]) }
    }

    /**
    Copy the trailing partial block into `scratch`, padded with ASCII spaces.

    Returns the number of real bytes copied, which may be zero when the input
    length is an exact multiple of [`STEP_SIZE`].
    */
    #[inline]
    pub(crate) fn remainder(&self, scratch: &mut [u8; STEP_SIZE]) -> usize {
        test_assert!(!self.has_full_block());

        *scratch = [b' '; STEP_SIZE];

        let rest = &self.input[self.idx.min(self.input.len())..];
        scratch[..rest.len()].copy_from_slice(rest);

        rest.len()
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.idx += STEP_SIZE;
    }

    /// The byte offset of the current block within the input.
    #[inline]
    pub(crate) fn block_index(&self) -> usize {
        self.idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_is_space_padded() {
        let input = b"{\"a\":1}";
        let reader = BlockReader::new(input);

        assert!(!reader.has_full_block());

        let mut scratch = [0u8; STEP_SIZE];
        assert_eq!(input.len(), reader.remainder(&mut scratch));
        assert_eq!(&scratch[..input.len()], input);
        assert!(scratch[input.len()..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn exact_multiple_has_no_remainder() {
        let input = [b'x'; STEP_SIZE * 2];
        let mut reader = BlockReader::new(&input);

        assert!(reader.has_full_block());
        reader.advance();
        assert!(reader.has_full_block());
        assert_eq!(STEP_SIZE, reader.block_index());
        reader.advance();
        assert!(!reader.has_full_block());

        let mut scratch = [0u8; STEP_SIZE];
        assert_eq!(0, reader.remainder(&mut scratch));
    }
}
