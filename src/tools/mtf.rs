use crate::error::TransformError;

/// The recency ordered list of all 256 byte values. Always a permutation of 0..=255.
#[derive(Debug, Clone)]
pub struct MtfIndex {
    index: [u8; 256],
}

impl MtfIndex {
    /// A fresh list holding 0..=255 in order.
    pub fn new() -> Self {
        let mut index = [0_u8; 256];
        for (i, slot) in index.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { index }
    }

    /// Current position of `byte` in the list.
    pub fn position(&self, byte: u8) -> u8 {
        // Every byte value is in the list, so the scan always finds it.
        self.index.iter().position(|&c| c == byte).unwrap_or(0) as u8
    }

    /// Byte currently sitting at `pos`.
    pub fn symbol(&self, pos: u8) -> u8 {
        self.index[pos as usize]
    }

    /// Move the byte at `pos` to the front, shifting the ones in front of it back by one.
    pub fn move_to_front(&mut self, pos: u8) {
        let idx = pos as usize;
        let temp_sym = self.index[idx];
        self.index.copy_within(0..idx, 1);
        self.index[0] = temp_sym;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.index
    }
}

impl Default for MtfIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode data using Move To Front transform. Each byte is replaced by its current position
/// in the recency list, then moved to the front.
pub fn mtf_encode(block: &[u8]) -> Result<Vec<u8>, TransformError> {
    if block.is_empty() {
        return Err(TransformError::EmptyInput);
    }
    let mut index = MtfIndex::new();
    Ok(block
        .iter()
        .map(|&byte| {
            let idx = index.position(byte);
            index.move_to_front(idx);
            idx
        })
        .collect())
}

/// Decode Move To Front data: look up the byte at each position, then apply the same update.
pub fn mtf_decode(block: &[u8]) -> Result<Vec<u8>, TransformError> {
    if block.is_empty() {
        return Err(TransformError::EmptyInput);
    }
    let mut index = MtfIndex::new();
    Ok(block
        .iter()
        .map(|&pos| {
            let byte = index.symbol(pos);
            index.move_to_front(pos);
            byte
        })
        .collect())
}
