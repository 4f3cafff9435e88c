/// Returns a frequency count of the input data, one counter per byte value.
pub fn freqs(data: &[u8]) -> Vec<u32> {
    let mut freqs = vec![0_u32; 256];
    data.iter().for_each(|&el| freqs[el as usize] += 1);
    freqs
}

/// Adds the byte counts of `data` to a running table. Used when a file is read in chunks.
/// Returns None if any counter would overflow its 32 bits.
pub fn add_freqs(table: &mut [u32; 256], data: &[u8]) -> Option<()> {
    for (total, count) in table.iter_mut().zip(freqs(data)) {
        *total = total.checked_add(count)?;
    }
    Some(())
}
