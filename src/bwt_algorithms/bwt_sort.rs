use log::trace;

use crate::error::TransformError;
use crate::tools::freq_count::freqs;

/// Burrows-Wheeler-Transform of one block. Returns the key (primary index) and the BWT data.
///
/// Rotations are ranked by prefix doubling: rank by the first byte, then repeatedly sort by
/// (rank of i, rank of i+k) for k = 1, 2, 4, ... and renumber, stopping once every rank is distinct.
/// This is O(N log²N), so callers must keep blocks bounded (the splitting layer uses 256k).
pub fn bwt_encode(block: &[u8]) -> Result<(u32, Vec<u8>), TransformError> {
    if block.is_empty() {
        return Err(TransformError::EmptyInput);
    }
    // A single byte has only one rotation.
    if block.len() == 1 {
        return Ok((0, block.to_vec()));
    }

    let n = block.len();
    let mut index = (0..n).collect::<Vec<usize>>();
    let mut rank = block.iter().map(|&b| b as u32).collect::<Vec<u32>>();
    let mut next_rank = vec![0_u32; n];

    let mut k = 1;
    while k < n {
        {
            let rank = &rank;
            let key = |i: usize| (rank[i], rank[(i + k) % n], i);
            index.sort_unstable_by_key(|&i| key(i));
        }

        // Renumber: equal (rank, rank+k) pairs share a rank.
        next_rank[index[0]] = 0;
        for w in 1..n {
            let (a, b) = (index[w - 1], index[w]);
            let same = rank[a] == rank[b] && rank[(a + k) % n] == rank[(b + k) % n];
            next_rank[b] = next_rank[a] + if same { 0 } else { 1 };
        }
        std::mem::swap(&mut rank, &mut next_rank);
        trace!("BWT doubling step k={} done", k);

        if rank[index[n - 1]] as usize == n - 1 {
            break;
        }
        k *= 2;
    }

    // Get key and BWT output. The output byte is the one just before each sorted rotation.
    let mut key = 0_u32;
    let mut bwt = vec![0; n];
    for (i, &start) in index.iter().enumerate() {
        if start == 0 {
            key = i as u32;
            bwt[i] = block[n - 1];
        } else {
            bwt[i] = block[start - 1];
        }
    }
    Ok((key, bwt))
}

/// Decode a Burrows-Wheeler-Transform given the key written by `bwt_encode`.
pub fn bwt_decode(key: u32, bwt_in: &[u8]) -> Result<Vec<u8>, TransformError> {
    if bwt_in.is_empty() {
        return Err(TransformError::EmptyInput);
    }
    let end = bwt_in.len();
    if key as usize >= end {
        return Err(TransformError::InvalidIndex);
    }

    // Convert frequency count to a cumulative sum of frequencies
    let freq_in = freqs(bwt_in);
    let mut starts = [0_u32; 256];
    for i in 0..255 {
        starts[i + 1] = starts[i] + freq_in[i];
    }

    // Build the transformation vector to find the next character in the original data
    let mut t_vec = vec![0_u32; end];
    for (i, &s) in bwt_in.iter().enumerate() {
        t_vec[starts[s as usize] as usize] = i as u32;
        starts[s as usize] += 1;
    }

    // Follow the chain from the key, one byte per step.
    let mut out = vec![0_u8; end];
    let mut curr = key as usize;
    for byte in out.iter_mut() {
        curr = t_vec[curr] as usize;
        *byte = bwt_in[curr];
    }
    Ok(out)
}
