//! This helper is part of the huffman encoding system.
//!
//! It builds the huffman tree from a table of symbol weights (byte frequencies) and derives the code of
//! every symbol from it. Compression and decompression both call `HuffmanTree::from_weights` with the same
//! table, so they always get exactly the same tree.
//!
//! Nodes live in one arena vec and point at their children by index. The tree is never changed once built.
//!

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NodeData {
    /// Arena indices of the left (bit 0) and right (bit 1) children.
    Kids(usize, usize),
    Leaf(u8),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Node {
    pub weight: u64,
    pub node_data: NodeData,
}

/// A huffman code: `len` bits packed LSB first into `bits`, ready for `BitWriter::write_bits`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    pub bits: Vec<u8>,
    pub len: usize,
}

impl Code {
    fn from_path(path: &[bool]) -> Self {
        let mut bits = vec![0_u8; (path.len() + 7) / 8];
        for (i, _) in path.iter().enumerate().filter(|(_, &b)| b) {
            bits[i / 8] |= 1 << (i % 8);
        }
        Code {
            bits,
            len: path.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build the tree for every symbol with a non-zero weight. Returns None if there are none.
    ///
    /// The two lightest nodes are merged until one remains; the first popped becomes the left child.
    /// Equal weights are taken in the order the nodes were pushed, leaves in ascending symbol order first.
    pub fn from_weights(weights: &[u32]) -> Option<HuffmanTree> {
        let mut nodes: Vec<Node> = Vec::with_capacity(511);
        // (weight, arrival order) with the arena index riding along
        let mut queue = BinaryHeap::new();

        for (sym, &w) in weights.iter().enumerate().take(256).filter(|(_, &w)| w > 0) {
            queue.push(Reverse((w as u64, nodes.len(), nodes.len())));
            nodes.push(Node {
                weight: w as u64,
                node_data: NodeData::Leaf(sym as u8),
            });
        }

        let mut arrival = nodes.len();
        while queue.len() > 1 {
            let (Some(Reverse((lw, _, left))), Some(Reverse((rw, _, right)))) =
                (queue.pop(), queue.pop())
            else {
                break;
            };
            nodes.push(Node {
                weight: lw + rw,
                node_data: NodeData::Kids(left, right),
            });
            queue.push(Reverse((lw + rw, arrival, nodes.len() - 1)));
            arrival += 1;
        }

        let Reverse((_, _, root)) = queue.pop()?;
        Some(HuffmanTree { nodes, root })
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// The symbol stored at `idx`, or None for an inner node.
    pub fn leaf(&self, idx: usize) -> Option<u8> {
        match self.nodes[idx].node_data {
            NodeData::Leaf(sym) => Some(sym),
            NodeData::Kids(..) => None,
        }
    }

    /// Follow one bit down from the inner node `idx`: 0 goes left, 1 goes right.
    pub fn step(&self, idx: usize, bit: bool) -> usize {
        match self.nodes[idx].node_data {
            NodeData::Kids(left, right) => {
                if bit {
                    right
                } else {
                    left
                }
            }
            NodeData::Leaf(_) => idx,
        }
    }

    /// Code table for all 256 byte values. Symbols not in the tree get an empty code.
    /// A tree with a single leaf gives that leaf an empty code as well.
    pub fn codes(&self) -> Vec<Code> {
        let mut codes = vec![Code::default(); 256];
        let mut path = Vec::new();
        self.return_leaves(self.root, &mut path, &mut codes);
        codes
    }

    /// Recursively walk the tree, recording the path to each leaf as its code.
    fn return_leaves(&self, idx: usize, path: &mut Vec<bool>, codes: &mut [Code]) {
        match self.nodes[idx].node_data {
            NodeData::Kids(left, right) => {
                path.push(false);
                self.return_leaves(left, path, codes);
                path.pop();
                path.push(true);
                self.return_leaves(right, path, codes);
                path.pop();
            }
            NodeData::Leaf(sym) => {
                codes[sym as usize] = Code::from_path(path);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn weights(pairs: &[(u8, u32)]) -> Vec<u32> {
        let mut w = vec![0_u32; 256];
        for &(s, f) in pairs {
            w[s as usize] = f;
        }
        w
    }

    fn bit_string(code: &Code) -> String {
        (0..code.len)
            .map(|i| if code.bits[i / 8] >> (i % 8) & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    #[test]
    fn classic_tree_shape() {
        // a:5 b:2 c:1 d:1 -> c+d (2), b+cd (4), a+bcd (9)
        let tree = HuffmanTree::from_weights(&weights(&[(b'a', 5), (b'b', 2), (b'c', 1), (b'd', 1)]))
            .unwrap();
        let codes = tree.codes();
        assert_eq!(tree.node(tree.root()).weight, 9);
        assert_eq!(bit_string(&codes[b'a' as usize]), "1");
        assert_eq!(bit_string(&codes[b'b' as usize]), "00");
        assert_eq!(bit_string(&codes[b'c' as usize]), "010");
        assert_eq!(bit_string(&codes[b'd' as usize]), "011");
        assert_eq!(codes[b'z' as usize].len, 0);
    }

    #[test]
    fn ties_follow_arrival_order() {
        let tree = HuffmanTree::from_weights(&weights(&[(1, 1), (2, 1), (3, 1), (4, 1)])).unwrap();
        let codes = tree.codes();
        assert_eq!(bit_string(&codes[1]), "00");
        assert_eq!(bit_string(&codes[2]), "01");
        assert_eq!(bit_string(&codes[3]), "10");
        assert_eq!(bit_string(&codes[4]), "11");
    }

    #[test]
    fn codes_are_prefix_free() {
        let w: Vec<u32> = (0..256).map(|i| (i * 7 % 31) as u32).collect();
        let tree = HuffmanTree::from_weights(&w).unwrap();
        let codes: Vec<String> = tree
            .codes()
            .iter()
            .filter(|c| c.len > 0)
            .map(bit_string)
            .collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                assert!(i == j || !b.starts_with(a.as_str()), "{} prefixes {}", a, b);
            }
        }
    }

    #[test]
    fn walking_reaches_the_symbol() {
        let tree = HuffmanTree::from_weights(&weights(&[(b'x', 3), (b'y', 1), (b'z', 1)])).unwrap();
        for (sym, code) in tree.codes().iter().enumerate().filter(|(_, c)| c.len > 0) {
            let mut idx = tree.root();
            for i in 0..code.len {
                idx = tree.step(idx, code.bits[i / 8] >> (i % 8) & 1 == 1);
            }
            assert_eq!(tree.leaf(idx), Some(sym as u8));
        }
    }

    #[test]
    fn single_and_empty_alphabets() {
        assert!(HuffmanTree::from_weights(&[0; 256]).is_none());
        let tree = HuffmanTree::from_weights(&weights(&[(9, 42)])).unwrap();
        assert_eq!(tree.leaf(tree.root()), Some(9));
        assert_eq!(tree.codes()[9].len, 0);
    }
}
