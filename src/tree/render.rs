//! ASCII rendering of the node array.

use std::fmt::Write;

use crate::{
    node::{left_child_index, right_child_index},
    Hasher,
};

use super::StandardMerkleTree;

impl<H: Hasher> StandardMerkleTree<H> {
    /// Render the tree top-down, one node per line:
    ///
    /// ```text
    /// 0) 0x…
    /// ├─ 1) 0x…
    /// │  ├─ 3) 0x…
    /// │  └─ 4) 0x…
    /// └─ 2) 0x…
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        // (index, path) where each path bit says whether a later sibling follows
        let mut stack: Vec<(usize, Vec<bool>)> = vec![(0, Vec::new())];

        while let Some((i, path)) = stack.pop() {
            if !out.is_empty() {
                out.push('\n');
            }
            if let Some((last, parents)) = path.split_last() {
                for &more in parents {
                    out.push_str(if more { "│  " } else { "   " });
                }
                out.push_str(if *last { "├─ " } else { "└─ " });
            }
            // Writing to a String cannot fail
            let _ = write!(out, "{i}) {}", self.tree[i]);

            if right_child_index(i) < self.tree.len() {
                let mut right = path.clone();
                right.push(false);
                stack.push((right_child_index(i), right));

                let mut left = path;
                left.push(true);
                stack.push((left_child_index(i), left));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{LeafEncoding, LeafValue, Record, StandardMerkleTree};
    use alloy_primitives::Address;

    #[test]
    fn test_render_shape() {
        let values: Vec<Record> = (1..=3u8)
            .map(|i| vec![LeafValue::from(Address::repeat_byte(i))])
            .collect();
        let tree = StandardMerkleTree::of(values, LeafEncoding::address()).unwrap();
        let rendered = tree.render();
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("0) 0x"));
        assert!(lines[1].starts_with("├─ 1) 0x"));
        assert!(lines[2].starts_with("│  ├─ 3) 0x"));
        assert!(lines[3].starts_with("│  └─ 4) 0x"));
        assert!(lines[4].starts_with("└─ 2) 0x"));
    }

    #[test]
    fn test_render_single_leaf() {
        let tree = StandardMerkleTree::of(
            vec![vec![LeafValue::from(Address::ZERO)]],
            LeafEncoding::address(),
        )
        .unwrap();
        assert_eq!(tree.render(), format!("0) {}", tree.root()));
    }
}
