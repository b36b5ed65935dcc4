#![forbid(unsafe_code)]

//! Fenwick tree (binary indexed tree) over integer values.
//!
//! Backs [`VariableHeightsFenwick`](crate::height::VariableHeightsFenwick):
//! item heights go in as fixed-point units, prefix sums (item offsets) and
//! offset-to-index lookups come out in O(log n). Integer sums are exact, so
//! the order in which the tree adds partial sums never changes a result.
//!
//! # Invariants
//!
//! 1. `values[i]` is the value stored at index `i`.
//! 2. `tree[k]` (1-based) holds the sum of `values[k - lowbit(k) .. k]`.
//! 3. Values are unsigned, so prefix sums are non-decreasing and
//!    [`FenwickTree::find_prefix`] can descend the tree.
//! 4. Callers keep the sum of all values below `u64::MAX`. Updates use
//!    wrapping arithmetic, which is exact under that bound.

/// Binary indexed tree with point update and prefix query.
#[derive(Debug, Clone, Default)]
pub struct FenwickTree {
    /// 1-based partial sums; `tree[0]` is unused.
    tree: Vec<u64>,
    /// Plain copy of the values for O(1) point reads and rebuilds.
    values: Vec<u64>,
}

#[inline]
fn lowbit(k: usize) -> usize {
    k & k.wrapping_neg()
}

impl FenwickTree {
    /// Tree of `len` zeros.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            tree: vec![0; len + 1],
            values: vec![0; len],
        }
    }

    /// Build from values in O(n).
    #[must_use]
    pub fn from_values(values: &[u64]) -> Self {
        let mut this = Self {
            tree: Vec::new(),
            values: values.to_vec(),
        };
        this.rebuild_tree();
        this
    }

    fn rebuild_tree(&mut self) {
        let n = self.values.len();
        self.tree.clear();
        self.tree.resize(n + 1, 0);
        for (i, &v) in self.values.iter().enumerate() {
            self.tree[i + 1] = v;
        }
        for k in 1..=n {
            let parent = k + lowbit(k);
            if parent <= n {
                self.tree[parent] = self.tree[parent].wrapping_add(self.tree[k]);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `idx`, or `0` past the end.
    #[must_use]
    pub fn get(&self, idx: usize) -> u64 {
        self.values.get(idx).copied().unwrap_or(0)
    }

    /// Replace the value at `idx`. Out-of-range indices are ignored.
    pub fn set(&mut self, idx: usize, value: u64) {
        let Some(&old) = self.values.get(idx) else {
            return;
        };
        let delta = value.wrapping_sub(old);
        self.values[idx] = value;
        let n = self.values.len();
        let mut k = idx + 1;
        while k <= n {
            self.tree[k] = self.tree[k].wrapping_add(delta);
            k += lowbit(k);
        }
    }

    /// Sum of `values[0..=idx]`. Clamps `idx` to the last index.
    #[must_use]
    pub fn prefix(&self, idx: usize) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let mut k = idx.min(self.values.len() - 1) + 1;
        let mut sum = 0u64;
        while k > 0 {
            sum = sum.wrapping_add(self.tree[k]);
            k -= lowbit(k);
        }
        sum
    }

    /// Sum of all values.
    #[must_use]
    pub fn total(&self) -> u64 {
        match self.values.len() {
            0 => 0,
            n => self.prefix(n - 1),
        }
    }

    /// Largest `i` with `prefix(i) <= target`, or `None` if `prefix(0) > target`.
    #[must_use]
    pub fn find_prefix(&self, target: u64) -> Option<usize> {
        let n = self.values.len();
        if n == 0 {
            return None;
        }
        let mut pos = 0usize;
        let mut remaining = target;
        let mut step = 1usize << (usize::BITS - 1 - n.leading_zeros());
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        // `pos` counts the values whose running sum stays within `target`.
        pos.checked_sub(1)
    }

    /// Grow or shrink to `new_len`; new slots hold `fill`. O(n).
    pub fn resize(&mut self, new_len: usize, fill: u64) {
        if new_len == self.values.len() {
            return;
        }
        self.values.resize(new_len, fill);
        self.rebuild_tree();
    }
}
