//! Canonical k-subset enumeration and combinatorial counting.
//!
//! Subsets are produced in lexicographic order over the fixed `0..n` id
//! space, which is the canonical order the aggregator folds in. The checked
//! counting helpers feed the explosion guards: any enumeration is sized
//! before it starts.

/// Iterator over all k-subsets of `0..n` in lexicographic order.
///
/// # Examples
/// ```
/// use ctrlplace_core::Combinations;
///
/// let combos: Vec<_> = Combinations::new(4, 2).collect();
/// assert_eq!(
///     combos,
///     vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]],
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    next: Option<Vec<usize>>,
}

impl Combinations {
    /// Creates an enumerator over all k-subsets of `0..n`.
    ///
    /// Yields nothing when `k > n`; yields the single empty subset when
    /// `k == 0`.
    #[must_use]
    pub fn new(n: usize, k: usize) -> Self {
        let next = (k <= n).then(|| (0..k).collect());
        Self { n, next }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let k = current.len();

        // Find the rightmost member that can still advance.
        let mut successor = current.clone();
        let mut pivot = k;
        for index in (0..k).rev() {
            if successor[index] < self.n - k + index {
                pivot = index;
                break;
            }
        }
        if pivot < k {
            successor[pivot] += 1;
            for index in (pivot + 1)..k {
                successor[index] = successor[index - 1] + 1;
            }
            self.next = Some(successor);
        }

        Some(current)
    }
}

/// Checked binomial coefficient `C(n, k)`; `None` on overflow.
#[must_use]
pub fn binomial(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for index in 0..k {
        result = result.checked_mul((n - index) as u128)?;
        result /= (index as u128) + 1;
    }
    Some(result)
}

/// Checked count of all failure states up to depth `max_failures`:
/// `Σ_{f=0}^{max_failures} C(edge_count, f)`.
#[must_use]
pub(crate) fn failure_state_count(edge_count: usize, max_failures: usize) -> Option<u128> {
    let mut total: u128 = 0;
    for f in 0..=max_failures {
        total = total.checked_add(binomial(edge_count, f)?)?;
    }
    Some(total)
}
