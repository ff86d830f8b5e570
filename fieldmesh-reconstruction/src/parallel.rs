//! Parallel helpers for the reconstruction stages
//!
//! Parallelism here never changes observable output: it is applied only to
//! pure per-element maps (cube classification, vertex transforms), and the
//! resulting order always matches the sequential one. Small inputs skip
//! rayon entirely.

use rayon::prelude::*;

/// Below this many elements a plain sequential map wins.
const PARALLEL_THRESHOLD: usize = 4096;

/// Order-preserving map, parallel for large inputs.
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if data.len() < PARALLEL_THRESHOLD {
        data.iter().map(f).collect()
    } else {
        data.par_iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_input_matches_sequential() {
        let data = vec![1, 2, 3, 4, 5];
        assert_eq!(parallel_map(&data, |x| x * 2), vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_large_input_preserves_order() {
        let data: Vec<usize> = (0..10_000).collect();
        let doubled = parallel_map(&data, |x| x * 2);
        let reference: Vec<usize> = data.iter().map(|x| x * 2).collect();
        assert_eq!(doubled, reference);
    }
}
