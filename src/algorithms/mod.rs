//! Hand-written sort and search routines plus a timing harness.
//!
//! The point of this module is the comparison against the standard library,
//! not raw speed: [`merge_sort_by`] is checked against `slice::sort_by` and
//! [`binary_search_by`] against `slice::binary_search_by`, and the harness
//! times both sides over the same data so the report can show the gap.
//!
//! Complexity: merge sort is O(n log n) time / O(n) space, binary search
//! O(log n), linear search O(n).

use std::cmp::Ordering;
use std::hint::black_box;
use std::time::Instant;

use serde::Serialize;

/// Lookups per timed search run; a single lookup is too fast to measure.
const SEARCH_CALLS: usize = 1_000;

// =============================================================================
// Sorting
// =============================================================================

/// Stable top-down merge sort.
///
/// Returns a sorted copy of `items` in non-decreasing order under `cmp`.
/// Elements that compare equal keep their input order, so the output is
/// identical to `slice::sort_by` (which is also stable) for any input.
pub fn merge_sort_by<T, F>(items: &[T], cmp: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    fn sort<T, F>(items: &[T], cmp: &F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T, &T) -> Ordering,
    {
        if items.len() <= 1 {
            return items.to_vec();
        }
        let mid = items.len() / 2;
        let left = sort(&items[..mid], cmp);
        let right = sort(&items[mid..], cmp);
        merge(left, right, cmp)
    }

    fn merge<T, F>(left: Vec<T>, right: Vec<T>, cmp: &F) -> Vec<T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();

        while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
            // Ties take from the left run, which is what keeps the sort stable.
            let next = if cmp(l, r) != Ordering::Greater {
                left.next()
            } else {
                right.next()
            };
            merged.extend(next);
        }
        merged.extend(left);
        merged.extend(right);
        merged
    }

    sort(items, &cmp)
}

/// Stable merge sort of an `Ord` slice.
pub fn merge_sort<T: Clone + Ord>(items: &[T]) -> Vec<T> {
    merge_sort_by(items, T::cmp)
}

// =============================================================================
// Searching
// =============================================================================

/// Binary search returning the index of the **leftmost** match.
///
/// `probe` compares an element against the target (`Less` means the element
/// sorts before the target).
///
/// # Precondition
///
/// The slice must be sorted under the ordering `probe` encodes. This is not
/// checked; on unsorted input the result is unspecified.
pub fn binary_search_by<T, F>(sorted: &[T], probe: F) -> Option<usize>
where
    F: Fn(&T) -> Ordering,
{
    let mut lo = 0;
    let mut hi = sorted.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if probe(&sorted[mid]) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    if lo < sorted.len() && probe(&sorted[lo]) == Ordering::Equal {
        Some(lo)
    } else {
        None
    }
}

/// Binary search for `target` in a sorted `Ord` slice (leftmost match).
pub fn binary_search<T: Ord>(sorted: &[T], target: &T) -> Option<usize> {
    binary_search_by(sorted, |element| element.cmp(target))
}

/// Linear scan returning the index of the first element matching the
/// predicate. O(n), no sortedness requirement.
pub fn linear_search_by<T, F>(items: &[T], pred: F) -> Option<usize>
where
    F: Fn(&T) -> bool,
{
    items.iter().position(pred)
}

/// Linear scan for `target`; first match.
pub fn linear_search<T: PartialEq>(items: &[T], target: &T) -> Option<usize> {
    linear_search_by(items, |element| element == target)
}

// =============================================================================
// Timing Harness
// =============================================================================

/// Elapsed time of the custom routine vs its built-in counterpart on the
/// same input of `n` elements, averaged over the harness trials.
#[derive(Debug, Clone, Serialize)]
pub struct TimingComparison {
    pub n: usize,
    pub custom_secs: f64,
    pub builtin_secs: f64,
    /// Whether the custom output matched the built-in output on this input.
    pub output_matches: bool,
}

impl TimingComparison {
    /// custom / builtin; `None` when the built-in time rounded to zero.
    pub fn ratio(&self) -> Option<f64> {
        (self.builtin_secs > 0.0).then(|| self.custom_secs / self.builtin_secs)
    }
}

/// Sort and search timings over a ladder of input sizes.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    /// Trials averaged per measurement.
    pub trials: u32,
    /// Merge sort vs `slice::sort` per input size.
    pub sort: Vec<TimingComparison>,
    /// Leftmost binary search vs `slice::binary_search_by`, elapsed over
    /// [`SEARCH_CALLS`] lookups per measurement.
    pub search: Vec<TimingComparison>,
}

/// Prefix sizes to benchmark: quarters of the dataset up to the full length.
fn size_ladder(len: usize) -> Vec<usize> {
    let mut sizes: Vec<usize> = [len / 8, len / 4, len / 2, len]
        .into_iter()
        .map(|n| n.clamp(1, len))
        .collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Time the custom routines against the built-ins over `values`.
///
/// One measurement per size per side, averaged over `trials` runs. The
/// input is used as-is (unsorted) for sorting and pre-sorted for searching.
pub fn benchmark<T: Clone + Ord>(values: &[T], trials: u32) -> BenchmarkReport {
    let trials = trials.max(1);
    let mut sort_runs = Vec::new();
    let mut search_runs = Vec::new();

    if values.is_empty() {
        return BenchmarkReport {
            trials,
            sort: sort_runs,
            search: search_runs,
        };
    }

    for n in size_ladder(values.len()) {
        let input = &values[..n];
        sort_runs.push(bench_sort(input, trials));
        search_runs.push(bench_search(input, trials));
    }

    BenchmarkReport {
        trials,
        sort: sort_runs,
        search: search_runs,
    }
}

fn bench_sort<T: Clone + Ord>(input: &[T], trials: u32) -> TimingComparison {
    let mut custom_total = 0.0;
    let mut builtin_total = 0.0;

    for _ in 0..trials {
        let start = Instant::now();
        let sorted = merge_sort(black_box(input));
        custom_total += start.elapsed().as_secs_f64();
        black_box(&sorted);

        let mut copy = input.to_vec();
        let start = Instant::now();
        copy.sort();
        builtin_total += start.elapsed().as_secs_f64();
        black_box(&copy);
    }

    let custom_sorted = merge_sort(input);
    let mut builtin_sorted = input.to_vec();
    builtin_sorted.sort();

    TimingComparison {
        n: input.len(),
        custom_secs: custom_total / f64::from(trials),
        builtin_secs: builtin_total / f64::from(trials),
        output_matches: custom_sorted == builtin_sorted,
    }
}

fn bench_search<T: Clone + Ord>(input: &[T], trials: u32) -> TimingComparison {
    let mut sorted = input.to_vec();
    sorted.sort();
    let target = &sorted[sorted.len() / 2];

    let mut custom_total = 0.0;
    let mut builtin_total = 0.0;

    for _ in 0..trials {
        let start = Instant::now();
        for _ in 0..SEARCH_CALLS {
            black_box(binary_search(black_box(&sorted), black_box(target)));
        }
        custom_total += start.elapsed().as_secs_f64();

        let start = Instant::now();
        for _ in 0..SEARCH_CALLS {
            black_box(sorted.binary_search_by(|element| element.cmp(black_box(target))));
        }
        builtin_total += start.elapsed().as_secs_f64();
    }

    let custom_hit = binary_search(&sorted, target);
    let builtin_hit = sorted.binary_search(target).ok();
    // Both find *a* match; with duplicates the indices may legitimately
    // differ, so compare the found values.
    let output_matches = match (custom_hit, builtin_hit) {
        (Some(a), Some(b)) => sorted[a] == sorted[b],
        (None, None) => true,
        _ => false,
    };

    TimingComparison {
        n: sorted.len(),
        custom_secs: custom_total / f64::from(trials),
        builtin_secs: builtin_total / f64::from(trials),
        output_matches,
    }
}
