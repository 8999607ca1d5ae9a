use itertools::Itertools;

///
/// Get the sorted, duplicate free union of every channel's key times.
///
/// Times are compared exactly. No failure mode, empty input gives an empty
/// timeline.
///
pub fn union_of<'a, I>(time_lists: I) -> Vec<f64>
where
  I: IntoIterator<Item = &'a [f64]>,
{
  time_lists
    .into_iter()
    .flatten()
    .copied()
    .sorted_by(f64::total_cmp)
    .dedup()
    .collect()
}
