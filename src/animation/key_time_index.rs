use itertools::Itertools;

use crate::error::{ExportError, Result};
use crate::scene::Keyframe;

///
/// Find the rightmost time less than or equal to `query` and return its index.
///
/// This is the step rule: the keyframe in effect at `query` is the most recent
/// one not later than it. `times` must be sorted ascending.
///
pub fn locate(times: &[f64], query: f64) -> Result<usize> {
  // partition_point gives the first index with a time past the query.
  match times.partition_point(|&time| time <= query) {
    0 => Err(ExportError::NoKeyAtOrBeforeTime { time: query }),
    next => Ok(next - 1),
  }
}

/// Precomputed searchable key times for one channel component.
///
/// Built once per animation and reused for every union-time query. Source keys
/// may come in any order; they are stably sorted by time here and `locate`
/// answers with the position in the original keyframe slice.
#[derive(Clone, Debug, Default)]
pub struct KeyTimeIndex {
  times: Vec<f64>,
  /// Original keyframe position of each entry in `times`.
  positions: Vec<usize>,
}

impl KeyTimeIndex {
  pub fn new<T>(keys: &[Keyframe<T>]) -> Self {
    // Stable, so keys sharing a time keep their source order.
    let (times, positions): (Vec<f64>, Vec<usize>) = keys
      .iter()
      .enumerate()
      .map(|(position, key)| (key.time, position))
      .sorted_by(|a, b| a.0.total_cmp(&b.0))
      .unzip();
    KeyTimeIndex { times, positions }
  }

  /// Position in the source keyframes of the key in effect at `query`.
  pub fn locate(&self, query: f64) -> Result<usize> {
    locate(&self.times, query).map(|sorted| self.positions[sorted])
  }

  pub fn times(&self) -> &[f64] {
    &self.times
  }

  pub fn len(&self) -> usize {
    self.times.len()
  }

  pub fn is_empty(&self) -> bool {
    self.times.is_empty()
  }
}
