use log::debug;

use super::{union_of, Attribute, Component, KeyTimeIndex, TimeSample};
use crate::error::{ExportError, Result};
use crate::scene::Keyframe;

/// One joint's keyframes for the component being resampled.
#[derive(Clone, Copy, Debug)]
pub struct JointKeys<'a, T> {
  /// Raw joint name, used for error reporting.
  pub joint: &'a str,
  /// Keyframes in any time order.
  pub keys: &'a [Keyframe<T>],
}

impl<'a, T> JointKeys<'a, T> {
  pub fn new(joint: &'a str, keys: &'a [Keyframe<T>]) -> Self {
    JointKeys { joint, keys }
  }
}

///
/// Resample one transform component across every joint of an animation.
///
/// If no joint has more than one keyframe the result is uniform, one value per
/// joint. Otherwise every joint is step sampled on the union of all key times.
/// Either way a joint without any keyframe fails with `MissingChannelData`
/// instead of making up a default value.
///
/// Output values follow the order of `joints`.
///
pub fn resample<T: Copy>(
  animation: &str,
  component: Component,
  joints: &[JointKeys<'_, T>],
) -> Result<Attribute<T>> {
  let missing = |joint: &JointKeys<'_, T>| ExportError::MissingChannelData {
    animation: animation.to_string(),
    joint: joint.joint.to_string(),
    component,
  };

  if joints.iter().all(|joint| joint.keys.len() <= 1) {
    debug!(
      "animation [{}]: {} is uniform across {} joints",
      animation,
      component,
      joints.len()
    );

    let values = joints
      .iter()
      .map(|joint| match joint.keys.first() {
        Some(key) => Ok(key.value),
        None => Err(missing(joint)),
      })
      .collect::<Result<Vec<T>>>()?;

    return Ok(Attribute::Uniform(values));
  }

  if let Some(empty) = joints.iter().find(|joint| joint.keys.is_empty()) {
    return Err(missing(empty));
  }

  // Searchable key times, built once per joint and reused for every row.
  let indices: Vec<KeyTimeIndex> = joints
    .iter()
    .map(|joint| KeyTimeIndex::new(joint.keys))
    .collect();

  let timeline = union_of(indices.iter().map(KeyTimeIndex::times));

  debug!(
    "animation [{}]: {} is time sampled, {} joints over {} times",
    animation,
    component,
    joints.len(),
    timeline.len()
  );

  let mut samples = Vec::with_capacity(timeline.len());
  for time in timeline {
    let values = joints
      .iter()
      .zip(&indices)
      .map(|(joint, index)| index.locate(time).map(|key| joint.keys[key].value))
      .collect::<Result<Vec<T>>>()?;

    samples.push(TimeSample { time, values });
  }

  Ok(Attribute::TimeSampled(samples))
}
