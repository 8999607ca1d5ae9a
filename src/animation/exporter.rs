use ahash::AHashSet;
use log::debug;

use super::resampler::JointKeys;
use super::{resample, AnimationExport, Component};
use crate::config::ExportOptions;
use crate::error::{ExportError, Result};
use crate::scene::{Channel, SourceAnimation};
use crate::skeleton::{Skeleton, PATH_SEPARATOR};

///
/// Turn one source animation into its export record.
///
/// Every channel is resolved against the skeleton before anything gets
/// resampled, so an unknown joint aborts the animation up front. Channels
/// are then put in skeleton order, which is also the order of the joint
/// targets and of every value row.
///
/// `name` is the final prim name of the animation. The joint targets are the
/// skeleton's joint paths re-rooted under `/<name>`.
///
pub fn export_animation(
  skeleton: &Skeleton,
  source: &SourceAnimation,
  name: &str,
  options: &ExportOptions,
) -> Result<AnimationExport> {
  let mut seen = AHashSet::with_capacity(source.channels.len());
  let mut resolved: Vec<(usize, &Channel)> = Vec::with_capacity(source.channels.len());

  for channel in &source.channels {
    let position = skeleton
      .name_index
      .position(&channel.joint_name)
      .ok_or_else(|| ExportError::UnknownJointReference {
        animation: name.to_string(),
        joint: channel.joint_name.clone(),
      })?;

    if !seen.insert(position) {
      return Err(ExportError::DuplicateJointChannel {
        animation: name.to_string(),
        joint: channel.joint_name.clone(),
      });
    }

    resolved.push((position, channel));
  }

  resolved.sort_by_key(|(position, _)| *position);

  let namespace = format!("{}{}", PATH_SEPARATOR, name);
  let joints = resolved
    .iter()
    .map(|(position, _)| skeleton.remap_path(&skeleton.joints[*position].path, &namespace))
    .collect();

  let channels: Vec<&Channel> = resolved.iter().map(|(_, channel)| *channel).collect();

  let translations = resample(
    name,
    Component::Translation,
    &channels
      .iter()
      .map(|channel| JointKeys::new(&channel.joint_name, &channel.translations))
      .collect::<Vec<_>>(),
  )?;

  let rotations = resample(
    name,
    Component::Rotation,
    &channels
      .iter()
      .map(|channel| JointKeys::new(&channel.joint_name, &channel.rotations))
      .collect::<Vec<_>>(),
  )?;

  let scales = resample(
    name,
    Component::Scale,
    &channels
      .iter()
      .map(|channel| JointKeys::new(&channel.joint_name, &channel.scales))
      .collect::<Vec<_>>(),
  )?;

  let ticks_per_second = effective_ticks_per_second(source.ticks_per_second, options);

  debug!(
    "animation [{}]: {} channels at {} ticks per second",
    name,
    channels.len(),
    ticks_per_second
  );

  Ok(AnimationExport {
    name: name.to_string(),
    ticks_per_second,
    joints,
    translations,
    rotations,
    scales,
  })
}

///
/// Get the declared rate, or the configured default when the source leaves it unspecified.
///
pub fn effective_ticks_per_second(declared: f64, options: &ExportOptions) -> f64 {
  if declared > 0.0 {
    declared
  } else {
    options.default_ticks_per_second
  }
}

///
/// Turn a raw animation name into something usable as a prim name.
///
/// Falls back to the configured default when the source has no name or an
/// empty one.
///
pub fn prim_name(raw: Option<&str>, options: &ExportOptions) -> String {
  let raw = match raw {
    Some(raw) if !raw.is_empty() => raw,
    _ => options.default_animation_name.as_str(),
  };

  let mut name: String = raw
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();

  if name.starts_with(|c: char| c.is_ascii_digit()) {
    name.insert(0, '_');
  }

  name
}
