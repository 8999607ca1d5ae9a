/// Builds the per-animation export record.
pub mod exporter;
/// Step lookup of the keyframe in effect at a time.
pub mod key_time_index;
/// Resamples one transform component across all joints.
pub mod resampler;
/// Union of keyframe times across channels.
pub mod union_timeline;

use std::fmt;

use glam::{Quat, Vec3};

pub use exporter::export_animation;
pub use key_time_index::KeyTimeIndex;
pub use resampler::resample;
pub use union_timeline::union_of;

/// The three transform components a channel animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
  Translation,
  Rotation,
  Scale,
}

impl fmt::Display for Component {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Component::Translation => "translation",
      Component::Rotation => "rotation",
      Component::Scale => "scale",
    };
    f.write_str(name)
  }
}

/// One row of a time-sampled attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSample<T> {
  /// Raw time in the animation's ticks.
  pub time: f64,
  /// One value per animated joint, in joint-target order.
  pub values: Vec<T>,
}

/// Resampled values of one component.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute<T> {
  /// No joint varies over time: one value per joint.
  Uniform(Vec<T>),
  /// Rows on the union timeline, strictly increasing in time.
  TimeSampled(Vec<TimeSample<T>>),
}

impl<T> Attribute<T> {
  pub fn is_uniform(&self) -> bool {
    matches!(self, Attribute::Uniform(_))
  }

  ///
  /// Get the sample times. Uniform attributes have none.
  ///
  pub fn times(&self) -> Vec<f64> {
    match self {
      Attribute::Uniform(_) => vec![],
      Attribute::TimeSampled(samples) => samples.iter().map(|sample| sample.time).collect(),
    }
  }
}

/// Finalized skeletal animation, ready to hand to a writer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationExport {
  /// Unique prim-safe name.
  pub name: String,
  /// Ticks per second the raw times are expressed in.
  pub ticks_per_second: f64,
  /// Animated joint paths, remapped under `/<name>`.
  pub joints: Vec<String>,
  /// Translation values.
  pub translations: Attribute<Vec3>,
  /// Rotation values.
  pub rotations: Attribute<Quat>,
  /// Scale values.
  pub scales: Attribute<Vec3>,
}
