use thiserror::Error;

use crate::animation::Component;

/// Result alias used by the export path.
pub type Result<T, E = ExportError> = std::result::Result<T, E>;

///
/// Everything that can abort the export of one animation.
///
/// None of these are recoverable for the animation being processed. Partially
/// sampled joint data is never handed out.
///
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
  /// A channel targets a joint name that is not in the skeleton.
  #[error("animation [{animation}] targets unknown joint [{joint}]")]
  UnknownJointReference { animation: String, joint: String },

  /// A joint has no keyframes for a component that has to be sampled.
  #[error("animation [{animation}] has no {component} keyframes for joint [{joint}]")]
  MissingChannelData {
    animation: String,
    joint: String,
    component: Component,
  },

  /// A query time lies before the first keyframe of a channel.
  #[error("no keyframe at or before time {time}")]
  NoKeyAtOrBeforeTime { time: f64 },

  /// Two channels of one animation target the same joint.
  #[error("animation [{animation}] has more than one channel for joint [{joint}]")]
  DuplicateJointChannel { animation: String, joint: String },
}

///
/// Failures while turning a glTF document into a source scene.
///
#[derive(Error, Debug)]
pub enum ImportError {
  #[error("failed to read [{path}]: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Gltf(#[from] gltf::Error),

  #[error("model [{0}] contains no scenes")]
  NoScene(String),

  #[error("scene contains no nodes")]
  EmptyScene,

  #[error("animation channel [{channel}] has no {what} data")]
  MissingAccessor { channel: usize, what: &'static str },

  #[error(
    "mismatched {component} length on node [{node}]: {values} values compared to {timestamps} timestamps"
  )]
  KeyCountMismatch {
    node: String,
    component: Component,
    values: usize,
    timestamps: usize,
  },

  #[error("attempted to overwrite node [{node}]'s {component} animation data")]
  DuplicateProperty { node: String, component: Component },
}
