/// Turns glTF documents into a [SourceScene](struct.SourceScene.html).
pub mod gltf_import;

use glam::{Mat4, Quat, Vec3};

/// One authored sample of a channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe<T> {
  /// Raw time in the animation's ticks.
  pub time: f64,
  /// Value held from this time until the next keyframe.
  pub value: T,
}

impl<T> Keyframe<T> {
  pub fn new(time: f64, value: T) -> Self {
    Keyframe { time, value }
  }
}

/// A node of the imported scene tree.
///
/// Children are owned, so a node can never be reached from itself.
#[derive(Clone, Debug)]
pub struct Node {
  /// Node name. Unique across the whole tree once the importer is done with it.
  pub name: String,
  /// Local transform relative to the parent.
  pub transform: Mat4,
  /// Ordered children.
  pub children: Vec<Node>,
}

impl Node {
  ///
  /// Create a new node with an identity transform and no children.
  ///
  pub fn new(name: impl Into<String>) -> Self {
    Node {
      name: name.into(),
      transform: Mat4::IDENTITY,
      children: vec![],
    }
  }

  pub fn with_transform(mut self, transform: Mat4) -> Self {
    self.transform = transform;
    self
  }

  pub fn with_child(mut self, child: Node) -> Self {
    self.children.push(child);
    self
  }

  ///
  /// Count this node and everything below it.
  ///
  pub fn node_count(&self) -> usize {
    1 + self.children.iter().map(Node::node_count).sum::<usize>()
  }
}

/// Container holding raw TRS keyframes for one node (bone) in one animation.
///
/// The three sequences are independent of each other: any of them may be
/// empty, hold a single key, or many keys on its own timeline.
#[derive(Clone, Debug, Default)]
pub struct Channel {
  /// Name of the node (bone) this channel drives.
  pub joint_name: String,
  /// Translation keyframes.
  pub translations: Vec<Keyframe<Vec3>>,
  /// Rotation keyframes.
  pub rotations: Vec<Keyframe<Quat>>,
  /// Scale keyframes.
  pub scales: Vec<Keyframe<Vec3>>,
}

impl Channel {
  ///
  /// Create a new empty channel for a joint.
  ///
  pub fn new(joint_name: impl Into<String>) -> Self {
    Channel {
      joint_name: joint_name.into(),
      ..Default::default()
    }
  }

  pub fn with_translations(mut self, keys: Vec<Keyframe<Vec3>>) -> Self {
    self.translations = keys;
    self
  }

  pub fn with_rotations(mut self, keys: Vec<Keyframe<Quat>>) -> Self {
    self.rotations = keys;
    self
  }

  pub fn with_scales(mut self, keys: Vec<Keyframe<Vec3>>) -> Self {
    self.scales = keys;
    self
  }
}

/// An animation as handed over by the importer.
#[derive(Clone, Debug, Default)]
pub struct SourceAnimation {
  /// Animation name, if the source format carries one.
  pub name: Option<String>,
  /// Declared ticks per second. Zero or less means unspecified.
  pub ticks_per_second: f64,
  /// One channel per animated joint.
  pub channels: Vec<Channel>,
}

/// Everything the exporter reads from an imported file.
#[derive(Clone, Debug)]
pub struct SourceScene {
  /// Root of the node tree.
  pub root: Node,
  /// Animations in source order.
  pub animations: Vec<SourceAnimation>,
}

impl SourceScene {
  pub fn new(root: Node) -> Self {
    SourceScene {
      root,
      animations: vec![],
    }
  }

  pub fn with_animation(mut self, animation: SourceAnimation) -> Self {
    self.animations.push(animation);
    self
  }
}
