use ahash::AHashMap;
use glam::{DMat4, Mat4};

use crate::scene::Node;

/// Separator between the components of a joint path.
pub const PATH_SEPARATOR: char = '/';

/// One flattened skeleton node.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
  /// Full hierarchical path, e.g. `/Skeleton/Root/Hips`.
  pub path: String,
  /// Rest pose local transform.
  pub rest_transform: DMat4,
}

/// Resolves raw node names into their joint.
#[derive(Clone, Debug, Default)]
pub struct JointNameIndex {
  by_name: AHashMap<String, usize>,
}

impl JointNameIndex {
  ///
  /// Get the position of the named joint in traversal order.
  ///
  pub fn position(&self, name: &str) -> Option<usize> {
    self.by_name.get(name).copied()
  }

  pub fn len(&self) -> usize {
    self.by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_name.is_empty()
  }
}

/// The flattened hierarchy: joints in pre-order plus the name lookup.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
  /// Path every joint path starts with.
  pub root_prefix: String,
  /// Joints in depth-first pre-order.
  pub joints: Vec<Joint>,
  /// Raw node name to joint.
  pub name_index: JointNameIndex,
}

impl Skeleton {
  ///
  /// Flatten a node tree into joints.
  ///
  /// The root joint lives at `root_prefix/<root name>` and every child at
  /// `<parent path>/<child name>`. A joint is always recorded before its
  /// children, so the joint list can be indexed positionally next to the
  /// rest transforms.
  ///
  /// Node names are trusted to be unique across the tree. If they are not,
  /// the name index keeps the last node seen under that name.
  ///
  pub fn build(root: &Node, root_prefix: &str) -> Self {
    let mut skeleton = Skeleton {
      root_prefix: root_prefix.to_string(),
      ..Default::default()
    };
    skeleton.add_joints(root, root_prefix);
    skeleton
  }

  fn add_joints(&mut self, node: &Node, parent_path: &str) {
    let path = format!("{}{}{}", parent_path, PATH_SEPARATOR, node.name);

    // Record before descending, the pre-order is part of the output contract.
    self
      .name_index
      .by_name
      .insert(node.name.clone(), self.joints.len());
    self.joints.push(Joint {
      path: path.clone(),
      rest_transform: to_double(&node.transform),
    });

    for child in &node.children {
      self.add_joints(child, &path);
    }
  }

  ///
  /// Look up a joint by raw node name.
  ///
  pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
    self
      .name_index
      .position(name)
      .and_then(|position| self.joints.get(position))
  }

  pub fn joint_paths(&self) -> Vec<&str> {
    self.joints.iter().map(|joint| joint.path.as_str()).collect()
  }

  pub fn rest_transforms(&self) -> Vec<DMat4> {
    self.joints.iter().map(|joint| joint.rest_transform).collect()
  }

  ///
  /// Re-root a joint path under another namespace.
  ///
  /// `/Skeleton/Root/Hips` with namespace `/Walk` becomes `/Walk/Root/Hips`.
  ///
  pub fn remap_path(&self, path: &str, namespace: &str) -> String {
    match path.strip_prefix(self.root_prefix.as_str()) {
      Some(rest) => format!("{}{}", namespace, rest),
      None => path.to_string(),
    }
  }
}

fn to_double(matrix: &Mat4) -> DMat4 {
  DMat4::from_cols_array(&matrix.to_cols_array().map(f64::from))
}

// ? ////////////////////////////////////////////////////////////////////////////////////////////// ? //
// ?                            CODE ENDS HERE, BEGIN UNIT TESTS.                                   ? //
// ? ////////////////////////////////////////////////////////////////////////////////////////////// ? //

#[cfg(test)]
mod tests {
  use super::*;
  use ahash::AHashSet;
  use glam::Vec3;

  fn humanoid() -> Node {
    Node::new("Root").with_child(
      Node::new("Hips")
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))
        .with_child(Node::new("Spine").with_child(Node::new("Head")))
        .with_child(Node::new("LeftLeg"))
        .with_child(Node::new("RightLeg")),
    )
  }

  #[test]
  fn paths_follow_pre_order() {
    drop(env_logger::try_init());

    let skeleton = Skeleton::build(&humanoid(), "/Skeleton");

    assert_eq!(
      skeleton.joint_paths(),
      vec![
        "/Skeleton/Root",
        "/Skeleton/Root/Hips",
        "/Skeleton/Root/Hips/Spine",
        "/Skeleton/Root/Hips/Spine/Head",
        "/Skeleton/Root/Hips/LeftLeg",
        "/Skeleton/Root/Hips/RightLeg",
      ]
    );
  }

  #[test]
  fn every_node_becomes_one_joint_with_a_parent() {
    drop(env_logger::try_init());

    let root = humanoid();
    let skeleton = Skeleton::build(&root, "/Skeleton");

    assert_eq!(skeleton.joints.len(), root.node_count());

    let paths: AHashSet<&str> = skeleton.joint_paths().into_iter().collect();
    assert_eq!(paths.len(), skeleton.joints.len());

    for path in skeleton.joint_paths().iter().skip(1) {
      let parent = match path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, _)) => parent,
        None => panic!("joint path {} has no separator", path),
      };
      assert!(paths.contains(parent), "{} has no parent joint", path);
    }
  }

  #[test]
  fn rest_transforms_stay_index_aligned() {
    drop(env_logger::try_init());

    let skeleton = Skeleton::build(&humanoid(), "/Skeleton");
    let rest = skeleton.rest_transforms();

    assert_eq!(rest.len(), skeleton.joints.len());
    assert_eq!(rest[0], DMat4::IDENTITY);
    assert_eq!(rest[1].w_axis.y, 1.0);
    assert_eq!(rest[2], DMat4::IDENTITY);
  }

  #[test]
  fn name_index_resolves_every_node() {
    drop(env_logger::try_init());

    let skeleton = Skeleton::build(&humanoid(), "/Skeleton");

    assert_eq!(skeleton.name_index.len(), 6);
    assert_eq!(skeleton.name_index.position("Spine"), Some(2));
    assert_eq!(
      skeleton.joint_by_name("Head").map(|joint| joint.path.as_str()),
      Some("/Skeleton/Root/Hips/Spine/Head")
    );
    assert!(skeleton.joint_by_name("Head_End").is_none());
  }

  #[test]
  fn remap_moves_paths_into_namespace() {
    drop(env_logger::try_init());

    let skeleton = Skeleton::build(&humanoid(), "/Skeleton");

    assert_eq!(
      skeleton.remap_path("/Skeleton/Root/Hips", "/Walk"),
      "/Walk/Root/Hips"
    );
  }
}
