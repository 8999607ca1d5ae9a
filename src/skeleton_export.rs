use ahash::AHashSet;
use glam::DMat4;
use log::{error, info};

use crate::animation::exporter::prim_name;
use crate::animation::{export_animation, AnimationExport};
use crate::config::ExportOptions;
use crate::error::Result;
use crate::scene::SourceScene;
use crate::skeleton::{Skeleton, PATH_SEPARATOR};

///
/// Finalized skeleton and animation data of one scene.
///
#[derive(Clone, Debug)]
pub struct SkeletonExport {
  /// Prim path of the skeleton.
  pub skeleton_path: String,
  /// Joint paths in depth-first pre-order.
  pub joints: Vec<String>,
  /// Rest transforms, index-aligned with `joints`.
  pub rest_transforms: Vec<DMat4>,
  /// Animations in source order.
  pub animations: Vec<AnimationExport>,
}

impl SkeletonExport {
  ///
  /// Get if there is any animation data.
  ///
  pub fn is_animated(&self) -> bool {
    !self.animations.is_empty()
  }

  pub fn animation(&self, name: &str) -> Option<&AnimationExport> {
    self.animations.iter().find(|animation| animation.name == name)
  }
}

///
/// Flatten the scene hierarchy and resample every animation in it.
///
/// The skeleton is fully built before the first animation is looked at. A
/// failing animation fails the run, unless `skip_failed_animations` is set,
/// in which case it is logged and left out.
///
pub fn export_scene(scene: &SourceScene, options: &ExportOptions) -> Result<SkeletonExport> {
  let skeleton = Skeleton::build(&scene.root, &options.skeleton_path);

  // Animations live next to the skeleton, their names can't shadow it.
  let mut taken: AHashSet<String> = AHashSet::new();
  if let Some(top_level) = options
    .skeleton_path
    .split(PATH_SEPARATOR)
    .find(|component| !component.is_empty())
  {
    taken.insert(top_level.to_string());
  }

  let mut animations = Vec::with_capacity(scene.animations.len());
  for source in &scene.animations {
    let name = unique_name(prim_name(source.name.as_deref(), options), &taken);

    match export_animation(&skeleton, source, &name, options) {
      Ok(animation) => {
        taken.insert(name);
        animations.push(animation);
      }
      Err(e) if options.skip_failed_animations => {
        error!("Animation [{}] will not be exported. {}", name, e);
      }
      Err(e) => return Err(e),
    }
  }

  info!(
    "Exported {} joints and {} of {} animations.",
    skeleton.joints.len(),
    animations.len(),
    scene.animations.len()
  );

  Ok(SkeletonExport {
    skeleton_path: options.skeleton_path.clone(),
    joints: skeleton.joints.iter().map(|joint| joint.path.clone()).collect(),
    rest_transforms: skeleton.rest_transforms(),
    animations,
  })
}

/// First of `base`, `base_1`, `base_2`, ... not in `taken`. Does not reserve it.
fn unique_name(base: String, taken: &AHashSet<String>) -> String {
  let mut name = base.clone();
  let mut suffix = 1;
  while taken.contains(&name) {
    name = format!("{}_{}", base, suffix);
    suffix += 1;
  }
  name
}
