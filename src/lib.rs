//! This crate turns an imported skeleton and its keyframe animations into
//! step-sampled skeletal animation, ready to be written out as a scene
//! description.
//!
//! The node tree is flattened into joints with unique slash separated paths.
//! Every animation is then resampled per transform component: a component
//! where no joint has more than one keyframe becomes a single value per joint,
//! anything else is sampled on the union of all its keyframe times, holding
//! each joint's most recent keyframe.
//!
//! glTF 2.0 files are read with the [gltf](https://github.com/gltf-rs/gltf)
//! crate and the result can be rendered as USDA text.
//!
//! # Example
//!
//! ```no_run
//! let options = skel_resample::ExportOptions::default();
//! let export = skel_resample::load("tests/walk.gltf", &options).expect("Failed to export");
//! for animation in &export.animations {
//!   println!("{}: {} joints", animation.name, animation.joints.len());
//! }
//! println!("{}", skel_resample::usda::to_usda(&export));
//! ```

/// Resampling of keyframe channels.
pub mod animation;
/// Export options.
pub mod config;
/// Error types.
pub mod error;
/// Input scene data as handed over by an importer.
pub mod scene;
/// Flattening of the node tree into joints.
pub mod skeleton;
/// The export run and its artifact.
pub mod skeleton_export;
/// USDA rendering of an export.
pub mod usda;

use std::error::Error;

pub use animation::{AnimationExport, Attribute, Component, TimeSample};
pub use config::ExportOptions;
pub use error::{ExportError, ImportError};
pub use scene::{Channel, Keyframe, Node, SourceAnimation, SourceScene};
pub use skeleton::{Joint, JointNameIndex, Skeleton};
pub use skeleton_export::{export_scene, SkeletonExport};

///
/// Load a glTF 2.0 file and export its skeleton and animations.
///
/// Note: You can use this function with either a `Gltf` (standard `glTF`) or `Glb` (binary glTF).
///
pub fn load(path: &str, options: &ExportOptions) -> Result<SkeletonExport, Box<dyn Error + Send + Sync>> {
  let scene = scene::gltf_import::load(path)?;
  Ok(export_scene(&scene, options)?)
}

// ? ////////////////////////////////////////////////////////////////////////////////////////////// ? //
// ?                            CODE ENDS HERE, BEGIN UNIT TESTS.                                   ? //
// ? ////////////////////////////////////////////////////////////////////////////////////////////// ? //
