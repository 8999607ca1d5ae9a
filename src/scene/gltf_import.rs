use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;
use gltf::buffer::Data;
use gltf::{Document, Gltf};
use log::{debug, warn};

use super::{Channel, Keyframe, Node, SourceAnimation, SourceScene};
use crate::animation::Component;
use crate::error::ImportError;
use crate::skeleton::PATH_SEPARATOR;

/// glTF keyframe times are in seconds.
pub const GLTF_TICKS_PER_SECOND: f64 = 1.0;

/// Root name used when a scene has several top level nodes and no name.
pub const DEFAULT_SCENE_NAME: &str = "Scene";

///
/// Load a glTF 2.0 file (`.gltf` or `.glb`) into a source scene.
///
pub fn load(path: &str) -> Result<SourceScene, ImportError> {
  let file_name = file_name_from_path(path);

  // We need the base path for the GLTF lib so external buffers resolve.
  let base = Path::new(path).parent().unwrap_or_else(|| Path::new("./"));

  let mut bytes = vec![];
  read_path_to_buf_read(path)?
    .read_to_end(&mut bytes)
    .map_err(|source| ImportError::Io {
      path: path.to_string(),
      source,
    })?;

  from_slice(&bytes, Some(base), file_name)
}

///
/// Parse glTF bytes and resolve their buffers.
///
/// `model_name` is only used in error messages.
///
pub fn from_slice(
  bytes: &[u8],
  base: Option<&Path>,
  model_name: &str,
) -> Result<SourceScene, ImportError> {
  let gltf_data = Gltf::from_slice(bytes)?;
  let buffers = gltf::import_buffers(&gltf_data.document, base, gltf_data.blob.clone())?;
  from_document(&gltf_data.document, &buffers, model_name)
}

///
/// Convert an already loaded document.
///
/// Uses the default scene, or the first one when there is no default. Node
/// names are made unique here so the skeleton can trust them.
///
pub fn from_document(
  document: &Document,
  buffers: &[Data],
  model_name: &str,
) -> Result<SourceScene, ImportError> {
  let scene = document
    .default_scene()
    .or_else(|| document.scenes().next())
    .ok_or_else(|| ImportError::NoScene(model_name.to_string()))?;

  let mut taken = AHashSet::new();
  let names: Vec<String> = document
    .nodes()
    .map(|node| {
      let base = match node.name() {
        Some(name) if !name.is_empty() => path_safe(name),
        _ => format!("node_{}", node.index()),
      };
      unique_node_name(base, node.index(), &mut taken)
    })
    .collect();

  let mut roots: Vec<Node> = scene
    .nodes()
    .map(|node| read_node(&node, &names))
    .collect();

  let root = match roots.len() {
    0 => return Err(ImportError::EmptyScene),
    1 => roots.remove(0),
    _ => {
      // Several top level nodes get wrapped so there is one skeleton root.
      let base = path_safe(scene.name().unwrap_or(DEFAULT_SCENE_NAME));
      let mut root = Node::new(unique_node_name(base, names.len(), &mut taken));
      root.children = roots;
      root
    }
  };

  let animations = document
    .animations()
    .map(|animation| read_animation(&animation, buffers, &names))
    .collect::<Result<Vec<_>, _>>()?;

  debug!(
    "{}: {} nodes, {} animations",
    model_name,
    root.node_count(),
    animations.len()
  );

  Ok(SourceScene { root, animations })
}

fn read_node(node: &gltf::Node, names: &[String]) -> Node {
  Node {
    name: names[node.index()].clone(),
    transform: Mat4::from_cols_array_2d(&node.transform().matrix()),
    children: node
      .children()
      .map(|child| read_node(&child, names))
      .collect(),
  }
}

///
/// Collect every channel of an animation, merged per target node.
///
/// glTF has one channel per node property; the result has one channel per
/// node holding all three properties, in order of first appearance. A
/// property without a glTF channel gets a single key with the node's rest
/// value at the animation's first key time.
///
fn read_animation(
  animation: &gltf::Animation,
  buffers: &[Data],
  names: &[String],
) -> Result<SourceAnimation, ImportError> {
  let mut order: Vec<usize> = vec![];
  let mut channels: AHashMap<usize, (Channel, RestPose)> = AHashMap::new();
  let mut start_time = f64::INFINITY;

  for (channel_index, channel) in animation.channels().enumerate() {
    let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));

    let timestamps: Vec<f64> = reader
      .read_inputs()
      .ok_or(ImportError::MissingAccessor {
        channel: channel_index,
        what: "timestamp",
      })?
      .map(f64::from)
      .collect();

    let outputs = reader.read_outputs().ok_or(ImportError::MissingAccessor {
      channel: channel_index,
      what: "keyframe",
    })?;

    let interpolation = channel.sampler().interpolation();
    if interpolation != Interpolation::Step {
      debug!(
        "Channel [{}] uses {:?} interpolation, it will be held per keyframe.",
        channel_index, interpolation
      );
    }

    let node = channel.target().node();
    let node_index = node.index();
    let node_name = &names[node_index];

    // Morph weights get dropped before the channel is registered.
    if let ReadOutputs::MorphTargetWeights(_) = outputs {
      warn!(
        "Morph target weights on node [{}] are not exported.",
        node_name
      );
      continue;
    }

    if let Some(&first) = timestamps.first() {
      start_time = start_time.min(first);
    }

    let (target, _) = channels.entry(node_index).or_insert_with(|| {
      order.push(node_index);
      (Channel::new(node_name.as_str()), RestPose::of(&node))
    });

    match outputs {
      ReadOutputs::Translations(translations) => {
        let values = translations.map(Vec3::from_array).collect();
        let keys = keyframes(node_name, Component::Translation, &timestamps, values, interpolation)?;
        assign(&mut target.translations, keys, node_name, Component::Translation)?;
      }
      ReadOutputs::Rotations(rotations) => {
        let values = rotations.into_f32().map(Quat::from_array).collect();
        let keys = keyframes(node_name, Component::Rotation, &timestamps, values, interpolation)?;
        assign(&mut target.rotations, keys, node_name, Component::Rotation)?;
      }
      ReadOutputs::Scales(scales) => {
        let values = scales.map(Vec3::from_array).collect();
        let keys = keyframes(node_name, Component::Scale, &timestamps, values, interpolation)?;
        assign(&mut target.scales, keys, node_name, Component::Scale)?;
      }
      ReadOutputs::MorphTargetWeights(_) => {}
    }
  }

  // Properties a node doesn't animate hold its rest pose from the first key on.
  let start_time = if start_time.is_finite() { start_time } else { 0.0 };
  let channels = order
    .into_iter()
    .filter_map(|node_index| channels.remove(&node_index))
    .map(|(channel, rest)| rest.fill(channel, start_time))
    .collect();

  Ok(SourceAnimation {
    name: animation.name().map(String::from),
    ticks_per_second: GLTF_TICKS_PER_SECOND,
    channels,
  })
}

/// Local TRS of a node, used for properties its channels leave out.
struct RestPose {
  translation: Vec3,
  rotation: Quat,
  scale: Vec3,
}

impl RestPose {
  fn of(node: &gltf::Node) -> Self {
    let (translation, rotation, scale) = node.transform().decomposed();
    RestPose {
      translation: Vec3::from_array(translation),
      rotation: Quat::from_array(rotation),
      scale: Vec3::from_array(scale),
    }
  }

  fn fill(self, mut channel: Channel, time: f64) -> Channel {
    if channel.translations.is_empty() {
      channel.translations.push(Keyframe::new(time, self.translation));
    }
    if channel.rotations.is_empty() {
      channel.rotations.push(Keyframe::new(time, self.rotation));
    }
    if channel.scales.is_empty() {
      channel.scales.push(Keyframe::new(time, self.scale));
    }
    channel
  }
}

///
/// Pair timestamps with their values.
///
/// Cubic spline samplers store an in-tangent, a value and an out-tangent per
/// keyframe. Only the value is kept.
///
fn keyframes<T>(
  node: &str,
  component: Component,
  timestamps: &[f64],
  values: Vec<T>,
  interpolation: Interpolation,
) -> Result<Vec<Keyframe<T>>, ImportError> {
  let values: Vec<T> = match interpolation {
    Interpolation::CubicSpline => values.into_iter().skip(1).step_by(3).collect(),
    Interpolation::Linear | Interpolation::Step => values,
  };

  if values.len() != timestamps.len() {
    return Err(ImportError::KeyCountMismatch {
      node: node.to_string(),
      component,
      values: values.len(),
      timestamps: timestamps.len(),
    });
  }

  Ok(
    timestamps
      .iter()
      .zip(values)
      .map(|(&time, value)| Keyframe::new(time, value))
      .collect(),
  )
}

fn assign<T>(
  slot: &mut Vec<Keyframe<T>>,
  keys: Vec<Keyframe<T>>,
  node: &str,
  component: Component,
) -> Result<(), ImportError> {
  // * If the node already has data for this property, the model is broken.
  if !slot.is_empty() {
    return Err(ImportError::DuplicateProperty {
      node: node.to_string(),
      component,
    });
  }
  *slot = keys;
  Ok(())
}

/// Node names become joint path components, so they can't hold a separator.
fn path_safe(name: &str) -> String {
  name.replace(PATH_SEPARATOR, "_")
}

fn unique_node_name(base: String, index: usize, taken: &mut AHashSet<String>) -> String {
  let mut name = base.clone();
  let mut attempt = 0;
  while taken.contains(&name) {
    name = if attempt == 0 {
      format!("{}_{}", base, index)
    } else {
      format!("{}_{}_{}", base, index, attempt)
    };
    attempt += 1;
  }
  taken.insert(name.clone());
  name
}

///
/// Automatically parse a file path into a BufReader<File>.
///
fn read_path_to_buf_read(path: &str) -> Result<BufReader<File>, ImportError> {
  match File::open(path) {
    Ok(file) => Ok(BufReader::new(file)),
    Err(source) => Err(ImportError::Io {
      path: path.to_string(),
      source,
    }),
  }
}

///
/// Get a file name from the path provided, falling back to the whole path.
///
fn file_name_from_path(path: &str) -> &str {
  Path::new(path)
    .file_name()
    .and_then(|os_str| os_str.to_str())
    .unwrap_or(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use base64::engine::general_purpose::STANDARD;
  use base64::Engine;

  // Root with two children that share a name, plus one animation on the first child.
  const WAVE_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [
      { "name": "Root", "children": [1, 2] },
      { "name": "Arm", "translation": [0.0, 2.0, 0.0] },
      { "name": "Arm" }
    ],
    "buffers": [{ "byteLength": 56, "uri": "BUFFER_URI" }],
    "bufferViews": [
      { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
      { "buffer": 0, "byteOffset": 8, "byteLength": 32 },
      { "buffer": 0, "byteOffset": 40, "byteLength": 4 },
      { "buffer": 0, "byteOffset": 44, "byteLength": 12 }
    ],
    "accessors": [
      { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
      { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC4" },
      { "bufferView": 2, "componentType": 5126, "count": 1, "type": "SCALAR", "min": [0.5], "max": [0.5] },
      { "bufferView": 3, "componentType": 5126, "count": 1, "type": "VEC3" }
    ],
    "animations": [{
      "name": "Wave",
      "samplers": [
        { "input": 0, "output": 1, "interpolation": "LINEAR" },
        { "input": 2, "output": 3, "interpolation": "STEP" }
      ],
      "channels": [
        { "sampler": 0, "target": { "node": 1, "path": "rotation" } },
        { "sampler": 1, "target": { "node": 1, "path": "translation" } }
      ]
    }]
  }"#;

  fn wave_gltf() -> String {
    let floats: [f32; 14] = [
      0.0, 1.0, // rotation times
      0.0, 0.0, 0.0, 1.0, // identity
      0.0, 1.0, 0.0, 0.0, // half turn around y
      0.5, // translation time
      0.0, 2.0, 0.0, // translation
    ];
    let bytes: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
    let uri = format!("data:application/octet-stream;base64,{}", STANDARD.encode(bytes));
    WAVE_GLTF.replace("BUFFER_URI", &uri)
  }

  #[test]
  fn reads_hierarchy_with_unique_names() {
    drop(env_logger::try_init());

    let scene = match from_slice(wave_gltf().as_bytes(), None, "wave.gltf") {
      Ok(scene) => scene,
      Err(e) => panic!("wave: failed to load. {}", e),
    };

    assert_eq!(scene.root.name, "Root");
    let children: Vec<&str> = scene
      .root
      .children
      .iter()
      .map(|child| child.name.as_str())
      .collect();
    assert_eq!(children, vec!["Arm", "Arm_2"]);
    assert_eq!(scene.root.children[0].transform.w_axis.y, 2.0);
  }

  #[test]
  fn merges_channels_per_node() {
    drop(env_logger::try_init());

    let scene = match from_slice(wave_gltf().as_bytes(), None, "wave.gltf") {
      Ok(scene) => scene,
      Err(e) => panic!("wave: failed to load. {}", e),
    };

    assert_eq!(scene.animations.len(), 1);
    let animation = &scene.animations[0];
    assert_eq!(animation.name.as_deref(), Some("Wave"));
    assert_eq!(animation.ticks_per_second, GLTF_TICKS_PER_SECOND);
    assert_eq!(animation.channels.len(), 1);

    let channel = &animation.channels[0];
    assert_eq!(channel.joint_name, "Arm");
    assert_eq!(channel.rotations.len(), 2);
    assert_eq!(channel.rotations[1].time, 1.0);
    assert_eq!(channel.rotations[1].value, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0));
    assert_eq!(
      channel.translations,
      vec![Keyframe::new(0.5, Vec3::new(0.0, 2.0, 0.0))]
    );
    assert_eq!(channel.scales, vec![Keyframe::new(0.0, Vec3::ONE)]);
  }

  #[test]
  fn cubic_spline_keeps_only_values() {
    let values = vec![10, 11, 12, 20, 21, 22];

    let keys = match keyframes(
      "Arm",
      Component::Scale,
      &[0.0, 1.0],
      values,
      Interpolation::CubicSpline,
    ) {
      Ok(keys) => keys,
      Err(e) => panic!("{}", e),
    };

    assert_eq!(keys, vec![Keyframe::new(0.0, 11), Keyframe::new(1.0, 21)]);
  }

  #[test]
  fn mismatched_counts_are_rejected() {
    assert!(matches!(
      keyframes("Arm", Component::Translation, &[0.0, 1.0], vec![1], Interpolation::Step),
      Err(ImportError::KeyCountMismatch { values: 1, timestamps: 2, .. })
    ));
  }

  #[test]
  fn overwriting_a_property_is_rejected() {
    let mut slot = vec![Keyframe::new(0.0, 1)];

    assert!(matches!(
      assign(&mut slot, vec![Keyframe::new(0.0, 2)], "Arm", Component::Rotation),
      Err(ImportError::DuplicateProperty { .. })
    ));
  }

  #[test]
  fn duplicate_names_get_index_suffixes() {
    let mut taken = AHashSet::new();

    assert_eq!(unique_node_name("Arm".to_string(), 1, &mut taken), "Arm");
    assert_eq!(unique_node_name("Arm".to_string(), 2, &mut taken), "Arm_2");
    assert_eq!(unique_node_name("Arm_2".to_string(), 3, &mut taken), "Arm_2_3");
  }

  #[test]
  fn separators_in_names_do_not_nest_joints() {
    drop(env_logger::try_init());

    let gltf = wave_gltf()
      .replacen("\"Root\"", "\"Rig/Root\"", 1)
      .replacen("\"Arm\"", "\"Arm/Upper\"", 1);
    let scene = match from_slice(gltf.as_bytes(), None, "wave.gltf") {
      Ok(scene) => scene,
      Err(e) => panic!("wave: failed to load. {}", e),
    };

    assert_eq!(scene.root.name, "Rig_Root");
    assert_eq!(scene.root.children[0].name, "Arm_Upper");
    assert_eq!(scene.root.children[1].name, "Arm");
    assert_eq!(scene.animations[0].channels[0].joint_name, "Arm_Upper");

    let skeleton = crate::skeleton::Skeleton::build(&scene.root, "/Skeleton");
    assert_eq!(
      skeleton.joint_paths(),
      vec![
        "/Skeleton/Rig_Root",
        "/Skeleton/Rig_Root/Arm_Upper",
        "/Skeleton/Rig_Root/Arm",
      ]
    );
  }

  #[test]
  fn missing_file_is_an_io_error() {
    drop(env_logger::try_init());

    assert!(matches!(
      load("tests/does_not_exist.gltf"),
      Err(ImportError::Io { .. })
    ));
  }
}
