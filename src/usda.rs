use std::fmt::{self, Display, Formatter};

use glam::{DMat4, Quat, Vec3};

use crate::animation::{AnimationExport, Attribute};
use crate::skeleton::PATH_SEPARATOR;
use crate::skeleton_export::SkeletonExport;

/// Time code rate written when there is no animation to take it from.
pub const DEFAULT_TIME_CODES_PER_SECOND: f64 = 24.0;

const INDENT: &str = "    ";

///
/// Render an export as a USDA layer.
///
pub fn to_usda(export: &SkeletonExport) -> String {
  Usda(export).to_string()
}

/// Display adapter writing a [SkeletonExport](../skeleton_export/struct.SkeletonExport.html) as USDA text.
///
/// A layer has a single `timeCodesPerSecond`, taken from the first animation.
/// Sample times of animations at other rates are rescaled onto it.
pub struct Usda<'a>(pub &'a SkeletonExport);

impl Display for Usda<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let export = self.0;
    let skeleton_prims = path_components(&export.skeleton_path);

    let time_codes_per_second = export
      .animations
      .first()
      .map(|animation| animation.ticks_per_second)
      .unwrap_or(DEFAULT_TIME_CODES_PER_SECOND);

    writeln!(f, "#usda 1.0")?;
    writeln!(f, "(")?;
    if let Some(default_prim) = skeleton_prims.first() {
      writeln!(f, "{}defaultPrim = {}", INDENT, quoted(default_prim))?;
    }
    writeln!(f, "{}timeCodesPerSecond = {}", INDENT, time_codes_per_second)?;
    writeln!(f, ")")?;

    write_skeleton(f, export, &skeleton_prims)?;

    for animation in &export.animations {
      writeln!(f)?;
      write_animation(f, animation, time_codes_per_second)?;
    }

    Ok(())
  }
}

fn write_skeleton(f: &mut Formatter<'_>, export: &SkeletonExport, prims: &[&str]) -> fmt::Result {
  // Everything above the skeleton prim is a plain transform.
  let depth = prims.len().saturating_sub(1);
  for (level, prim) in prims.iter().enumerate() {
    writeln!(f)?;
    let schema = if level == depth { "Skeleton" } else { "Xform" };
    writeln!(f, "{}def {} {}", indent(level), schema, quoted(prim))?;
    writeln!(f, "{}{{", indent(level))?;
  }

  let body = indent(prims.len());
  write!(f, "{}uniform token[] joints = ", body)?;
  write_tokens(f, &export.joints, &export.skeleton_path)?;
  writeln!(f)?;

  write!(f, "{}uniform matrix4d[] restTransforms = ", body)?;
  write_array(f, &export.rest_transforms)?;
  writeln!(f)?;

  for level in (0..prims.len()).rev() {
    writeln!(f, "{}}}", indent(level))?;
  }

  Ok(())
}

fn write_animation(
  f: &mut Formatter<'_>,
  animation: &AnimationExport,
  time_codes_per_second: f64,
) -> fmt::Result {
  let time_scale = if animation.ticks_per_second > 0.0 {
    time_codes_per_second / animation.ticks_per_second
  } else {
    1.0
  };
  let namespace = format!("{}{}", PATH_SEPARATOR, animation.name);

  writeln!(f, "def SkelAnimation {}", quoted(&animation.name))?;
  writeln!(f, "{{")?;

  write!(f, "{}uniform token[] joints = ", INDENT)?;
  write_tokens(f, &animation.joints, &namespace)?;
  writeln!(f)?;

  write_attribute(f, "float3[]", "translations", &animation.translations, time_scale)?;
  write_attribute(f, "quatf[]", "rotations", &animation.rotations, time_scale)?;
  write_attribute(f, "half3[]", "scales", &animation.scales, time_scale)?;

  writeln!(f, "}}")
}

fn write_attribute<T: UsdValue>(
  f: &mut Formatter<'_>,
  type_name: &str,
  name: &str,
  attribute: &Attribute<T>,
  time_scale: f64,
) -> fmt::Result {
  match attribute {
    Attribute::Uniform(values) => {
      write!(f, "{}{} {} = ", INDENT, type_name, name)?;
      write_array(f, values)?;
      writeln!(f)
    }
    Attribute::TimeSampled(samples) => {
      writeln!(f, "{}{} {}.timeSamples = {{", INDENT, type_name, name)?;
      for sample in samples {
        write!(f, "{}{}: ", indent(2), sample.time * time_scale)?;
        write_array(f, &sample.values)?;
        writeln!(f, ",")?;
      }
      writeln!(f, "{}}}", INDENT)
    }
  }
}

fn write_array<T: UsdValue>(f: &mut Formatter<'_>, values: &[T]) -> fmt::Result {
  write!(f, "[")?;
  for (i, value) in values.iter().enumerate() {
    if i > 0 {
      write!(f, ", ")?;
    }
    value.write_usd(f)?;
  }
  write!(f, "]")
}

/// Joint paths are written relative to the prim that owns them.
fn write_tokens(f: &mut Formatter<'_>, paths: &[String], owner: &str) -> fmt::Result {
  write!(f, "[")?;
  for (i, path) in paths.iter().enumerate() {
    if i > 0 {
      write!(f, ", ")?;
    }
    let relative = path
      .strip_prefix(owner)
      .unwrap_or(path)
      .trim_start_matches(PATH_SEPARATOR);
    write!(f, "{}", quoted(relative))?;
  }
  write!(f, "]")
}

fn path_components(path: &str) -> Vec<&str> {
  path
    .split(PATH_SEPARATOR)
    .filter(|component| !component.is_empty())
    .collect()
}

fn indent(level: usize) -> String {
  INDENT.repeat(level)
}

fn quoted(text: &str) -> String {
  format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Value types that have a USDA literal.
trait UsdValue {
  fn write_usd(&self, f: &mut Formatter<'_>) -> fmt::Result;
}

impl UsdValue for Vec3 {
  fn write_usd(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let [x, y, z] = self.to_array();
    write!(f, "({}, {}, {})", x, y, z)
  }
}

impl UsdValue for Quat {
  // USD stores the real part first.
  fn write_usd(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let [x, y, z, w] = self.to_array();
    write!(f, "({}, {}, {}, {})", w, x, y, z)
  }
}

impl UsdValue for DMat4 {
  // USD matrices are row-vector, so each glam column is written as a row.
  fn write_usd(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "(")?;
    for (i, column) in self.to_cols_array_2d().iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "({}, {}, {}, {})", column[0], column[1], column[2], column[3])?;
    }
    write!(f, ")")
  }
}
