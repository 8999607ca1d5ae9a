/// Knobs for one export run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
  /// Prim path the skeleton is declared at. Every joint path starts with it.
  pub skeleton_path: String,
  /// Name used for animations that come without one.
  pub default_animation_name: String,
  /// Rate used when an animation does not declare a positive one.
  pub default_ticks_per_second: f64,
  /// Log and drop animations that fail instead of failing the whole run.
  pub skip_failed_animations: bool,
}

impl Default for ExportOptions {
  fn default() -> Self {
    ExportOptions {
      skeleton_path: "/Skeleton".to_string(),
      default_animation_name: "Anim1".to_string(),
      default_ticks_per_second: 24.0,
      skip_failed_animations: false,
    }
  }
}

impl ExportOptions {
  pub fn with_skeleton_path(mut self, skeleton_path: impl Into<String>) -> Self {
    self.skeleton_path = skeleton_path.into();
    self
  }

  pub fn with_skip_failed_animations(mut self, skip: bool) -> Self {
    self.skip_failed_animations = skip;
    self
  }
}
