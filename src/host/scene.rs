use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::animation::keyframes::Action;
use crate::compositor::graph::NodeTree;
use crate::foundation::{
    core::{FrameIndex, FrameRange},
    error::{RenderqError, RenderqResult},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Image file format of render and compositor outputs.
pub enum FileFormat {
    /// 8-bit PNG.
    #[default]
    Png,
    /// 32-bit float OpenEXR.
    OpenExr,
}

impl FileFormat {
    /// Filename extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::OpenExr => "exr",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Channels written to PNG outputs.
pub enum ColorMode {
    /// Greyscale.
    Bw,
    /// Colour, opaque.
    #[default]
    Rgb,
    /// Colour with alpha.
    Rgba,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Viewport shading mode.
pub enum ShadingType {
    /// Edges only.
    Wireframe,
    /// Flat studio lighting.
    #[default]
    Solid,
    /// Material preview.
    Material,
    /// Full render engine in the viewport.
    Rendered,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How the camera's lens is specified in the host UI.
pub enum LensUnit {
    /// Focal length.
    #[default]
    Millimeters,
    /// Field of view.
    Fov,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Camera object data.
pub struct CameraData {
    /// Near clip distance.
    pub clip_start: f64,
    /// Far clip distance.
    pub clip_end: f64,
    /// Lens unit shown in the host UI.
    pub lens_unit: LensUnit,
    /// Field of view in radians.
    pub angle: f64,
    /// Focal length in millimeters.
    pub lens: f64,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            clip_start: 0.1,
            clip_end: 100.0,
            lens_unit: LensUnit::Millimeters,
            angle: 0.6911,
            lens: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Object type, with type-specific data where the pipeline needs it.
pub enum ObjectKind {
    /// Renderable geometry.
    Mesh,
    /// A camera and its lens settings.
    Camera(CameraData),
    /// Skeleton driving a mesh.
    Armature,
    /// Transform-only helper.
    Empty,
    /// Light source.
    Light,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A named scene object.
pub struct Object {
    /// Unique name, also its key in [`Scene::objects`].
    pub name: String,
    /// Object type.
    pub kind: ObjectKind,
    /// Hidden in the viewport.
    #[serde(default)]
    pub hide_viewport: bool,
    /// Static location; animated channels override it.
    #[serde(default)]
    pub location: [f64; 3],
    /// XYZ Euler rotation in radians.
    #[serde(default)]
    pub rotation_euler: [f64; 3],
    /// Keyframes, when the object is animated.
    #[serde(default)]
    pub action: Option<Action>,
}

impl Object {
    /// Unanimated object at the origin.
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            hide_viewport: false,
            location: [0.0; 3],
            rotation_euler: [0.0; 3],
            action: None,
        }
    }

    /// Whether the object is a mesh.
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, ObjectKind::Mesh)
    }

    /// Camera data, if this is a camera.
    pub fn camera(&self) -> Option<&CameraData> {
        match &self.kind {
            ObjectKind::Camera(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable camera data, if this is a camera.
    pub fn camera_mut(&mut self) -> Option<&mut CameraData> {
        match &mut self.kind {
            ObjectKind::Camera(data) => Some(data),
            _ => None,
        }
    }

    /// The object's keyframes, or an error naming the object when it is not animated.
    pub fn action_mut(&mut self) -> RenderqResult<&mut Action> {
        let name = &self.name;
        self.action
            .as_mut()
            .ok_or_else(|| RenderqError::keyframe(format!("object '{name}' has no animation data")))
    }

    /// Key the current value of a property at `frame`.
    ///
    /// Supported paths: `location`, `rotation_euler` (three channels each) and `data.lens` on
    /// cameras.
    pub fn keyframe_insert(&mut self, data_path: &str, frame: FrameIndex) -> RenderqResult<()> {
        let values: Vec<f64> = match data_path {
            "location" => self.location.to_vec(),
            "rotation_euler" => self.rotation_euler.to_vec(),
            "data.lens" => {
                let cam = self.camera().ok_or_else(|| {
                    RenderqError::keyframe(format!("'{}' is not a camera", self.name))
                })?;
                vec![cam.lens]
            }
            other => {
                return Err(RenderqError::keyframe(format!(
                    "unsupported keyframe path '{other}'"
                )));
            }
        };

        let action = self.action.get_or_insert_with(Action::default);
        for (idx, value) in values.into_iter().enumerate() {
            action.fcurve_mut(data_path, idx).insert(frame, value);
        }
        Ok(())
    }

    /// Location at `frame`, taking animated channels from the action.
    pub fn location_at(&self, frame: FrameIndex) -> [f64; 3] {
        let mut out = self.location;
        if let Some(action) = &self.action {
            for (idx, v) in out.iter_mut().enumerate() {
                if let Some(s) = action.sample("location", idx, frame) {
                    *v = s;
                }
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Output settings of the scene's render engine.
pub struct RenderSettings {
    /// Main output path; still renders append `####.{ext}`.
    pub filepath: PathBuf,
    /// Render the background transparent.
    pub film_transparent: bool,
    /// Main output format.
    pub file_format: FileFormat,
    /// Main output channels.
    pub color_mode: ColorMode,
    /// Run the compositor graph after still renders.
    pub use_compositing: bool,
    /// Output width in pixels.
    pub resolution_x: u32,
    /// Output height in pixels.
    pub resolution_y: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            filepath: PathBuf::from("tmp"),
            film_transparent: false,
            file_format: FileFormat::Png,
            color_mode: ColorMode::Rgb,
            use_compositing: false,
            resolution_x: 1920,
            resolution_y: 1080,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Render passes produced for the compositor.
pub struct ViewLayer {
    /// Motion-vector pass.
    pub use_pass_vector: bool,
    /// Depth pass.
    pub use_pass_z: bool,
}

/// The host's single active scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Scene {
    /// First frame of the sequence.
    pub frame_start: FrameIndex,
    /// Last frame of the sequence, inclusive.
    pub frame_end: FrameIndex,
    /// Frame animation is evaluated at.
    pub frame_current: FrameIndex,
    /// Objects keyed by name.
    pub objects: BTreeMap<String, Object>,
    /// Name of the active camera object.
    pub camera: Option<String>,
    /// Render output settings.
    pub render: RenderSettings,
    /// Enabled render passes.
    pub view_layer: ViewLayer,
    /// Enable the compositor node graph.
    pub use_nodes: bool,
    /// Shading used by viewport renders.
    pub viewport_shading: ShadingType,
    /// Compositor graph.
    pub node_tree: NodeTree,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            frame_start: FrameIndex(1),
            frame_end: FrameIndex(250),
            frame_current: FrameIndex(1),
            objects: BTreeMap::new(),
            camera: None,
            render: RenderSettings::default(),
            view_layer: ViewLayer::default(),
            use_nodes: false,
            viewport_shading: ShadingType::Solid,
            node_tree: NodeTree::new(),
        }
    }
}

impl Scene {
    /// Check the frame range, object keys, keyframes, active camera and resolution.
    pub fn validate(&self) -> RenderqResult<()> {
        self.frame_range()?;
        for (key, obj) in &self.objects {
            if key != &obj.name {
                return Err(RenderqError::validation(format!(
                    "object key '{key}' does not match object name '{}'",
                    obj.name
                )));
            }
            if let Some(action) = &obj.action {
                action.validate()?;
            }
        }
        if let Some(name) = &self.camera {
            self.active_camera().map_err(|_| {
                RenderqError::validation(format!("active camera '{name}' is not a camera object"))
            })?;
        }
        if self.render.resolution_x == 0 || self.render.resolution_y == 0 {
            return Err(RenderqError::validation("render resolution must be non-zero"));
        }
        Ok(())
    }

    /// `frame_start..=frame_end`.
    pub fn frame_range(&self) -> RenderqResult<FrameRange> {
        FrameRange::new(self.frame_start, self.frame_end)
    }

    /// Insert an object under its name, replacing any object with the same name.
    pub fn add_object(&mut self, obj: Object) {
        self.objects.insert(obj.name.clone(), obj);
    }

    /// Look up an object, failing with [`RenderqError::MissingObject`].
    pub fn object(&self, name: &str) -> RenderqResult<&Object> {
        self.objects
            .get(name)
            .ok_or_else(|| RenderqError::missing_object(format!("object '{name}'")))
    }

    /// Mutable [`Scene::object`].
    pub fn object_mut(&mut self, name: &str) -> RenderqResult<&mut Object> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| RenderqError::missing_object(format!("object '{name}'")))
    }

    /// The active camera object; fails when unset or not a camera.
    pub fn active_camera(&self) -> RenderqResult<&Object> {
        let name = self
            .camera
            .as_deref()
            .ok_or_else(|| RenderqError::missing_object("scene has no active camera"))?;
        let obj = self.object(name)?;
        if obj.camera().is_none() {
            return Err(RenderqError::missing_object(format!(
                "active camera '{name}' is not a camera"
            )));
        }
        Ok(obj)
    }

    /// Mutable [`Scene::active_camera`].
    pub fn active_camera_mut(&mut self) -> RenderqResult<&mut Object> {
        self.active_camera()?;
        let name = self.camera.clone().unwrap_or_default();
        self.object_mut(&name)
    }

    /// Names of all objects that are not meshes, in name order.
    pub fn non_mesh_objects(&self) -> Vec<String> {
        self.objects
            .values()
            .filter(|o| !o.is_mesh())
            .map(|o| o.name.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scene.rs"]
mod tests;
