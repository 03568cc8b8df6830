use crate::foundation::{
    core::{FrameIndex, RowMajor4},
    error::{RenderqError, RenderqResult},
};
use crate::host::scene::{CameraData, LensUnit, Object, ObjectKind, Scene};

/// Name of the camera object the rig creates or reuses.
pub const CAMERA_NAME: &str = "Camera";
/// Horizontal field of view of the capture camera, in degrees.
pub const DEFAULT_FOV_DEG: f64 = 54.22;
/// Square output resolution set by [`add_camera`].
pub const DEFAULT_RESOLUTION: u32 = 512;
const SENSOR_WIDTH_MM: f64 = 36.0;

fn default_start_frame() -> FrameIndex {
    FrameIndex(1)
}

fn default_end_frame() -> FrameIndex {
    FrameIndex(24)
}

/// Two camera-to-world poses keyed at two frames; the host interpolates in between.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraMotion {
    /// Pose at `start_frame`.
    pub start: RowMajor4,
    /// Pose at `end_frame`.
    pub end: RowMajor4,
    /// Defaults to 1.
    #[serde(default = "default_start_frame")]
    pub start_frame: FrameIndex,
    /// Defaults to 24.
    #[serde(default = "default_end_frame")]
    pub end_frame: FrameIndex,
}

/// Make `Camera` the active camera, creating it if needed, and apply the capture intrinsics:
/// near clip 0.001, 54.22° field of view, 512x512 output.
pub fn add_camera(scene: &mut Scene) -> RenderqResult<()> {
    let cam = scene
        .objects
        .entry(CAMERA_NAME.to_string())
        .or_insert_with(|| Object::new(CAMERA_NAME, ObjectKind::Camera(CameraData::default())));
    let data = cam.camera_mut().ok_or_else(|| {
        RenderqError::validation(format!("object '{CAMERA_NAME}' exists but is not a camera"))
    })?;

    data.clip_start = 0.001;
    data.lens_unit = LensUnit::Fov;
    data.angle = DEFAULT_FOV_DEG.to_radians();
    data.lens = (SENSOR_WIDTH_MM / 2.0) / (data.angle / 2.0).tan();

    scene.camera = Some(CAMERA_NAME.to_string());
    scene.render.resolution_x = DEFAULT_RESOLUTION;
    scene.render.resolution_y = DEFAULT_RESOLUTION;
    Ok(())
}

/// Place the active camera from a row-major camera-to-world matrix.
///
/// The input follows the computer-vision convention (camera looking down +Z); the host camera
/// looks down -Z, hence the extra half turn about Y.
pub fn set_camera(scene: &mut Scene, c2w: &RowMajor4) -> RenderqResult<()> {
    let m = glam::DMat4::from_cols_array_2d(c2w).transpose();
    let (_scale, rotation, translation) = m.to_scale_rotation_translation();
    // Intrinsic ZYX equals the host's extrinsic XYZ Euler order.
    let (z, y, x) = rotation.to_euler(glam::EulerRot::ZYX);

    let cam = scene.active_camera_mut()?;
    cam.location = translation.to_array();
    cam.rotation_euler = [x, y + std::f64::consts::PI, z];
    Ok(())
}

/// Key location, rotation and lens of the active camera at both poses of `motion`.
pub fn set_keyframes(scene: &mut Scene, motion: &CameraMotion) -> RenderqResult<()> {
    if motion.start_frame >= motion.end_frame {
        return Err(RenderqError::validation(
            "camera start_frame must be before end_frame",
        ));
    }

    for (pose, frame) in [
        (&motion.start, motion.start_frame),
        (&motion.end, motion.end_frame),
    ] {
        scene.frame_current = frame;
        set_camera(scene, pose)?;
        let cam = scene.active_camera_mut()?;
        for path in ["location", "rotation_euler", "data.lens"] {
            cam.keyframe_insert(path, frame)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/camera/rig.rs"]
mod tests;
