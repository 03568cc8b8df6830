use super::*;
use crate::config::layout::OutputLayout;
use crate::foundation::core::FrameIndex;
use crate::host::headless::{HeadlessHost, HeadlessOpts, RenderKind};
use crate::host::scene::{CameraData, Object, ObjectKind, Scene};

fn fixture() -> (HeadlessHost, TaskContext) {
    let mut scene = Scene {
        frame_start: FrameIndex(1),
        frame_end: FrameIndex(3),
        ..Scene::default()
    };
    let mut cam = Object::new("Camera", ObjectKind::Camera(CameraData::default()));
    cam.location = [0.0, 0.0, 10.0];
    scene.add_object(cam);
    scene.add_object(Object::new("Cube", ObjectKind::Mesh));
    scene.add_object(Object::new("Light", ObjectKind::Light));
    let mut rig = Object::new("Armature", ObjectKind::Armature);
    rig.hide_viewport = true;
    scene.add_object(rig);
    scene.camera = Some("Camera".to_string());

    let ctx = TaskContext {
        layout: OutputLayout::new("out"),
        depth_margin: 5.0,
        animated_object: "Armature".to_string(),
    };
    (HeadlessHost::new(scene, HeadlessOpts::default()), ctx)
}

#[test]
fn renders_three_frames_with_padded_names() {
    let (mut host, ctx) = fixture();
    let mut task = ViewportTask::default();
    let mut state = RunState::default();

    task.set_rendering(&mut host, &mut state, &ctx).unwrap();
    state.frame_cursor = FrameIndex(1);
    assert!(!state.task_finished);

    for expected_finished in [false, false, true] {
        state.rendering = true;
        task.render_next_frame(&mut host, &mut state, &ctx).unwrap();
        assert_eq!(state.task_finished, expected_finished);
        assert!(!state.rendering);
    }

    let files: Vec<PathBuf> = host
        .renders()
        .iter()
        .map(|r| {
            assert_eq!(r.kind, RenderKind::Viewport);
            r.files[0].clone()
        })
        .collect();
    assert_eq!(
        files,
        vec![
            PathBuf::from("out/ani/0001.png"),
            PathBuf::from("out/ani/0002.png"),
            PathBuf::from("out/ani/0003.png"),
        ]
    );
}

#[test]
fn setup_hides_non_mesh_objects_and_switches_output() {
    let (mut host, ctx) = fixture();
    let mut task = ViewportTask::default();
    let mut state = RunState::default();
    task.set_rendering(&mut host, &mut state, &ctx).unwrap();

    let scene = host.scene();
    assert_eq!(scene.viewport_shading, ShadingType::Material);
    assert!(scene.render.film_transparent);
    assert_eq!(scene.render.file_format, FileFormat::Png);
    assert_eq!(scene.render.color_mode, ColorMode::Rgba);
    assert_eq!(scene.render.filepath, PathBuf::from("out/ani"));
    assert!(scene.object("Camera").unwrap().hide_viewport);
    assert!(scene.object("Light").unwrap().hide_viewport);
    assert!(!scene.object("Cube").unwrap().hide_viewport);
}

#[test]
fn clear_restores_prior_state_and_is_idempotent() {
    let (mut host, ctx) = fixture();
    let before = host.scene().clone();
    let mut task = ViewportTask::default();
    let mut state = RunState::default();

    task.set_rendering(&mut host, &mut state, &ctx).unwrap();
    task.clear_rendering(&mut host).unwrap();
    assert_eq!(host.scene(), &before);
    // Armature was hidden before the task started and stays hidden.
    assert!(host.scene().object("Armature").unwrap().hide_viewport);

    host.scene_mut().render.film_transparent = true;
    task.clear_rendering(&mut host).unwrap();
    assert!(host.scene().render.film_transparent);
}

#[test]
fn renders_without_an_active_camera() {
    let (mut host, ctx) = fixture();
    host.scene_mut().camera = None;
    let mut task = ViewportTask::default();
    let mut state = RunState::default();

    task.set_rendering(&mut host, &mut state, &ctx).unwrap();
    state.frame_cursor = FrameIndex(1);
    while !state.task_finished {
        state.rendering = true;
        task.render_next_frame(&mut host, &mut state, &ctx).unwrap();
    }
    assert_eq!(host.renders().len(), 3);
}
