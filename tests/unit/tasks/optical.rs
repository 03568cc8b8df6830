use super::*;
use crate::config::layout::OutputLayout;
use crate::foundation::core::FrameIndex;
use crate::host::headless::{HeadlessHost, HeadlessOpts};
use crate::host::scene::{CameraData, Object, ObjectKind, Scene};
use std::path::PathBuf;

fn fixture() -> (HeadlessHost, TaskContext) {
    let mut scene = Scene {
        frame_start: FrameIndex(4),
        frame_end: FrameIndex(5),
        ..Scene::default()
    };
    scene.add_object(Object::new(
        "Camera",
        ObjectKind::Camera(CameraData::default()),
    ));
    scene.camera = Some("Camera".to_string());
    let ctx = TaskContext {
        layout: OutputLayout::new("base"),
        depth_margin: 5.0,
        animated_object: "Armature".to_string(),
    };
    (HeadlessHost::new(scene, HeadlessOpts::default()), ctx)
}

#[test]
fn writes_forward_and_backward_flow_per_frame() {
    let (mut host, ctx) = fixture();
    let mut task = OpticalFlowTask;
    let mut state = RunState::default();
    task.set_rendering(&mut host, &mut state, &ctx).unwrap();
    assert!(host.scene().view_layer.use_pass_vector);
    state.frame_cursor = FrameIndex(4);

    let mut steps = 0;
    while !state.task_finished {
        state.rendering = true;
        task.render_next_frame(&mut host, &mut state, &ctx).unwrap();
        steps += 1;
    }
    assert_eq!(steps, 2);
    assert_eq!(
        host.renders()[0].files,
        vec![
            PathBuf::from("base/tmp0004.png"),
            PathBuf::from("base/optical/all/fwd_flow_0004.exr"),
            PathBuf::from("base/optical/all/bwd_flow_0004.exr"),
        ]
    );
}

#[test]
fn clear_twice_is_a_no_op() {
    let (mut host, ctx) = fixture();
    let mut task = OpticalFlowTask;
    let mut state = RunState::default();
    task.set_rendering(&mut host, &mut state, &ctx).unwrap();
    assert_eq!(host.scene().node_tree.len(), 6);
    task.clear_rendering(&mut host).unwrap();
    task.clear_rendering(&mut host).unwrap();
    assert!(host.scene().node_tree.is_empty());
}
