use super::*;
use crate::compositor::config::output_depth;
use crate::config::layout::OutputLayout;
use crate::host::scene::{CameraData, Object};
use crate::scheduler::task_scheduler::TaskScheduler;
use crate::tasks::{TaskContext, TaskKind};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "renderq_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn scene() -> Scene {
    let mut scene = Scene {
        frame_start: FrameIndex(1),
        frame_end: FrameIndex(3),
        ..Scene::default()
    };
    scene.render.resolution_x = 4;
    scene.render.resolution_y = 4;
    let mut cam = Object::new("Camera", ObjectKind::Camera(CameraData::default()));
    cam.location = [0.0, 6.0, 8.0];
    scene.add_object(cam);
    scene.camera = Some("Camera".to_string());

    let mut rig = Object::new("Armature", ObjectKind::Armature);
    for f in 1..=3 {
        rig.location = [f as f64, 2.0 * f as f64, 0.0];
        rig.keyframe_insert("location", FrameIndex(f)).unwrap();
    }
    scene.add_object(rig);
    scene
}

fn writing() -> HeadlessOpts {
    HeadlessOpts {
        write_images: true,
        ..HeadlessOpts::default()
    }
}

#[test]
fn sample_reports_camera_distance_and_mean_motion() {
    let mut host = HeadlessHost::new(scene(), HeadlessOpts::default());
    host.frame_set(FrameIndex(2)).unwrap();
    let s = host.sample_layers().unwrap();
    assert_eq!(s.depth, 10.0);
    assert_eq!(s.vector, [-1.0, -2.0, 1.0, 2.0]);
    assert_eq!(s.image[3], 1.0);

    host.scene_mut().render.film_transparent = true;
    assert_eq!(host.sample_layers().unwrap().image[3], 0.0);
}

#[test]
fn still_needs_a_camera_but_viewport_does_not() {
    let mut host = HeadlessHost::new(Scene::default(), HeadlessOpts::default());
    let err = host.render_still().unwrap_err();
    assert!(matches!(err, RenderqError::MissingObject(_)));
    assert!(host.renders().is_empty());

    host.render_viewport().unwrap();
    assert_eq!(host.renders().len(), 1);
    assert_eq!(host.renders()[0].kind, RenderKind::Viewport);
}

#[test]
fn still_writes_main_image_and_compositor_outputs() {
    let dir = temp_dir("headless_still");
    let mut host = HeadlessHost::new(scene(), writing());
    host.scene_mut().render.filepath = dir.join("tmp");
    output_depth(host.scene_mut(), 20.0, &dir.join("depth")).unwrap();
    host.frame_set(FrameIndex(3)).unwrap();
    host.render_still().unwrap();

    let rec = &host.renders()[0];
    assert_eq!(rec.kind, RenderKind::Still);
    assert_eq!(rec.frame, FrameIndex(3));
    assert_eq!(
        rec.files,
        vec![dir.join("tmp0003.png"), dir.join("depth/depth_0003.exr")]
    );
    assert!(rec.files.iter().all(|p| p.exists()));

    let depth = image::open(&rec.files[1]).unwrap().to_rgba32f();
    assert_eq!(depth.dimensions(), (4, 4));
    let px = depth.get_pixel(0, 0).0;
    assert!((px[0] - 0.5).abs() < 1e-6);
    assert_eq!(px[3], 1.0);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn viewport_writes_transparent_png_to_filepath() {
    let dir = temp_dir("headless_viewport");
    let mut host = HeadlessHost::new(scene(), writing());
    let path = dir.join("ani/0001.png");
    {
        let s = host.scene_mut();
        s.render.filepath = path.clone();
        s.render.film_transparent = true;
        s.render.color_mode = ColorMode::Rgba;
    }
    host.render_viewport().unwrap();

    assert_eq!(host.renders()[0].files, vec![path.clone()]);
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(1, 1).0, [204, 204, 204, 0]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn undo_restores_pushed_snapshot() {
    let mut host = HeadlessHost::new(scene(), HeadlessOpts::default());
    assert!(host.undo().is_err());

    host.undo_push("edit").unwrap();
    host.scene_mut().frame_end = FrameIndex(99);
    host.scene_mut().objects.clear();
    assert_eq!(host.undo_depth(), 1);

    host.undo().unwrap();
    assert_eq!(host.undo_depth(), 0);
    assert_eq!(host.scene(), &scene());
}

#[test]
fn timers_and_interface_lock() {
    let mut host = HeadlessHost::new(scene(), HeadlessOpts::default());
    let a = host.event_timer_add(Duration::from_millis(10));
    let b = host.event_timer_add(Duration::from_millis(20));
    assert_ne!(a, b);
    assert_eq!(host.active_timers(), 2);
    host.event_timer_remove(a);
    host.event_timer_remove(a);
    assert_eq!(host.active_timers(), 1);

    host.set_lock_interface(true);
    assert!(host.is_interface_locked());
    host.set_lock_interface(false);
    assert!(!host.is_interface_locked());
}

fn operator(tasks: &[TaskKind]) -> RenderOperator {
    let ctx = TaskContext {
        layout: OutputLayout::new("out"),
        depth_margin: 5.0,
        animated_object: "Armature".to_string(),
    };
    RenderOperator::new(
        TaskScheduler::new(tasks.iter().copied(), ctx),
        Duration::from_millis(1),
    )
}

#[test]
fn run_operator_drives_job_to_completion() {
    let mut host = HeadlessHost::new(scene(), HeadlessOpts::default());
    let mut op = operator(&[TaskKind::Viewport, TaskKind::OpticalFlow]);

    let status = host.run_operator(&mut op, None).unwrap();
    assert_eq!(status, ModalStatus::Finished);
    assert_eq!(host.renders().len(), 6);
    assert_eq!(host.active_timers(), 0);
    assert!(!host.is_interface_locked());
}

#[test]
fn run_operator_cancels_after_n_ticks() {
    let mut host = HeadlessHost::new(scene(), HeadlessOpts::default());
    let mut op = operator(&[TaskKind::Viewport]);

    let status = host.run_operator(&mut op, Some(2)).unwrap();
    assert_eq!(status, ModalStatus::Cancelled);
    assert_eq!(host.renders().len(), 2);
    assert_eq!(host.active_timers(), 0);
}
