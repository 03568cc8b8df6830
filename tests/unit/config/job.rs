use super::*;
use crate::foundation::core::FrameIndex;
use crate::tasks::scheduled::Anchor;

#[test]
fn empty_json_uses_tool_defaults() {
    let cfg = JobConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("new_folder1"));
    assert_eq!(cfg.tasks, vec![TaskKind::Viewport, TaskKind::Depth]);
    assert_eq!(cfg.poll_interval(), Duration::from_millis(500));
    assert_eq!(cfg.depth_margin, 5.0);
    assert_eq!(cfg.animated_object, "Armature");
    assert!(cfg.camera.is_none());
    cfg.validate().unwrap();
}

#[test]
fn task_kinds_parse_with_interval_default() {
    let cfg = JobConfig::from_json_str(
        r#"{
            "tasks": [
                { "kind": "optical_flow" },
                { "kind": "scheduled_optical_flow" },
                { "kind": "scheduled_optical_flow", "interval_length": 4 }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(
        cfg.tasks,
        vec![
            TaskKind::OpticalFlow,
            TaskKind::ScheduledOpticalFlow { interval_length: 8 },
            TaskKind::ScheduledOpticalFlow { interval_length: 4 },
        ]
    );
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = JobConfig::from_json_str("{ \"tasks\": 3 }").unwrap_err();
    assert!(matches!(err, RenderqError::Serde(_)));
}

#[test]
fn validate_rejects_bad_tunables() {
    let mut cfg = JobConfig {
        tasks: vec![],
        ..JobConfig::default()
    };
    assert!(cfg.validate().is_err());

    cfg.tasks = vec![TaskKind::ScheduledOpticalFlow { interval_length: 0 }];
    assert!(cfg.validate().is_err());

    cfg.tasks = vec![TaskKind::Depth];
    cfg.poll_interval_ms = 0;
    assert!(cfg.validate().is_err());

    cfg.poll_interval_ms = 10;
    cfg.depth_margin = f64::NAN;
    assert!(cfg.validate().is_err());

    cfg.depth_margin = 1.0;
    cfg.validate().unwrap();
}

#[test]
fn prepare_scene_rigs_camera_and_rewinds() {
    let mut cfg = JobConfig::default();
    cfg.scene.frame_start = FrameIndex(3);
    cfg.scene.frame_end = FrameIndex(9);
    cfg.scene.frame_current = FrameIndex(7);
    cfg.camera = Some(CameraMotion {
        start: [
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        end: [
            [1.0, 0.0, 0.0, 0.5],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        start_frame: FrameIndex(1),
        end_frame: FrameIndex(24),
    });

    let scene = cfg.prepare_scene().unwrap();
    assert_eq!(scene.frame_current, FrameIndex(3));
    let cam = scene.active_camera().unwrap();
    assert!(cam.action.is_some());
    // The job's own scene is left untouched.
    assert!(cfg.scene.camera.is_none());
}

#[test]
fn plan_counts_steps_and_work_items() {
    let mut cfg = JobConfig {
        tasks: vec![
            TaskKind::Viewport,
            TaskKind::Depth,
            TaskKind::ScheduledOpticalFlow { interval_length: 8 },
        ],
        ..JobConfig::default()
    };
    cfg.scene.frame_start = FrameIndex(1);
    cfg.scene.frame_end = FrameIndex(25);

    let plan = cfg.plan().unwrap();
    assert_eq!(plan.tasks[0].steps, 25);
    assert_eq!(plan.tasks[1].steps, 25);
    assert_eq!(plan.tasks[2].steps, 40);
    assert_eq!(plan.total_steps, 25 + 25 + 40 + 1);

    let items = plan.tasks[2].work_items.as_ref().unwrap();
    assert_eq!(items[0].anchor, Anchor::Left(FrameIndex(1)));
    assert_eq!(items[1].anchor, Anchor::Right(FrameIndex(8)));
    assert_eq!(items[0].output_dir, PathBuf::from("new_folder1/1_8"));

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["tasks"][0]["task"]["kind"], "viewport");
    assert!(json["tasks"][0].get("work_items").is_none());
    assert_eq!(json["tasks"][2]["work_items"][1]["anchor"]["role"], "right");
}

#[test]
fn plan_with_no_intermediate_frames_still_takes_a_step() {
    let mut cfg = JobConfig {
        tasks: vec![TaskKind::ScheduledOpticalFlow { interval_length: 1 }],
        ..JobConfig::default()
    };
    cfg.scene.frame_start = FrameIndex(1);
    cfg.scene.frame_end = FrameIndex(4);
    let plan = cfg.plan().unwrap();
    assert_eq!(plan.tasks[0].work_items.as_ref().unwrap().len(), 0);
    assert_eq!(plan.tasks[0].steps, 1);
}
