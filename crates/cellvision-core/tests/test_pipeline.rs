mod common;

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use ndarray::Array3;
use cellvision_core::error::VisionError;
use cellvision_core::frame::{Frame, FrameMetadata};
use cellvision_core::geometry::{bearing, Target};
use cellvision_core::pipeline::{
    CellPipeline, PipelineConfig, PipelineDriver, PipelineStage, StageReporter, StalePolicy,
    VisionPipeline,
};
use cellvision_core::telemetry::TelemetryTable;
use cellvision_core::video::{LatestFrameSink, NullVideoSink};

use common::{blank_frame, cell_frame, count_set, default_config};

const ANGLE_KEY: &str = "CellVisionAngle";
const VERTICAL_KEY: &str = "CellVisionVerticalAngle";
const DISTANCE_KEY: &str = "CellVisionDistance";
const RADIUS_KEY: &str = "CellVisionRadius";

fn driver_with_table(config: PipelineConfig) -> (PipelineDriver, Arc<TelemetryTable>, LatestFrameSink) {
    let config = Arc::new(config);
    let table = Arc::new(TelemetryTable::new(config.telemetry.table.clone()));
    let canvas = LatestFrameSink::new();
    let driver = PipelineDriver::headless(config, table.clone(), Box::new(canvas.clone()));
    (driver, table, canvas)
}

#[derive(Default)]
struct Recorder {
    stages: Mutex<Vec<PipelineStage>>,
    frames: Mutex<Vec<(usize, bool)>>,
}

impl StageReporter for Recorder {
    fn enter_stage(&self, stage: PipelineStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn frame_done(&self, frame_index: usize, target: Option<&Target>) {
        self.frames.lock().unwrap().push((frame_index, target.is_some()));
    }
}

// ---------------------------------------------------------------------------
// End-to-end detection
// ---------------------------------------------------------------------------

#[test]
fn test_single_disc_yields_one_target() {
    let config = default_config();
    let mut pipeline = CellPipeline::new(Arc::new(config.clone()));
    let frame = cell_frame(100.0, 75.0, 15.0);

    let outcome = pipeline.process(&frame).expect("process");
    assert_eq!(outcome.candidate_count, 1);
    let target = outcome.target.expect("target");
    let c = &target.candidate;

    assert!((c.radius - 15.0).abs() <= 1.0, "radius {}", c.radius);
    assert!((c.center.x - 100.0).abs() <= 1.0, "center x {}", c.center.x);
    assert!((c.center.y - 75.0).abs() <= 1.0, "center y {}", c.center.y);

    let expected = bearing(c.center, config.geometry.reference_point);
    assert_abs_diff_eq!(target.horizontal_angle, expected.horizontal, epsilon = 1e-6);
    assert_abs_diff_eq!(target.vertical_angle, expected.vertical, epsilon = 1e-6);
    assert_abs_diff_eq!(
        target.distance,
        config.geometry.object_diameter * config.geometry.focal_length / (2.0 * c.radius),
        epsilon = 1e-6
    );
    // Right of and below the reference point.
    assert!(target.horizontal_angle > 0.0);
}

#[test]
fn test_annotation_traces_the_target() {
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let frame = cell_frame(60.0, 50.0, 12.0);
    let outcome = pipeline.process(&frame).expect("process");
    let target = outcome.target.clone().expect("target");
    let canvas = outcome.annotated;

    assert_eq!(canvas.dim(), (frame.height(), frame.width()));
    assert!(count_set(canvas) > 0);
    let c = &target.candidate;
    for ((row, col), &v) in canvas.indexed_iter() {
        if v != 0 {
            assert_eq!(v, 255);
            let d = c.center.distance(&cellvision_core::detection::Point::new(col as f64, row as f64));
            assert!(d <= c.radius + 2.0, "pixel ({col}, {row}) at {d}");
        }
    }
}

#[test]
fn test_blank_frame_has_no_target_and_blank_canvas() {
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let outcome = pipeline.process(&blank_frame()).expect("process");
    assert!(outcome.target.is_none());
    assert_eq!(outcome.candidate_count, 0);
    assert_eq!(count_set(outcome.annotated), 0);
}

#[test]
fn test_disc_outside_radius_band_is_ignored() {
    let mut config = default_config();
    config.detection.max_radius = 10.0;
    let mut pipeline = CellPipeline::new(Arc::new(config));
    let outcome = pipeline.process(&cell_frame(80.0, 60.0, 20.0)).expect("process");
    assert_eq!(outcome.candidate_count, 1);
    assert!(outcome.target.is_none());
    assert_eq!(count_set(outcome.annotated), 0);
}

#[test]
fn test_larger_of_two_discs_is_selected() {
    let mut frame = cell_frame(40.0, 60.0, 8.0);
    let big = cell_frame(115.0, 60.0, 16.0);
    for row in 0..frame.height() {
        for col in 75..frame.width() {
            for ch in 0..3 {
                frame.data[[row, col, ch]] = big.data[[row, col, ch]];
            }
        }
    }
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let outcome = pipeline.process(&frame).expect("process");
    assert_eq!(outcome.candidate_count, 2);
    let target = outcome.target.expect("target");
    assert!((target.candidate.center.x - 115.0).abs() <= 1.0);
}

#[test]
fn test_speckle_noise_is_cleaned() {
    let mut frame = cell_frame(80.0, 60.0, 14.0);
    for &(row, col) in &[(5, 5), (10, 140), (110, 20), (100, 150)] {
        for ch in 0..3 {
            frame.data[[row, col, ch]] = common::CELL_COLOR[ch];
        }
    }
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let outcome = pipeline.process(&frame).expect("process");
    assert_eq!(outcome.candidate_count, 1);
    assert!(outcome.target.is_some());
    assert!(count_set(pipeline.mask()) > count_set(pipeline.cleaned_mask()));
}

#[test]
fn test_median_blur_keeps_detection() {
    let mut config = default_config();
    config.detection.median_blur = 7;
    let mut pipeline = CellPipeline::new(Arc::new(config));
    let outcome = pipeline.process(&cell_frame(80.0, 60.0, 15.0)).expect("process");
    let target = outcome.target.expect("target");
    assert!((target.candidate.radius - 15.0).abs() <= 1.5);
}

// ---------------------------------------------------------------------------
// Pass independence
// ---------------------------------------------------------------------------

#[test]
fn test_same_frame_twice_is_bit_identical() {
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let frame = cell_frame(70.0, 40.0, 13.0);

    let first = pipeline.process(&frame).expect("process").target;
    let mask_a = pipeline.mask().clone();
    let canvas_a = pipeline.canvas().clone();

    let second = pipeline.process(&frame).expect("process").target;
    assert_eq!(first, second);
    assert_eq!(&mask_a, pipeline.mask());
    assert_eq!(&canvas_a, pipeline.canvas());
}

#[test]
fn test_previous_frame_does_not_leak() {
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    assert!(pipeline.process(&cell_frame(80.0, 60.0, 15.0)).expect("process").target.is_some());
    let outcome = pipeline.process(&blank_frame()).expect("process");
    assert!(outcome.target.is_none());
    assert_eq!(count_set(outcome.annotated), 0);
    assert_eq!(count_set(pipeline.mask()), 0);
}

#[test]
fn test_dimension_mismatch_is_rejected() {
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let small = Frame::filled(80, 60, [0, 0, 0]);
    let err = pipeline.process(&small).unwrap_err();
    match err {
        VisionError::DimensionMismatch {
            expected_width,
            expected_height,
            actual_width,
            actual_height,
            ..
        } => {
            assert_eq!((expected_width, expected_height), (160, 120));
            assert_eq!((actual_width, actual_height), (80, 60));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(pipeline.stage(), PipelineStage::Idle);
}

#[test]
fn test_wrong_channel_count_is_rejected() {
    let mut pipeline = CellPipeline::new(Arc::new(default_config()));
    let rgba = Frame {
        data: Array3::zeros((120, 160, 4)),
        metadata: FrameMetadata::default(),
    };
    match pipeline.process(&rgba) {
        Err(VisionError::DimensionMismatch {
            expected_channels,
            actual_channels,
            ..
        }) => assert_eq!((expected_channels, actual_channels), (3, 4)),
        other => panic!("unexpected result: {:?}", other.map(|o| o.target)),
    }
    assert_eq!(pipeline.stage(), PipelineStage::Idle);
}

#[test]
fn test_standalone_pipeline_returns_to_idle() {
    let recorder = Arc::new(Recorder::default());
    let mut pipeline = CellPipeline::new(Arc::new(default_config())).with_reporter(recorder.clone());
    assert_eq!(pipeline.stage(), PipelineStage::Idle);

    assert!(pipeline.process(&cell_frame(80.0, 60.0, 15.0)).expect("process").target.is_some());
    assert_eq!(pipeline.stage(), PipelineStage::Idle);
    assert_eq!(
        recorder.stages.lock().unwrap().last(),
        Some(&PipelineStage::EstimatingGeometry)
    );

    assert!(pipeline.process(&blank_frame()).expect("process").target.is_none());
    assert_eq!(pipeline.stage(), PipelineStage::Idle);
}

// ---------------------------------------------------------------------------
// Driver: telemetry, video, stages
// ---------------------------------------------------------------------------

#[test]
fn test_driver_publishes_target() {
    let (mut driver, table, canvas) = driver_with_table(default_config());
    let target = driver.run_pass(&cell_frame(100.0, 75.0, 15.0)).expect("pass").expect("target");

    assert_eq!(table.name(), "visionTable");
    assert_eq!(table.get_number(ANGLE_KEY), Some(target.horizontal_angle));
    assert_eq!(table.get_number(VERTICAL_KEY), Some(target.vertical_angle));
    assert_eq!(table.get_number(DISTANCE_KEY), Some(target.distance));
    assert_eq!(table.get_number(RADIUS_KEY), Some(target.candidate.radius));
    assert_eq!(canvas.frames_received(), 1);
    assert!(count_set(&canvas.latest().expect("canvas")) > 0);
    assert_eq!(driver.stage(), PipelineStage::Idle);
}

#[test]
fn test_hold_policy_keeps_last_values() {
    let (mut driver, table, canvas) = driver_with_table(default_config());
    driver.run_pass(&cell_frame(100.0, 75.0, 15.0)).expect("pass");
    let before = table.snapshot();

    assert!(driver.run_pass(&blank_frame()).expect("pass").is_none());
    assert_eq!(table.snapshot(), before);
    assert_eq!(before.len(), 4);
    // The blank canvas is still pushed.
    assert_eq!(canvas.frames_received(), 2);
    assert_eq!(count_set(&canvas.latest().expect("canvas")), 0);
}

#[test]
fn test_invalidate_policy_clears_values() {
    let mut config = default_config();
    config.telemetry.stale_policy = StalePolicy::Invalidate;
    let (mut driver, table, _canvas) = driver_with_table(config);
    driver.run_pass(&cell_frame(100.0, 75.0, 15.0)).expect("pass");
    assert_eq!(table.snapshot().len(), 4);

    driver.run_pass(&blank_frame()).expect("pass");
    assert!(table.snapshot().is_empty());
}

#[test]
fn test_no_target_publishes_nothing_on_fresh_table() {
    let (mut driver, table, _canvas) = driver_with_table(default_config());
    driver.run_pass(&blank_frame()).expect("pass");
    assert!(table.snapshot().is_empty());
}

#[test]
fn test_custom_keys_are_used() {
    let mut config = default_config();
    config.telemetry.distance_key = "range".into();
    let (mut driver, table, _canvas) = driver_with_table(config);
    driver.run_pass(&cell_frame(80.0, 60.0, 15.0)).expect("pass");
    assert!(table.get_number("range").is_some());
    assert!(table.get_number(DISTANCE_KEY).is_none());
}

#[test]
fn test_failed_pass_publishes_nothing() {
    let (mut driver, table, canvas) = driver_with_table(default_config());
    let err = driver.run_pass(&Frame::filled(10, 10, [0, 0, 0]));
    assert!(matches!(err, Err(VisionError::DimensionMismatch { .. })));
    assert!(table.snapshot().is_empty());
    assert_eq!(canvas.frames_received(), 0);
    assert_eq!(driver.stats().frames_processed, 0);
    assert_eq!(driver.stage(), PipelineStage::Idle);
}

#[test]
fn test_stages_run_in_order() {
    let config = Arc::new(default_config());
    let recorder = Arc::new(Recorder::default());
    let table = Arc::new(TelemetryTable::new("t"));
    let mut driver = PipelineDriver::new(config, table, Box::new(NullVideoSink), recorder.clone());

    driver.run_pass(&cell_frame(80.0, 60.0, 15.0).with_index(7)).expect("pass");
    assert_eq!(
        *recorder.stages.lock().unwrap(),
        vec![
            PipelineStage::Preprocessing,
            PipelineStage::Segmenting,
            PipelineStage::Cleaning,
            PipelineStage::ExtractingContours,
            PipelineStage::SelectingCandidate,
            PipelineStage::EstimatingGeometry,
            PipelineStage::Publishing,
            PipelineStage::Idle,
        ]
    );

    recorder.stages.lock().unwrap().clear();
    driver.run_pass(&blank_frame().with_index(8)).expect("pass");
    let stages = recorder.stages.lock().unwrap().clone();
    assert!(!stages.contains(&PipelineStage::EstimatingGeometry));
    assert_eq!(stages.last(), Some(&PipelineStage::Idle));

    assert_eq!(*recorder.frames.lock().unwrap(), vec![(7, true), (8, false)]);
    let stats = driver.finish().expect("finish");
    assert_eq!(stats.frames_processed, 2);
    assert_eq!(stats.targets_found, 1);
}
