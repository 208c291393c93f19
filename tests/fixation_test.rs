//! Fixation clustering behaviour on hand-built gaze sequences

use gaze_tracking::{fixation::FixationDetector, types::GazePoint};
use proptest::prelude::*;

fn point(x: f64, y: f64, t: i64) -> GazePoint {
    GazePoint::new(x, y, t, 1.0)
}

#[test]
fn test_distance_exactly_at_threshold_joins() {
    let detector = FixationDetector::default();
    let points = vec![
        point(0.0, 0.0, 0),
        point(0.0, 0.0, 60),
        point(0.0, 0.0, 120),
        point(50.0, 0.0, 180),
        point(500.0, 500.0, 240),
    ];

    let fixations = detector.detect(&points);
    assert_eq!(fixations.len(), 1);
    assert_eq!(fixations[0].duration, 180);
    assert!((fixations[0].x - 12.5).abs() < 1e-9);
}

#[test]
fn test_one_unit_beyond_threshold_starts_new_cluster() {
    let detector = FixationDetector::default();
    let points = vec![
        point(0.0, 0.0, 0),
        point(0.0, 0.0, 60),
        point(0.0, 0.0, 120),
        point(51.0, 0.0, 180),
        point(500.0, 500.0, 240),
    ];

    let fixations = detector.detect(&points);
    assert_eq!(fixations.len(), 1);
    assert_eq!(fixations[0].duration, 120);
    assert_eq!(fixations[0].x, 0.0);
}

#[test]
fn test_dwell_then_saccade_yields_single_fixation() {
    // 40 samples on a 30 px circle over 250 ms, then a 200 px jump
    let mut points: Vec<GazePoint> = (0..40)
        .map(|i| {
            let angle = f64::from(i * 9).to_radians();
            point(400.0 + 30.0 * angle.cos(), 300.0 + 30.0 * angle.sin(), i64::from(i) * 250 / 39)
        })
        .collect();
    points.push(point(600.0, 300.0, 400));

    let fixations = FixationDetector::default().detect(&points);
    assert_eq!(fixations.len(), 1);
    assert_eq!(fixations[0].duration, 250);
    assert_eq!(fixations[0].start_time, 0);
    assert!((fixations[0].x - 400.0).abs() < 5.0);
    assert!((fixations[0].y - 300.0).abs() < 5.0);
}

#[test]
fn test_short_dwell_is_not_a_fixation() {
    let points: Vec<GazePoint> = (0..5).map(|i| point(10.0, 10.0, i * 20)).collect();
    assert!(FixationDetector::default().detect(&points).is_empty());
}

#[test]
fn test_too_few_points_is_not_a_fixation() {
    let points = vec![point(10.0, 10.0, 0), point(10.0, 10.0, 500)];
    assert!(FixationDetector::default().detect(&points).is_empty());

    let lenient = FixationDetector::new(50.0, 100, 2);
    assert_eq!(lenient.detect(&points).len(), 1);
}

#[test]
fn test_empty_and_single_inputs() {
    let detector = FixationDetector::default();
    assert!(detector.detect(&[]).is_empty());
    assert!(detector.detect(&[point(1.0, 1.0, 0)]).is_empty());
}

#[test]
fn test_two_dwells_are_ordered() {
    let mut points: Vec<GazePoint> = (0..10).map(|i| point(100.0, 100.0, i * 20)).collect();
    points.extend((0..10).map(|i| point(700.0, 400.0, 400 + i * 20)));

    let fixations = FixationDetector::default().detect(&points);
    assert_eq!(fixations.len(), 2);
    assert!(fixations[0].start_time < fixations[1].start_time);
    assert_eq!(fixations[1].x, 700.0);
}

fn gaze_sequence() -> impl Strategy<Value = Vec<GazePoint>> {
    prop::collection::vec((0.0f64..1000.0, 0.0f64..1000.0, 1i64..80), 0..200).prop_map(|steps| {
        let mut t = 0;
        steps
            .into_iter()
            .map(|(x, y, dt)| {
                t += dt;
                point(x, y, t)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_detection_is_idempotent(points in gaze_sequence()) {
        let detector = FixationDetector::default();
        prop_assert_eq!(detector.detect(&points), detector.detect(&points));
    }

    #[test]
    fn prop_fixations_respect_thresholds(points in gaze_sequence()) {
        let fixations = FixationDetector::default().detect(&points);
        let last = points.last().map_or(0, |p| p.timestamp);
        for fixation in &fixations {
            prop_assert!(fixation.duration >= 100);
            prop_assert!(fixation.start_time + fixation.duration <= last);
        }
        for pair in fixations.windows(2) {
            prop_assert!(pair[0].start_time + pair[0].duration < pair[1].start_time);
        }
    }
}
