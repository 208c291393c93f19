//! Error handling tests for all modules

use gaze_tracking::{
    calibration::{CalibrationProgress, CalibrationTarget},
    config::Config,
    render::OverlayRenderer,
    session::SessionState,
    types::{CalibrationDomain, ImageBounds, Viewport},
    utils::safe_cast::f64_to_canvas_dim,
    Error,
};

#[test]
fn test_geometry_errors() {
    assert!(matches!(
        CalibrationDomain::new(0.0, 0.0, 0.0, 10.0),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        CalibrationDomain::new(10.0, 0.0, 0.0, 10.0),
        Err(Error::InvalidInput(_))
    ));
    assert!(CalibrationDomain::new(f64::NAN, 1.0, 0.0, 1.0).is_err());

    assert!(Viewport::new(0.0, 1080.0).validate().is_err());
    assert!(Viewport::new(1920.0, f64::INFINITY).validate().is_err());

    assert!(ImageBounds::new(0.0, 0.0, 800.0, 600.0, 0.0, 3000.0).validate().is_err());
    assert!(ImageBounds::new(f64::NAN, 0.0, 800.0, 600.0, 4000.0, 3000.0).validate().is_err());
}

#[test]
fn test_config_errors() {
    let result = Config::from_yaml("session: [not, a, map]");
    match result {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("Failed to parse")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }

    let mut config = Config::default();
    config.validation.confidence_floor = 1.5;
    match config.validate() {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("Confidence floor")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }

    let mut config = Config::default();
    config.fixation.min_points = 1;
    assert!(config.validate().is_err());

    assert!(matches!(Config::from_file("/nonexistent/gaze.yaml"), Err(Error::IoError(_))));
}

#[test]
fn test_calibration_progress_errors() {
    let mut progress = CalibrationProgress::new(CalibrationTarget::nine_point_grid(), 2);
    assert!(matches!(progress.confirm(9), Err(Error::InvalidInput(_))));
    assert!(!progress.confirm(0).unwrap());
    assert!(progress.confirm(0).unwrap());
    // Extra confirmations do not count toward other targets
    assert!(progress.confirm(0).unwrap());
    assert_eq!(progress.remaining(), 16);
}

#[test]
fn test_renderer_rejects_unusable_geometry() {
    let mut renderer = OverlayRenderer::default();
    let huge = ImageBounds::new(0.0, 0.0, 1.0e10, 10.0, 100.0, 100.0);
    assert!(renderer.ensure_canvas(&huge).is_err());
    assert!(f64_to_canvas_dim(-3.0).is_err());
}

#[test]
fn test_concurrent_error_handling() {
    use std::sync::Arc;
    use std::thread;

    let error = Arc::new(Error::InvalidInput("Test error".to_string()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let error_clone = Arc::clone(&error);
            thread::spawn(move || {
                let msg = format!("{}", error_clone);
                assert!(msg.contains("Test error"));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_error_display_formatting() {
    let errors = vec![
        Error::InvalidInput("Test input error".to_string()),
        Error::Initialization("Test camera error".to_string()),
        Error::SessionConflict("Test conflict".to_string()),
        Error::Persistence("Test store error".to_string()),
        Error::SampleSource("Test source error".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty());
        assert!(display.contains("Test"));
    }

    let transition = Error::InvalidTransition {
        from: SessionState::Tracking,
        action: "finish calibration",
    };
    assert_eq!(transition.to_string(), "Cannot finish calibration while session is tracking");
    assert_eq!(
        Error::CalibrationIncomplete { remaining: 3 }.to_string(),
        "Calibration incomplete: 3 confirmations outstanding"
    );
}
