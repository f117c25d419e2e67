/*!
 * Tests for window planning
 */

use audio_to_subs::errors::PlanningError;
use audio_to_subs::segmentation::{needs_splitting, plan_default, plan_segments, TimeWindow};

/// Short audio gets one window covering everything
#[test]
fn test_planSegments_withDurationBelowMax_shouldReturnSingleWindow() {
    let windows = plan_segments(120.5, 900.0, 2.0).unwrap();
    assert_eq!(windows, vec![TimeWindow::new(0.0, 120.5)]);
}

/// Duration exactly at the limit is still a single window
#[test]
fn test_planSegments_withDurationEqualToMax_shouldNotSplit() {
    let windows = plan_segments(900.0, 900.0, 2.0).unwrap();
    assert_eq!(windows.len(), 1);
    assert!(!needs_splitting(900.0, 900.0));
    assert!(needs_splitting(900.5, 900.0));
}

/// Consecutive windows overlap by exactly `overlap` and the last one ends at the duration
#[test]
fn test_planSegments_withLongAudio_shouldChainWindowsWithOverlap() {
    for &(duration, max_length, overlap) in &[(2000.0, 900.0, 2.0), (3601.7, 600.0, 5.5), (10.0, 3.0, 1.0)] {
        let windows = plan_segments(duration, max_length, overlap).unwrap();

        assert!(windows.len() > 1);
        assert_eq!(windows[0].start, 0.0);
        assert_eq!(windows.last().unwrap().end, duration);
        for pair in windows.windows(2) {
            assert_eq!(pair[1].start, pair[0].end - overlap);
            assert!(pair[1].start > pair[0].start);
        }
        for window in &windows {
            assert!(window.duration() <= max_length);
        }
    }
}

/// The three windows of a 2000 s file with the defaults
#[test]
fn test_planDefault_with2000Seconds_shouldMatchExpectedWindows() {
    let windows = plan_default(2000.0).unwrap();
    assert_eq!(
        windows,
        vec![
            TimeWindow::new(0.0, 900.0),
            TimeWindow::new(898.0, 1798.0),
            TimeWindow::new(1796.0, 2000.0),
        ]
    );
}

/// Invalid arguments are rejected with the offending value
#[test]
fn test_planSegments_withInvalidArguments_shouldFail() {
    assert_eq!(
        plan_segments(-1.0, 900.0, 2.0),
        Err(PlanningError::InvalidDuration { value: -1.0 })
    );
    assert_eq!(
        plan_segments(100.0, 0.0, 2.0),
        Err(PlanningError::InvalidMaxLength { value: 0.0 })
    );
    assert_eq!(
        plan_segments(100.0, 10.0, 10.0),
        Err(PlanningError::InvalidOverlap { overlap: 10.0, max_length: 10.0 })
    );
    assert!(plan_segments(f64::NAN, 900.0, 2.0).is_err());
    assert!(plan_segments(100.0, 900.0, 0.0).is_err());
}

/// Zero-length audio plans one empty window
#[test]
fn test_planSegments_withZeroDuration_shouldReturnEmptyWindow() {
    assert_eq!(plan_segments(0.0, 900.0, 2.0).unwrap(), vec![TimeWindow::new(0.0, 0.0)]);
}

/// Plans beyond the window limit are refused before allocating anything
#[test]
fn test_planSegments_withHugeDuration_shouldReturnTooManyWindows() {
    let result = std::panic::catch_unwind(|| plan_segments(1e300, 10.0, 2.0));

    let err = result.expect("planning must not panic").unwrap_err();
    assert!(matches!(err, PlanningError::TooManyWindows { .. }));
}
