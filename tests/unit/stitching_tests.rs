/*!
 * Tests for timestamp stitching
 */

use audio_to_subs::errors::StitchingError;
use audio_to_subs::stitching::stitch;
use crate::common::cue;

/// The offset comes from the previous chunk's last cue end, not the window length
#[test]
fn test_stitch_withTwoChunks_shouldCarryLastCueEnd() {
    let chunks = vec![vec![cue(0.0, 2.0, "a")], vec![cue(0.0, 3.0, "b")]];

    let stitched = stitch(&chunks).unwrap();

    assert_eq!(stitched, vec![cue(0.0, 2.0, "a"), cue(2.0, 5.0, "b")]);
}

/// Offsets accumulate across several chunks
#[test]
fn test_stitch_withThreeChunks_shouldAccumulateOffsets() {
    let chunks = vec![
        vec![cue(0.0, 4.0, "one"), cue(4.0, 898.5, "two")],
        vec![cue(1.0, 899.0, "three")],
        vec![cue(0.25, 10.0, "four")],
    ];

    let stitched = stitch(&chunks).unwrap();

    assert_eq!(stitched[2], cue(899.5, 1797.5, "three"));
    assert_eq!(stitched[3], cue(1797.75, 1807.5, "four"));
}

/// Texts are carried through unchanged and in order
#[test]
fn test_stitch_shouldPreserveTextAndOrder() {
    let chunks = vec![vec![cue(0.0, 1.0, "x\ny"), cue(1.0, 2.0, "")], vec![cue(0.0, 1.0, "z")]];

    let texts: Vec<String> = stitch(&chunks).unwrap().into_iter().map(|c| c.text).collect();

    assert_eq!(texts, vec!["x\ny", "", "z"]);
}

/// Malformed chunk data names the chunk and the cue
#[test]
fn test_stitch_withInvertedCue_shouldFail() {
    let chunks = vec![vec![cue(5.0, 4.0, "bad")]];

    let err = stitch(&chunks).unwrap_err();

    assert_eq!(err, StitchingError::InvertedRange { chunk: 0, cue: 0, start: 5.0, end: 4.0 });
    assert!(err.to_string().contains("Chunk 0, cue 0"));
}
