//! Sampling tests against reference curve values.

use approx::assert_abs_diff_eq;
use sensation_curves::{BezierPath, CurveError, Keyframe, Point};

const TOLERANCE: f32 = 1e-4;

fn single_segment() -> Result<BezierPath, CurveError> {
    BezierPath::new(vec![
        Keyframe::new(Point::new(0.0, 0.0)).with_out_tangent(Point::new(0.6, 0.0)),
        Keyframe::new(Point::new(1.8, 2.0)).with_in_tangent(Point::new(1.2, -1.279795)),
    ])
}

fn three_keyframes() -> Result<BezierPath, CurveError> {
    BezierPath::new(vec![
        Keyframe::new(Point::new(0.0, 0.3)).with_out_tangent(Point::new(0.1325325, 0.3)),
        Keyframe::new(Point::new(0.3975974, 1.333954))
            .with_in_tangent(Point::new(0.2650649, 1.161977))
            .with_out_tangent(Point::new(0.8650649, 1.940549)),
        Keyframe::new(Point::new(1.8, 2.0)).with_in_tangent(Point::new(1.332533, -0.5553294)),
    ])
}

#[test]
fn single_segment_sampled_every_tenth_of_a_second() -> Result<(), CurveError> {
    let expected = [
        0.0, -0.01084869, -0.03938968, -0.0796154, -0.1255182, -0.1710906, -0.2103248,
        -0.2372134, -0.2457487, -0.2299231, -0.1837291, -0.101159, 0.02379485, 0.1971399,
        0.4248839, 0.7130347, 1.067599, 1.494586,
    ];

    let mut timeline = single_segment()?.timeline();
    let mut value = timeline.advance(0.0);
    for (step, want) in expected.iter().enumerate() {
        assert_abs_diff_eq!(value, *want, epsilon = TOLERANCE);
        assert!(!timeline.is_finished(), "finished early at step {step}");
        value = timeline.advance(0.1);
    }
    Ok(())
}

#[test]
fn multiple_segments_sampled_every_tenth_of_a_second() -> Result<(), CurveError> {
    let expected = [
        0.3, 0.438888, 0.7567842, 1.105537, 1.337044, 1.420382, 1.427235, 1.37534, 1.282435,
        1.166256, 1.044542, 0.9350283, 0.8554535, 0.8235546, 0.8570688, 0.9737334, 1.191285,
        1.527464,
    ];

    let mut timeline = three_keyframes()?.timeline();
    let mut value = timeline.advance(0.0);
    for want in expected {
        assert_abs_diff_eq!(value, want, epsilon = TOLERANCE);
        value = timeline.advance(0.1);
    }
    Ok(())
}

#[test]
fn large_step_skips_whole_segments() -> Result<(), CurveError> {
    let mut timeline = three_keyframes()?.timeline();
    assert_abs_diff_eq!(timeline.advance(0.4), 1.337044, epsilon = TOLERANCE);
    assert_abs_diff_eq!(timeline.advance(0.4), 1.282435, epsilon = TOLERANCE);
    assert_abs_diff_eq!(timeline.advance(0.4), 0.8554535, epsilon = TOLERANCE);
    Ok(())
}

#[test]
fn overshooting_the_end_yields_final_value() -> Result<(), CurveError> {
    let mut timeline = three_keyframes()?.timeline();
    assert_abs_diff_eq!(timeline.advance(4.0), 2.0, epsilon = TOLERANCE);
    assert!(timeline.is_finished());
    Ok(())
}

#[test]
fn finishes_only_after_passing_last_keyframe() -> Result<(), CurveError> {
    let mut timeline = three_keyframes()?.timeline();
    timeline.advance(0.5);
    assert!(!timeline.is_finished());
    timeline.advance(1.3001);
    assert!(timeline.is_finished());
    Ok(())
}

#[test]
fn bounding_box_covers_dip_below_start() -> Result<(), CurveError> {
    let range = single_segment()?.bounding_box();
    assert_abs_diff_eq!(range.max, 2.0, epsilon = TOLERANCE);
    // sampled minimum is -0.2457 near t = 0.44; the analytic one is lower still
    assert!(range.min <= -0.2457);
    assert!(range.min > -0.26);
    Ok(())
}

#[test]
fn bounding_box_spans_every_segment() -> Result<(), CurveError> {
    let range = three_keyframes()?.bounding_box();
    assert_abs_diff_eq!(range.max, 2.0, epsilon = TOLERANCE);
    assert!(range.min <= 0.3);
    assert!(range.min > 0.0);
    Ok(())
}
