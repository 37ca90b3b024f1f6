//! Integration test: controller behavior against reference scenarios.
//!
//! Covers the proportional, integral, saturation and reset scenarios plus the
//! anti-windup comparison between a saturated and an unsaturated controller.

use ts_controls::{ControlError, ErrorDifferentiator, Gains, PidController};

const TOL: f64 = 1e-3;

fn controller(gains: Gains, min: f64, max: f64) -> PidController {
    PidController::new(gains, 0.5, min, max, 10.0).unwrap()
}

#[test]
fn scenario_a_proportional() {
    let mut pid = controller(Gains::new(1.0, 0.0, 0.0), 0.0, 1.0);
    assert!((pid.compute(0.1, 0.0, 1.0) - 0.6).abs() < TOL);
}

#[test]
fn scenario_b_integral_ramp() {
    let mut pid = controller(Gains::new(1.0, 10.0, 0.0), 0.0, 1.0);
    let outputs: Vec<f64> = (0..3).map(|_| pid.compute(0.1, 0.0, 1.0)).collect();
    for (got, want) in outputs.iter().zip([0.6, 0.61, 0.62]) {
        assert!((got - want).abs() < TOL, "got {got}, want {want}");
    }
}

#[test]
fn scenario_d_saturation() {
    let mut pid = controller(Gains::new(1.0, 0.0, 0.0), 0.0, 1.0);
    assert_eq!(pid.compute(1.0, 0.0, 1.0), 1.0);
    assert_eq!(pid.compute(-1.0, 0.0, 1.0), 0.0);
}

#[test]
fn integral_raises_output_monotonically() {
    let mut pid = controller(Gains::new(1.0, 5.0, 0.0), -100.0, 100.0);
    let mut last = f64::NEG_INFINITY;
    for _ in 0..20 {
        let out = pid.compute(0.2, 0.0, 1.0);
        assert!(out > last);
        last = out;
    }
}

#[test]
fn anti_windup_limits_growth_under_saturation() {
    let gains = Gains::new(1.0, 10.0, 0.0);
    let mut saturated = controller(gains, 0.0, 1.0);
    let mut linear = controller(gains, -100.0, 100.0);

    for _ in 0..30 {
        assert_eq!(saturated.compute(1.0, 0.0, 1.0), 1.0);
        linear.compute(1.0, 0.0, 1.0);
        assert!(saturated.integral_state().abs() <= saturated.max_integral());
    }

    assert!(saturated.integral_state() < linear.integral_state());
    assert_eq!(linear.integral_state(), 10.0);
}

#[test]
fn reset_matches_fresh_controller() {
    let gains = Gains::new(1.5, 4.0, 0.5);
    let mut used = controller(gains, 0.0, 1.0);
    for i in 0..25 {
        used.compute(0.05 * i as f64, 0.01, 0.5);
    }
    used.reset();

    let mut fresh = controller(gains, 0.0, 1.0);
    assert_eq!(used.compute(0.1, 0.0, 0.5), fresh.compute(0.1, 0.0, 0.5));
    assert_eq!(used.integral_state(), fresh.integral_state());
}

#[test]
fn derivative_action_from_differentiator() {
    let mut pid = controller(Gains::new(1.0, 0.0, 2.0), -10.0, 10.0);
    let mut diff = ErrorDifferentiator::new(0.0);
    let dt = 1.0;
    let e = 0.25;
    let out = pid.compute(e, diff.update(e, dt), dt);
    // 0.5 + (0.25 + 2.0 * 0.25)
    assert!((out - 1.25).abs() < 1e-12);
}

#[test]
fn constructor_errors_name_the_constraint() {
    let err = PidController::new(Gains::new(1.0, -2.0, 0.0), 0.5, 0.0, 1.0, 10.0).unwrap_err();
    assert!(err.to_string().contains("tau_I must be >= 0, got -2"));

    let err = PidController::new(Gains::new(1.0, 1.0, 0.0), 0.5, 2.0, 1.0, 10.0).unwrap_err();
    assert_eq!(err, ControlError::InvalidLimits { min: 2.0, max: 1.0 });

    let err = PidController::new(Gains::new(1.0, 1.0, 0.0), 0.5, 0.0, 1.0, -1.0).unwrap_err();
    assert!(err.to_string().contains("max_integral must be >= 0, got -1"));
}
