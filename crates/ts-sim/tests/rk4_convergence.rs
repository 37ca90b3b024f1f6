//! Fourth-order convergence of the RK4 stepper on problems with closed-form
//! solutions.

use nalgebra::DVector;
use ts_model::{ProcessModel, TankModel, TankParameters};
use ts_sim::Rk4Stepper;

fn integrate<F>(
    stepper: &mut Rk4Stepper,
    x0: &[f64],
    input: &[f64],
    dt: f64,
    steps: usize,
    mut f: F,
) -> DVector<f64>
where
    F: FnMut(f64, &DVector<f64>, &DVector<f64>) -> DVector<f64>,
{
    let mut x = DVector::from_row_slice(x0);
    let u = DVector::from_row_slice(input);
    for i in 0..steps {
        x = stepper.step(i as f64 * dt, dt, &x, &u, &mut f).unwrap();
    }
    x
}

fn oscillator_error(dt: f64, t_end: f64) -> f64 {
    // x'' = -x, x(0) = 1, x'(0) = 0 -> x = cos t
    let steps = (t_end / dt).round() as usize;
    let mut rk4 = Rk4Stepper::new(2, 0).unwrap();
    let x = integrate(&mut rk4, &[1.0, 0.0], &[], dt, steps, |_, x, _| {
        DVector::from_row_slice(&[x[1], -x[0]])
    });
    let exact = DVector::from_row_slice(&[t_end.cos(), -t_end.sin()]);
    (x - exact).norm()
}

#[test]
fn harmonic_oscillator_error_ratio() {
    let coarse = oscillator_error(0.1, 10.0);
    let fine = oscillator_error(0.05, 10.0);
    let ratio = coarse / fine;
    assert!((12.0..=20.0).contains(&ratio), "ratio {ratio}");
}

#[test]
fn harmonic_oscillator_short_horizon() {
    let ratio = oscillator_error(0.1, 2.0) / oscillator_error(0.05, 2.0);
    assert!((12.0..=20.0).contains(&ratio), "ratio {ratio}");
}

fn drain_error(dt: f64) -> f64 {
    // q_in = 0, valve open: sqrt(h) falls linearly, h(t) = (sqrt(h0) - k x t / 2A)^2
    let params = TankParameters::default();
    let tank = TankModel::new(params).unwrap();
    let (h0, valve, t_end) = (4.0, 1.0, 100.0);
    let steps = (t_end / dt).round() as usize;
    let mut rk4 = Rk4Stepper::new(tank.state_dim(), tank.input_dim()).unwrap();
    let h = integrate(&mut rk4, &[h0], &[0.0, valve], dt, steps, |_, x, u| {
        tank.derivative(x, u)
    });
    let root = h0.sqrt() - params.valve_coefficient * valve * t_end / (2.0 * params.area);
    (h[0] - root * root).abs()
}

#[test]
fn draining_tank_error_ratio() {
    let ratio = drain_error(10.0) / drain_error(5.0);
    assert!((12.0..=20.0).contains(&ratio), "ratio {ratio}");
}
