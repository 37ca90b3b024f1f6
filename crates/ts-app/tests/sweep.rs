use ts_app::{AppError, sweep_gains};
use ts_sim::{Simulator, SimulatorConfig};

fn step_config() -> SimulatorConfig {
    let mut config = SimulatorConfig::default();
    config.controllers[0].initial_setpoint = 3.0;
    config
}

#[test]
fn stronger_gain_tracks_setpoint_step_better() {
    let points = sweep_gains(&step_config(), &[-0.2, -1.0, -3.0], 600).unwrap();
    let kcs: Vec<f64> = points.iter().map(|p| p.kc).collect();
    assert_eq!(kcs, vec![-0.2, -1.0, -3.0]);
    assert!(points[0].iae > points[1].iae);
    assert!(points[1].iae > points[2].iae);
}

#[test]
fn parallel_result_matches_single_run() {
    let config = step_config();
    let points = sweep_gains(&config, &[-1.0], 200).unwrap();

    let mut sim = Simulator::new(config).unwrap();
    let mut iae = 0.0;
    for _ in 0..200 {
        sim.step().unwrap();
        iae += sim.error(0).unwrap().abs() * sim.dt();
    }
    assert_eq!(points[0].iae, iae);
}

#[test]
fn open_loop_config_is_rejected() {
    let config = SimulatorConfig {
        controllers: Vec::new(),
        ..SimulatorConfig::default()
    };
    assert!(matches!(
        sweep_gains(&config, &[-1.0], 10),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn setpoint_above_tank_is_rejected() {
    let mut config = step_config();
    config.controllers[0].initial_setpoint = 50.0;
    let err = sweep_gains(&config, &[-1.0], 10).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.contains("initial_setpoint")));
}

#[test]
fn invalid_candidate_surfaces_as_simulation_error() {
    let err = sweep_gains(&step_config(), &[-1.0, f64::NAN], 10).unwrap_err();
    assert!(matches!(err, AppError::Simulation(_)));
}
