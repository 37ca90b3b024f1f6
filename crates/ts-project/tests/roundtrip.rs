use ts_project::*;

fn scripted_project() -> Project {
    let mut project = Project::new("Roundtrip");
    project.history = HistoryDef {
        capacity: 500,
        record_every: 2,
    };
    project.events = vec![
        EventDef {
            at_s: 10.0,
            action: EventAction::SetSetpoint {
                controller: 0,
                value: 3.0,
            },
        },
        EventDef {
            at_s: 20.0,
            action: EventAction::SetGains {
                controller: 0,
                gains: ts_controls::Gains::new(-2.0, 20.0, 0.0),
            },
        },
        EventDef {
            at_s: 30.0,
            action: EventAction::Reset,
        },
    ];
    project
}

#[test]
fn roundtrip_yaml() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("project.yaml");
    let project = scripted_project();
    save_yaml(&path, &project).unwrap();
    assert_eq!(load_yaml(&path).unwrap(), project);
    assert_eq!(load(&path).unwrap(), project);
}

#[test]
fn roundtrip_json() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("project.json");
    let project = scripted_project();
    save(&path, &project).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().starts_with('{'));
    assert_eq!(load_json(&path).unwrap(), project);
}

#[test]
fn invalid_project_is_not_written() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("bad.yaml");
    let mut project = scripted_project();
    project.simulation.initial_state = vec![];
    let err = save_yaml(&path, &project).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
    assert!(!path.exists());
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let content = r#"
version: 1
name: bad controller
simulation:
  model: { area: 120.0, k_v: 1.2649, max_height: 5.0 }
  controllers:
    - gains: { Kc: -1.0, tau_I: -10.0, tau_D: 0.0 }
      min_output: 0.0
      max_output: 1.0
      max_integral: 10.0
      measured_index: 0
      output_index: 1
      initial_setpoint: 2.5
  initial_state: [2.5]
  initial_inputs: [1.0, 0.5]
  dt: 1.0
"#;
    let err = from_yaml_str(content).unwrap_err();
    assert!(err.to_string().contains("tau_I must be >= 0"), "{err}");
}
