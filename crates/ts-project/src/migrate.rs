//! Schema migration framework.
//!
//! Migrations run on the untyped document so older layouts that no longer
//! deserialize into `Project` can still be lifted.

use crate::ProjectError;
use crate::schema::Project;
use serde_json::{Map, Value};

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut raw: Value) -> Result<Project, ProjectError> {
    loop {
        let version = version_of(&raw)?;
        if version >= LATEST_VERSION {
            break;
        }
        raw = migrate_one_version(version, raw)?;
    }
    Ok(serde_json::from_value(raw)?)
}

fn version_of(raw: &Value) -> Result<u32, ProjectError> {
    match raw.get("version") {
        None => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ProjectError::Migration {
                what: format!("version must be a non-negative integer, got {v}"),
            }),
    }
}

fn migrate_one_version(version: u32, raw: Value) -> Result<Value, ProjectError> {
    match version {
        0 => migrate_v0_to_v1(raw),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 kept `dt` beside `simulation` and had no history block.
fn migrate_v0_to_v1(raw: Value) -> Result<Value, ProjectError> {
    let Value::Object(mut doc) = raw else {
        return Err(ProjectError::Migration {
            what: "project document must be a mapping".to_string(),
        });
    };

    if let Some(dt) = doc.remove("dt") {
        let simulation = doc
            .entry("simulation")
            .or_insert_with(|| Value::Object(Map::new()));
        match simulation {
            Value::Object(sim) => {
                sim.entry("dt").or_insert(dt);
            }
            _ => {
                return Err(ProjectError::Migration {
                    what: "simulation must be a mapping".to_string(),
                });
            }
        }
    }

    doc.insert("version".to_string(), Value::from(1));
    Ok(Value::Object(doc))
}
