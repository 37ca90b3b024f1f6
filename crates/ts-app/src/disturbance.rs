//! Inlet flow disturbance applied before each tick.

use crate::error::{AppError, AppResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use ts_project::InletDef;

/// Bounded random walk on the inlet flow.
#[derive(Debug, Clone)]
struct BrownianWalk {
    min: f64,
    max: f64,
    variance: f64,
    seed: Option<u64>,
    rng: StdRng,
    increment: Normal<f64>,
}

/// Source of inlet flow changes between operator commands.
#[derive(Debug, Clone, Default)]
pub struct InletDisturbance {
    walk: Option<BrownianWalk>,
}

impl InletDisturbance {
    /// Inlet held wherever the operator last put it.
    pub fn constant() -> Self {
        Self { walk: None }
    }

    /// Random walk with N(0, variance) increments, clamped to `[min, max]`.
    /// Without a seed the generator is seeded from the OS.
    pub fn brownian(min: f64, max: f64, variance: f64, seed: Option<u64>) -> AppResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(AppError::InvalidInput(format!(
                "inlet bounds must satisfy 0 <= min <= max, got min={min}, max={max}"
            )));
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "inlet variance must be finite and >= 0, got {variance}"
            )));
        }
        let increment = Normal::new(0.0, variance.sqrt()).map_err(|e| {
            AppError::InvalidInput(format!("inlet variance {variance} rejected: {e}"))
        })?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            walk: Some(BrownianWalk {
                min,
                max,
                variance,
                seed,
                rng,
                increment,
            }),
        })
    }

    pub fn from_def(def: &InletDef) -> AppResult<Self> {
        match *def {
            InletDef::Constant => Ok(Self::constant()),
            InletDef::Brownian {
                min,
                max,
                variance,
                seed,
            } => Self::brownian(min, max, variance, seed),
        }
    }

    pub fn to_def(&self) -> InletDef {
        match &self.walk {
            None => InletDef::Constant,
            Some(w) => InletDef::Brownian {
                min: w.min,
                max: w.max,
                variance: w.variance,
                seed: w.seed,
            },
        }
    }

    pub fn is_constant(&self) -> bool {
        self.walk.is_none()
    }

    /// Next inlet flow given the current one. `None` in constant mode.
    pub fn next(&mut self, current: f64) -> Option<f64> {
        let walk = self.walk.as_mut()?;
        let step = walk.increment.sample(&mut walk.rng);
        Some((current + step).clamp(walk.min, walk.max))
    }

    /// Restart a seeded walk from its seed.
    pub fn reset(&mut self) {
        if let Some(walk) = self.walk.as_mut()
            && let Some(seed) = walk.seed
        {
            walk.rng = StdRng::seed_from_u64(seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_never_moves() {
        let mut d = InletDisturbance::constant();
        assert_eq!(d.next(1.0), None);
        assert!(d.is_constant());
        assert_eq!(d.to_def(), InletDef::Constant);
    }

    #[test]
    fn walk_stays_in_bounds() {
        let mut d = InletDisturbance::brownian(0.8, 1.2, 0.01, Some(3)).unwrap();
        let mut q = 1.0;
        for _ in 0..10_000 {
            q = d.next(q).unwrap();
            assert!((0.8..=1.2).contains(&q));
        }
    }

    #[test]
    fn seeded_walk_is_reproducible() {
        let walk = |d: &mut InletDisturbance| {
            let mut q = 1.0;
            (0..50)
                .map(|_| {
                    q = d.next(q).unwrap();
                    q
                })
                .collect::<Vec<_>>()
        };
        let mut a = InletDisturbance::brownian(0.5, 1.5, 0.001, Some(42)).unwrap();
        let mut b = InletDisturbance::brownian(0.5, 1.5, 0.001, Some(42)).unwrap();
        let first = walk(&mut a);
        assert_eq!(first, walk(&mut b));
        a.reset();
        assert_eq!(first, walk(&mut a));
    }

    #[test]
    fn zero_variance_holds_value() {
        let mut d = InletDisturbance::brownian(0.0, 2.0, 0.0, Some(1)).unwrap();
        assert_eq!(d.next(1.3), Some(1.3));
    }

    #[test]
    fn invalid_settings_rejected() {
        assert!(InletDisturbance::brownian(1.2, 0.8, 0.01, None).is_err());
        assert!(InletDisturbance::brownian(-0.1, 0.8, 0.01, None).is_err());
        assert!(InletDisturbance::brownian(0.1, 0.8, -1.0, None).is_err());
        assert!(InletDisturbance::brownian(0.1, 0.8, f64::INFINITY, None).is_err());
        assert!(InletDisturbance::brownian(0.1, 0.8, f64::NAN, None).is_err());
    }

    #[test]
    fn agrees_with_project_validation() {
        let def = InletDef::Brownian {
            min: 0.8,
            max: 1.2,
            variance: f64::INFINITY,
            seed: None,
        };
        let mut project = ts_project::Project::new("inf");
        project.inlet = def;
        assert!(ts_project::validate_project(&project).is_err());
        assert!(InletDisturbance::from_def(&def).is_err());
    }
}
