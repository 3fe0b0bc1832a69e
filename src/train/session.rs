use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::network::mlp::Mlp;
use crate::optim::optimizer::Optimizer;
use crate::playground::boundary::DecisionGrid;
use crate::playground::points::{LabeledPoint, PointSet};
use crate::train::runs::{Run, RunHistory};
use crate::train::tick_stats::TickStats;
use crate::train::train_config::SessionConfig;
use crate::train::trainer::train_tick;

/// Where the session is in its train / stop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// No ticks are being scheduled; manual ticks are still allowed.
    Idle,
    /// Ticks are being scheduled.
    Training,
    /// Training was stopped; `start` resumes it.
    Stopped,
}

/// Serializable snapshot of a session, for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub status: TrainingStatus,
    pub layers: Option<Vec<usize>>,
    pub activation: Option<String>,
    pub points: usize,
    pub class_counts: [usize; 2],
    pub step_count: u64,
    pub last_loss: Option<f64>,
    pub active_run: Option<String>,
}

/// One playground: the painted points, the model being trained on them, its
/// optimizer, and the loss history.
///
/// Everything happens on the caller's thread. A tick runs to completion;
/// `start` and `stop` only flip the status that a scheduler consults before
/// running the next tick.
pub struct Session {
    config: SessionConfig,
    model: Option<Mlp>,
    optimizer: Option<Optimizer>,
    points: PointSet,
    runs: RunHistory,
    step_count: u64,
    status: TrainingStatus,
    last_loss: Option<f64>,
    rng: StdRng,
}

impl Session {
    pub fn new() -> Session {
        Session::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Session {
        Session::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Session {
        Session {
            config: SessionConfig::default(),
            model: None,
            optimizer: None,
            points: PointSet::new(),
            runs: RunHistory::default(),
            step_count: 0,
            status: TrainingStatus::Idle,
            last_loss: None,
            rng,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&Mlp> {
        self.model.as_ref()
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn runs(&self) -> &RunHistory {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut RunHistory {
        &mut self.runs
    }

    /// Opens a new run and makes it active.
    pub fn new_run(&mut self) -> &Run {
        self.runs.new_run(&mut self.rng)
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn training_status(&self) -> TrainingStatus {
        self.status
    }

    pub fn is_training(&self) -> bool {
        self.status == TrainingStatus::Training
    }

    pub fn last_loss(&self) -> Option<f64> {
        self.last_loss
    }

    /// Builds a fresh model and optimizer from `config` and resets the step
    /// counter. On error the previous model and config are kept.
    pub fn build(&mut self, config: SessionConfig) -> Result<()> {
        let (sizes, activation) = config.resolve()?;
        let model = Mlp::with_rng(&sizes, activation, &mut self.rng)?;
        let optimizer = Optimizer::new(config.optimizer, &model)?;

        if config.history_cap != self.config.history_cap {
            info!("loss history cap is {}; existing runs are dropped", config.history_cap);
            self.runs = RunHistory::with_cap(config.history_cap);
        }

        self.model = Some(model);
        self.optimizer = Some(optimizer);
        self.config = config;
        self.step_count = 0;
        self.status = TrainingStatus::Idle;
        Ok(())
    }

    /// Rebuilds with the current config, drawing new weights.
    pub fn reset(&mut self) -> Result<()> {
        if self.model.is_none() {
            return Err(Error::NoModel);
        }
        self.build(self.config.clone())
    }

    pub fn add_point(&mut self, point: LabeledPoint) -> Result<()> {
        self.points.add(point)
    }

    pub fn erase_points(&mut self, x: f64, y: f64, radius: f64) -> usize {
        self.points.erase_within(x, y, radius)
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
        self.last_loss = None;
    }

    /// Marks the session as training, opening a run if none is active.
    /// Returns `false` if it already was.
    pub fn start(&mut self) -> bool {
        if self.is_training() {
            return false;
        }
        if self.runs.active().is_none() {
            self.runs.new_run(&mut self.rng);
        }
        self.status = TrainingStatus::Training;
        true
    }

    /// Stops scheduling further ticks. Returns `false` if not training.
    pub fn stop(&mut self) -> bool {
        if !self.is_training() {
            return false;
        }
        self.status = TrainingStatus::Stopped;
        true
    }

    /// Runs one tick of `steps_per_tick` single-sample updates and records
    /// the average loss in the active run (a run is opened if needed).
    pub fn tick(&mut self) -> Result<TickStats> {
        if self.runs.active().is_none() {
            self.runs.new_run(&mut self.rng);
        }

        let (Some(model), Some(optimizer)) = (self.model.as_mut(), self.optimizer.as_mut()) else {
            warn!("tick refused: build a model first");
            return Err(Error::NoModel);
        };
        if self.points.is_empty() {
            warn!("tick refused: add points first");
            return Err(Error::NoPoints);
        }

        let steps = self.config.steps();
        let avg_loss = train_tick(model, optimizer, &self.points, steps, &mut self.rng)?;

        self.step_count += steps as u64;
        self.runs.record(self.step_count, avg_loss);
        self.last_loss = Some(avg_loss);

        debug!("tick: {} steps, total {}, avg loss {:.6}", steps, self.step_count, avg_loss);
        Ok(TickStats {
            steps,
            step_count: self.step_count,
            avg_loss,
            run_id: self.runs.active_id().map(str::to_owned),
        })
    }

    /// Samples the current model on an `n × n` grid.
    pub fn decision_grid(&self, resolution: usize) -> Result<DecisionGrid> {
        let model = self.model.as_ref().ok_or(Error::NoModel)?;
        DecisionGrid::sample(model, resolution)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            status: self.status,
            layers: self.model.as_ref().map(|m| m.sizes().to_vec()),
            activation: self.model.as_ref().map(|m| m.activation().to_string()),
            points: self.points.len(),
            class_counts: self.points.class_counts(),
            step_count: self.step_count,
            last_loss: self.last_loss,
            active_run: self.runs.active_id().map(str::to_owned),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_points(session: &mut Session) {
        for &(x, y) in &[(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5), (0.5, 0.5)] {
            session.add_point(LabeledPoint::new(x, y, (x > 0.0) as u8)).unwrap();
        }
    }

    #[test]
    fn tick_requires_a_model_and_points() {
        let mut session = Session::with_seed(1);
        assert_eq!(session.tick().unwrap_err(), Error::NoModel);

        session.build(SessionConfig::default()).unwrap();
        assert_eq!(session.tick().unwrap_err(), Error::NoPoints);
        assert_eq!(session.step_count(), 0);
        assert!(session.runs().active().unwrap().samples.is_empty());
    }

    #[test]
    fn tick_advances_steps_and_records_a_sample() {
        let mut session = Session::with_seed(2);
        session.build(SessionConfig { steps_per_tick: 7, ..Default::default() }).unwrap();
        seeded_points(&mut session);

        let stats = session.tick().unwrap();
        assert_eq!(stats.steps, 7);
        assert_eq!(stats.step_count, 7);
        session.tick().unwrap();

        let run = session.runs().active().unwrap();
        assert_eq!(run.samples.len(), 2);
        assert_eq!(run.last().unwrap().step, 14);
        assert_eq!(session.last_loss(), Some(run.last().unwrap().loss));
        assert_eq!(session.training_status(), TrainingStatus::Idle);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut session = Session::with_seed(3);
        assert!(session.start());
        assert!(!session.start());
        assert!(session.runs().active().is_some());
        assert!(session.stop());
        assert!(!session.stop());
        assert_eq!(session.training_status(), TrainingStatus::Stopped);
    }

    #[test]
    fn build_errors_keep_the_previous_model() {
        let mut session = Session::with_seed(4);
        assert_eq!(session.reset(), Err(Error::NoModel));
        session.build(SessionConfig::default()).unwrap();

        let bad = SessionConfig { activation: "nope".into(), ..Default::default() };
        assert!(session.build(bad).is_err());
        assert_eq!(session.model().unwrap().sizes(), &[2, 8, 8, 1]);
        assert_eq!(session.config().activation, "relu");
    }

    #[test]
    fn reset_draws_new_weights_and_zeroes_steps() {
        let mut session = Session::with_seed(5);
        session.build(SessionConfig::default()).unwrap();
        seeded_points(&mut session);
        session.tick().unwrap();

        let before = session.model().unwrap().clone();
        session.reset().unwrap();
        assert_eq!(session.step_count(), 0);
        assert_ne!(session.model().unwrap().layers(), before.layers());
    }

    #[test]
    fn clearing_points_forgets_the_last_loss() {
        let mut session = Session::with_seed(6);
        session.build(SessionConfig::default()).unwrap();
        seeded_points(&mut session);
        session.tick().unwrap();
        assert!(session.last_loss().is_some());

        assert_eq!(session.erase_points(0.5, 0.5, 0.01), 1);
        session.clear_points();
        assert!(session.points().is_empty());
        assert!(session.last_loss().is_none());
        assert_eq!(session.status().points, 0);
    }
}
