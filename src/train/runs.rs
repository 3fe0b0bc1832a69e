use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};

/// Samples kept per run before the oldest are dropped.
pub const DEFAULT_HISTORY_CAP: usize = 10_000;

/// One point of a loss curve: the cumulative step count at the end of a tick
/// and the tick's average loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossSample {
    pub step: u64,
    pub loss: f64,
}

/// An independent loss history.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub id: String,
    pub name: String,
    pub samples: VecDeque<LossSample>,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Run {
    pub fn last(&self) -> Option<&LossSample> {
        self.samples.back()
    }
}

/// Axis ranges for drawing every run on one loss chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartBounds {
    pub min_step: u64,
    pub max_step: u64,
    pub min_loss: f64,
    pub max_loss: f64,
}

/// All runs, newest first, with at most one active.
#[derive(Debug, Clone, Serialize)]
pub struct RunHistory {
    runs: Vec<Run>,
    active: Option<String>,
    #[serde(skip)]
    next_number: usize,
    #[serde(skip)]
    cap: usize,
}

impl Default for RunHistory {
    fn default() -> Self {
        RunHistory::with_cap(DEFAULT_HISTORY_CAP)
    }
}

impl RunHistory {
    pub fn new() -> RunHistory {
        RunHistory::default()
    }

    pub fn with_cap(cap: usize) -> RunHistory {
        RunHistory { runs: Vec::new(), active: None, next_number: 1, cap: cap.max(1) }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Run> {
        let id = self.active.as_deref()?;
        self.runs.iter().find(|r| r.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Run> {
        self.runs.iter().find(|r| r.id == id)
    }

    /// Starts a fresh run, puts it first and makes it active.
    pub fn new_run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Run {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let id = format!("{}_{:012x}", created_at, rng.gen::<u64>() & 0xffff_ffff_ffff);
        let name = format!("Run {}", self.next_number);
        self.next_number += 1;

        info!("starting {name} ({id})");
        self.active = Some(id.clone());
        self.runs.insert(0, Run { id, name, samples: VecDeque::new(), created_at });
        &self.runs[0]
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::UnknownRun(id.to_owned()));
        }
        self.active = Some(id.to_owned());
        Ok(())
    }

    /// Deletes a run. If it was active, the newest remaining run takes over.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let pos = self
            .runs
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::UnknownRun(id.to_owned()))?;
        let removed = self.runs.remove(pos);
        info!("deleted {} ({})", removed.name, removed.id);

        if self.active.as_deref() == Some(id) {
            self.active = self.runs.first().map(|r| r.id.clone());
        }
        Ok(())
    }

    /// Appends a sample to the active run. Returns `false` when there is no
    /// active run.
    pub fn record(&mut self, step: u64, loss: f64) -> bool {
        let cap = self.cap;
        let Some(id) = self.active.as_deref() else {
            return false;
        };
        let Some(run) = self.runs.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        run.samples.push_back(LossSample { step, loss });
        while run.samples.len() > cap {
            run.samples.pop_front();
        }
        true
    }

    /// Chart ranges over runs with at least two samples; `None` if there
    /// are none. The loss axis always includes 0.
    pub fn bounds(&self) -> Option<ChartBounds> {
        let mut usable = self.runs.iter().filter(|r| r.samples.len() >= 2).peekable();
        usable.peek()?;

        let mut b = ChartBounds {
            min_step: u64::MAX,
            max_step: 0,
            min_loss: f64::INFINITY,
            max_loss: f64::NEG_INFINITY,
        };
        for sample in usable.flat_map(|r| r.samples.iter()) {
            b.min_step = b.min_step.min(sample.step);
            b.max_step = b.max_step.max(sample.step);
            b.min_loss = b.min_loss.min(sample.loss);
            b.max_loss = b.max_loss.max(sample.loss);
        }

        if b.max_step == b.min_step {
            b.max_step = b.min_step + 1;
        }
        if b.max_loss == b.min_loss {
            b.max_loss = b.min_loss + 1e-6;
        }
        b.min_loss = b.min_loss.min(0.0);
        Some(b)
    }
}
