//! Scripted in-memory source for refresh tests.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use roster_core::{
  RawDataset,
  entity::{AssignmentRow, ItemRow, PersonRow},
  source::TrainingSource,
};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  People,
  Documents,
  History,
}

#[derive(Debug, thiserror::Error)]
#[error("scripted failure: {0}")]
pub struct ScriptedError(&'static str);

pub struct ScriptedSource {
  raw:     Mutex<RawDataset>,
  faults:  Mutex<Vec<Fault>>,
  gate:    Option<Arc<Semaphore>>,
  fetches: AtomicUsize,
}

fn person(id: &str, first: &str, dept: &str) -> PersonRow {
  PersonRow {
    id:            Some(id.into()),
    first_name:    Some(first.into()),
    last_name:     None,
    department_id: Some(dept.into()),
    role_id:       None,
  }
}

fn module(id: &str, title: &str) -> ItemRow {
  ItemRow { id: Some(id.into()), title: Some(title.into()) }
}

fn record(person: &str, item: &str, at: Option<&str>) -> AssignmentRow {
  AssignmentRow {
    person_id:    Some(person.into()),
    item_id:      Some(item.into()),
    item_type:    Some("module".into()),
    completed_at: at.map(Into::into),
  }
}

/// P1/M1 complete (history older), P2/M2 history only, P3/M3 outstanding
/// over history. P2 alone is in department D1.
pub fn scenario_raw() -> RawDataset {
  RawDataset {
    people:     vec![person("1", "P1", "D0"), person("2", "P2", "D1"), person("3", "P3", "D0")],
    modules:    vec![module("1", "M1"), module("2", "M2"), module("3", "M3")],
    documents:  vec![],
    current:    vec![record("1", "1", Some("2024-01-10")), record("3", "3", None)],
    historical: vec![
      record("1", "1", Some("2023-01-01")),
      record("2", "2", Some("2022-05-05")),
      record("3", "3", Some("2021-07-07")),
    ],
  }
}

impl ScriptedSource {
  pub fn new(raw: RawDataset) -> Self {
    Self {
      raw:     Mutex::new(raw),
      faults:  Mutex::new(Vec::new()),
      gate:    None,
      fetches: AtomicUsize::new(0),
    }
  }

  pub fn scenario() -> Self { Self::new(scenario_raw()) }

  pub fn failing(self, fault: Fault) -> Self {
    self.set_faults(&[fault]);
    self
  }

  /// Block every people read until [`ScriptedSource::release`] is called.
  pub fn gated(mut self) -> Self {
    self.gate = Some(Arc::new(Semaphore::new(0)));
    self
  }

  /// Let one blocked (or future) people read through.
  pub fn release(&self) {
    if let Some(gate) = &self.gate {
      gate.add_permits(1);
    }
  }

  pub fn set_faults(&self, faults: &[Fault]) {
    *self.faults.lock().unwrap() = faults.to_vec();
  }

  /// How many cycles have started reading.
  pub fn fetches(&self) -> usize { self.fetches.load(Ordering::SeqCst) }

  fn check(&self, fault: Fault) -> Result<(), ScriptedError> {
    if self.faults.lock().unwrap().contains(&fault) {
      Err(ScriptedError("no such table"))
    } else {
      Ok(())
    }
  }

  fn snapshot(&self) -> RawDataset { self.raw.lock().unwrap().clone() }
}

impl TrainingSource for ScriptedSource {
  type Error = ScriptedError;

  async fn people(&self) -> Result<Vec<PersonRow>, ScriptedError> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    if let Some(gate) = &self.gate
      && let Ok(permit) = gate.acquire().await
    {
      permit.forget();
    }
    self.check(Fault::People)?;
    Ok(self.snapshot().people)
  }

  async fn modules(&self) -> Result<Vec<ItemRow>, ScriptedError> {
    Ok(self.snapshot().modules)
  }

  async fn documents(&self) -> Result<Vec<ItemRow>, ScriptedError> {
    self.check(Fault::Documents)?;
    Ok(self.snapshot().documents)
  }

  async fn current_assignments(&self) -> Result<Vec<AssignmentRow>, ScriptedError> {
    Ok(self.snapshot().current)
  }

  async fn historical_completions(&self) -> Result<Vec<AssignmentRow>, ScriptedError> {
    self.check(Fault::History)?;
    Ok(self.snapshot().historical)
  }
}
