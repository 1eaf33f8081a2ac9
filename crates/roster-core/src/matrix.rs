//! Matrix materialisation: visible people × visible items → resolved cells.
//!
//! Both record sets are indexed once per cycle by [`AssignmentKey`] so every
//! cell is a single hash lookup, independent of how many records exist.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
  entity::{ItemKind, Person, TrainingItem},
  key::{AssignmentKey, ItemKey, PersonKey},
  resolve::{CompletionFact, ResolvedCell, resolve},
};

// ─── Record index ────────────────────────────────────────────────────────────

/// Current and historical facts recorded for one (person, item) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSources {
  pub current:    Option<CompletionFact>,
  pub historical: Option<CompletionFact>,
}

impl CellSources {
  pub fn resolve(&self) -> ResolvedCell {
    resolve(self.current.as_ref(), self.historical.as_ref())
  }
}

/// Both record sets keyed by person, item and kind. Later records for the
/// same key replace earlier ones, so duplicates resolve by source order.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
  entries: HashMap<AssignmentKey, CellSources>,
}

impl RecordIndex {
  pub fn new() -> Self { Self::default() }

  pub fn insert_current(&mut self, key: AssignmentKey, fact: CompletionFact) {
    self.entries.entry(key).or_default().current = Some(fact);
  }

  pub fn insert_historical(&mut self, key: AssignmentKey, fact: CompletionFact) {
    self.entries.entry(key).or_default().historical = Some(fact);
  }

  pub fn get(&self, key: &AssignmentKey) -> Option<&CellSources> { self.entries.get(key) }

  /// Every pair with at least one record, current or historical.
  pub fn keys(&self) -> impl Iterator<Item = &AssignmentKey> { self.entries.keys() }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Matrix ──────────────────────────────────────────────────────────────────

/// A visible training item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
  pub key:   ItemKey,
  pub kind:  ItemKind,
  pub title: String,
}

/// A visible person and one resolved cell per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
  pub key:        PersonKey,
  pub name:       String,
  pub department: Option<String>,
  pub role:       Option<String>,
  pub cells:      Vec<ResolvedCell>,
}

/// Per-status cell totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatrixSummary {
  pub complete:   usize,
  pub incomplete: usize,
  pub historical: usize,
  pub unassigned: usize,
}

/// The materialised grid. Built whole and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
  columns: Vec<Column>,
  rows:    Vec<MatrixRow>,
}

impl Matrix {
  pub fn columns(&self) -> &[Column] { &self.columns }

  pub fn rows(&self) -> &[MatrixRow] { &self.rows }

  pub fn cell(&self, row: usize, column: usize) -> Option<ResolvedCell> {
    self.rows.get(row)?.cells.get(column).copied()
  }

  pub fn summary(&self) -> MatrixSummary {
    let mut summary = MatrixSummary::default();
    for cell in self.rows.iter().flat_map(|r| &r.cells) {
      match cell {
        ResolvedCell::Complete(_) => summary.complete += 1,
        ResolvedCell::Incomplete => summary.incomplete += 1,
        ResolvedCell::Historical(_) => summary.historical += 1,
        ResolvedCell::Unassigned => summary.unassigned += 1,
      }
    }
    summary
  }
}

/// Build the grid: one row per person in the given order, one cell per item
/// in the given order.
pub fn build(people: &[&Person], items: &[&TrainingItem], index: &RecordIndex) -> Matrix {
  let columns = items
    .iter()
    .map(|item| Column {
      key:   item.key.clone(),
      kind:  item.kind(),
      title: item.title.clone(),
    })
    .collect();

  let rows = people
    .iter()
    .map(|person| {
      let cells = items
        .iter()
        .map(|item| {
          let key = AssignmentKey::new(person.key.clone(), item.key.clone());
          index
            .get(&key)
            .map_or(ResolvedCell::Unassigned, CellSources::resolve)
        })
        .collect();
      MatrixRow {
        key: person.key.clone(),
        name: person.display_name.clone(),
        department: person.department.clone(),
        role: person.role.clone(),
        cells,
      }
    })
    .collect();

  Matrix { columns, rows }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;
  use crate::key::KeyOrigin;

  fn person(key: PersonKey, name: &str) -> Person {
    Person { key, display_name: name.into(), department: None, role: None }
  }

  fn module(id: &str, index: usize) -> TrainingItem {
    TrainingItem {
      key:           ItemKey::natural(ItemKind::Module, id),
      title:         format!("Module {id}"),
      catalog_index: index,
    }
  }

  fn done(y: i32, m: u32, d: u32) -> CompletionFact {
    CompletionFact::completed(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
  }

  fn pair(person: &str, item: &str) -> AssignmentKey {
    AssignmentKey::new(
      PersonKey::natural(person),
      ItemKey::natural(ItemKind::Module, item),
    )
  }

  #[test]
  fn cells_follow_row_and_column_order() {
    let p1 = person(PersonKey::natural("1"), "One");
    let p2 = person(PersonKey::natural("2"), "Two");
    let m1 = module("a", 0);
    let m2 = module("b", 1);

    let mut index = RecordIndex::new();
    index.insert_current(pair("1", "b"), done(2024, 1, 10));
    index.insert_current(pair("2", "a"), CompletionFact::outstanding());
    index.insert_historical(pair("2", "b"), done(2022, 5, 5));

    let matrix = build(&[&p1, &p2], &[&m1, &m2], &index);
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

    assert_eq!(matrix.columns().len(), 2);
    assert_eq!(matrix.cell(0, 0), Some(ResolvedCell::Unassigned));
    assert_eq!(matrix.cell(0, 1), Some(ResolvedCell::Complete(date(2024, 1, 10))));
    assert_eq!(matrix.cell(1, 0), Some(ResolvedCell::Incomplete));
    assert_eq!(matrix.cell(1, 1), Some(ResolvedCell::Historical(date(2022, 5, 5))));
    assert_eq!(matrix.cell(2, 0), None);
  }

  #[test]
  fn later_duplicate_record_wins() {
    let mut index = RecordIndex::new();
    index.insert_current(pair("1", "a"), done(2020, 1, 1));
    index.insert_current(pair("1", "a"), CompletionFact::outstanding());
    assert_eq!(index.len(), 1);
    assert_eq!(index.get(&pair("1", "a")).unwrap().resolve(), ResolvedCell::Incomplete);
  }

  #[test]
  fn building_twice_is_identical() {
    let p = person(PersonKey::natural("1"), "One");
    let m = module("a", 0);
    let mut index = RecordIndex::new();
    index.insert_current(pair("1", "a"), done(2023, 3, 3));

    let first = build(&[&p], &[&m], &index);
    let second = build(&[&p], &[&m], &index);
    assert_eq!(first, second);
  }

  #[test]
  fn fallback_keyed_person_builds_like_any_other() {
    let anon = PersonKey::from_origin(KeyOrigin::Fallback { index: 0, hint: "anon".into() });
    let p = person(anon.clone(), "Anon");
    let m = module("a", 0);
    let mut index = RecordIndex::new();
    index.insert_current(
      AssignmentKey::new(anon, ItemKey::natural(ItemKind::Module, "a")),
      CompletionFact::outstanding(),
    );

    let matrix = build(&[&p], &[&m], &index);
    assert_eq!(matrix.cell(0, 0), Some(ResolvedCell::Incomplete));
    assert_eq!(matrix.rows()[0].key.to_string(), "person~0~anon");
  }

  #[test]
  fn summary_counts_each_status() {
    let p = person(PersonKey::natural("1"), "One");
    let items = [module("a", 0), module("b", 1), module("c", 2)];
    let mut index = RecordIndex::new();
    index.insert_current(pair("1", "a"), done(2023, 3, 3));
    index.insert_historical(pair("1", "b"), done(2021, 3, 3));

    let refs: Vec<_> = items.iter().collect();
    let summary = build(&[&p], &refs, &index).summary();
    assert_eq!(
      summary,
      MatrixSummary { complete: 1, incomplete: 0, historical: 1, unassigned: 1 }
    );
  }
}
