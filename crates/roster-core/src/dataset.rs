//! One fetch cycle's worth of data, before and after normalisation.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
  columns::visible_items,
  entity::{
    AssignmentRow, ItemKind, ItemRow, Person, PersonRow, TrainingItem, display_name,
  },
  filter::{MatrixFilter, filter_people},
  key::{AssignmentKey, ItemKey, KeyNormalizer, PersonKey, natural_id},
  matrix::{self, Matrix, RecordIndex},
  resolve::CompletionFact,
};

/// Rows exactly as read from the five sources.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
  pub people:     Vec<PersonRow>,
  pub modules:    Vec<ItemRow>,
  pub documents:  Vec<ItemRow>,
  pub current:    Vec<AssignmentRow>,
  pub historical: Vec<AssignmentRow>,
}

/// Data-quality findings from normalisation. None of them block a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
  /// People keyed by fallback (missing or repeated identifier).
  pub people_without_id: usize,
  /// Items keyed by fallback (missing or repeated identifier).
  pub items_without_id:  usize,
  /// Assignment or history rows missing a person, item, or known kind.
  pub orphan_records:    usize,
}

impl DataQuality {
  pub fn is_clean(&self) -> bool { *self == Self::default() }
}

/// A normalised cycle: keyed entities plus the record index. Immutable once
/// built; filter changes materialise new matrices from the same dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  pub people:  Vec<Person>,
  /// Modules then documents, each in catalog order.
  pub items:   Vec<TrainingItem>,
  pub index:   RecordIndex,
  pub quality: DataQuality,
}

impl Dataset {
  pub fn normalize(raw: RawDataset) -> Self {
    let mut quality = DataQuality::default();

    let mut person_keys = KeyNormalizer::new();
    let people: Vec<Person> = raw
      .people
      .iter()
      .enumerate()
      .map(|(i, row)| {
        let origin = person_keys.assign(
          row.id.as_deref(),
          i,
          &[row.first_name.as_deref(), row.last_name.as_deref()],
        );
        Person {
          key:          PersonKey::from_origin(origin),
          display_name: display_name(row),
          department:   natural_id(row.department_id.as_deref()).map(str::to_owned),
          role:         natural_id(row.role_id.as_deref()).map(str::to_owned),
        }
      })
      .collect();
    quality.people_without_id = person_keys.fallbacks();

    let mut items = catalog(ItemKind::Module, &raw.modules, &mut quality);
    items.extend(catalog(ItemKind::Document, &raw.documents, &mut quality));

    let mut index = RecordIndex::new();
    for row in &raw.current {
      match record_key(row) {
        Some(key) => {
          index.insert_current(key, CompletionFact::from_raw(row.completed_at.as_deref()))
        }
        None => quality.orphan_records += 1,
      }
    }
    for row in &raw.historical {
      match record_key(row) {
        Some(key) => index
          .insert_historical(key, CompletionFact::from_raw(row.completed_at.as_deref())),
        None => quality.orphan_records += 1,
      }
    }

    if quality.is_clean() {
      debug!(
        people = people.len(),
        items = items.len(),
        records = index.len(),
        "normalised dataset"
      );
    } else {
      warn!(
        people_without_id = quality.people_without_id,
        items_without_id = quality.items_without_id,
        orphan_records = quality.orphan_records,
        "source data has entities without usable identifiers"
      );
    }

    Self { people, items, index, quality }
  }

  /// Filter rows, derive visible columns, and resolve every cell.
  pub fn materialize(&self, filter: &MatrixFilter) -> Matrix {
    let people = filter_people(&self.people, filter);
    let items = visible_items(&people, &self.items, &self.index);
    matrix::build(&people, &items, &self.index)
  }
}

fn catalog(kind: ItemKind, rows: &[ItemRow], quality: &mut DataQuality) -> Vec<TrainingItem> {
  let mut keys = KeyNormalizer::new();
  let items = rows
    .iter()
    .enumerate()
    .map(|(i, row)| {
      let title = row
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| format!("Untitled {kind}"), str::to_owned);
      let origin = keys.assign(row.id.as_deref(), i, &[row.title.as_deref()]);
      TrainingItem {
        key: ItemKey::from_origin(kind, origin),
        title,
        catalog_index: i,
      }
    })
    .collect();
  quality.items_without_id += keys.fallbacks();
  items
}

/// The composite key a record addresses, or `None` for an orphan row.
fn record_key(row: &AssignmentRow) -> Option<AssignmentKey> {
  let person = natural_id(row.person_id.as_deref())?;
  let item = natural_id(row.item_id.as_deref())?;
  let kind = match row.item_type.as_deref()?.parse::<ItemKind>() {
    Ok(kind) => kind,
    Err(e) => {
      debug!(error = %e, "skipping record");
      return None;
    }
  };
  Some(AssignmentKey::new(
    PersonKey::natural(person),
    ItemKey::natural(kind, item),
  ))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::resolve::ResolvedCell;

  fn person(id: &str, first: &str, dept: &str) -> PersonRow {
    PersonRow {
      id:            Some(id.into()),
      first_name:    Some(first.into()),
      last_name:     None,
      department_id: Some(dept.into()),
      role_id:       None,
    }
  }

  fn item(id: &str, title: &str) -> ItemRow {
    ItemRow { id: Some(id.into()), title: Some(title.into()) }
  }

  fn record(person: &str, item: &str, kind: &str, at: Option<&str>) -> AssignmentRow {
    AssignmentRow {
      person_id:    Some(person.into()),
      item_id:      Some(item.into()),
      item_type:    Some(kind.into()),
      completed_at: at.map(Into::into),
    }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  /// P1/M1 complete over history, P2/M2 history only, P3/M3 outstanding
  /// over history. P2 alone sits in department D1.
  fn scenario() -> RawDataset {
    RawDataset {
      people:     vec![person("1", "P1", "D0"), person("2", "P2", "D1"), person("3", "P3", "D0")],
      modules:    vec![item("1", "M1"), item("2", "M2"), item("3", "M3")],
      documents:  vec![],
      current:    vec![
        record("1", "1", "module", Some("2024-01-10")),
        record("3", "3", "module", None),
      ],
      historical: vec![
        record("1", "1", "module", Some("2023-01-01")),
        record("2", "2", "module", Some("2022-05-05")),
        record("3", "3", "module", Some("2020-09-09")),
      ],
    }
  }

  fn column_titles(matrix: &Matrix) -> Vec<&str> {
    matrix.columns().iter().map(|c| c.title.as_str()).collect()
  }

  #[test]
  fn precedence_scenarios() {
    let dataset = Dataset::normalize(scenario());
    let matrix = dataset.materialize(&MatrixFilter::default());

    assert_eq!(column_titles(&matrix), ["M1", "M2", "M3"]);
    assert_eq!(matrix.cell(0, 0), Some(ResolvedCell::Complete(date(2024, 1, 10))));
    assert_eq!(matrix.cell(1, 1), Some(ResolvedCell::Historical(date(2022, 5, 5))));
    assert_eq!(matrix.cell(2, 2), Some(ResolvedCell::Incomplete));
    assert!(dataset.quality.is_clean());
  }

  #[test]
  fn department_filter_drops_unreferenced_columns() {
    let dataset = Dataset::normalize(scenario());
    let filter = MatrixFilter { department: Some("D1".into()), ..Default::default() };
    let matrix = dataset.materialize(&filter);

    assert_eq!(matrix.rows().len(), 1);
    assert_eq!(matrix.rows()[0].name, "P2");
    assert_eq!(column_titles(&matrix), ["M2"]);
    assert_eq!(matrix.cell(0, 0), Some(ResolvedCell::Historical(date(2022, 5, 5))));
  }

  #[test]
  fn anonymous_people_stay_distinct() {
    let mut raw = scenario();
    raw.people.push(PersonRow { first_name: Some("Sam".into()), ..Default::default() });
    raw.people.push(PersonRow { first_name: Some("Sam".into()), ..Default::default() });

    let dataset = Dataset::normalize(raw);
    assert_eq!(dataset.quality.people_without_id, 2);
    let matrix = dataset.materialize(&MatrixFilter::default());
    assert_eq!(matrix.rows().len(), 5);
    assert_ne!(matrix.rows()[3].key, matrix.rows()[4].key);
    assert!(matrix.rows()[3].cells.iter().all(|c| *c == ResolvedCell::Unassigned));
  }

  #[test]
  fn orphan_records_are_counted_and_skipped() {
    let mut raw = scenario();
    raw.current.push(AssignmentRow { item_id: Some("1".into()), ..Default::default() });
    raw.current.push(record("2", "1", "policy", None));
    raw.historical.push(record("2", " ", "module", Some("2020-01-01")));

    let dataset = Dataset::normalize(raw);
    assert_eq!(dataset.quality.orphan_records, 3);
    let matrix = dataset.materialize(&MatrixFilter::default());
    assert_eq!(matrix.cell(1, 0), Some(ResolvedCell::Unassigned));
  }

  #[test]
  fn items_without_id_are_keyed_but_never_visible() {
    let mut raw = scenario();
    raw.documents.push(ItemRow { id: None, title: Some("Handbook".into()) });
    raw.documents.push(ItemRow { id: None, title: None });

    let dataset = Dataset::normalize(raw);
    assert_eq!(dataset.quality.items_without_id, 2);
    assert_eq!(dataset.items.len(), 5);
    assert_eq!(dataset.items[4].title, "Untitled document");
    assert_ne!(dataset.items[3].key, dataset.items[4].key);
    assert_eq!(dataset.materialize(&MatrixFilter::default()).columns().len(), 3);
  }

  #[test]
  fn materialize_is_idempotent() {
    let dataset = Dataset::normalize(scenario());
    let filter = MatrixFilter { name: Some("p".into()), ..Default::default() };
    assert_eq!(dataset.materialize(&filter), dataset.materialize(&filter));
  }
}
