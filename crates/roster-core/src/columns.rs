//! Column visibility: which items are relevant to the visible audience.
//!
//! An item is a column only when at least one visible person has a current
//! assignment or a history record for it. Columns are ordered modules first,
//! then documents, each in catalog order, so a refresh does not reshuffle them.

use std::collections::HashSet;

use crate::{
  entity::{Person, TrainingItem},
  key::{ItemKey, PersonKey},
  matrix::RecordIndex,
};

pub fn visible_items<'a>(
  people: &[&Person],
  items: &'a [TrainingItem],
  index: &RecordIndex,
) -> Vec<&'a TrainingItem> {
  let audience: HashSet<&PersonKey> = people.iter().map(|p| &p.key).collect();
  let referenced: HashSet<&ItemKey> = index
    .keys()
    .filter(|k| audience.contains(&k.person))
    .map(|k| &k.item)
    .collect();

  let mut columns: Vec<&TrainingItem> = items
    .iter()
    .filter(|item| referenced.contains(&item.key))
    .collect();
  columns.sort_by_key(|item| (item.kind(), item.catalog_index));
  columns
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::ItemKind,
    key::AssignmentKey,
    resolve::CompletionFact,
  };

  fn person(id: &str) -> Person {
    Person {
      key:          PersonKey::natural(id),
      display_name: format!("Person {id}"),
      department:   None,
      role:         None,
    }
  }

  fn item(kind: ItemKind, id: &str, index: usize) -> TrainingItem {
    TrainingItem {
      key:           ItemKey::natural(kind, id),
      title:         id.to_uppercase(),
      catalog_index: index,
    }
  }

  fn titles(items: &[&TrainingItem]) -> Vec<String> {
    items.iter().map(|i| i.title.clone()).collect()
  }

  #[test]
  fn only_referenced_items_are_visible() {
    let (p1, p2) = (person("1"), person("2"));
    let catalog = vec![
      item(ItemKind::Module, "m1", 0),
      item(ItemKind::Module, "m2", 1),
      item(ItemKind::Module, "m3", 2),
    ];
    let mut index = RecordIndex::new();
    index.insert_current(
      AssignmentKey::new(p1.key.clone(), catalog[0].key.clone()),
      CompletionFact::outstanding(),
    );
    index.insert_historical(
      AssignmentKey::new(p2.key.clone(), catalog[2].key.clone()),
      CompletionFact::outstanding(),
    );

    assert_eq!(titles(&visible_items(&[&p1, &p2], &catalog, &index)), ["M1", "M3"]);
    assert_eq!(titles(&visible_items(&[&p2], &catalog, &index)), ["M3"]);
    assert!(visible_items(&[], &catalog, &index).is_empty());
  }

  #[test]
  fn modules_precede_documents_then_catalog_order() {
    let p = person("1");
    let catalog = vec![
      item(ItemKind::Document, "d1", 0),
      item(ItemKind::Module, "m2", 1),
      item(ItemKind::Module, "m1", 0),
      item(ItemKind::Document, "d0", 1),
    ];
    let mut index = RecordIndex::new();
    for i in &catalog {
      index.insert_current(
        AssignmentKey::new(p.key.clone(), i.key.clone()),
        CompletionFact::outstanding(),
      );
    }

    let first = titles(&visible_items(&[&p], &catalog, &index));
    assert_eq!(first, ["M1", "M2", "D1", "D0"]);
    assert_eq!(titles(&visible_items(&[&p], &catalog, &index)), first);
  }

  #[test]
  fn same_id_in_other_catalog_is_a_different_column() {
    let p = person("1");
    let catalog = vec![item(ItemKind::Module, "7", 0), item(ItemKind::Document, "7", 0)];
    let mut index = RecordIndex::new();
    index.insert_current(
      AssignmentKey::new(p.key.clone(), ItemKey::natural(ItemKind::Document, "7")),
      CompletionFact::outstanding(),
    );

    let visible = visible_items(&[&p], &catalog, &index);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].kind(), ItemKind::Document);
  }
}
