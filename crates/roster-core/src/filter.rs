//! Row filtering over the normalised person list.

use serde::{Deserialize, Serialize};

use crate::entity::Person;

/// Independent, conjunctive predicates over people. Absent or blank fields
/// do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixFilter {
  /// Case-insensitive substring of the display name.
  #[serde(default)]
  pub name:       Option<String>,
  /// Exact department identifier.
  #[serde(default)]
  pub department: Option<String>,
  /// Exact role identifier.
  #[serde(default)]
  pub role:       Option<String>,
}

impl MatrixFilter {
  pub fn is_empty(&self) -> bool {
    active(&self.name).is_none()
      && active(&self.department).is_none()
      && active(&self.role).is_none()
  }
}

fn active(field: &Option<String>) -> Option<&str> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The people matching every active predicate, in their original order.
pub fn filter_people<'a>(people: &'a [Person], filter: &MatrixFilter) -> Vec<&'a Person> {
  let needle = active(&filter.name).map(str::to_lowercase);
  let department = active(&filter.department);
  let role = active(&filter.role);

  people
    .iter()
    .filter(|p| {
      needle
        .as_deref()
        .is_none_or(|n| p.display_name.to_lowercase().contains(n))
    })
    .filter(|p| department.is_none_or(|d| p.department.as_deref() == Some(d)))
    .filter(|p| role.is_none_or(|r| p.role.as_deref() == Some(r)))
    .collect()
}
