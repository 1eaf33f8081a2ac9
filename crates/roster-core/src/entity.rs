//! Entities of the training matrix and the raw rows they are built from.
//!
//! Raw rows mirror the source columns one-to-one and keep every field
//! optional: source data is not trusted to carry identifiers, names, or a
//! recognisable item kind. Normalised entities always carry a key.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  key::{ItemKey, PersonKey},
};

// ─── Item kind ───────────────────────────────────────────────────────────────

/// The catalog a training item comes from. Declaration order is the column
/// order: modules before documents.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
  Module,
  Document,
}

impl FromStr for ItemKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "module" => Ok(Self::Module),
      "document" => Ok(Self::Document),
      _ => Err(Error::UnknownItemKind(s.to_owned())),
    }
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A row from the people source.
#[derive(Debug, Clone, Default)]
pub struct PersonRow {
  pub id:            Option<String>,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub department_id: Option<String>,
  pub role_id:       Option<String>,
}

/// A row from either item catalog (modules or documents).
#[derive(Debug, Clone, Default)]
pub struct ItemRow {
  pub id:    Option<String>,
  pub title: Option<String>,
}

/// A row from the current-assignment or historical-completion source. Both
/// share the same tuple shape.
#[derive(Debug, Clone, Default)]
pub struct AssignmentRow {
  pub person_id:    Option<String>,
  pub item_id:      Option<String>,
  /// `module` or `document`; anything else makes the row unaddressable.
  pub item_type:    Option<String>,
  /// Unparsed completion timestamp; `None` means outstanding.
  pub completed_at: Option<String>,
}

// ─── Normalised entities ─────────────────────────────────────────────────────

/// A person with a stable key. Never mutated after normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
  pub key:          PersonKey,
  pub display_name: String,
  pub department:   Option<String>,
  pub role:         Option<String>,
}

/// A training module or document with a stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingItem {
  pub key:           ItemKey,
  pub title:         String,
  /// Position within the item's own catalog, in source order.
  pub catalog_index: usize,
}

impl TrainingItem {
  pub fn kind(&self) -> ItemKind { self.key.kind() }
}

/// Join the name fragments of a person row into a display name.
pub(crate) fn display_name(row: &PersonRow) -> String {
  let joined = [row.first_name.as_deref(), row.last_name.as_deref()]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");
  if joined.is_empty() {
    "Unnamed person".to_owned()
  } else {
    joined
  }
}
