//! Key normalisation: a stable, collision-free identity for every row and
//! column entity, even when the source omits its natural identifier.
//!
//! Keys are typed: a [`PersonKey`] and an [`ItemKey`] are different types,
//! and an item key carries its [`ItemKind`], so a module and a document that
//! share an identifier never meet. Within one fetch cycle every entity gets a
//! distinct key: entities without a usable identifier (or repeating one already
//! claimed) receive a fallback key built from their positional index.

use std::{collections::HashSet, fmt};

use serde::{Serialize, Serializer};

use crate::entity::ItemKind;

const HINT_MAX_LEN: usize = 32;

// ─── Key origin ──────────────────────────────────────────────────────────────

/// Where a key came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyOrigin {
  /// The source's own identifier.
  Natural(String),
  /// Synthesised for an entity without a usable identifier. `index` is the
  /// entity's position in its source list, so it is unique per cycle.
  Fallback { index: usize, hint: String },
}

impl KeyOrigin {
  pub fn is_fallback(&self) -> bool { matches!(self, Self::Fallback { .. }) }

  fn render(&self, prefix: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Natural(id) => write!(f, "{prefix}:{id}"),
      Self::Fallback { index, hint } => write!(f, "{prefix}~{index}~{hint}"),
    }
  }
}

// ─── Typed keys ──────────────────────────────────────────────────────────────

/// Identity of a person row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonKey(KeyOrigin);

impl PersonKey {
  pub fn natural(id: impl Into<String>) -> Self {
    Self(KeyOrigin::Natural(id.into()))
  }

  pub fn from_origin(origin: KeyOrigin) -> Self { Self(origin) }

  pub fn origin(&self) -> &KeyOrigin { &self.0 }

  pub fn is_fallback(&self) -> bool { self.0.is_fallback() }
}

/// Identity of a training item, namespaced by its catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
  kind:   ItemKind,
  origin: KeyOrigin,
}

impl ItemKey {
  pub fn natural(kind: ItemKind, id: impl Into<String>) -> Self {
    Self { kind, origin: KeyOrigin::Natural(id.into()) }
  }

  pub fn from_origin(kind: ItemKind, origin: KeyOrigin) -> Self {
    Self { kind, origin }
  }

  pub fn kind(&self) -> ItemKind { self.kind }

  pub fn origin(&self) -> &KeyOrigin { &self.origin }

  pub fn is_fallback(&self) -> bool { self.origin.is_fallback() }
}

/// Composite lookup key for assignment and history records: one person, one
/// item of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentKey {
  pub person: PersonKey,
  pub item:   ItemKey,
}

impl AssignmentKey {
  pub fn new(person: PersonKey, item: ItemKey) -> Self { Self { person, item } }
}

impl fmt::Display for PersonKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.render("person", f)
  }
}

impl fmt::Display for ItemKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.origin.render(self.kind.as_ref(), f)
  }
}

impl Serialize for PersonKey {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl Serialize for ItemKey {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

// ─── Normaliser ──────────────────────────────────────────────────────────────

/// A source identifier, or `None` when it is missing or blank.
pub fn natural_id(raw: Option<&str>) -> Option<&str> {
  raw.map(str::trim).filter(|id| !id.is_empty())
}

/// Assigns key origins for one entity namespace during one fetch cycle.
///
/// Feed entities in source order with their positional index. The first
/// entity to present an identifier owns it; entities with no identifier, or
/// repeating an owned one, get a fallback origin.
#[derive(Debug, Default)]
pub struct KeyNormalizer {
  claimed:   HashSet<String>,
  fallbacks: usize,
}

impl KeyNormalizer {
  pub fn new() -> Self { Self::default() }

  /// Produce the key origin for the entity at `index`. `hints` are
  /// distinguishing fields (name fragments, titles) folded into a fallback.
  pub fn assign(
    &mut self,
    natural: Option<&str>,
    index: usize,
    hints: &[Option<&str>],
  ) -> KeyOrigin {
    if let Some(id) = natural_id(natural)
      && self.claimed.insert(id.to_owned())
    {
      return KeyOrigin::Natural(id.to_owned());
    }
    self.fallbacks += 1;
    KeyOrigin::Fallback { index, hint: slug(hints) }
  }

  /// How many entities needed a fallback key so far.
  pub fn fallbacks(&self) -> usize { self.fallbacks }
}

/// Lowercase ASCII slug of the hint fragments, `unnamed` when nothing usable
/// remains.
fn slug(hints: &[Option<&str>]) -> String {
  let mut out = String::new();
  for ch in hints.iter().flatten().flat_map(|h| h.chars().chain([' '])) {
    if ch.is_ascii_alphanumeric() {
      out.push(ch.to_ascii_lowercase());
    } else if !out.is_empty() && !out.ends_with('-') {
      out.push('-');
    }
    if out.len() >= HINT_MAX_LEN {
      break;
    }
  }
  let trimmed = out.trim_end_matches('-');
  if trimmed.is_empty() {
    "unnamed".to_owned()
  } else {
    trimmed.to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn natural_ids_are_stable() {
    let mut a = KeyNormalizer::new();
    let mut b = KeyNormalizer::new();
    assert_eq!(a.assign(Some("42"), 0, &[]), b.assign(Some("42"), 7, &[]));
    assert_eq!(a.fallbacks(), 0);
  }

  #[test]
  fn missing_ids_get_distinct_keys() {
    let mut n = KeyNormalizer::new();
    let keys: HashSet<_> = (0..25)
      .map(|i| n.assign(None, i, &[Some("Same"), Some("Name")]))
      .collect();
    assert_eq!(keys.len(), 25);
    assert_eq!(n.fallbacks(), 25);
  }

  #[test]
  fn blank_ids_count_as_missing() {
    let mut n = KeyNormalizer::new();
    let origin = n.assign(Some("   "), 3, &[Some("Grace"), Some("Hopper")]);
    assert_eq!(
      origin,
      KeyOrigin::Fallback { index: 3, hint: "grace-hopper".into() }
    );
  }

  #[test]
  fn repeated_id_falls_back_after_first_claim() {
    let mut n = KeyNormalizer::new();
    assert_eq!(n.assign(Some("7"), 0, &[]), KeyOrigin::Natural("7".into()));
    assert!(n.assign(Some("7"), 1, &[]).is_fallback());
    assert_eq!(n.fallbacks(), 1);
  }

  #[test]
  fn rendered_keys_are_namespaced() {
    let person = PersonKey::natural("5");
    let module = ItemKey::natural(ItemKind::Module, "5");
    let document = ItemKey::natural(ItemKind::Document, "5");
    assert_eq!(person.to_string(), "person:5");
    assert_eq!(module.to_string(), "module:5");
    assert_ne!(module, document);

    let fallback = PersonKey::from_origin(KeyOrigin::Fallback {
      index: 2,
      hint:  "unnamed".into(),
    });
    assert_eq!(fallback.to_string(), "person~2~unnamed");
  }

  #[test]
  fn slug_collapses_punctuation() {
    assert_eq!(slug(&[Some("O'Brien, Jr."), None, Some("Pat")]), "o-brien-jr-pat");
    assert_eq!(slug(&[Some("!!"), None]), "unnamed");
  }
}
