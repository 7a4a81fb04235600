//! The subject catalogue: the id/name reference table every rule points into.
//!
//! Subjects are immutable reference data. The generator never writes them; it
//! loads them once per run and checks every emitted id against them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result, combination::SubjectTriple};

/// A single A/L subject row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:   i64,
  pub name: String,
}

// ─── Well-known subjects ─────────────────────────────────────────────────────

/// Every subject the stock stream rules refer to, by canonical catalogue name.
///
/// Stock rules are written against these keys and resolved to numeric ids via
/// [`SubjectCatalogue::resolve`], so a renamed or missing catalogue row fails
/// the build of the rule instead of silently producing a bad id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum SubjectKey {
  Physics,
  Chemistry,
  #[strum(serialize = "Combined Mathematics")]
  CombinedMathematics,
  #[strum(serialize = "Higher Mathematics")]
  HigherMathematics,
  Biology,
  Mathematics,
  #[strum(serialize = "Agricultural Science")]
  AgriculturalScience,
  #[strum(serialize = "Business Studies")]
  BusinessStudies,
  Economics,
  Accounting,
  Geography,
  #[strum(serialize = "Business Statistics")]
  BusinessStatistics,
  History,
  #[strum(serialize = "Political Science")]
  PoliticalScience,
  English,
  #[strum(serialize = "Logic & Scientific Method")]
  LogicAndScientificMethod,
  #[strum(serialize = "ICT")]
  Ict,
  #[strum(serialize = "Engineering Technology")]
  EngineeringTechnology,
  #[strum(serialize = "Science for Technology")]
  ScienceForTechnology,
  #[strum(serialize = "Bio Systems Technology")]
  BioSystemsTechnology,
  #[strum(serialize = "Home Economics")]
  HomeEconomics,
  #[strum(serialize = "Communication & Media Studies")]
  CommunicationAndMediaStudies,
  Art,
  Buddhism,
  Hinduism,
  Christianity,
  Islam,
  Sinhala,
  Tamil,
  #[strum(serialize = "Greek & Roman Civilization")]
  GreekAndRomanCivilization,
  #[strum(serialize = "Buddhist Civilization")]
  BuddhistCivilization,
  #[strum(serialize = "Hindu Civilization")]
  HinduCivilization,
  #[strum(serialize = "Christian Civilization")]
  ChristianCivilization,
  #[strum(serialize = "Islamic Civilization")]
  IslamicCivilization,
  #[strum(serialize = "Drama & Theatre")]
  DramaAndTheatre,
}

impl SubjectKey {
  /// The canonical catalogue name.
  pub fn name(self) -> &'static str { self.into() }

  /// The stock subject table, with ids assigned 1..N in declaration order.
  pub fn default_catalogue() -> Vec<Subject> {
    Self::iter()
      .zip(1..)
      .map(|(key, id)| Subject { id, name: key.name().to_owned() })
      .collect()
  }
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

/// In-memory view of the subject table, indexed both ways.
#[derive(Debug, Clone, Default)]
pub struct SubjectCatalogue {
  by_id:   BTreeMap<i64, String>,
  by_name: BTreeMap<String, i64>,
}

impl SubjectCatalogue {
  pub fn new(subjects: impl IntoIterator<Item = Subject>) -> Self {
    let mut catalogue = Self::default();
    for subject in subjects {
      catalogue
        .by_name
        .insert(subject.name.trim().to_lowercase(), subject.id);
      catalogue.by_id.insert(subject.id, subject.name);
    }
    catalogue
  }

  pub fn len(&self) -> usize { self.by_id.len() }

  pub fn is_empty(&self) -> bool { self.by_id.is_empty() }

  pub fn contains(&self, id: i64) -> bool { self.by_id.contains_key(&id) }

  pub fn name_of(&self, id: i64) -> Option<&str> {
    self.by_id.get(&id).map(String::as_str)
  }

  /// Case-insensitive lookup by subject name.
  pub fn id_of_name(&self, name: &str) -> Option<i64> {
    self.by_name.get(&name.trim().to_lowercase()).copied()
  }

  /// Resolve a well-known subject to its catalogue id.
  pub fn resolve(&self, key: SubjectKey) -> Result<i64> {
    self
      .id_of_name(key.name())
      .ok_or_else(|| Error::UnknownSubject(key.name().to_owned()))
  }

  /// Resolve a list of well-known subjects, failing on the first missing one.
  pub fn resolve_all(&self, keys: &[SubjectKey]) -> Result<Vec<i64>> {
    keys.iter().map(|k| self.resolve(*k)).collect()
  }

  /// Check that every id of `triple` names a catalogue subject.
  pub fn validate(&self, triple: &SubjectTriple) -> Result<()> {
    match triple.ids().into_iter().find(|id| !self.contains(*id)) {
      Some(missing) => Err(Error::UnknownSubjectId(missing)),
      None => Ok(()),
    }
  }

  /// The subject names of `triple`, with `#<id>` for ids the catalogue lacks.
  pub fn names(&self, triple: &SubjectTriple) -> [String; 3] {
    triple.ids().map(|id| {
      self
        .name_of(id)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("#{id}"))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_catalogue_ids_are_sequential() {
    let subjects = SubjectKey::default_catalogue();
    assert_eq!(subjects[0], Subject { id: 1, name: "Physics".into() });
    assert!(subjects.iter().zip(1..).all(|(s, id)| s.id == id));
  }

  #[test]
  fn resolve_is_case_insensitive() {
    let catalogue = SubjectCatalogue::new(vec![Subject {
      id:   42,
      name: "combined mathematics".into(),
    }]);
    assert_eq!(catalogue.resolve(SubjectKey::CombinedMathematics).unwrap(), 42);
  }

  #[test]
  fn stored_names_are_trimmed() {
    let catalogue = SubjectCatalogue::new(vec![Subject { id: 1, name: "  Physics\t".into() }]);
    assert_eq!(catalogue.resolve(SubjectKey::Physics).unwrap(), 1);
    assert_eq!(catalogue.id_of_name(" physics "), Some(1));
  }

  #[test]
  fn resolve_missing_subject_fails_fast() {
    let catalogue = SubjectCatalogue::new(vec![Subject { id: 1, name: "Physics".into() }]);
    let err = catalogue
      .resolve_all(&[SubjectKey::Physics, SubjectKey::Chemistry])
      .unwrap_err();
    assert!(matches!(err, Error::UnknownSubject(ref name) if name == "Chemistry"));
  }

  #[test]
  fn validate_reports_missing_id() {
    let catalogue = SubjectCatalogue::new(SubjectKey::default_catalogue());
    let triple = SubjectTriple::new([1, 2, 999]).unwrap();
    assert!(matches!(
      catalogue.validate(&triple),
      Err(Error::UnknownSubjectId(999))
    ));
    assert_eq!(catalogue.names(&triple)[2], "#999");
  }
}
