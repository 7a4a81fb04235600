//! Per-stream eligibility rules.
//!
//! Rules arrive as untrusted JSON stored alongside each stream. They are
//! parsed and structurally checked here, at the boundary, before any generator
//! sees them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::{
  Result,
  catalogue::{SubjectCatalogue, SubjectKey},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a stream's rule document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
  #[error("rule has no `type` field")]
  MissingType,

  #[error("unrecognised rule type {0:?}")]
  UnknownType(String),

  #[error("malformed rule: {0}")]
  Malformed(String),
}

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The generation strategy named by a rule's `type` tag.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
  PhysicalScience,
  BiologicalScience,
  Commerce,
  EngineeringTechnology,
  BiosystemsTechnology,
  Arts,
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// A parsed stream rule, one variant per generation strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamRule {
  /// Any three of the allowed subjects.
  PhysicalScience {
    #[serde(alias = "allowedSubjects")]
    allowed_subjects: Vec<i64>,
  },
  /// Every required subject, topped up from the optional pool.
  BiologicalScience {
    required: Vec<i64>,
    optional: Vec<i64>,
  },
  /// All three core subjects, or any two core plus one supporting subject.
  Commerce {
    core:       Vec<i64>,
    supporting: Vec<i64>,
  },
  EngineeringTechnology {
    required: Vec<i64>,
    optional: Vec<i64>,
  },
  BiosystemsTechnology {
    required: Vec<i64>,
    optional: Vec<i64>,
  },
  /// Basket-based electives; see [`ArtsLimits`] for the size caps.
  Arts {
    baskets: ArtsBaskets,
    #[serde(default)]
    limits:  ArtsLimits,
  },
}

/// The elective baskets of the Arts stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtsBaskets {
  #[serde(alias = "socialSciences")]
  pub social_sciences: Vec<i64>,
  #[serde(default)]
  pub religions:       Vec<i64>,
  /// Carried with the rule but not drawn on by any combination rule yet.
  #[serde(default)]
  pub aesthetic:       Vec<i64>,
  #[serde(default)]
  pub languages:       Vec<i64>,
}

/// Truncation caps for the Arts generator.
///
/// These bound the output size; they are not admissions policy. The defaults
/// reproduce the historical cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtsLimits {
  /// How many leading social-science subjects feed the three-of rule.
  pub social_sciences_slice: usize,
  /// How many leading social-science subjects feed the two-plus-religion rule.
  pub social_religion_slice: usize,
  /// Maximum number of three-social-science combinations emitted.
  pub max_social_triples:    usize,
}

impl Default for ArtsLimits {
  fn default() -> Self {
    Self {
      social_sciences_slice: 10,
      social_religion_slice: 8,
      max_social_triples:    50,
    }
  }
}

impl StreamRule {
  /// Parse and validate an untrusted rule document.
  pub fn parse(value: &Value) -> Result<Self, RuleError> {
    let tag = match value.get("type") {
      None | Some(Value::Null) => return Err(RuleError::MissingType),
      Some(Value::String(tag)) => tag,
      Some(other) => {
        return Err(RuleError::Malformed(format!(
          "`type` must be a string, got {other}"
        )));
      }
    };
    tag
      .parse::<RuleKind>()
      .map_err(|_| RuleError::UnknownType(tag.clone()))?;

    let rule: Self = serde_json::from_value(value.clone())
      .map_err(|e| RuleError::Malformed(e.to_string()))?;
    rule.check()?;
    Ok(rule)
  }

  pub fn kind(&self) -> RuleKind {
    match self {
      Self::PhysicalScience { .. } => RuleKind::PhysicalScience,
      Self::BiologicalScience { .. } => RuleKind::BiologicalScience,
      Self::Commerce { .. } => RuleKind::Commerce,
      Self::EngineeringTechnology { .. } => RuleKind::EngineeringTechnology,
      Self::BiosystemsTechnology { .. } => RuleKind::BiosystemsTechnology,
      Self::Arts { .. } => RuleKind::Arts,
    }
  }

  /// Structural checks that serde cannot express.
  fn check(&self) -> Result<(), RuleError> {
    match self {
      Self::PhysicalScience { allowed_subjects } => {
        distinct("allowed_subjects", allowed_subjects)?;
        if allowed_subjects.len() < 3 {
          return Err(RuleError::Malformed(format!(
            "allowed_subjects needs at least 3 subjects, got {}",
            allowed_subjects.len()
          )));
        }
      }
      Self::BiologicalScience { required, optional }
      | Self::EngineeringTechnology { required, optional }
      | Self::BiosystemsTechnology { required, optional } => {
        distinct("required", required)?;
        distinct("optional", optional)?;
        if required.len() > 2 {
          return Err(RuleError::Malformed(format!(
            "at most 2 required subjects fit a combination, got {}",
            required.len()
          )));
        }
        if optional.iter().any(|id| required.contains(id)) {
          return Err(RuleError::Malformed(
            "optional pool repeats a required subject".into(),
          ));
        }
        if required.len() + optional.len() < 3 {
          return Err(RuleError::Malformed(
            "required and optional subjects cannot fill 3 slots".into(),
          ));
        }
      }
      Self::Commerce { core, supporting } => {
        distinct("core", core)?;
        distinct("supporting", supporting)?;
        if core.len() != 3 {
          return Err(RuleError::Malformed(format!(
            "commerce needs exactly 3 core subjects, got {}",
            core.len()
          )));
        }
      }
      Self::Arts { baskets, .. } => {
        distinct("social_sciences", &baskets.social_sciences)?;
        distinct("religions", &baskets.religions)?;
        distinct("aesthetic", &baskets.aesthetic)?;
        distinct("languages", &baskets.languages)?;
        if !matches!(baskets.languages.len(), 0 | 3) {
          return Err(RuleError::Malformed(format!(
            "the languages basket holds 0 or 3 subjects, got {}",
            baskets.languages.len()
          )));
        }
      }
    }
    Ok(())
  }

  // ── Stock rules ─────────────────────────────────────────────────────────

  /// Build the stock rule for `kind`, resolving every subject by name.
  ///
  /// Fails with [`crate::Error::UnknownSubject`] if the catalogue lacks any
  /// subject the rule names.
  pub fn stock(kind: RuleKind, catalogue: &SubjectCatalogue) -> Result<Self> {
    let ids = |keys: &[SubjectKey]| catalogue.resolve_all(keys);
    Ok(match kind {
      RuleKind::PhysicalScience => Self::PhysicalScience {
        allowed_subjects: ids(PHYSICAL_SCIENCE)?,
      },
      RuleKind::BiologicalScience => Self::BiologicalScience {
        required: ids(&[SubjectKey::Biology])?,
        optional: ids(BIOLOGICAL_SCIENCE_OPTIONAL)?,
      },
      RuleKind::Commerce => Self::Commerce {
        core:       ids(COMMERCE_CORE)?,
        supporting: ids(COMMERCE_SUPPORTING)?,
      },
      RuleKind::EngineeringTechnology => Self::EngineeringTechnology {
        required: ids(&[
          SubjectKey::EngineeringTechnology,
          SubjectKey::ScienceForTechnology,
        ])?,
        optional: ids(TECHNOLOGY_OPTIONAL)?,
      },
      RuleKind::BiosystemsTechnology => Self::BiosystemsTechnology {
        required: ids(&[
          SubjectKey::BioSystemsTechnology,
          SubjectKey::ScienceForTechnology,
        ])?,
        optional: ids(TECHNOLOGY_OPTIONAL)?,
      },
      RuleKind::Arts => Self::Arts {
        baskets: ArtsBaskets {
          social_sciences: ids(ARTS_SOCIAL_SCIENCES)?,
          religions:       ids(ARTS_RELIGIONS)?,
          aesthetic:       ids(&[SubjectKey::Art])?,
          languages:       ids(ARTS_LANGUAGES)?,
        },
        limits:  ArtsLimits::default(),
      },
    })
  }

  pub fn to_json(&self) -> Result<Value> { Ok(serde_json::to_value(self)?) }
}

fn distinct(field: &str, ids: &[i64]) -> Result<(), RuleError> {
  let mut seen = BTreeSet::new();
  match ids.iter().find(|id| !seen.insert(**id)) {
    Some(id) => Err(RuleError::Malformed(format!(
      "{field} lists subject {id} more than once"
    ))),
    None => Ok(()),
  }
}

// ─── Stock subject pools ─────────────────────────────────────────────────────

const PHYSICAL_SCIENCE: &[SubjectKey] = &[
  SubjectKey::HigherMathematics,
  SubjectKey::CombinedMathematics,
  SubjectKey::Physics,
  SubjectKey::Chemistry,
];

const BIOLOGICAL_SCIENCE_OPTIONAL: &[SubjectKey] = &[
  SubjectKey::Physics,
  SubjectKey::Chemistry,
  SubjectKey::Mathematics,
  SubjectKey::AgriculturalScience,
];

const COMMERCE_CORE: &[SubjectKey] = &[
  SubjectKey::BusinessStudies,
  SubjectKey::Economics,
  SubjectKey::Accounting,
];

const COMMERCE_SUPPORTING: &[SubjectKey] = &[
  SubjectKey::AgriculturalScience,
  SubjectKey::Geography,
  SubjectKey::BusinessStatistics,
  SubjectKey::CombinedMathematics,
  SubjectKey::Mathematics,
  SubjectKey::History,
  SubjectKey::PoliticalScience,
  SubjectKey::English,
  SubjectKey::LogicAndScientificMethod,
  SubjectKey::Ict,
];

const TECHNOLOGY_OPTIONAL: &[SubjectKey] = &[
  SubjectKey::Economics,
  SubjectKey::Geography,
  SubjectKey::HomeEconomics,
  SubjectKey::English,
  SubjectKey::CommunicationAndMediaStudies,
  SubjectKey::Ict,
  SubjectKey::Art,
  SubjectKey::BusinessStudies,
  SubjectKey::AgriculturalScience,
  SubjectKey::Accounting,
  SubjectKey::Mathematics,
];

const ARTS_SOCIAL_SCIENCES: &[SubjectKey] = &[
  SubjectKey::Economics,
  SubjectKey::Geography,
  SubjectKey::History,
  SubjectKey::PoliticalScience,
  SubjectKey::LogicAndScientificMethod,
  SubjectKey::HomeEconomics,
  SubjectKey::CommunicationAndMediaStudies,
  SubjectKey::Accounting,
  SubjectKey::BusinessStudies,
  SubjectKey::BusinessStatistics,
  SubjectKey::AgriculturalScience,
  SubjectKey::Mathematics,
  SubjectKey::Ict,
  SubjectKey::GreekAndRomanCivilization,
  SubjectKey::BuddhistCivilization,
  SubjectKey::HinduCivilization,
  SubjectKey::ChristianCivilization,
  SubjectKey::IslamicCivilization,
  SubjectKey::DramaAndTheatre,
];

const ARTS_RELIGIONS: &[SubjectKey] = &[
  SubjectKey::Buddhism,
  SubjectKey::Hinduism,
  SubjectKey::Christianity,
  SubjectKey::Islam,
];

const ARTS_LANGUAGES: &[SubjectKey] =
  &[SubjectKey::Sinhala, SubjectKey::Tamil, SubjectKey::English];
