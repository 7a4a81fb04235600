//! Streams: the academic tracks that own valid combinations.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  Result,
  catalogue::SubjectCatalogue,
  rule::{RuleError, RuleKind, StreamRule},
};

/// Name of the stream that never contributes combinations.
pub const COMMON_STREAM: &str = "Common";

/// Id of the stream that never contributes combinations.
pub const COMMON_STREAM_ID: i64 = 7;

/// A stored stream record. The rule stays raw JSON until
/// [`Stream::parse_rule`] validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
  pub id:     i64,
  pub name:   String,
  #[serde(default = "default_active")]
  pub active: bool,
  #[serde(default)]
  pub rule:   Value,
}

fn default_active() -> bool { true }

impl Stream {
  pub fn parse_rule(&self) -> Result<StreamRule, RuleError> {
    StreamRule::parse(&self.rule)
  }

  /// Whether the stream's name matches any of `names`, ignoring case.
  pub fn is_named(&self, names: &[String]) -> bool {
    names
      .iter()
      .any(|n| n.trim().eq_ignore_ascii_case(self.name.trim()))
  }
}

/// The stock streams with rules built against `catalogue`.
///
/// Ids are fixed: 1 Physical Science through 6 Arts, and 7 Common.
pub fn default_streams(catalogue: &SubjectCatalogue) -> Result<Vec<Stream>> {
  let stock = [
    (1, "Physical Science", RuleKind::PhysicalScience),
    (2, "Biological Science", RuleKind::BiologicalScience),
    (3, "Commerce", RuleKind::Commerce),
    (4, "Engineering Technology", RuleKind::EngineeringTechnology),
    (5, "Biosystems Technology", RuleKind::BiosystemsTechnology),
    (6, "Arts", RuleKind::Arts),
  ];

  let mut streams = stock
    .into_iter()
    .map(|(id, name, kind)| {
      Ok(Stream {
        id,
        name: name.to_owned(),
        active: true,
        rule: StreamRule::stock(kind, catalogue)?.to_json()?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  streams.push(Stream {
    id:     COMMON_STREAM_ID,
    name:   COMMON_STREAM.to_owned(),
    active: true,
    rule:   json!({ "type": "common" }),
  });
  Ok(streams)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalogue::SubjectKey;

  #[test]
  fn default_streams_include_common_as_seven() {
    let catalogue = SubjectCatalogue::new(SubjectKey::default_catalogue());
    let streams = default_streams(&catalogue).unwrap();
    assert_eq!(streams.len(), 7);
    let common = streams.iter().find(|s| s.id == COMMON_STREAM_ID).unwrap();
    assert_eq!(common.name, COMMON_STREAM);
    assert!(common.parse_rule().is_err());
    assert!(streams[..6].iter().all(|s| s.parse_rule().is_ok()));
  }

  #[test]
  fn default_streams_fail_on_missing_subject() {
    let catalogue = SubjectCatalogue::new(
      SubjectKey::default_catalogue()
        .into_iter()
        .filter(|s| s.name != "Biology"),
    );
    assert!(matches!(
      default_streams(&catalogue),
      Err(crate::Error::UnknownSubject(ref name)) if name == "Biology"
    ));
  }

  #[test]
  fn is_named_ignores_case_and_whitespace() {
    let stream = Stream {
      id:     7,
      name:   " common ".into(),
      active: true,
      rule:   Value::Null,
    };
    assert!(stream.is_named(&["Common".into()]));
    assert!(!stream.is_named(&["Arts".into()]));
  }
}
