//! Field references and edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Reference to a pass (`Pass`) or to one of its fields (`Pass.field`).
///
/// The pass name is everything before the first `.`. The remainder is the
/// field name and may itself contain dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldRef {
    pass: String,
    field: Option<String>,
}

impl FieldRef {
    /// Parse a `Pass` or `Pass.field` reference.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || GraphError::InvalidFieldRef(text.to_string());
        match text.split_once('.') {
            Some((pass, field)) => {
                if pass.is_empty() || field.is_empty() {
                    return Err(invalid());
                }
                Ok(Self {
                    pass: pass.to_string(),
                    field: Some(field.to_string()),
                })
            }
            None if text.is_empty() => Err(invalid()),
            None => Ok(Self {
                pass: text.to_string(),
                field: None,
            }),
        }
    }

    /// Reference a whole pass.
    pub fn pass_only(pass: impl Into<String>) -> Self {
        Self {
            pass: pass.into(),
            field: None,
        }
    }

    /// Pass instance name.
    pub fn pass(&self) -> &str {
        &self.pass
    }

    /// Field name, `None` for a whole-pass reference.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// True for `Pass.field` references.
    pub fn is_field(&self) -> bool {
        self.field.is_some()
    }

    pub(crate) fn refers_to(&self, pass: &str) -> bool {
        self.pass == pass
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}", self.pass, field),
            None => f.write_str(&self.pass),
        }
    }
}

impl FromStr for FieldRef {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldRef {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FieldRef> for String {
    fn from(value: FieldRef) -> Self {
        value.to_string()
    }
}

/// What an edge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Output field of one pass feeds an input field of another.
    Data,
    /// Ordering only: the destination pass runs after the source pass.
    Execution,
}

/// A directed edge in the render graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    src: FieldRef,
    dst: FieldRef,
}

impl Edge {
    /// Build an edge, rejecting a field endpoint paired with a pass endpoint.
    pub fn new(src: FieldRef, dst: FieldRef) -> Result<Self> {
        if src.is_field() != dst.is_field() {
            return Err(GraphError::MixedEdge {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        Ok(Self { src, dst })
    }

    /// Producing endpoint.
    pub fn src(&self) -> &FieldRef {
        &self.src
    }

    /// Consuming endpoint.
    pub fn dst(&self) -> &FieldRef {
        &self.dst
    }

    /// Data edge between fields, or execution edge between passes.
    pub fn kind(&self) -> EdgeKind {
        if self.src.is_field() {
            EdgeKind::Data
        } else {
            EdgeKind::Execution
        }
    }

    pub(crate) fn touches(&self, pass: &str) -> bool {
        self.src.refers_to(pass) || self.dst.refers_to(pass)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        let field = FieldRef::parse("VBufferRT.vbuffer").unwrap();
        assert_eq!(field.pass(), "VBufferRT");
        assert_eq!(field.field(), Some("vbuffer"));
        assert!(field.is_field());
        assert_eq!(field.to_string(), "VBufferRT.vbuffer");
    }

    #[test]
    fn test_parse_pass_only() {
        let field = FieldRef::parse("ReSTIR_FG").unwrap();
        assert_eq!(field.pass(), "ReSTIR_FG");
        assert_eq!(field.field(), None);
        assert_eq!(field, FieldRef::pass_only("ReSTIR_FG"));
    }

    #[test]
    fn test_parse_nested_field_name() {
        let field = FieldRef::parse("Pass.group.member").unwrap();
        assert_eq!(field.pass(), "Pass");
        assert_eq!(field.field(), Some("group.member"));
    }

    #[test]
    fn test_parse_malformed() {
        for text in ["", ".", "Pass.", ".field"] {
            assert!(
                matches!(FieldRef::parse(text), Err(GraphError::InvalidFieldRef(_))),
                "expected '{text}' to be rejected"
            );
        }
    }

    #[test]
    fn test_edge_kinds() {
        let data = Edge::new(
            "ReSTIR_FG.color".parse().unwrap(),
            "AccumulatePass.input".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(data.kind(), EdgeKind::Data);
        assert_eq!(data.to_string(), "ReSTIR_FG.color -> AccumulatePass.input");

        let exec = Edge::new(FieldRef::pass_only("A"), FieldRef::pass_only("B")).unwrap();
        assert_eq!(exec.kind(), EdgeKind::Execution);
    }

    #[test]
    fn test_mixed_edge_rejected() {
        let result = Edge::new("A.out".parse().unwrap(), FieldRef::pass_only("B"));
        assert!(matches!(result, Err(GraphError::MixedEdge { .. })));
    }

    #[test]
    fn test_field_ref_serializes_as_string() {
        let field = FieldRef::parse("ToneMapper.dst").unwrap();
        assert_eq!(serde_json::to_string(&field).unwrap(), r#""ToneMapper.dst""#);
        assert!(serde_json::from_str::<FieldRef>(r#""ToneMapper.""#).is_err());
    }
}
