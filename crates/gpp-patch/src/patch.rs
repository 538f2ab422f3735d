//! Suggested patch model

use crate::error::PatchError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// What a patch does to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PatchOperation {
    /// Insert the value under the node at `path`
    Create,
    /// Replace the node at `path` with the value
    Update,
    /// Detach the node at `path`
    Remove,
}

impl PatchOperation {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
        }
    }
}

impl Display for PatchOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchOperation {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "remove" => Ok(Self::Remove),
            _ => Err(PatchError::InvalidOperation(s.to_string())),
        }
    }
}

impl TryFrom<String> for PatchOperation {
    type Error = PatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Template instantiated for one lot
///
/// Equality and hashing ignore `description`, so the same structural patch
/// suggested for two clauses compares equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedPatch {
    /// Template name, or a name derived from it
    pub name: String,
    /// eForms business term ids touched
    #[serde(default)]
    pub bt_ids: Vec<String>,
    /// Prerequisite template name
    #[serde(default)]
    pub depends_on: Option<String>,
    /// Path relative to the lot element
    pub path: String,
    /// Fragment text, empty for removals
    #[serde(default)]
    pub value: String,
    pub op: PatchOperation,
    /// Human-readable summary, not part of equality
    #[serde(default)]
    pub description: String,
    pub lot_id: String,
}

impl SuggestedPatch {
    /// Start building a patch
    #[inline]
    #[must_use]
    pub fn builder() -> SuggestedPatchBuilder {
        SuggestedPatchBuilder::new()
    }
}

impl PartialEq for SuggestedPatch {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.bt_ids == other.bt_ids
            && self.depends_on == other.depends_on
            && self.path == other.path
            && self.value == other.value
            && self.op == other.op
            && self.lot_id == other.lot_id
    }
}

impl Eq for SuggestedPatch {}

impl Hash for SuggestedPatch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.bt_ids.hash(state);
        self.depends_on.hash(state);
        self.path.hash(state);
        self.value.hash(state);
        self.op.hash(state);
        self.lot_id.hash(state);
    }
}

impl Display for SuggestedPatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at {}:{}", self.op, self.name, self.lot_id, self.path)
    }
}

/// Drop repeated patches, keeping the first occurrence of each
#[must_use]
pub fn dedup_patches(patches: Vec<SuggestedPatch>) -> Vec<SuggestedPatch> {
    patches.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

/// Builder for [`SuggestedPatch`]
#[derive(Debug, Clone, Default)]
pub struct SuggestedPatchBuilder {
    name: Option<String>,
    bt_ids: Vec<String>,
    depends_on: Option<String>,
    path: Option<String>,
    value: String,
    op: Option<PatchOperation>,
    description: String,
    lot_id: Option<String>,
}

impl SuggestedPatchBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set name
    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set business term ids
    #[inline]
    #[must_use]
    pub fn bt_ids(mut self, bt_ids: Vec<String>) -> Self {
        self.bt_ids = bt_ids;
        self
    }

    /// Set prerequisite template name
    #[inline]
    #[must_use]
    pub fn depends_on(mut self, depends_on: Option<String>) -> Self {
        self.depends_on = depends_on;
        self
    }

    /// Set lot-relative path
    #[inline]
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set fragment text
    #[inline]
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set operation
    #[inline]
    #[must_use]
    pub fn op(mut self, op: PatchOperation) -> Self {
        self.op = Some(op);
        self
    }

    /// Set description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set target lot
    #[inline]
    #[must_use]
    pub fn lot_id(mut self, lot_id: impl Into<String>) -> Self {
        self.lot_id = Some(lot_id.into());
        self
    }

    /// Build patch
    ///
    /// # Errors
    /// Returns [`PatchError::MissingField`] if name, path, op or lot id is unset.
    pub fn build(self) -> Result<SuggestedPatch, PatchError> {
        Ok(SuggestedPatch {
            name: self.name.ok_or(PatchError::MissingField("name"))?,
            bt_ids: self.bt_ids,
            depends_on: self.depends_on,
            path: self.path.ok_or(PatchError::MissingField("path"))?,
            value: self.value,
            op: self.op.ok_or(PatchError::MissingField("op"))?,
            description: self.description,
            lot_id: self.lot_id.ok_or(PatchError::MissingField("lotId"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patch(name: &str, description: &str) -> SuggestedPatch {
        SuggestedPatch::builder()
            .name(name)
            .path("cac:TenderingTerms")
            .value("<cac:AwardingTerms/>")
            .op(PatchOperation::Create)
            .description(description)
            .lot_id("LOT-0001")
            .build()
            .unwrap()
    }

    #[test]
    fn operation_parses_case_insensitively() {
        assert_eq!("CREATE".parse::<PatchOperation>(), Ok(PatchOperation::Create));
        assert_eq!("Update".parse::<PatchOperation>(), Ok(PatchOperation::Update));
        assert_eq!(" remove ".parse::<PatchOperation>(), Ok(PatchOperation::Remove));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = "invalidOp".parse::<PatchOperation>().unwrap_err();
        assert_eq!(err.to_string(), "invalid patch operation: invalidOp");
    }

    #[test]
    fn equality_ignores_description() {
        assert_eq!(patch("Awarding Terms", "a"), patch("Awarding Terms", "b"));
        assert_ne!(patch("Awarding Terms", "a"), patch("Tendering Terms", "a"));
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let patches = vec![
            patch("Tendering Terms", "first"),
            patch("Awarding Terms", ""),
            patch("Tendering Terms", "second"),
        ];
        let deduped = dedup_patches(patches);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].name, "Tendering Terms");
        assert_eq!(deduped[0].description, "first");
        assert_eq!(deduped[1].name, "Awarding Terms");
    }

    #[test]
    fn builder_requires_fields() {
        let err = SuggestedPatch::builder().name("x").build().unwrap_err();
        assert_eq!(err, PatchError::MissingField("path"));
    }

    #[test]
    fn json_uses_camel_case_and_lowercase_op() {
        let json = serde_json::to_value(patch("Tendering Terms", "d")).unwrap();
        assert_eq!(json["op"], "create");
        assert_eq!(json["lotId"], "LOT-0001");
        assert!(json.get("btIds").is_some());

        let back: SuggestedPatch = serde_json::from_value(json).unwrap();
        assert_eq!(back.op, PatchOperation::Create);
    }

    #[test]
    fn json_with_bad_op_fails() {
        let result = serde_json::from_str::<SuggestedPatch>(
            r#"{"name":"n","path":".","op":"invalidOp","lotId":"LOT-0001"}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid patch operation: invalidOp"), "{err}");
    }
}
