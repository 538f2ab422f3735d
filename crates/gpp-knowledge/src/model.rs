//! Domain knowledge records
//!
//! Three record kinds are loaded from JSON: reference documents, criteria and
//! patch templates. Suggested criteria are derived per lot and returned to
//! callers, who may hand them back to select what gets patched.

use crate::clause::ClauseType;
use crate::cpv;
use crate::error::UnknownAmbitionLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Ambition level a criterion is written for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AmbitionLevel {
    /// Baseline criteria
    #[default]
    Core,
    /// Stricter criteria
    Comprehensive,
    /// Criteria valid at either level
    Both,
}

impl AmbitionLevel {
    /// Lowercase name as used in the records
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Comprehensive => "comprehensive",
            Self::Both => "both",
        }
    }
}

impl Display for AmbitionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmbitionLevel {
    type Err = UnknownAmbitionLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(Self::Core),
            "comprehensive" => Ok(Self::Comprehensive),
            "both" => Ok(Self::Both),
            _ => Err(UnknownAmbitionLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for AmbitionLevel {
    type Error = UnknownAmbitionLevel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Published GPP criteria set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDocument {
    pub name: String,
    /// Issuing body, e.g. `eu` or `national`
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub document_reference: String,
    /// Accepts a plain date or an ISO date-time; serialized as a date
    #[serde(default, with = "publication_date")]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub relevant_cpv_codes: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl ReferenceDocument {
    /// Whether any of `codes` falls under the document's codes
    #[must_use]
    pub fn is_applicable<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        cpv::has_match(codes, &self.relevant_cpv_codes)
    }
}

/// One GPP clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    /// Name of the reference document the clause comes from
    pub gpp_document: String,
    #[serde(default)]
    pub gpp_source: Option<String>,
    #[serde(default)]
    pub category: String,
    /// e.g. `award criteria`, `selection criteria`
    pub criterion_type: String,
    /// `core`, `comprehensive` or `both`; kept as written
    pub ambition_level: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relevant_cpv_codes: Vec<String>,
    #[serde(default)]
    pub environmental_impact_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub selection_criterion_type: Option<String>,
}

impl Criterion {
    /// Level check, case-insensitive; `both` applies everywhere
    #[must_use]
    pub fn applies_at(&self, level: AmbitionLevel) -> bool {
        let own = self.ambition_level.trim();
        own.eq_ignore_ascii_case(AmbitionLevel::Both.as_str())
            || own.eq_ignore_ascii_case(level.as_str())
    }

    /// Codes match and the level applies
    #[must_use]
    pub fn is_applicable<S: AsRef<str>>(&self, codes: &[S], level: AmbitionLevel) -> bool {
        self.applies_at(level) && cpv::has_match(codes, &self.relevant_cpv_codes)
    }

    /// Dispatch key for clause patches
    #[inline]
    #[must_use]
    pub fn clause_type(&self) -> ClauseType {
        ClauseType::from(self.criterion_type.as_str())
    }

    /// Source, if set and non-blank
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        non_blank(self.gpp_source.as_deref())
    }

    /// Impact category, if set and non-blank
    #[must_use]
    pub fn environmental_impact(&self) -> Option<&str> {
        non_blank(self.environmental_impact_type.as_deref())
    }

    /// Whether `suggested` was derived from this clause
    ///
    /// Compares id, ambition level and document name, ignoring case.
    #[must_use]
    pub fn matches(&self, suggested: &SuggestedCriterion) -> bool {
        self.id.eq_ignore_ascii_case(&suggested.id)
            && self.ambition_level.eq_ignore_ascii_case(&suggested.ambition_level)
            && self.gpp_document.eq_ignore_ascii_case(&suggested.gpp_document)
    }
}

/// Template for one patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTemplate {
    pub name: String,
    #[serde(default)]
    pub bt_ids: Vec<String>,
    /// Prerequisite template; absent, empty or `-` means none
    #[serde(default)]
    pub depends_on: Option<String>,
    /// Lot-relative path; empty means the lot itself
    #[serde(default)]
    pub path_in_lot: String,
    /// Fragment text with `{name}` placeholders
    #[serde(default)]
    pub value: String,
}

impl PatchTemplate {
    /// Declared prerequisite template name
    #[must_use]
    pub fn prerequisite(&self) -> Option<&str> {
        non_blank(self.depends_on.as_deref()).filter(|name| *name != "-")
    }

    /// Path to target, `.` when the template targets the lot
    #[must_use]
    pub fn path(&self) -> &str {
        match self.path_in_lot.trim() {
            "" => ".",
            path => path,
        }
    }
}

/// Criterion projected onto one lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCriterion {
    pub gpp_document: String,
    #[serde(default)]
    pub category: String,
    pub criterion_type: String,
    pub ambition_level: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relevant_cpv_codes: Vec<String>,
    /// Lot codes covered by `relevant_cpv_codes`
    #[serde(default)]
    pub matching_cpv_codes: Vec<String>,
    pub lot_id: String,
}

impl SuggestedCriterion {
    /// Project `criterion` onto a lot with the given codes
    #[must_use]
    pub fn from_criterion<S: AsRef<str>>(criterion: &Criterion, lot_id: &str, lot_codes: &[S]) -> Self {
        Self {
            gpp_document: criterion.gpp_document.clone(),
            category: criterion.category.clone(),
            criterion_type: criterion.criterion_type.clone(),
            ambition_level: criterion.ambition_level.clone(),
            id: criterion.id.clone(),
            name: criterion.name.clone(),
            relevant_cpv_codes: criterion.relevant_cpv_codes.clone(),
            matching_cpv_codes: cpv::matching_codes(lot_codes, &criterion.relevant_cpv_codes),
            lot_id: lot_id.to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

mod publication_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        parse(text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid publication date: {text}")))
    }

    fn parse(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
    }
}
