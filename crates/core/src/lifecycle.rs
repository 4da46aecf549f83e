//! Bucket lifecycle rules
//!
//! [`LifecycleOptions`] is what callers fill in; [`LifecycleOptions::build`]
//! validates it and produces the single [`LifecycleRule`] that is submitted
//! for a bucket.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rule id used when none is given
pub const DEFAULT_RULE_ID: &str = "DefaultRule";

/// Longest rule id the service accepts
pub const MAX_RULE_ID_LEN: usize = 255;

/// Whether a rule is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    #[default]
    Enabled,
    Disabled,
}

impl RuleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleStatus::Enabled => "Enabled",
            RuleStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" => Ok(RuleStatus::Enabled),
            "disabled" => Ok(RuleStatus::Disabled),
            _ => Err(Error::InvalidArgument(format!(
                "unknown rule status '{s}', expected Enabled or Disabled"
            ))),
        }
    }
}

/// Object tag predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parses `key=value`
impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Tag::new(key, value)),
            _ => Err(Error::InvalidArgument(format!(
                "invalid tag '{s}', expected key=value"
            ))),
        }
    }
}

/// Which objects a rule applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleFilter {
    /// Empty filter: every object in the bucket
    #[default]
    All,
    Prefix(String),
    Tag(Tag),
    /// Conjunction of a prefix and/or several tags
    And {
        #[serde(skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
        tags: Vec<Tag>,
    },
}

impl LifecycleFilter {
    /// Build the filter from its predicates.
    ///
    /// No predicate gives [`LifecycleFilter::All`], exactly one is used
    /// directly, and more than one is wrapped in [`LifecycleFilter::And`].
    /// An empty prefix counts as no prefix.
    pub fn from_parts(prefix: Option<String>, mut tags: Vec<Tag>) -> Self {
        let prefix = prefix.filter(|p| !p.is_empty());

        match (prefix, tags.len()) {
            (None, 0) => LifecycleFilter::All,
            (Some(prefix), 0) => LifecycleFilter::Prefix(prefix),
            (None, 1) => LifecycleFilter::Tag(tags.remove(0)),
            (prefix, _) => LifecycleFilter::And { prefix, tags },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LifecycleFilter::All)
    }
}

/// Current-version expiration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_object_delete_marker: Option<bool>,
}

/// Move current versions to another storage class after `days`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub days: i32,
    pub storage_class: String,
}

/// Parses `days:STORAGE_CLASS`, e.g. `30:STANDARD_IA`
impl FromStr for Transition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (days, storage_class) = parse_days_and_class(s)?;
        Ok(Transition {
            days,
            storage_class,
        })
    }
}

/// Move noncurrent versions to another storage class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoncurrentVersionTransition {
    pub noncurrent_days: i32,
    pub storage_class: String,
}

/// Parses `days:STORAGE_CLASS`
impl FromStr for NoncurrentVersionTransition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (noncurrent_days, storage_class) = parse_days_and_class(s)?;
        Ok(NoncurrentVersionTransition {
            noncurrent_days,
            storage_class,
        })
    }
}

fn parse_days_and_class(s: &str) -> Result<(i32, String)> {
    let invalid = || Error::InvalidArgument(format!("invalid transition '{s}', expected days:CLASS"));
    let (days, class) = s.split_once(':').ok_or_else(invalid)?;
    let days = days.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok((days, class.trim().to_string()))
}

/// A validated lifecycle rule, ready to submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRule {
    pub id: String,
    pub status: RuleStatus,
    pub filter: LifecycleFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Expiration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration_days: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub noncurrent_version_transitions: Vec<NoncurrentVersionTransition>,
}

/// Caller-facing lifecycle settings
///
/// Every field is optional:
/// - `rule_id` defaults to [`DEFAULT_RULE_ID`]
/// - `status` defaults to [`RuleStatus::Enabled`]
/// - no `prefix` and no `tags` means the rule applies to the whole bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleOptions {
    pub rule_id: Option<String>,
    pub status: Option<RuleStatus>,
    pub prefix: Option<String>,
    pub tags: Vec<Tag>,
    pub expiration_days: Option<i32>,
    pub expired_object_delete_marker: Option<bool>,
    pub transitions: Vec<Transition>,
    pub noncurrent_version_expiration_days: Option<i32>,
    pub noncurrent_version_transitions: Vec<NoncurrentVersionTransition>,
}

impl LifecycleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule_id(mut self, id: impl Into<String>) -> Self {
        self.rule_id = Some(id.into());
        self
    }

    pub fn status(mut self, status: RuleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn expiration_days(mut self, days: i32) -> Self {
        self.expiration_days = Some(days);
        self
    }

    pub fn expired_object_delete_marker(mut self, enabled: bool) -> Self {
        self.expired_object_delete_marker = Some(enabled);
        self
    }

    pub fn transition(mut self, days: i32, storage_class: impl Into<String>) -> Self {
        self.transitions.push(Transition {
            days,
            storage_class: storage_class.into(),
        });
        self
    }

    pub fn noncurrent_version_expiration_days(mut self, days: i32) -> Self {
        self.noncurrent_version_expiration_days = Some(days);
        self
    }

    pub fn noncurrent_version_transition(
        mut self,
        noncurrent_days: i32,
        storage_class: impl Into<String>,
    ) -> Self {
        self.noncurrent_version_transitions
            .push(NoncurrentVersionTransition {
                noncurrent_days,
                storage_class: storage_class.into(),
            });
        self
    }

    /// Validate the settings and produce the rule
    pub fn build(&self) -> Result<LifecycleRule> {
        let id = self
            .rule_id
            .clone()
            .unwrap_or_else(|| DEFAULT_RULE_ID.to_string());
        if id.is_empty() || id.chars().count() > MAX_RULE_ID_LEN {
            return Err(Error::InvalidArgument(format!(
                "rule id must be 1 to {MAX_RULE_ID_LEN} characters"
            )));
        }

        let mut seen = HashSet::new();
        for tag in &self.tags {
            if tag.key.is_empty() {
                return Err(Error::InvalidArgument("tag key cannot be empty".into()));
            }
            if !seen.insert(tag.key.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate tag key '{}'",
                    tag.key
                )));
            }
        }

        if let Some(days) = self.expiration_days {
            require_positive("expiration_days", days)?;
            if self.expired_object_delete_marker == Some(true) {
                return Err(Error::InvalidArgument(
                    "expired_object_delete_marker cannot be combined with expiration_days".into(),
                ));
            }
        }
        if let Some(days) = self.noncurrent_version_expiration_days {
            require_positive("noncurrent_version_expiration_days", days)?;
        }
        for t in &self.transitions {
            require_storage_class(&t.storage_class)?;
            if t.days < 0 {
                return Err(Error::InvalidArgument(format!(
                    "transition days must not be negative, got {}",
                    t.days
                )));
            }
        }
        for t in &self.noncurrent_version_transitions {
            require_storage_class(&t.storage_class)?;
            require_positive("noncurrent transition days", t.noncurrent_days)?;
        }

        // A disabled marker has no effect and does not count as an action
        let delete_marker = self.expired_object_delete_marker.filter(|enabled| *enabled);
        let expiration = if self.expiration_days.is_some() || delete_marker.is_some() {
            Some(Expiration {
                days: self.expiration_days,
                expired_object_delete_marker: delete_marker,
            })
        } else {
            None
        };

        let rule = LifecycleRule {
            id,
            status: self.status.unwrap_or_default(),
            filter: LifecycleFilter::from_parts(self.prefix.clone(), self.tags.clone()),
            expiration,
            transitions: self.transitions.clone(),
            noncurrent_version_expiration_days: self.noncurrent_version_expiration_days,
            noncurrent_version_transitions: self.noncurrent_version_transitions.clone(),
        };

        if rule.expiration.is_none()
            && rule.transitions.is_empty()
            && rule.noncurrent_version_expiration_days.is_none()
            && rule.noncurrent_version_transitions.is_empty()
        {
            return Err(Error::InvalidArgument(
                "lifecycle rule needs at least one expiration or transition".into(),
            ));
        }

        Ok(rule)
    }
}

fn require_positive(field: &str, days: i32) -> Result<()> {
    if days < 1 {
        return Err(Error::InvalidArgument(format!(
            "{field} must be at least 1, got {days}"
        )));
    }
    Ok(())
}

fn require_storage_class(class: &str) -> Result<()> {
    if class.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "transition storage class cannot be empty".into(),
        ));
    }
    Ok(())
}
