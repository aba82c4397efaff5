//! AtomicFact: an immutable (subject, predicate, object) core plus a
//! two-state lifecycle (`Active` → `Invalidated`).
//!
//! The core has no setters. The only way to change a fact is
//! [`AtomicFact::apply`], which returns a new version and leaves the
//! original untouched. Once invalidated, a fact never changes again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classification::{FactKind, TemporalKind};
use super::confidence::Confidence;
use super::invalidation::{InvalidationReason, LifecycleDelta};
use crate::entity::{self, EntityId};
use crate::errors::ValidationError;

/// Globally unique fact identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(Uuid);

impl FactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Normalized (subject, predicate) pair. Conflict lookup and per-key
/// serialization both go through this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactKey {
    pub subject_id: EntityId,
    pub predicate: String,
}

impl FactKey {
    pub fn from_raw(subject: &str, predicate: &str) -> Self {
        Self {
            subject_id: entity::normalize(subject).id,
            predicate: entity::normalize_predicate(predicate),
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject_id, self.predicate)
    }
}

/// Everything needed to build a fact. Validated by [`AtomicFact::create`].
#[derive(Debug, Clone)]
pub struct NewFact {
    pub id: FactId,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub source_chunk_id: Uuid,
    pub source_text: String,
    pub fact_kind: FactKind,
    pub temporal_kind: TemporalKind,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_open_interval: bool,
    pub confidence: f64,
    pub extracted_at: DateTime<Utc>,
}

/// Immutable part of a fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactCore {
    subject: String,
    predicate: String,
    object: String,
    key: FactKey,
    object_id: EntityId,
    source_chunk_id: Uuid,
    source_text: String,
    fact_kind: FactKind,
    temporal_kind: TemporalKind,
    valid_from: DateTime<Utc>,
    is_open_interval: bool,
    confidence: Confidence,
    extracted_at: DateTime<Utc>,
}

impl FactCore {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn key(&self) -> &FactKey {
        &self.key
    }

    pub fn subject_id(&self) -> EntityId {
        self.key.subject_id
    }

    pub fn object_id(&self) -> EntityId {
        self.object_id
    }

    pub fn source_chunk_id(&self) -> Uuid {
        self.source_chunk_id
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn fact_kind(&self) -> FactKind {
        self.fact_kind
    }

    pub fn temporal_kind(&self) -> TemporalKind {
        self.temporal_kind
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn is_open_interval(&self) -> bool {
        self.is_open_interval
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn extracted_at(&self) -> DateTime<Utc> {
        self.extracted_at
    }
}

/// Lifecycle metadata written exactly once, by the first invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Invalidation {
    pub by: FactId,
    pub at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
    pub reason: InvalidationReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactState {
    Active,
    Invalidated(Invalidation),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactLifecycle {
    valid_until: Option<DateTime<Utc>>,
    state: FactState,
}

impl FactLifecycle {
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    pub fn state(&self) -> &FactState {
        &self.state
    }
}

/// Result of applying a lifecycle delta.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The new version. The receiver is unchanged.
    Applied(AtomicFact),
    /// The fact was already invalidated; first invalidation wins.
    AlreadyInvalidated(Invalidation),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomicFact {
    id: FactId,
    core: FactCore,
    lifecycle: FactLifecycle,
}

impl AtomicFact {
    /// Validate and build an active fact.
    pub fn create(new: NewFact) -> Result<Self, ValidationError> {
        let subject = require_text("subject", &new.subject)?;
        let predicate = require_text("predicate", &new.predicate)?;
        let object = require_text("object", &new.object)?;

        let subject_entity = entity::normalize(&subject);
        let object_entity = entity::normalize(&object);
        let predicate_key = entity::normalize_predicate(&predicate);
        if subject_entity.normalized_name.is_empty() {
            return Err(ValidationError::IncompleteTriplet { field: "subject" });
        }
        if predicate_key.is_empty() {
            return Err(ValidationError::IncompleteTriplet { field: "predicate" });
        }
        if object_entity.normalized_name.is_empty() {
            return Err(ValidationError::IncompleteTriplet { field: "object" });
        }

        let confidence = Confidence::try_new(new.confidence)?;
        check_window(new.valid_from, new.valid_until)?;

        Ok(Self {
            id: new.id,
            core: FactCore {
                subject,
                predicate,
                object,
                key: FactKey {
                    subject_id: subject_entity.id,
                    predicate: predicate_key,
                },
                object_id: object_entity.id,
                source_chunk_id: new.source_chunk_id,
                source_text: new.source_text,
                fact_kind: new.fact_kind,
                temporal_kind: new.temporal_kind,
                valid_from: new.valid_from,
                is_open_interval: new.is_open_interval,
                confidence,
                extracted_at: new.extracted_at,
            },
            lifecycle: FactLifecycle {
                valid_until: new.valid_until,
                state: FactState::Active,
            },
        })
    }

    /// Rebuild a persisted fact in whatever state it was stored.
    pub fn restore(new: NewFact, state: FactState) -> Result<Self, ValidationError> {
        let mut fact = Self::create(new)?;
        if let FactState::Invalidated(inv) = &state {
            if inv.by == fact.id {
                return Err(ValidationError::SelfInvalidation {
                    fact_id: fact.id.to_string(),
                });
            }
        }
        fact.lifecycle.state = state;
        Ok(fact)
    }

    /// Pure lifecycle transition. `valid_until` from the delta is used only if
    /// the fact has none; an earlier boundary is preserved.
    pub fn apply(&self, delta: &LifecycleDelta) -> Result<Transition, ValidationError> {
        if let FactState::Invalidated(existing) = self.lifecycle.state {
            return Ok(Transition::AlreadyInvalidated(existing));
        }
        if delta.invalidated_by == self.id {
            return Err(ValidationError::SelfInvalidation {
                fact_id: self.id.to_string(),
            });
        }

        let valid_until = self.lifecycle.valid_until.or(delta.valid_until);
        check_window(self.core.valid_from, valid_until)?;

        Ok(Transition::Applied(Self {
            id: self.id,
            core: self.core.clone(),
            lifecycle: FactLifecycle {
                valid_until,
                state: FactState::Invalidated(Invalidation {
                    by: delta.invalidated_by,
                    at: delta.invalidated_at,
                    expired_at: delta.expired_at,
                    reason: delta.reason,
                }),
            },
        }))
    }

    /// Re-check structural invariants. Stores call this before appending.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("subject", &self.core.subject)?;
        require_text("predicate", &self.core.predicate)?;
        require_text("object", &self.core.object)?;
        Confidence::try_new(self.core.confidence.value())?;
        check_window(self.core.valid_from, self.lifecycle.valid_until)?;
        if let FactState::Invalidated(inv) = self.lifecycle.state {
            if inv.by == self.id {
                return Err(ValidationError::SelfInvalidation {
                    fact_id: self.id.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn id(&self) -> FactId {
        self.id
    }

    pub fn core(&self) -> &FactCore {
        &self.core
    }

    pub fn lifecycle(&self) -> &FactLifecycle {
        &self.lifecycle
    }

    pub fn key(&self) -> &FactKey {
        &self.core.key
    }

    pub fn is_active(&self) -> bool {
        matches!(self.lifecycle.state, FactState::Active)
    }

    pub fn invalidation(&self) -> Option<&Invalidation> {
        match &self.lifecycle.state {
            FactState::Active => None,
            FactState::Invalidated(inv) => Some(inv),
        }
    }

    pub fn invalidated_by(&self) -> Option<FactId> {
        self.invalidation().map(|inv| inv.by)
    }

    pub fn invalidated_at(&self) -> Option<DateTime<Utc>> {
        self.invalidation().map(|inv| inv.at)
    }

    pub fn expired_at(&self) -> Option<DateTime<Utc>> {
        self.invalidation().map(|inv| inv.expired_at)
    }

    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.valid_until
    }
}

fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::IncompleteTriplet { field });
    }
    Ok(trimmed.to_string())
}

fn check_window(
    valid_from: DateTime<Utc>,
    valid_until: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match valid_until {
        Some(until) if until < valid_from => Err(ValidationError::InvalidValidityWindow {
            valid_from,
            valid_until: until,
        }),
        _ => Ok(()),
    }
}
