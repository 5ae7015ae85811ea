//! Flat key/value records for storage-agnostic persistence.
//!
//! Every entity flattens into dotted keys (`attr.<id>.value`) mapped to a
//! scalar, and inflates back by matching the final key segment. Inflation is
//! lenient: unknown keys, missing values and type mismatches are skipped and
//! only reported to the caller's hook.

use crate::models::smart::{Attribute, AttributeFamily, AttributeStatus};
use crate::models::zfs::{Pool, ScrubState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar in a flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Int(_)   => "int64",
            FieldValue::Float(_) => "float64",
            FieldValue::Str(_)   => "string",
        }
    }
}

impl From<i64> for FieldValue    { fn from(v: i64) -> Self { FieldValue::Int(v) } }
impl From<f64> for FieldValue    { fn from(v: f64) -> Self { FieldValue::Float(v) } }
impl From<&str> for FieldValue   { fn from(v: &str) -> Self { FieldValue::Str(v.to_string()) } }
impl From<String> for FieldValue { fn from(v: String) -> Self { FieldValue::Str(v) } }

pub type FlatRecord = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnknownKey,
    Missing,
    TypeMismatch { expected: &'static str, found: &'static str },
    OutOfRange,
}

/// A field `inflate` declined to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedField {
    pub key:    String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::UnknownKey => write!(f, "{}: unknown key", self.key),
            SkipReason::Missing    => write!(f, "{}: no value", self.key),
            SkipReason::TypeMismatch { expected, found } =>
                write!(f, "{}: expected {}, found {}", self.key, expected, found),
            SkipReason::OutOfRange => write!(f, "{}: value out of range", self.key),
        }
    }
}

pub trait Flatten {
    fn flatten(&self) -> FlatRecord;
}

pub trait Inflate {
    /// Apply one key/value pair, reporting anything skipped to `hook`.
    fn inflate_with(&mut self, key: &str, val: Option<&FieldValue>, hook: &mut dyn FnMut(SkippedField));

    /// Apply one key/value pair; skipped fields are logged at trace level.
    fn inflate(&mut self, key: &str, val: Option<&FieldValue>) {
        self.inflate_with(key, val, &mut |skipped| {
            tracing::trace!(%skipped, "ignoring field while inflating");
        });
    }

    fn inflate_all(&mut self, record: &FlatRecord) {
        for (key, val) in record {
            self.inflate(key, Some(val));
        }
    }
}

fn last_segment(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Typed accessors that route every mismatch to the hook.
struct Field<'a, 'h> {
    key:  &'a str,
    val:  &'a FieldValue,
    hook: &'h mut dyn FnMut(SkippedField),
}

impl Field<'_, '_> {
    fn skip(&mut self, reason: SkipReason) {
        (self.hook)(SkippedField { key: self.key.to_string(), reason });
    }

    fn mismatch(&mut self, expected: &'static str) {
        let found = self.val.kind();
        self.skip(SkipReason::TypeMismatch { expected, found });
    }

    fn int(&mut self) -> Option<i64> {
        match self.val {
            FieldValue::Int(v) => Some(*v),
            _ => { self.mismatch("int64"); None }
        }
    }

    fn uint(&mut self) -> Option<u64> {
        let v = self.int()?;
        match u64::try_from(v) {
            Ok(u)  => Some(u),
            Err(_) => { self.skip(SkipReason::OutOfRange); None }
        }
    }

    fn float(&mut self) -> Option<f64> {
        match self.val {
            FieldValue::Float(v) => Some(*v),
            _ => { self.mismatch("float64"); None }
        }
    }

    fn string(&mut self) -> Option<String> {
        match self.val {
            FieldValue::Str(v) => Some(v.clone()),
            _ => { self.mismatch("string"); None }
        }
    }

    fn timestamp(&mut self) -> Option<DateTime<Utc>> {
        let secs = self.int()?;
        match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(ts) => Some(ts),
            None     => { self.skip(SkipReason::OutOfRange); None }
        }
    }
}

// ── Attribute ─────────────────────────────────────────────────────────

impl Flatten for Attribute {
    fn flatten(&self) -> FlatRecord {
        let k = |field: &str| format!("attr.{}.{}", self.id, field);
        let mut rec = FlatRecord::new();
        rec.insert(k("attribute_id"),      self.id.clone().into());
        rec.insert(k("family"),            self.family.label().into());
        rec.insert(k("value"),             self.value.into());
        rec.insert(k("thresh"),            self.threshold.into());
        rec.insert(k("transformed_value"), self.transformed_value.into());
        rec.insert(k("status"),            i64::from(self.status.bits()).into());
        rec.insert(k("status_reason"),     self.status_reason.clone().into());
        rec.insert(k("failure_rate"),      self.failure_rate.into());
        rec
    }
}

impl Inflate for Attribute {
    fn inflate_with(&mut self, key: &str, val: Option<&FieldValue>, hook: &mut dyn FnMut(SkippedField)) {
        let val = match val {
            Some(v) => v,
            None    => {
                hook(SkippedField { key: key.to_string(), reason: SkipReason::Missing });
                return;
            }
        };
        let mut f = Field { key, val, hook };

        match last_segment(key) {
            "attribute_id" => if let Some(v) = f.string() { self.id = v },
            "family" => {
                if let Some(v) = f.string() {
                    match AttributeFamily::from_name(&v) {
                        Some(fam) => self.family = fam,
                        None      => f.skip(SkipReason::OutOfRange),
                    }
                }
            }
            "value"             => if let Some(v) = f.int() { self.value = v },
            "thresh"            => if let Some(v) = f.int() { self.threshold = v },
            "transformed_value" => if let Some(v) = f.int() { self.transformed_value = v },
            "status"            => if let Some(v) = f.int() { self.status = AttributeStatus::from_bits(v) },
            "status_reason"     => if let Some(v) = f.string() { self.status_reason = v },
            "failure_rate"      => if let Some(v) = f.float() { self.failure_rate = v },
            _                   => f.skip(SkipReason::UnknownKey),
        }
    }
}

/// Rebuild every attribute stored in one device-wide record, grouped by the
/// `attr.<id>.` key prefix and ordered by id.
pub fn inflate_attributes(record: &FlatRecord, family: AttributeFamily) -> Vec<Attribute> {
    let mut by_id: BTreeMap<&str, Attribute> = BTreeMap::new();
    for (key, val) in record {
        let rest = match key.strip_prefix("attr.") {
            Some(r) => r,
            None    => continue,
        };
        let id = match rest.rsplit_once('.') {
            Some((id, _)) => id,
            None          => continue,
        };
        by_id.entry(id)
            .or_insert_with(|| Attribute::new(family, id, 0, Attribute::NO_THRESHOLD))
            .inflate(key, Some(val));
    }
    by_id.into_values().collect()
}

// ── Pool ──────────────────────────────────────────────────────────────

impl Flatten for Pool {
    /// Scalar summary only; the vdev tree is not part of the flat record.
    fn flatten(&self) -> FlatRecord {
        let k = |field: &str| format!("pool.{}.{}", self.name, field);
        let mut rec = FlatRecord::new();
        rec.insert(k("name"),                   self.name.clone().into());
        rec.insert(k("status"),                 self.status.clone().into());
        rec.insert(k("scrub_state"),            self.scrub_state.label().into());
        rec.insert(k("scrub_percent_complete"), self.scrub_percent_complete.into());
        rec.insert(k("scrub_errors_count"),     to_i64(self.scrub_errors_count).into());
        rec.insert(k("total_read_errors"),      to_i64(self.total_read_errors).into());
        rec.insert(k("total_write_errors"),     to_i64(self.total_write_errors).into());
        rec.insert(k("total_checksum_errors"),  to_i64(self.total_checksum_errors).into());
        if let Some(ts) = self.scrub_start_time {
            rec.insert(k("scrub_start_time"), ts.timestamp().into());
        }
        if let Some(ts) = self.scrub_end_time {
            rec.insert(k("scrub_end_time"), ts.timestamp().into());
        }
        rec
    }
}

impl Inflate for Pool {
    fn inflate_with(&mut self, key: &str, val: Option<&FieldValue>, hook: &mut dyn FnMut(SkippedField)) {
        let val = match val {
            Some(v) => v,
            None    => {
                hook(SkippedField { key: key.to_string(), reason: SkipReason::Missing });
                return;
            }
        };
        let mut f = Field { key, val, hook };

        match last_segment(key) {
            "name"   => if let Some(v) = f.string() { self.name = v },
            "status" => if let Some(v) = f.string() { self.status = v },
            "scrub_state" => {
                if let Some(v) = f.string() {
                    match ScrubState::from_label(&v) {
                        Some(s) => self.scrub_state = s,
                        None    => f.skip(SkipReason::OutOfRange),
                    }
                }
            }
            "scrub_start_time"       => if let Some(v) = f.timestamp() { self.scrub_start_time = Some(v) },
            "scrub_end_time"         => if let Some(v) = f.timestamp() { self.scrub_end_time = Some(v) },
            "scrub_percent_complete" => if let Some(v) = f.float() { self.scrub_percent_complete = v },
            "scrub_errors_count"     => if let Some(v) = f.uint() { self.scrub_errors_count = v },
            "total_read_errors"      => if let Some(v) = f.uint() { self.total_read_errors = v },
            "total_write_errors"     => if let Some(v) = f.uint() { self.total_write_errors = v },
            "total_checksum_errors"  => if let Some(v) = f.uint() { self.total_checksum_errors = v },
            _                        => f.skip(SkipReason::UnknownKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn failing_attr() -> Attribute {
        let mut a = Attribute::new(AttributeFamily::Nvme, "media_errors", 12, 0);
        a.transformed_value = 12;
        a.status = AttributeStatus::FAILED_SCRUTINY;
        a.status_reason = "Attribute is failing recommended SMART threshold".into();
        a.failure_rate = 0.25;
        a
    }

    #[test]
    fn attribute_flatten_keys() {
        let rec = failing_attr().flatten();
        assert_eq!(rec.get("attr.media_errors.value"), Some(&FieldValue::Int(12)));
        assert_eq!(rec.get("attr.media_errors.thresh"), Some(&FieldValue::Int(0)));
        assert_eq!(rec.get("attr.media_errors.status"), Some(&FieldValue::Int(4)));
        assert_eq!(rec.get("attr.media_errors.failure_rate"), Some(&FieldValue::Float(0.25)));
        assert_eq!(
            rec.get("attr.media_errors.attribute_id"),
            Some(&FieldValue::Str("media_errors".into()))
        );
    }

    #[test]
    fn attribute_inflate_restores_every_field() {
        let original = failing_attr();
        let mut restored = Attribute::new(AttributeFamily::Ata, "", 0, 0);
        restored.inflate_all(&original.flatten());
        assert_eq!(restored, original);
    }

    #[test]
    fn inflate_ignores_mismatch_and_unknown() {
        let mut a = Attribute::new(AttributeFamily::Nvme, "temperature", 40, 70);
        let mut skipped = Vec::new();
        let mut hook = |s: SkippedField| skipped.push(s);

        a.inflate_with("attr.temperature.value", Some(&FieldValue::Str("hot".into())), &mut hook);
        a.inflate_with("attr.temperature.failure_rate", Some(&FieldValue::Int(1)), &mut hook);
        a.inflate_with("attr.temperature.bogus", Some(&FieldValue::Int(1)), &mut hook);
        a.inflate_with("attr.temperature.thresh", None, &mut hook);

        assert_eq!(a.value, 40);
        assert_eq!(a.threshold, 70);
        assert_eq!(a.failure_rate, 0.0);
        assert_eq!(skipped.len(), 4);
        assert_eq!(
            skipped[0].reason,
            SkipReason::TypeMismatch { expected: "int64", found: "string" }
        );
        assert_eq!(skipped[2].reason, SkipReason::UnknownKey);
        assert_eq!(skipped[3].reason, SkipReason::Missing);
    }

    #[test]
    fn inflate_attributes_groups_by_id() {
        let mut rec = failing_attr().flatten();
        rec.extend(Attribute::new(AttributeFamily::Nvme, "available_spare", 100, 10).flatten());
        rec.insert("device.model".into(), "x".into());

        let attrs = inflate_attributes(&rec, AttributeFamily::Nvme);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].id, "available_spare");
        assert_eq!(attrs[0].threshold, 10);
        assert_eq!(attrs[1].id, "media_errors");
        assert!(attrs[1].status.is_failed());
    }

    #[test]
    fn pool_record_roundtrip_keeps_summary() {
        let mut pool = Pool::new("tank");
        pool.status = "DEGRADED".into();
        pool.scrub_state = ScrubState::Finished;
        pool.scrub_end_time = Utc.with_ymd_and_hms(2026, 1, 5, 0, 34, 31).single();
        pool.scrub_percent_complete = 100.0;
        pool.total_read_errors = 3;
        pool.total_checksum_errors = 9;

        let rec = pool.flatten();
        assert_eq!(rec.get("pool.tank.scrub_state"), Some(&FieldValue::Str("finished".into())));
        assert!(!rec.contains_key("pool.tank.scrub_start_time"));

        let mut restored = Pool::default();
        restored.inflate_all(&rec);
        assert_eq!(restored, pool);
    }

    #[test]
    fn pool_inflate_rejects_negative_counter() {
        let mut pool = Pool::new("tank");
        let mut skipped = Vec::new();
        pool.inflate_with("pool.tank.total_read_errors", Some(&FieldValue::Int(-4)), &mut |s| skipped.push(s));
        assert_eq!(pool.total_read_errors, 0);
        assert_eq!(skipped[0].reason, SkipReason::OutOfRange);
    }

    #[test]
    fn field_value_json_shapes() {
        let rec: FlatRecord = serde_json::from_str(r#"{"a": 1, "b": 1.5, "c": "x"}"#).unwrap();
        assert_eq!(rec["a"], FieldValue::Int(1));
        assert_eq!(rec["b"], FieldValue::Float(1.5));
        assert_eq!(rec["c"], FieldValue::Str("x".into()));
    }
}
