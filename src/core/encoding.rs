//! SenML compaction codec
//!
//! A group of records bound for the same destination is rewritten around a
//! synthetic base record: the longest common colon-delimited name prefix, the
//! minimum timestamp and, when every record agrees on it, the unit. The base
//! values travel once, on the first record of the group, and every record
//! carries only what differs from them. [`resolve_pack`] performs the
//! inverse, and doubles as the normaliser for inbound SenML packs.

use crate::core::{Record, Value};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// SenML version announced in `bver`
pub const SENML_VERSION: i32 = 5;

/// Separator of hierarchical record names
pub const NAME_SEPARATOR: &str = ":";

/// One SenML record as it appears on the wire.
///
/// Fields are declared in tag order so the serialized object has a stable
/// key order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SenmlRecord {
    #[serde(rename = "bn", skip_serializing_if = "Option::is_none", default)]
    pub base_name: Option<String>,
    #[serde(rename = "bs", skip_serializing_if = "Option::is_none", default)]
    pub base_sum: Option<f64>,
    #[serde(rename = "bt", skip_serializing_if = "Option::is_none", default)]
    pub base_time: Option<f64>,
    #[serde(rename = "bu", skip_serializing_if = "Option::is_none", default)]
    pub base_unit: Option<String>,
    #[serde(rename = "bv", skip_serializing_if = "Option::is_none", default)]
    pub base_value: Option<f64>,
    #[serde(rename = "bver", skip_serializing_if = "Option::is_none", default)]
    pub base_version: Option<i32>,
    #[serde(rename = "n", skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(rename = "s", skip_serializing_if = "Option::is_none", default)]
    pub sum: Option<f64>,
    #[serde(rename = "t", skip_serializing_if = "Option::is_none", default)]
    pub time: Option<f64>,
    #[serde(rename = "u", skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
    #[serde(rename = "ut", skip_serializing_if = "Option::is_none", default)]
    pub update_time: Option<f64>,
    #[serde(rename = "v", skip_serializing_if = "Option::is_none", default)]
    pub value: Option<f64>,
    #[serde(rename = "vb", skip_serializing_if = "Option::is_none", default)]
    pub bool_value: Option<bool>,
    #[serde(rename = "vd", skip_serializing_if = "Option::is_none", default)]
    pub data_value: Option<String>,
    #[serde(rename = "vs", skip_serializing_if = "Option::is_none", default)]
    pub string_value: Option<String>,
}

/// Values shared by every record of a group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseFields {
    pub name: Option<String>,
    pub time: Option<f64>,
    pub unit: Option<String>,
    pub version: Option<i32>,
}

impl BaseFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.time.is_none() && self.unit.is_none() && self.version.is_none()
    }

    /// The base tags that open a group on the wire.
    fn to_senml(&self) -> SenmlRecord {
        SenmlRecord {
            base_name: self.name.clone(),
            base_time: self.time,
            base_unit: self.unit.clone(),
            base_version: self.version,
            ..Default::default()
        }
    }
}

/// Compute the base of a group. Singletons are never compacted.
pub fn extract_base<R: Borrow<Record>>(group: &[R]) -> BaseFields {
    if group.len() < 2 {
        return BaseFields::default();
    }

    BaseFields {
        name: common_base_name(records(group).map(|r| r.name.as_str())),
        time: records(group).map(|r| r.time).reduce(f64::min),
        unit: common_unit(records(group).map(|r| r.unit.as_str())),
        version: Some(SENML_VERSION),
    }
}

fn records<R: Borrow<Record>>(group: &[R]) -> impl Iterator<Item = &Record> {
    group.iter().map(<R as Borrow<Record>>::borrow)
}

/// Greatest common colon-delimited prefix of `names`, measured against the
/// first name.
///
/// The separator is kept at the end of the prefix only when it is a strict
/// prefix of every name, so each name can be expressed as a suffix of it.
fn common_base_name<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<String> {
    let reference: Vec<&str> = names.next()?.split(NAME_SEPARATOR).collect();
    let mut common = reference.len();
    let mut shortest = reference.len();

    for name in names {
        let segments: Vec<&str> = name.split(NAME_SEPARATOR).collect();
        shortest = shortest.min(segments.len());
        common = common.min(segments.len());
        if let Some(diverge) =
            reference[..common].iter().zip(&segments).position(|(ours, theirs)| ours != theirs)
        {
            common = diverge;
        }
    }

    if common == 0 {
        return None;
    }

    let mut base = reference[..common].join(NAME_SEPARATOR);
    if common < shortest {
        base.push_str(NAME_SEPARATOR);
    }
    Some(base)
}

fn common_unit<'a>(mut units: impl Iterator<Item = &'a str>) -> Option<String> {
    let first = units.next()?;
    (!first.is_empty() && units.all(|unit| unit == first)).then(|| first.to_string())
}

/// Rewrite one record relative to its group's base.
///
/// The first record of a group also carries the base tags.
pub fn encode_record(record: &Record, base: &BaseFields, first_of_group: bool) -> SenmlRecord {
    let mut encoded = if first_of_group { base.to_senml() } else { SenmlRecord::default() };

    // A name equal to the base name is left implicit
    encoded.name = match &base.name {
        Some(prefix) => {
            let rest = record.name.strip_prefix(prefix.as_str()).unwrap_or(&record.name);
            (!rest.is_empty()).then(|| rest.to_string())
        }
        None => Some(record.name.clone()),
    };

    encoded.time = match base.time {
        Some(base_time) if base_time == record.time => None,
        Some(base_time) => Some(record.time - base_time),
        None => Some(record.time),
    };

    match &record.value {
        Value::Numeric(v) => encoded.value = Some(*v),
        Value::Text(s) => encoded.string_value = Some(s.clone()),
        Value::Data(d) => encoded.data_value = Some(d.clone()),
        Value::Boolean(b) => encoded.bool_value = Some(*b),
        Value::Absent => {}
    }

    encoded.unit = match &base.unit {
        Some(unit) if *unit == record.unit => None,
        Some(_) => Some(record.unit.clone()),
        None if record.unit.is_empty() => None,
        None => Some(record.unit.clone()),
    };

    if record.update_time != 0.0 {
        encoded.update_time = Some(record.update_time);
    }
    encoded.sum = record.sum;

    encoded
}

/// Compact a whole group around its base.
pub fn encode_group<R: Borrow<Record>>(group: &[R]) -> Vec<SenmlRecord> {
    let base = extract_base(group);
    records(group).enumerate().map(|(i, record)| encode_record(record, &base, i == 0)).collect()
}

/// Encode a group without a base record; every entry is self-contained.
pub fn encode_uncompacted<R: Borrow<Record>>(group: &[R]) -> Vec<SenmlRecord> {
    let base = BaseFields::default();
    records(group).map(|record| encode_record(record, &base, false)).collect()
}

/// A reading recovered from a SenML pack, with every base value applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurement {
    pub name: String,
    pub unit: String,
    pub time: f64,
    pub update_time: f64,
    pub value: Value,
    pub sum: Option<f64>,
}

#[derive(Default)]
struct PackBase {
    name: String,
    time: f64,
    unit: Option<String>,
    value: f64,
    sum: f64,
}

/// Resolve a SenML pack into absolute readings.
///
/// Base fields apply to the record carrying them and to every following
/// record until overridden.
pub fn resolve_pack(pack: &[SenmlRecord]) -> Result<Vec<Measurement>> {
    let mut base = PackBase::default();

    pack.iter()
        .enumerate()
        .map(|(i, entry)| {
            if let Some(name) = &entry.base_name {
                base.name = name.clone();
            }
            if let Some(time) = entry.base_time {
                base.time = time;
            }
            if let Some(unit) = &entry.base_unit {
                base.unit = Some(unit.clone());
            }
            if let Some(value) = entry.base_value {
                base.value = value;
            }
            if let Some(sum) = entry.base_sum {
                base.sum = sum;
            }

            let value = match (
                entry.value,
                &entry.string_value,
                &entry.data_value,
                entry.bool_value,
            ) {
                (Some(v), None, None, None) => Value::Numeric(base.value + v),
                (None, Some(s), None, None) => Value::Text(s.clone()),
                (None, None, Some(d), None) => Value::Data(d.clone()),
                (None, None, None, Some(b)) => Value::Boolean(b),
                (None, None, None, None) => Value::Absent,
                _ => {
                    return Err(Error::Parse(format!("record {} carries more than one value", i)))
                }
            };

            Ok(Measurement {
                name: format!("{}{}", base.name, entry.name.as_deref().unwrap_or_default()),
                unit: entry.unit.clone().or_else(|| base.unit.clone()).unwrap_or_default(),
                time: base.time + entry.time.unwrap_or_default(),
                update_time: entry.update_time.unwrap_or_default(),
                value,
                sum: entry.sum.map(|s| base.sum + s),
            })
        })
        .collect()
}
