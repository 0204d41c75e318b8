//! Capture slots for interactive fields

use crate::error::CaptureError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    Text,
    Signature,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Signature => "signature",
        }
    }
}

/// Stable identity of one interactive placeholder occurrence: the n-th field of its type in
/// document order. Displays as `text_0`, `signature_1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureKey {
    pub field: FieldType,
    pub index: usize,
}

impl CaptureKey {
    pub fn new(field: FieldType, index: usize) -> Self {
        Self { field, index }
    }
}

impl fmt::Display for CaptureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field.as_str(), self.index)
    }
}

impl FromStr for CaptureKey {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CaptureError::MalformedKey(s.to_string());
        let (field, index) = s.rsplit_once('_').ok_or_else(malformed)?;
        let field = match field {
            "text" => FieldType::Text,
            "signature" => FieldType::Signature,
            _ => return Err(malformed()),
        };
        let index = index.parse::<usize>().map_err(|_| malformed())?;
        Ok(CaptureKey { field, index })
    }
}

impl Serialize for CaptureKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CaptureKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A value entered into an interactive field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CapturedValue {
    Text(String),
    /// Encoded image bytes as produced by the signature pad
    Signature(Vec<u8>),
}

impl CapturedValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            CapturedValue::Text(_) => FieldType::Text,
            CapturedValue::Signature(_) => FieldType::Signature,
        }
    }
}

/// Values entered for one render pass, keyed by capture key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureSlotMap {
    values: BTreeMap<CaptureKey, CapturedValue>,
}

impl CaptureSlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn write(
        &mut self,
        key: CaptureKey,
        value: CapturedValue,
    ) -> Result<Option<CapturedValue>, CaptureError> {
        if value.field_type() != key.field {
            return Err(CaptureError::KindMismatch {
                key: key.to_string(),
            });
        }
        Ok(self.values.insert(key, value))
    }

    /// [`CaptureSlotMap::write`] with a key in its string form.
    pub fn write_str(
        &mut self,
        key: &str,
        value: CapturedValue,
    ) -> Result<Option<CapturedValue>, CaptureError> {
        self.write(key.parse()?, value)
    }

    pub fn get(&self, key: &CaptureKey) -> Option<&CapturedValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CaptureKey, &CapturedValue)> {
        self.values.iter()
    }

    /// A fresh map holding the values of `previous` whose keys are still bound in `keys`.
    ///
    /// Keys are positional, so values stay attached to the same field as long as the fields
    /// before it are unchanged.
    pub fn carry_over(previous: &CaptureSlotMap, keys: &[CaptureKey]) -> CaptureSlotMap {
        let values = keys
            .iter()
            .filter_map(|key| previous.get(key).map(|value| (*key, value.clone())))
            .collect();
        CaptureSlotMap { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_parse() {
        let key = CaptureKey::new(FieldType::Signature, 1);
        assert_eq!(key.to_string(), "signature_1");
        assert_eq!("signature_1".parse::<CaptureKey>(), Ok(key));
        assert!("signature".parse::<CaptureKey>().is_err());
        assert!("initials_0".parse::<CaptureKey>().is_err());
        assert!("text_x".parse::<CaptureKey>().is_err());
    }

    #[test]
    fn test_write_checks_kind() {
        let mut slots = CaptureSlotMap::new();
        let text = CaptureKey::new(FieldType::Text, 0);
        assert_eq!(
            slots.write(text, CapturedValue::Text("Nairobi".to_string())),
            Ok(None)
        );
        assert!(slots
            .write(text, CapturedValue::Signature(vec![1, 2, 3]))
            .is_err());
        assert!(slots
            .write_str("signature_0", CapturedValue::Signature(vec![0x89, 0x50]))
            .is_ok());
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_carry_over_keeps_bound_keys_only() {
        let mut slots = CaptureSlotMap::new();
        let t0 = CaptureKey::new(FieldType::Text, 0);
        let t1 = CaptureKey::new(FieldType::Text, 1);
        slots.write(t0, CapturedValue::Text("a".into())).expect("write");
        slots.write(t1, CapturedValue::Text("b".into())).expect("write");

        let next = CaptureSlotMap::carry_over(&slots, &[t0]);
        assert_eq!(next.get(&t0), Some(&CapturedValue::Text("a".into())));
        assert_eq!(next.get(&t1), None);
    }

    #[test]
    fn test_serialized_keys_are_strings() {
        let mut slots = CaptureSlotMap::new();
        slots
            .write_str("text_0", CapturedValue::Text("x".into()))
            .expect("write");
        let json = serde_json::to_string(&slots).expect("serialize");
        assert_eq!(
            json,
            r#"{"values":{"text_0":{"kind":"text","value":"x"}}}"#
        );
    }
}
