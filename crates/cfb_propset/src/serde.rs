use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::{Error as _, SerializeMap},
    Deserialize, Serialize,
};

use crate::{
    codepage::CodePage,
    dictionary::{Dictionary, DictionaryEntry},
    property::{PropertyString, TypedPropertyValue},
};

impl Serialize for Dictionary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for entry in self.iter() {
            let name = entry.name().map_err(S::Error::custom)?;
            map.serialize_entry(&entry.property_identifier, &name)?;
        }
        map.end()
    }
}

struct DictionaryVisitor {
    code_page: CodePage,
}

impl<'de> Visitor<'de> for DictionaryVisitor {
    type Value = Vec<DictionaryEntry>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of property identifiers to names")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));

        while let Some((id, name)) = access.next_entry::<u32, String>()? {
            let entry = DictionaryEntry::new(id, &name, self.code_page)
                .map_err(serde::de::Error::custom)?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

/// Names are encoded as UTF-16LE, the default code page
impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Dictionary::new(deserializer.deserialize_map(
            DictionaryVisitor {
                code_page: CodePage::default(),
            },
        )?))
    }
}

impl Serialize for PropertyString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.value().map_err(S::Error::custom)?)
    }
}

impl Serialize for TypedPropertyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            TypedPropertyValue::Lpstr(value) | TypedPropertyValue::Lpwstr(value) => {
                value.serialize(serializer)
            }
        }
    }
}
