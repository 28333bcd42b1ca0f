//! Wire encoding of absent values.
//!
//! Persisted tables never contain empty cells: an absent string is written as
//! the literal `"0"`, an absent count as `0`, and flags as `0`/`1`. Reports and
//! existing tables test `player_out != "0"` to mean "there was a wicket", so
//! the encoding is exact. In memory the same values are `Option`s and `bool`s.

/// The literal written for every absent value.
pub const ABSENT: &str = "0";

pub fn decode(s: &str) -> Option<String> {
    if s.is_empty() || s == ABSENT {
        None
    } else {
        Some(s.to_owned())
    }
}

pub fn encode(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or(ABSENT)
}

/// `Option<String>` as a string column.
pub mod text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(super::encode(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let s = String::deserialize(d)?;
        Ok(super::decode(&s))
    }
}

/// `Option<u32>` as an integer column.
pub mod count {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(v.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let s = String::deserialize(d)?;
        match super::decode(s.trim()) {
            None => Ok(None),
            Some(t) => t
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a count, got '{t}'"))),
        }
    }
}

/// `bool` as a `0`/`1` column.
pub mod flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let s = String::deserialize(d)?;
        match s.trim().to_lowercase().as_str() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(D::Error::custom(format!("expected 0 or 1, got '{other}'"))),
        }
    }
}
