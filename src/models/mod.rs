pub mod dashboard;
pub mod user;
pub mod zone;

pub use self::dashboard::{DashboardStats, MehfilReportEntry, OverallTotals, ZoneReportStat};
pub use self::user::User;
pub use self::zone::{Mehfil, Zone};

use serde::{Deserialize, Deserializer};

/// Role flags arrive as JSON booleans or as 0/1 integers depending on the
/// backend serializer. Null counts as false.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null,
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) | Flag::Null => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "expected boolean flag, got {other}"
        ))),
    }
}

/// Accepts `"12"`, `12` or null and yields a string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Null => String::new(),
    })
}

/// Null strings become empty strings.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
