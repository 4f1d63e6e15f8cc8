//! Sample records written by `folio seed`

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Collection the sample users are written to
pub const SAMPLE_COLLECTION: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(deserialize_with = "number_or_string")]
    pub pincode: Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub age: Number,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

impl User {
    fn sample(name: &str, company: &str) -> Self {
        Self {
            name: name.to_string(),
            age: Number::from(23u64),
            contact: "9101910191".to_string(),
            company: company.to_string(),
            address: Address {
                city: "bangalore".to_string(),
                state: "karnataka".to_string(),
                country: "india".to_string(),
                pincode: Number::from(509101u64),
            },
        }
    }
}

/// Numeric field written as a bare JSON number, also accepted as a numeric string.
fn number_or_string<'de, D>(deserializer: D) -> Result<Number, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Number),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => serde_json::from_str::<Number>(text.trim())
            .map_err(|_| de::Error::custom(format!("'{}' is not a number", text))),
    }
}

pub fn sample_users() -> Vec<User> {
    vec![
        User::sample("John", "Myrl Tech"),
        User::sample("Bon", "Gugul Tech"),
        User::sample("Don", "Bulbul Tech"),
        User::sample("Mon", "Juljul Tech"),
        User::sample("Kon", "dul Tech"),
    ]
}
