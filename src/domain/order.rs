//! Orders and the fulfillment filter

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub id: i32,
    pub name: String,
    pub street: String,
    #[serde(deserialize_with = "zipcode_text")]
    pub zipcode: String,
    #[serde(deserialize_with = "bool_like")]
    pub fulfilled: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Zipcode {
    Number(i64),
    Text(String),
}

fn zipcode_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Zipcode::deserialize(deserializer)? {
        Zipcode::Number(value) => value.to_string(),
        Zipcode::Text(value) => value,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Number(i64),
}

fn bool_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(value) => value,
        BoolLike::Number(value) => value != 0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    Fulfilled,
    Unfulfilled,
}

impl OrderFilter {
    pub const ALL: [OrderFilter; 3] = [
        OrderFilter::All,
        OrderFilter::Fulfilled,
        OrderFilter::Unfulfilled,
    ];

    /// Path segment understood by the orders endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderFilter::All => "All",
            OrderFilter::Fulfilled => "Fulfilled",
            OrderFilter::Unfulfilled => "Unfulfilled",
        }
    }

    pub fn next(self) -> Self {
        match self {
            OrderFilter::All => OrderFilter::Fulfilled,
            OrderFilter::Fulfilled => OrderFilter::Unfulfilled,
            OrderFilter::Unfulfilled => OrderFilter::All,
        }
    }
}

impl fmt::Display for OrderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order filter {0:?}")]
pub struct UnknownFilter(pub String);

impl FromStr for OrderFilter {
    type Err = UnknownFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        OrderFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownFilter(trimmed.to_string()))
    }
}
