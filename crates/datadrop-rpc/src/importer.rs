//! Type-directed decoding and transactional import of data file records.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{RpcError, RpcResult};
use crate::storage::{CoreRecord, Database, ScoreRecord};

/// Payload types with a known import strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    Core,
    Score,
}

impl PayloadType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Score => "score",
        }
    }
}

impl std::str::FromStr for PayloadType {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Self::Core),
            "score" => Ok(Self::Score),
            other => Err(RpcError::UnsupportedType(other.to_string())),
        }
    }
}

impl std::fmt::Display for PayloadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered records of one data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBatch {
    Core(Vec<CoreRecord>),
    Score(Vec<ScoreRecord>),
}

/// Outcome of a committed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub payload_type: PayloadType,
    pub records: usize,
    pub rows_affected: u64,
}

impl ImportBatch {
    /// Decode `content` according to `payload_type`.
    ///
    /// Unknown types are rejected before the content is looked at.
    pub fn decode(payload_type: &str, content: &str) -> RpcResult<Self> {
        match payload_type.parse::<PayloadType>()? {
            PayloadType::Core => decode_records(content).map(Self::Core),
            PayloadType::Score => decode_records(content).map(Self::Score),
        }
    }

    pub const fn payload_type(&self) -> PayloadType {
        match self {
            Self::Core(_) => PayloadType::Core,
            Self::Score(_) => PayloadType::Score,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Core(records) => records.len(),
            Self::Score(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upsert the whole batch in a single transaction.
    pub async fn apply(&self, db: &Database) -> RpcResult<ImportSummary> {
        let rows_affected = match self {
            Self::Core(records) => db.upsert_core_batch(records).await?,
            Self::Score(records) => db.upsert_score_batch(records).await?,
        };

        Ok(ImportSummary {
            payload_type: self.payload_type(),
            records: self.len(),
            rows_affected,
        })
    }
}

/// Decode `{"data": [{...}, ...]}`.
///
/// Derived struct decoding would also accept sequences, so the top level and
/// every record are checked to be objects first. A missing `data` key is an
/// empty batch.
fn decode_records<T: DeserializeOwned>(content: &str) -> RpcResult<Vec<T>> {
    let mut file: Map<String, Value> =
        serde_json::from_str(content).map_err(|e| RpcError::malformed("data file", e))?;

    let entries = match file.remove("data") {
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(RpcError::MalformedInput(
                "data file: `data` is not an array".to_string(),
            ));
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.is_object() {
                return Err(RpcError::MalformedInput(format!(
                    "data file: record {index} is not an object"
                )));
            }
            serde_json::from_value(entry)
                .map_err(|e| RpcError::malformed(&format!("data file record {index}"), e))
        })
        .collect()
}
