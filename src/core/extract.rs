use crate::core::source::RawRecord;
use crate::domain::model::ParsedEntity;
use crate::utils::error::{HarvestError, Result};
use serde_json::Value;

const STAGE: &str = "extract";
const SLASH: char = '/';
const ID_FIELD: &str = "@id";
const DEPICTION_FIELD: &str = "depiction";

#[derive(Debug, Default, Clone, Copy)]
pub struct DepictionExtractor;

impl DepictionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parses one record.
    ///
    /// A line that does not decode as JSON aborts the run. A record without a
    /// usable identifier or without depiction information is skipped and
    /// logged, returning `Ok(None)`.
    pub fn extract(&self, record: &RawRecord) -> Result<Option<ParsedEntity>> {
        let Value::Object(mut sheet) = parse_sheet(record)? else {
            // 非物件的 JSON 沒有 @id 可取
            tracing::warn!(
                stage = STAGE,
                "⚠️ no GND identifier in EntityFacts sheet '{}'",
                record.line
            );
            return Ok(None);
        };

        let Some(sheet_id) = sheet.get(ID_FIELD).and_then(Value::as_str) else {
            tracing::warn!(
                stage = STAGE,
                "⚠️ no GND identifier in EntityFacts sheet '{}'",
                record.line
            );
            return Ok(None);
        };

        let Some(identifier) = identifier_from_sheet_id(sheet_id).map(str::to_string) else {
            tracing::warn!(
                stage = STAGE,
                "⚠️ no GND identifier in EntityFacts sheet id '{}'",
                sheet_id
            );
            return Ok(None);
        };

        let depiction = match sheet.remove(DEPICTION_FIELD) {
            Some(depiction) if !depiction.is_null() => depiction,
            _ => {
                tracing::warn!(
                    stage = STAGE,
                    identifier = %identifier,
                    "⚠️ no depiction information for GND identifier '{}' in its EntityFacts sheet",
                    identifier
                );
                return Ok(None);
            }
        };

        tracing::info!(
            stage = STAGE,
            identifier = %identifier,
            "🔍 found depiction information of GND identifier '{}' in its EntityFacts sheet",
            identifier
        );

        Ok(Some(ParsedEntity {
            identifier,
            depiction,
        }))
    }
}

fn parse_sheet(record: &RawRecord) -> Result<Value> {
    serde_json::from_str(&record.line).map_err(|source| HarvestError::MalformedRecord {
        line_number: record.line_number,
        line: record.line.clone(),
        source,
    })
}

/// 取 sheet URI 最後一個 '/' 之後的部分；位置 0 的 '/' 不算
fn identifier_from_sheet_id(sheet_id: &str) -> Option<&str> {
    match sheet_id.rfind(SLASH) {
        Some(index) if index > 0 => {
            let identifier = &sheet_id[index + 1..];
            (!identifier.is_empty()).then_some(identifier)
        }
        _ => None,
    }
}
