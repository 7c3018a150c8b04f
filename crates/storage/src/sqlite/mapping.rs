use drill_core::model::AssetResponse;
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn status_from_i64(v: i64) -> Result<u16, StorageError> {
    u16::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid status: {v}")))
}

pub(crate) fn map_response_row(row: &sqlx::sqlite::SqliteRow) -> Result<AssetResponse, StorageError> {
    let status = status_from_i64(row.try_get("status").map_err(ser)?)?;
    let content_type: Option<String> = row.try_get("content_type").map_err(ser)?;
    let body: Vec<u8> = row.try_get("body").map_err(ser)?;
    Ok(AssetResponse::new(status, content_type, body))
}
