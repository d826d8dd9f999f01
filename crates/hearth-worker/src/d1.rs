//! Value translation for SeaORM's proxy connection over Cloudflare D1.
//!
//! D1 only knows SQLite storage classes and hands result rows back as JSON objects.
//! Statements bound for D1 are flattened into [`Param`]s here, and result rows are
//! rebuilt into [`ProxyRow`]s. Integers always come back as `BigInt`, which is why
//! every integer column in the schema is an `i64`.

use std::collections::BTreeMap;

use sea_orm::{DbErr, ProxyExecResult, ProxyRow, RuntimeErr, Statement, Value};
use serde_json::Value as JsonValue;

/// Name of the D1 binding in `wrangler.toml`.
pub const DB_BINDING: &str = "DB";

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A bind parameter in one of SQLite's storage classes.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

pub fn internal(message: impl Into<String>) -> DbErr {
    DbErr::Conn(RuntimeErr::Internal(message.into()))
}

/// Flatten the statement's bound values.
pub fn params(statement: &Statement) -> Result<Vec<Param>, DbErr> {
    match &statement.values {
        Some(values) => values.0.iter().map(param).collect(),
        None => Ok(Vec::new()),
    }
}

fn param(value: &Value) -> Result<Param, DbErr> {
    let p = match value {
        Value::Bool(v) => v.map(|b| Param::Integer(i64::from(b))),
        Value::TinyInt(v) => v.map(|n| Param::Integer(i64::from(n))),
        Value::SmallInt(v) => v.map(|n| Param::Integer(i64::from(n))),
        Value::Int(v) => v.map(|n| Param::Integer(i64::from(n))),
        Value::BigInt(v) => v.map(Param::Integer),
        Value::TinyUnsigned(v) => v.map(|n| Param::Integer(i64::from(n))),
        Value::SmallUnsigned(v) => v.map(|n| Param::Integer(i64::from(n))),
        Value::Unsigned(v) => v.map(|n| Param::Integer(i64::from(n))),
        Value::BigUnsigned(v) => match v {
            Some(n) => Some(Param::Integer(
                i64::try_from(*n).map_err(|_| internal(format!("integer {n} does not fit in SQLite")))?,
            )),
            None => None,
        },
        Value::Float(v) => v.map(|n| Param::Real(f64::from(n))),
        Value::Double(v) => v.map(Param::Real),
        Value::String(v) => v.as_ref().map(|s| Param::Text(s.as_str().to_string())),
        Value::Char(v) => v.map(|c| Param::Text(c.to_string())),
        Value::Bytes(v) => v.as_ref().map(|b| Param::Blob(b.to_vec())),
        Value::Json(v) => v.as_ref().map(|j| Param::Text(j.to_string())),
        other => return Err(internal(format!("unsupported bind value for D1: {other:?}"))),
    };
    Ok(p.unwrap_or(Param::Null))
}

/// Rebuild one D1 result row.
///
/// NULL becomes an empty string value; only `Option<String>` columns are nullable.
pub fn row_from_json(row: JsonValue) -> Result<ProxyRow, DbErr> {
    let JsonValue::Object(columns) = row else {
        return Err(internal("D1 returned a row that is not an object"));
    };

    let mut values = BTreeMap::new();
    for (name, raw) in columns {
        let value = column_value(raw).map_err(|e| internal(format!("column {name}: {e}")))?;
        values.insert(name, value);
    }
    Ok(ProxyRow { values })
}

fn column_value(raw: JsonValue) -> Result<Value, String> {
    Ok(match raw {
        JsonValue::Null => Value::String(None),
        JsonValue::Bool(b) => Value::BigInt(Some(i64::from(b))),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::BigInt(Some(i))
            } else {
                let f = n.as_f64().ok_or_else(|| format!("unreadable number {n}"))?;
                if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                    Value::BigInt(Some(f as i64))
                } else {
                    Value::Double(Some(f))
                }
            }
        }
        JsonValue::String(s) => Value::String(Some(Box::new(s))),
        // BLOBs arrive as arrays of byte values.
        JsonValue::Array(items) => {
            let bytes = items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or("blob contains a non-byte element")?;
            Value::Bytes(Some(Box::new(bytes)))
        }
        JsonValue::Object(_) => return Err("nested objects are not column values".to_string()),
    })
}

/// Build the execution summary from D1's result metadata.
pub fn exec_result(last_row_id: Option<i64>, changes: Option<usize>) -> ProxyExecResult {
    ProxyExecResult {
        last_insert_id: last_row_id.and_then(|id| u64::try_from(id).ok()).unwrap_or(0),
        rows_affected: changes.and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
    }
}
