//! SeaORM connection backed by the Worker's D1 binding.
//!
//! D1 has no interactive transactions, so `begin`/`commit`/`rollback` fall back to the
//! proxy's no-op defaults. Counters that must be race-free use single statements.

use std::fmt;
use std::sync::Arc;

use sea_orm::{
    Database, DatabaseConnection, DbBackend, DbErr, ProxyDatabaseTrait, ProxyExecResult, ProxyRow, Statement,
};
use worker::js_sys::Uint8Array;
use worker::send::{SendFuture, SendWrapper};
use worker::wasm_bindgen::JsValue;
use worker::{D1Database, D1Result, Env, Error, Result};

use crate::d1::{self, Param, DB_BINDING};

struct D1Connection {
    db: SendWrapper<D1Database>,
}

impl fmt::Debug for D1Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("D1Connection").field("binding", &DB_BINDING).finish()
    }
}

fn d1_err(e: Error) -> DbErr {
    d1::internal(e.to_string())
}

fn js_value(param: Param) -> JsValue {
    match param {
        Param::Null => JsValue::NULL,
        // D1 takes JS numbers; stored integers stay well inside 2^53.
        Param::Integer(n) => JsValue::from_f64(n as f64),
        Param::Real(n) => JsValue::from_f64(n),
        Param::Text(s) => JsValue::from_str(&s),
        Param::Blob(bytes) => Uint8Array::from(bytes.as_slice()).into(),
    }
}

impl D1Connection {
    async fn run(&self, statement: &Statement, rows: bool) -> std::result::Result<D1Result, DbErr> {
        let params: Vec<JsValue> = d1::params(statement)?.into_iter().map(js_value).collect();
        let prepared = self.db.prepare(statement.sql.as_str()).bind(&params).map_err(d1_err)?;
        let result = if rows { prepared.all().await } else { prepared.run().await }.map_err(d1_err)?;
        match result.error() {
            Some(message) => Err(d1::internal(message)),
            None => Ok(result),
        }
    }
}

#[async_trait::async_trait]
impl ProxyDatabaseTrait for D1Connection {
    async fn query(&self, statement: Statement) -> std::result::Result<Vec<ProxyRow>, DbErr> {
        SendFuture::new(async move {
            let result = self.run(&statement, true).await?;
            let rows: Vec<serde_json::Value> = result.results().map_err(d1_err)?;
            rows.into_iter().map(d1::row_from_json).collect()
        })
        .await
    }

    async fn execute(&self, statement: Statement) -> std::result::Result<ProxyExecResult, DbErr> {
        SendFuture::new(async move {
            let result = self.run(&statement, false).await?;
            let meta = result.meta().map_err(d1_err)?;
            Ok(d1::exec_result(
                meta.as_ref().and_then(|m| m.last_row_id),
                meta.as_ref().and_then(|m| m.changes),
            ))
        })
        .await
    }
}

pub async fn db_connect(env: &Env) -> Result<DatabaseConnection> {
    let db = env.d1(DB_BINDING)?;
    let proxy: Box<dyn ProxyDatabaseTrait> = Box::new(D1Connection { db: SendWrapper::new(db) });
    Database::connect_proxy(DbBackend::Sqlite, Arc::new(proxy))
        .await
        .map_err(|e| Error::RustError(format!("D1 connection failed: {e}")))
}
