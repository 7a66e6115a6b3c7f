//! MySQL adapter over SQLx
//!
//! Implements the driver ports for a real MySQL server. Every `execute`
//! runs inside its own transaction, so the command, the row fetch, and the
//! commit happen together whether the command reads or writes.

use async_trait::async_trait;
use bench_core::{
    BenchResult, BoxError, Connection, ConnectionParameters, Connector, Params, Row, Rows, Value,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, Connection as _, Row as _, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::DatabaseError;

/// Opens MySQL connections from a fixed set of options
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    options: MySqlConnectOptions,
}

impl MySqlConnector {
    pub fn new(options: MySqlConnectOptions) -> Self {
        Self { options }
    }

    /// Builds connect options from loaded connection parameters
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Configuration` if a required key is missing or
    /// the port does not parse.
    pub fn from_parameters(params: &ConnectionParameters) -> BenchResult<Self> {
        params.validate()?;

        let mut options = MySqlConnectOptions::new()
            .host(params.host()?)
            .port(params.port()?)
            .username(params.user()?)
            .password(params.password()?)
            .database(params.database()?);

        if let Some(charset) = params.charset() {
            options = options.charset(charset);
        }

        Ok(Self::new(options))
    }

    pub fn options(&self) -> &MySqlConnectOptions {
        &self.options
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Connection = MySqlSession;

    async fn connect(&self) -> Result<MySqlSession, BoxError> {
        let conn = self.options.connect().await.map_err(DatabaseError::from)?;
        debug!("Opened MySQL connection");
        Ok(MySqlSession { conn })
    }
}

/// One open MySQL session
#[derive(Debug)]
pub struct MySqlSession {
    conn: MySqlConnection,
}

#[async_trait]
impl Connection for MySqlSession {
    async fn execute(&mut self, command: &str, params: &Params) -> Result<Rows, BoxError> {
        let (sql, values) = params.bind(command).map_err(DatabaseError::from)?;

        let mut query = sqlx::query::<MySql>(&sql);
        for value in values {
            query = bind_value(query, value);
        }

        let mut tx = self.conn.begin().await.map_err(DatabaseError::from)?;
        let rows = query.fetch_all(&mut *tx).await.map_err(DatabaseError::from)?;
        tx.commit().await.map_err(DatabaseError::from)?;

        let rows = rows.iter().map(decode_row).collect::<Result<Rows, _>>()?;
        Ok(rows)
    }

    async fn close(self) -> Result<(), BoxError> {
        self.conn.close().await.map_err(DatabaseError::from)?;
        debug!("Closed MySQL connection");
        Ok(())
    }
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Int(v) => query.bind(*v),
        Value::UInt(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row, DatabaseError> {
    (0..row.len()).map(|index| decode_column(row, index)).collect()
}

// Columns are decoded unchecked by their declared SQL type; the type name
// decides which Rust type reads the wire value.
fn decode_column(row: &MySqlRow, index: usize) -> Result<Value, DatabaseError> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match type_name.as_str() {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::Int(row.try_get_unchecked::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "BIT" => Value::UInt(row.try_get_unchecked::<u64, _>(index)?),
        "FLOAT" | "DOUBLE" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        "DATE" => Value::Text(row.try_get_unchecked::<NaiveDate, _>(index)?.to_string()),
        "TIME" => Value::Text(row.try_get_unchecked::<NaiveTime, _>(index)?.to_string()),
        "DATETIME" | "TIMESTAMP" => {
            Value::Text(row.try_get_unchecked::<NaiveDateTime, _>(index)?.to_string())
        }
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET"
        | "JSON" | "DECIMAL" => Value::Text(row.try_get_unchecked::<String, _>(index)?),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
            Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?)
        }
        _ => {
            return Err(DatabaseError::UnsupportedColumn { index, type_name });
        }
    };

    Ok(value)
}
