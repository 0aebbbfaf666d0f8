//! PostgreSQL column types a projection can be declared with.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Boolean,
    Null,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    VarChar,
    Char,
    String,
    Json,
    Bytea,
    Uuid,
    Array(Box<DataType>),
}

lazy_static! {
    /// Lowercase type names and the aliases `pg_type` and DDL use for them.
    static ref TYPES_BY_NAME: HashMap<&'static str, DataType> = {
        use DataType::*;
        HashMap::from([
            ("smallint", Short),
            ("int2", Short),
            ("integer", Int),
            ("int", Int),
            ("int4", Int),
            ("bigint", Long),
            ("int8", Long),
            ("real", Float),
            ("float4", Float),
            ("double precision", Double),
            ("float8", Double),
            ("numeric", Decimal),
            ("decimal", Decimal),
            ("boolean", Boolean),
            ("bool", Boolean),
            ("date", Date),
            ("time", Time),
            ("timestamp", Timestamp),
            ("timestamp without time zone", Timestamp),
            ("timestamptz", TimestampTz),
            ("timestamp with time zone", TimestampTz),
            ("varchar", VarChar),
            ("character varying", VarChar),
            ("char", Char),
            ("character", Char),
            ("bpchar", Char),
            ("text", String),
            ("name", String),
            ("json", Json),
            ("jsonb", Json),
            ("bytea", Bytea),
            ("uuid", Uuid),
        ])
    };
}

impl DataType {
    /// Parses a type name such as `bigint`, `INT8`, `text[]` or `_int4`.
    pub fn from_postgres_type(type_name: &str) -> Result<Self, String> {
        let name = type_name.trim().to_ascii_lowercase();
        if let Some(element) = name.strip_suffix("[]").or_else(|| name.strip_prefix('_')) {
            return Self::from_postgres_type(element)
                .map(|element| DataType::Array(Box::new(element)))
                .map_err(|_| format!("Unknown Postgres column type: {type_name}"));
        }

        TYPES_BY_NAME
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| format!("Unknown Postgres column type: {type_name}"))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            DataType::Array(element) => return write!(f, "{element}[]"),
            DataType::Short => "SMALLINT",
            DataType::Int => "INTEGER",
            DataType::Long => "BIGINT",
            DataType::Float => "REAL",
            DataType::Double => "DOUBLE PRECISION",
            DataType::Decimal => "NUMERIC",
            DataType::Boolean => "BOOLEAN",
            DataType::Null => "NULL",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::TimestampTz => "TIMESTAMPTZ",
            DataType::VarChar => "VARCHAR",
            DataType::Char => "CHAR",
            DataType::String => "TEXT",
            DataType::Json => "JSONB",
            DataType::Bytea => "BYTEA",
            DataType::Uuid => "UUID",
        };
        f.write_str(keyword)
    }
}
