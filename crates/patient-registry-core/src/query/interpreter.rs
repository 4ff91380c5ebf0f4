//! Free-text query classification and execution.
//!
//! Each recognized shape is a tagged variant carrying its extracted
//! parameters; classification walks the shapes in a fixed priority order and
//! the first match wins. Anything else is rejected with a descriptive error.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;

use super::{Cell, QueryError, QueryResult, ResultSet, VALID_COLUMNS};
use crate::db::Database;

/// Comparison operators allowed in id/age conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(CmpOp::Eq),
            ">" => Some(CmpOp::Gt),
            "<" => Some(CmpOp::Lt),
            ">=" => Some(CmpOp::Ge),
            "<=" => Some(CmpOp::Le),
            _ => None,
        }
    }

    /// SQL token for this operator. Fixed strings, never user text.
    fn as_sql(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
        }
    }
}

/// A recognized WHERE condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    IdCmp(CmpOp, i64),
    AgeCmp(CmpOp, i64),
    NameEq(String),
    NameLike(String),
    GenderEq(String),
    PhoneEq(String),
}

/// A recognized query shape, in classification priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    /// `select * from patient`
    AllRows,
    /// `select * from patient where <condition>`
    Filtered(Condition),
    /// `select <col>, ... from patient` with allow-listed columns
    Columns(Vec<&'static str>),
    /// `select count(*) from patient`
    CountAll,
}

// Alternation puts >= and <= first so they parse as themselves instead of
// as a bare > or < followed by garbage.
static WHERE_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^select \* from patient where (.+)$").unwrap());
static ID_COND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^id\s*(>=|<=|=|>|<)\s*(\d+)$").unwrap());
static AGE_COND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^age\s*(>=|<=|=|>|<)\s*(\d+)$").unwrap());
static NAME_COND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^name\s*(=|like)\s*['"]([^'"]+)['"]$"#).unwrap());
static GENDER_COND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^gender\s*=\s*['"]([^'"]+)['"]$"#).unwrap());
static PHONE_COND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^phone_number\s*=\s*['"]([^'"]+)['"]$"#).unwrap());

/// Classify raw query text into a shape.
///
/// The lowered copy drives classification; literal values are captured from
/// the original trimmed text so their case survives into bound parameters.
pub fn classify(raw: &str) -> QueryResult<QueryShape> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    let lowered = trimmed.to_lowercase();

    if lowered == "select * from patient" {
        return Ok(QueryShape::AllRows);
    }

    if let Some(caps) = WHERE_FORM.captures(trimmed) {
        let clause = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        return parse_condition(clause).map(QueryShape::Filtered);
    }

    if lowered.starts_with("select") && lowered.contains("from patient") && !lowered.contains('*') {
        return parse_columns(&lowered).map(QueryShape::Columns);
    }

    if lowered == "select count(*) from patient" {
        return Ok(QueryShape::CountAll);
    }

    Err(QueryError::Unsupported(
        "Query not supported. Try simple SELECT queries on the patient table \
         with WHERE conditions using id, name, age, gender, or phone_number."
            .to_string(),
    ))
}

/// Match a WHERE clause against the five supported condition shapes.
fn parse_condition(clause: &str) -> QueryResult<Condition> {
    if let Some(caps) = ID_COND.captures(clause) {
        if let Some(op) = CmpOp::parse(&caps[1]) {
            return Ok(Condition::IdCmp(op, parse_int(&caps[2])?));
        }
    }

    if let Some(caps) = AGE_COND.captures(clause) {
        if let Some(op) = CmpOp::parse(&caps[1]) {
            return Ok(Condition::AgeCmp(op, parse_int(&caps[2])?));
        }
    }

    if let Some(caps) = NAME_COND.captures(clause) {
        let value = caps[2].to_string();
        return Ok(if caps[1].eq_ignore_ascii_case("like") {
            Condition::NameLike(value)
        } else {
            Condition::NameEq(value)
        });
    }

    if let Some(caps) = GENDER_COND.captures(clause) {
        return Ok(Condition::GenderEq(caps[1].to_string()));
    }

    if let Some(caps) = PHONE_COND.captures(clause) {
        return Ok(Condition::PhoneEq(caps[1].to_string()));
    }

    Err(QueryError::Unsupported(
        "This WHERE clause is not recognized. Try using conditions on \
         id, name, age, gender, or phone_number."
            .to_string(),
    ))
}

fn parse_int(literal: &str) -> QueryResult<i64> {
    literal.parse::<i64>().map_err(|_| {
        QueryError::Unsupported(format!("Integer literal out of range: {}", literal))
    })
}

/// Validate a projection list against the column allow-list. The statement
/// must end at `from patient`; trailing text is rejected rather than
/// silently dropped. The returned identifiers are the static allow-list
/// entries, never user text.
fn parse_columns(lowered: &str) -> QueryResult<Vec<&'static str>> {
    let from_idx = match lowered.find("from patient") {
        Some(idx) if idx >= 6 && &lowered[idx..] == "from patient" => idx,
        _ => {
            return Err(QueryError::Unsupported(
                "Query not supported. Try simple SELECT queries on the patient table \
                 with WHERE conditions using id, name, age, gender, or phone_number."
                    .to_string(),
            ))
        }
    };

    let mut columns = Vec::new();
    let mut invalid = Vec::new();
    for requested in lowered[6..from_idx].split(',') {
        let requested = requested.trim();
        match VALID_COLUMNS.iter().find(|c| **c == requested) {
            Some(valid) => columns.push(*valid),
            None => invalid.push(requested.to_string()),
        }
    }

    if invalid.is_empty() {
        Ok(columns)
    } else {
        Err(QueryError::InvalidColumn { invalid })
    }
}

impl QueryShape {
    /// SQL template plus bound parameters for this shape.
    fn to_statement(&self) -> (String, Vec<Value>) {
        match self {
            QueryShape::AllRows => (
                "SELECT * FROM patient ORDER BY id ASC".to_string(),
                Vec::new(),
            ),
            QueryShape::Filtered(cond) => cond.to_statement(),
            QueryShape::Columns(cols) => {
                (format!("SELECT {} FROM patient", cols.join(", ")), Vec::new())
            }
            QueryShape::CountAll => ("SELECT COUNT(*) FROM patient".to_string(), Vec::new()),
        }
    }
}

impl Condition {
    fn to_statement(&self) -> (String, Vec<Value>) {
        match self {
            Condition::IdCmp(op, value) => (
                format!("SELECT * FROM patient WHERE id {} ?1", op.as_sql()),
                vec![Value::Integer(*value)],
            ),
            Condition::AgeCmp(op, value) => (
                format!("SELECT * FROM patient WHERE age {} ?1", op.as_sql()),
                vec![Value::Integer(*value)],
            ),
            Condition::NameEq(value) => (
                "SELECT * FROM patient WHERE name = ?1".to_string(),
                vec![Value::Text(value.clone())],
            ),
            Condition::NameLike(value) => (
                "SELECT * FROM patient WHERE name LIKE ?1".to_string(),
                vec![Value::Text(value.clone())],
            ),
            Condition::GenderEq(value) => (
                "SELECT * FROM patient WHERE gender = ?1".to_string(),
                vec![Value::Text(value.clone())],
            ),
            Condition::PhoneEq(value) => (
                "SELECT * FROM patient WHERE phone_number = ?1".to_string(),
                vec![Value::Text(value.clone())],
            ),
        }
    }
}

/// Interpreter bound to a database handle.
pub struct Interpreter<'a> {
    db: &'a Database,
}

impl<'a> Interpreter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Classify and execute raw query text.
    pub fn run(&self, raw: &str) -> QueryResult<ResultSet> {
        let shape = classify(raw)?;
        self.execute(&shape)
    }

    /// Execute an already-classified shape.
    pub fn execute(&self, shape: &QueryShape) -> QueryResult<ResultSet> {
        let (sql, params) = shape.to_statement();

        let mut stmt = self.db.conn().prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        let mut out: Vec<Vec<Cell>> = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                cells.push(Cell::from(row.get_ref(idx)?));
            }
            out.push(cells);
        }

        if out.is_empty() {
            return Ok(ResultSet::default());
        }
        Ok(ResultSet { columns, rows: out })
    }
}
