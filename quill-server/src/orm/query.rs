//! Query building on top of a model's precomputed SELECT

use super::SqlValue;

/// Row limit for [`FindAll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u32),
    /// `(offset, count)`
    Range(u64, u32),
}

/// Filtered, ordered, limited `find_all` query.
///
/// # Example
///
/// ```
/// use quill_server::orm::FindAll;
///
/// let (sql, args) = FindAll::new()
///     .filter("user_id=?", vec!["u1".into()])
///     .order_by("created_at desc")
///     .range(10, 5)
///     .to_sql(r#"select "id" from "blogs""#);
/// assert_eq!(
///     sql,
///     r#"select "id" from "blogs" where user_id=? order by created_at desc limit ? offset ?"#
/// );
/// assert_eq!(args.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindAll {
    where_clause: Option<String>,
    args: Vec<SqlValue>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl FindAll {
    pub fn new() -> Self {
        Self::default()
    }

    /// WHERE clause written with `?` placeholders.
    pub fn filter(mut self, clause: impl Into<String>, args: Vec<SqlValue>) -> Self {
        self.where_clause = Some(clause.into());
        self.args = args;
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.limit = Some(Limit::Count(count));
        self
    }

    pub fn range(mut self, offset: u64, count: u32) -> Self {
        self.limit = Some(Limit::Range(offset, count));
        self
    }

    /// Render against a base SELECT, returning SQL and args in placeholder order.
    pub fn to_sql(&self, select: &str) -> (String, Vec<SqlValue>) {
        let mut sql = vec![select.to_owned()];
        let mut args = self.args.clone();

        if let Some(clause) = &self.where_clause {
            sql.push("where".to_string());
            sql.push(clause.clone());
        }
        if let Some(order) = &self.order_by {
            sql.push("order by".to_string());
            sql.push(order.clone());
        }
        match self.limit {
            Some(Limit::Count(n)) => {
                sql.push("limit ?".to_string());
                args.push(SqlValue::from(n));
            }
            Some(Limit::Range(offset, n)) => {
                sql.push("limit ? offset ?".to_string());
                args.push(SqlValue::from(n));
                args.push(SqlValue::BigInt(offset as i64));
            }
            None => {}
        }

        (sql.join(" "), args)
    }
}

/// `select <expr> as _num_ from "table" [where ...]`
pub fn count_sql(table: &str, select_field: &str, where_clause: Option<&str>) -> String {
    let mut sql = format!("select {} as _num_ from \"{}\"", select_field, table);
    if let Some(clause) = where_clause {
        sql.push_str(" where ");
        sql.push_str(clause);
    }
    sql
}

/// Rewrite `?` placeholders to PostgreSQL's `$1..$n`.
///
/// Question marks inside single-quoted literals are left alone.
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut n = 0;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}
