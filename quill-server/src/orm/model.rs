//! Model metadata and the `Model` trait

use sqlx::postgres::PgRow;
use sqlx::FromRow;

use super::{Field, OrmError, SqlValue};

/// Table mapping derived from a model's field descriptors.
///
/// Built once per model; the CRUD statements are precomputed here so the
/// executor only has to bind values.
#[derive(Debug, Clone)]
pub struct ModelMeta {
    pub model: &'static str,
    pub table: &'static str,
    /// Primary key column name
    pub primary_key: &'static str,
    /// Non-key column names, in declaration order
    pub fields: Vec<&'static str>,
    /// Every descriptor, key included
    pub mappings: Vec<Field>,
    pub select: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl ModelMeta {
    /// Build metadata, requiring exactly one primary key.
    pub fn new(
        model: &'static str,
        table: &'static str,
        mappings: Vec<Field>,
    ) -> Result<Self, OrmError> {
        tracing::info!("build mapping: {} (table: {})", model, table);

        let mut primary_key = None;
        let mut fields = Vec::new();
        for field in &mappings {
            tracing::info!("  mapping: {} ==> {}", field.name, field);
            if field.primary_key {
                if primary_key.is_some() {
                    return Err(OrmError::DuplicatePrimaryKey {
                        model,
                        field: field.name,
                    });
                }
                primary_key = Some(field.name);
            } else {
                fields.push(field.name);
            }
        }
        let primary_key = primary_key.ok_or(OrmError::MissingPrimaryKey { model })?;

        let escaped: Vec<String> = fields.iter().map(|f| quoted(f)).collect();
        let pk = quoted(primary_key);
        let tbl = quoted(table);

        let select = if escaped.is_empty() {
            format!("select {} from {}", pk, tbl)
        } else {
            format!("select {}, {} from {}", pk, escaped.join(", "), tbl)
        };
        let mut insert_columns = escaped.clone();
        insert_columns.push(pk.clone());
        let insert = format!(
            "insert into {} ({}) values ({})",
            tbl,
            insert_columns.join(", "),
            placeholders(insert_columns.len())
        );
        let assignments: Vec<String> = escaped.iter().map(|f| format!("{}=?", f)).collect();
        let update = format!(
            "update {} set {} where {}=?",
            tbl,
            assignments.join(", "),
            pk
        );
        let delete = format!("delete from {} where {}=?", tbl, pk);

        Ok(Self {
            model,
            table,
            primary_key,
            fields,
            mappings,
            select,
            insert,
            update,
            delete,
        })
    }

    /// Look up a descriptor by column name.
    pub fn field(&self, name: &str) -> Result<&Field, OrmError> {
        self.mappings
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| OrmError::UnknownField {
                model: self.model,
                field: name.to_owned(),
            })
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this model.
    pub fn create_table_sql(&self) -> String {
        let mut columns: Vec<String> = self.mappings.iter().map(Field::column_sql).collect();
        columns.push(format!("PRIMARY KEY ({})", quoted(self.primary_key)));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quoted(self.table),
            columns.join(",\n    ")
        )
    }
}

/// A struct persisted through [`ModelMeta`].
///
/// Implementors expose their columns by name so the executor can bind them
/// without knowing the concrete type.
pub trait Model: for<'r> FromRow<'r, PgRow> + Send + Unpin + Sized {
    fn meta() -> &'static ModelMeta;

    /// Current value of a column; `None` when the field is unset.
    fn value(&self, field: &str) -> Option<SqlValue>;

    fn set_value(&mut self, field: &str, value: SqlValue) -> Result<(), OrmError>;

    /// Value of a column, falling back to (and storing) its declared default.
    fn value_or_default(&mut self, field: &str) -> Result<SqlValue, OrmError> {
        if let Some(value) = self.value(field) {
            return Ok(value);
        }
        let meta = Self::meta();
        match meta.field(field)?.default.produce() {
            Some(value) => {
                tracing::debug!("using default value for {}.{}: {}", meta.model, field, value);
                self.set_value(field, value.clone())?;
                Ok(value)
            }
            None => Ok(SqlValue::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelMeta {
        ModelMeta::new(
            "Note",
            "notes",
            vec![
                Field::string("id").ddl(50).primary_key(),
                Field::string("title"),
                Field::float("created_at"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn precomputed_statements() {
        let meta = sample();
        assert_eq!(meta.primary_key, "id");
        assert_eq!(meta.fields, vec!["title", "created_at"]);
        assert_eq!(
            meta.select,
            r#"select "id", "title", "created_at" from "notes""#
        );
        assert_eq!(
            meta.insert,
            r#"insert into "notes" ("title", "created_at", "id") values (?, ?, ?)"#
        );
        assert_eq!(
            meta.update,
            r#"update "notes" set "title"=?, "created_at"=? where "id"=?"#
        );
        assert_eq!(meta.delete, r#"delete from "notes" where "id"=?"#);
    }

    #[test]
    fn rejects_two_primary_keys() {
        let err = ModelMeta::new(
            "Bad",
            "bad",
            vec![Field::integer("a").primary_key(), Field::integer("b").primary_key()],
        )
        .unwrap_err();
        assert!(matches!(err, OrmError::DuplicatePrimaryKey { field: "b", .. }));
    }

    #[test]
    fn rejects_missing_primary_key() {
        let err = ModelMeta::new("Bad", "bad", vec![Field::text("body")]).unwrap_err();
        assert!(matches!(err, OrmError::MissingPrimaryKey { model: "Bad" }));
    }

    #[test]
    fn unknown_field_lookup() {
        let meta = sample();
        assert!(meta.field("title").is_ok());
        assert!(matches!(
            meta.field("nope").unwrap_err(),
            OrmError::UnknownField { .. }
        ));
    }

    #[test]
    fn create_table_ddl() {
        let ddl = sample().create_table_sql();
        assert!(ddl.starts_with(r#"CREATE TABLE IF NOT EXISTS "notes" ("#));
        assert!(ddl.contains(r#""id" varchar(50) NOT NULL"#));
        assert!(ddl.contains(r#""created_at" double precision NOT NULL"#));
        assert!(ddl.contains(r#"PRIMARY KEY ("id")"#));
    }
}
