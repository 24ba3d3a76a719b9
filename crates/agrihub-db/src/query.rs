use async_trait::async_trait;
use serde_json::Value;

use crate::error::DbError;
use crate::schema::CREATED_AT;

/// How an embedded table relates to the table being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Rows of the embedded table whose `fk` equals this row's `id`.
    Children { fk: &'static str },
    /// The single row of the embedded table whose `id` equals this row's `fk`.
    Parent { fk: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub link: Link,
}

impl Embed {
    pub fn children(table: &'static str, fk: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            link: Link::Children { fk },
        }
    }

    pub fn parent(table: &'static str, fk: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            link: Link::Parent { fk },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// A single-table request against the row store: which rows (equality
/// filters), in which order, how many, and which columns and embedded
/// relations to return. Mutations use the same shape; the column list then
/// describes the returned representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            columns: vec!["*"],
            embeds: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &'static str, descending: bool) -> Self {
        self.order = Some(Order { column, descending });
        self
    }

    /// Descending by creation time, the default for every list read.
    pub fn newest_first(self) -> Self {
        self.order_by(CREATED_AT, true)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The select list in PostgREST syntax: `*,forum_replies(id,content)`.
    pub fn select_clause(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        for embed in &self.embeds {
            parts.push(format!("{}({})", embed.table, embed.columns.join(",")));
        }
        parts.join(",")
    }
}

/// The hosted relational backend, used purely as a row store.
///
/// Every method is one round trip. Mutations return the affected rows.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, DbError>;

    async fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>, DbError>;

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, DbError>;

    async fn delete(&self, query: &Query) -> Result<Vec<Value>, DbError>;

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_clause_renders_embeds() {
        let q = Query::table("forums").embed(Embed::children(
            "forum_replies",
            "forum_id",
            &["id", "content"],
        ));
        assert_eq!(q.select_clause(), "*,forum_replies(id,content)");
    }

    #[test]
    fn newest_first_orders_by_created_at_descending() {
        let q = Query::table("donations").newest_first();
        assert_eq!(
            q.order,
            Some(Order {
                column: "created_at",
                descending: true
            })
        );
    }
}
