pub mod equipment_lease;
pub mod error;
pub mod farmer_support;
pub mod forum;
pub mod land_lease;
pub mod memory;
pub mod query;
pub mod rest;
pub mod schema;

use std::sync::Arc;

use agrihub_types::{Actor, Envelope};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{error, info, warn};

pub use error::DbError;
pub use memory::MemoryStore;
pub use query::{Embed, Query, RowStore};
pub use rest::RestStore;

/// The data-access layer. Every public operation performs its backend
/// round trip(s) and returns an [`Envelope`]; nothing escapes as an error.
///
/// Cloning is cheap: all clones share one long-lived store handle.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn RowStore>,
}

impl Database {
    pub fn new(store: impl RowStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_arc(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Connect to the hosted backend over its REST interface.
    pub fn connect(project_url: &str, api_key: &str) -> Result<Self, DbError> {
        let store = RestStore::new(project_url, api_key)?;
        info!("Row store at {}", store.rest_base());
        Ok(Self::new(store))
    }

    /// Cheap round trip used at startup and by the health route.
    pub async fn check_connection(&self) -> Envelope<()> {
        let query = Query::table(schema::FORUMS).columns(&["count"]).limit(1);
        let result = self.store.select(&query).await.map(|_| ());
        if result.is_ok() {
            info!("Database connection verified");
        }
        finish("checking database connection", result)
    }

    // -- Helpers --

    /// Forward the acting user to the backend's authorization context.
    /// Best-effort: the owner filters and backend policies are what enforce.
    async fn set_user_context(&self, actor: &Actor) {
        let args = json!({ "claim": "sub", "value": actor.id });
        if let Err(e) = self.store.rpc(schema::SET_CLAIM_RPC, args).await {
            warn!(user = %actor.id, "Could not set user context: {e}");
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, DbError> {
        let rows = self.store.select(query).await?;
        decode_rows(rows)
    }

    /// At most one row; more than one is a decode failure.
    async fn fetch_one<T: DeserializeOwned>(&self, query: &Query) -> Result<Option<T>, DbError> {
        let rows = self.fetch::<T>(query).await?;
        if rows.len() > 1 {
            return Err(DbError::Decode(format!(
                "{} rows in {} matched, expected one",
                rows.len(),
                query.table
            )));
        }
        Ok(rows.into_iter().next())
    }

    async fn insert_one<B: Serialize, T: DeserializeOwned>(
        &self,
        query: &Query,
        body: &B,
    ) -> Result<T, DbError> {
        let row = serde_json::to_value(body)?;
        let rows = self.store.insert(query, vec![row]).await?;
        first_row(rows)
    }
}

/// Insert body with the owner columns stamped from the acting user.
#[derive(Serialize)]
struct Owned<'a, T: Serialize> {
    clerk_user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_email: Option<&'a str>,
    #[serde(flatten)]
    body: &'a T,
}

impl<'a, T: Serialize> Owned<'a, T> {
    fn id_only(actor: &'a Actor, body: &'a T) -> Self {
        Self {
            clerk_user_id: &actor.id,
            user_name: None,
            user_email: None,
            body,
        }
    }

    fn named(actor: &'a Actor, body: &'a T) -> Self {
        Self {
            user_name: Some(actor.display_name()),
            ..Self::id_only(actor, body)
        }
    }

    fn contact(actor: &'a Actor, body: &'a T) -> Self {
        Self {
            user_email: Some(actor.email()),
            ..Self::named(actor, body)
        }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, DbError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(DbError::from))
        .collect()
}

fn first_row<T: DeserializeOwned>(rows: Vec<Value>) -> Result<T, DbError> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Decode("backend returned no rows".to_string()))?;
    Ok(serde_json::from_value(row)?)
}

/// Envelope boundary: log the failure and fold it into the result.
fn finish<T>(op: &str, result: Result<T, DbError>) -> Envelope<T> {
    if let Err(e) = &result {
        error!("Error {op}: {e}");
    }
    Envelope::from(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Call, Op};

    #[tokio::test]
    async fn check_connection_reads_forums() {
        let store = Arc::new(MemoryStore::new());
        let db = Database::from_arc(store.clone());

        assert!(db.check_connection().await.is_success());
        assert_eq!(
            store.calls(),
            vec![Call {
                op: Op::Select,
                target: "forums".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn check_connection_reports_backend_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail(Op::Select, "forums", "relation \"forums\" does not exist");
        let db = Database::from_arc(store);

        let env = db.check_connection().await;
        assert_eq!(env.error(), Some("relation \"forums\" does not exist"));
    }

    #[test]
    fn owned_body_carries_owner_columns() {
        #[derive(Serialize)]
        struct Body {
            title: &'static str,
        }
        let actor = Actor::new("user_1").with_name("Ravi").with_email("ravi@example.com");
        let body = Body { title: "Hi" };

        let value = serde_json::to_value(Owned::contact(&actor, &body)).unwrap();
        assert_eq!(
            value,
            json!({
                "clerk_user_id": "user_1",
                "user_name": "Ravi",
                "user_email": "ravi@example.com",
                "title": "Hi"
            })
        );

        let value = serde_json::to_value(Owned::id_only(&actor, &body)).unwrap();
        assert_eq!(value, json!({ "clerk_user_id": "user_1", "title": "Hi" }));
    }
}
