use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;

/// The credential seam: token issuance lives outside this service, which
/// only needs to resolve an opaque bearer token to a user id.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<Option<String>>;
}

/// Verifier backed by the `api_tokens` table the credential component
/// provisions.
pub struct DbTokenVerifier {
    db: Arc<Mutex<Connection>>,
}

impl DbTokenVerifier {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenVerifier for DbTokenVerifier {
    async fn verify(&self, token: &str) -> anyhow::Result<Option<String>> {
        let conn = self.db.lock().unwrap();
        queries::lookup_token(&conn, token)
    }
}

/// Provision an opaque token for a user. Used by fixtures and ops tooling;
/// the token carries no structure beyond being unguessable.
pub fn mint_token(conn: &Connection, user_id: &str) -> anyhow::Result<String> {
    let token = Uuid::new_v4().to_string();
    queries::insert_token(conn, &token, user_id)?;
    Ok(token)
}
