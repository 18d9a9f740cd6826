//! Database round-trip probe backing the health checker endpoint.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ConnectivityError, ConnectivityProbe};

use super::pool::DbPool;

/// Runs `SELECT 1` on a pooled connection.
#[derive(Clone)]
pub struct DieselConnectivityProbe {
    pool: DbPool,
}

impl DieselConnectivityProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectivityProbe for DieselConnectivityProbe {
    async fn check(&self) -> Result<(), ConnectivityError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ConnectivityError::unavailable(err.into_message()))?;
        let rows = diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|err| ConnectivityError::unavailable(err.to_string()))?;
        if rows == 0 {
            return Err(ConnectivityError::misconfigured("SELECT 1 returned no rows"));
        }
        Ok(())
    }
}
