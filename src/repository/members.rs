//! Members repository for backend operations

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member},
};

use super::Gateway;

const TABLE: &str = "members";

#[derive(Clone)]
pub struct MembersRepository {
    gateway: Gateway,
}

impl MembersRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// List members, newest first
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let query = self.gateway.from(TABLE).order("created_at", false);
        self.gateway.select(&query).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Member> {
        let query = self.gateway.from(TABLE).eq("id", id);
        self.gateway
            .select_one(&query, &format!("Member with id {}", id))
            .await
    }

    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        self.gateway.insert_one(&self.gateway.from(TABLE), member).await
    }

    pub async fn count(&self) -> AppResult<usize> {
        let query = self.gateway.from(TABLE).columns(&["id"]);
        let rows: Vec<serde_json::Value> = self.gateway.select(&query).await?;
        Ok(rows.len())
    }
}
