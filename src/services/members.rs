//! Member administration service

use validator::Validate;

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    /// Register a member
    pub async fn create(&self, member: CreateMember) -> AppResult<Member> {
        member.validate()?;

        let member = CreateMember {
            name: member.name.trim().to_string(),
            email: member.email.trim().to_string(),
            phone: member.phone.filter(|p| !p.trim().is_empty()),
        };

        let created = self.repository.members.create(&member).await?;
        tracing::info!(member_id = %created.id, "Member created");
        Ok(created)
    }
}
