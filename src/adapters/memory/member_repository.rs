use crate::domain::{member::Member, value_objects::MemberId};
use crate::ports::member_repository::MemberRepository as MemberRepositoryTrait;
use crate::ports::{RepositoryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;

/// In-memory implementation of MemberRepository
#[derive(Default)]
pub struct MemberRepository {
    members: Mutex<HashMap<MemberId, Member>>,
}

impl MemberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(lock(&self.members)?.get(&member_id).cloned())
    }

    async fn insert(&self, member: Member) -> Result<()> {
        lock(&self.members)?.insert(member.member_id, Member { version: 0, ..member });
        Ok(())
    }

    async fn update(&self, member: Member) -> Result<Member> {
        let mut members = lock(&self.members)?;
        let stored_version = members.get(&member.member_id).map(|stored| stored.version);
        if stored_version != Some(member.version) {
            return Err(RepositoryError::VersionConflict {
                entity: "member",
                id: member.member_id.value(),
                expected: member.version,
            });
        }

        let saved = Member {
            version: member.version + 1,
            ..member
        };
        members.insert(saved.member_id, saved.clone());
        Ok(saved)
    }
}
