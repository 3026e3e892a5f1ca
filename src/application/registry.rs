use chrono::Utc;

use crate::domain::{
    ItemId, MemberId,
    commands::{RegisterItem, RegisterMember},
    item, member,
};

use super::{LibraryError, Result, ServiceDependencies};

/// 資料を登録する
pub async fn register_item(deps: &ServiceDependencies, cmd: RegisterItem) -> Result<ItemId> {
    let title = cmd.title.trim();
    if title.is_empty() {
        return Err(LibraryError::InvalidInput("title must not be empty".into()));
    }

    let item = item::register_item(title, cmd.loanable, cmd.condition, Utc::now());
    let item_id = item.item_id;
    deps.items.insert(item).await?;

    tracing::info!(%item_id, loanable = cmd.loanable, "item registered");
    Ok(item_id)
}

/// 会員を登録する
pub async fn register_member(deps: &ServiceDependencies, cmd: RegisterMember) -> Result<MemberId> {
    let name = cmd.name.trim();
    if name.is_empty() {
        return Err(LibraryError::InvalidInput("name must not be empty".into()));
    }

    let member = member::register_member(name, Utc::now());
    let member_id = member.member_id;
    deps.members.insert(member).await?;

    tracing::info!(%member_id, "member registered");
    Ok(member_id)
}
