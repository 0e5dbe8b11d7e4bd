//! Likes and saves. Both need read access to the entry; removing either is a
//! set difference, so removing nothing still succeeds.

use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    engagement::{Membership, MembershipKind, SavedEntryResponse},
    entries::visibility::{ensure_readable, retain_readable},
    error::AppError,
    store::SocialStore,
};

pub async fn mark_entry(
    store: &dyn SocialStore,
    kind: MembershipKind,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<Membership, AppError> {
    ensure_readable(store, user_id, entry_id).await?;

    let membership = store.insert_membership(kind, user_id, entry_id).await?;

    tracing::info!(%user_id, %entry_id, ?kind, "entry marked");
    Ok(membership)
}

pub async fn unmark_entry(
    store: &dyn SocialStore,
    kind: MembershipKind,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<(), AppError> {
    if store.delete_membership(kind, user_id, entry_id).await? {
        tracing::info!(%user_id, %entry_id, ?kind, "entry unmarked");
    }
    Ok(())
}

/// Saved entries the viewer can still read, newest save first.
pub async fn list_saved(
    store: &dyn SocialStore,
    viewer_id: Uuid,
) -> Result<Vec<SavedEntryResponse>, AppError> {
    let saved = store.list_saved(viewer_id).await?;
    let saved = retain_readable(store, viewer_id, saved, |s| &s.source.entry).await?;
    if saved.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = saved.iter().map(|s| s.source.entry.id).collect();
    let engagement: HashMap<Uuid, _> = store
        .engagement(viewer_id, &ids)
        .await?
        .into_iter()
        .map(|e| (e.entry_id, e))
        .collect();

    Ok(saved
        .into_iter()
        .map(|s| {
            let stats = engagement.get(&s.source.entry.id);
            SavedEntryResponse::project(s, stats)
        })
        .collect())
}
