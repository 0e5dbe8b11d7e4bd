//! In-process `SocialStore` for exercising the relationship and visibility rules.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    engagement::{Membership, MembershipKind, SavedEntry},
    entries::{AuthoredEntry, Engagement, Entry, EntryFilter, SortOrder, Visibility},
    error::AppError,
    follows::{Follow, FollowEdge, FollowStatus, FollowView},
    store::{SharedStore, SocialStore},
    users::{AuthorResponse, UserSummary},
};

#[derive(Default)]
struct MemoryState {
    users: Vec<UserSummary>,
    follows: Vec<Follow>,
    entries: Vec<Entry>,
    likes: Vec<Membership>,
    saved: Vec<Membership>,
    comments: Vec<(Uuid, Uuid)>,
    last_created_at: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing timestamps so "newest first" is well defined.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_created_at {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_created_at = Some(now);
        now
    }

    fn user(&self, id: Uuid) -> Option<&UserSummary> {
        self.users.iter().find(|u| u.id == id)
    }

    fn author(&self, entry: &Entry) -> Option<AuthoredEntry> {
        let author = self.user(entry.user_id)?;
        Some(AuthoredEntry {
            entry: entry.clone(),
            author: AuthorResponse {
                id: author.id,
                name: author.name.clone(),
                image: author.image.clone(),
            },
        })
    }

    fn memberships(&mut self, kind: MembershipKind) -> &mut Vec<Membership> {
        match kind {
            MembershipKind::Like => &mut self.likes,
            MembershipKind::Save => &mut self.saved,
        }
    }

    fn marks(&self, kind: MembershipKind, user_id: Uuid, entry_id: Uuid) -> bool {
        let rows = match kind {
            MembershipKind::Like => &self.likes,
            MembershipKind::Save => &self.saved,
        };
        rows.iter().any(|m| m.user_id == user_id && m.entry_id == entry_id)
    }

    fn push_membership(
        &mut self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Membership {
        let membership = Membership {
            id: Uuid::new_v4(),
            user_id,
            entry_id,
            created_at: self.tick(),
        };
        self.memberships(kind).push(membership.clone());
        membership
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> SharedStore {
        Arc::new(self.clone())
    }

    pub fn add_user(&self, name: &str, is_public: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.push(UserSummary {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            image: None,
            bio: None,
            is_public,
        });
        id
    }

    pub fn add_entry_at(
        &self,
        owner: Uuid,
        visibility: Visibility,
        created_at: DateTime<Utc>,
    ) -> Entry {
        let entry = Entry {
            id: Uuid::new_v4(),
            user_id: owner,
            content: serde_json::json!({ "type": "doc", "text": "learned something" }),
            visibility,
            created_at,
            updated_at: created_at,
        };
        self.state.lock().unwrap().entries.push(entry.clone());
        entry
    }

    pub fn add_entry(&self, owner: Uuid, visibility: Visibility) -> Entry {
        let created_at = self.state.lock().unwrap().tick();
        self.add_entry_at(owner, visibility, created_at)
    }

    pub fn set_visibility(&self, entry_id: Uuid, visibility: Visibility) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.entries.iter_mut().find(|e| e.id == entry_id) {
            entry.visibility = visibility;
        }
    }

    pub fn like(&self, user_id: Uuid, entry_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .push_membership(MembershipKind::Like, user_id, entry_id);
    }

    pub fn save(&self, user_id: Uuid, entry_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .push_membership(MembershipKind::Save, user_id, entry_id);
    }

    pub fn remove_entry(&self, entry_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        state.entries.retain(|e| e.id != entry_id);
        state.likes.retain(|m| m.entry_id != entry_id);
        state.saved.retain(|m| m.entry_id != entry_id);
        state.comments.retain(|(_, e)| *e != entry_id);
    }

    pub fn comment(&self, user_id: Uuid, entry_id: Uuid) {
        self.state.lock().unwrap().comments.push((user_id, entry_id));
    }

    pub fn follow_count(&self) -> usize {
        self.state.lock().unwrap().follows.len()
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserSummary>, AppError> {
        Ok(self.state.lock().unwrap().user(id).cloned())
    }

    async fn find_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Follow>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .follows
            .iter()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .cloned())
    }

    async fn find_follow_by_id(&self, id: Uuid) -> Result<Option<Follow>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.follows.iter().find(|f| f.id == id).cloned())
    }

    async fn insert_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        status: FollowStatus,
    ) -> Result<Follow, AppError> {
        let mut state = self.state.lock().unwrap();

        if state
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
        {
            return Err(AppError::Conflict(
                "Already following or request pending".to_string(),
            ));
        }

        let follow = Follow {
            id: Uuid::new_v4(),
            follower_id,
            following_id,
            status,
            created_at: state.tick(),
        };
        state.follows.push(follow.clone());
        Ok(follow)
    }

    async fn update_follow_status(
        &self,
        id: Uuid,
        status: FollowStatus,
    ) -> Result<Option<Follow>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.follows.iter_mut().find(|f| f.id == id).map(|f| {
            f.status = status;
            f.clone()
        }))
    }

    async fn delete_follow_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.follows.len();
        state.follows.retain(|f| f.id != id);
        Ok(state.follows.len() < before)
    }

    async fn delete_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.following_id == following_id));
        Ok(state.follows.len() < before)
    }

    async fn list_follows(
        &self,
        user_id: Uuid,
        view: FollowView,
    ) -> Result<Vec<FollowEdge>, AppError> {
        let state = self.state.lock().unwrap();

        let mut edges: Vec<FollowEdge> = state
            .follows
            .iter()
            .filter(|f| f.status == view.status())
            .filter_map(|f| {
                let (matched, counterpart) = if view.is_inbound() {
                    (f.following_id, f.follower_id)
                } else {
                    (f.follower_id, f.following_id)
                };
                if matched != user_id {
                    return None;
                }
                let user = state.user(counterpart)?.clone();
                Some(FollowEdge {
                    id: f.id,
                    follower_id: f.follower_id,
                    following_id: f.following_id,
                    status: f.status,
                    created_at: f.created_at,
                    user,
                })
            })
            .collect();

        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(edges)
    }

    async fn accepted_following_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .follows
            .iter()
            .filter(|f| f.follower_id == follower_id && f.status == FollowStatus::Accepted)
            .map(|f| f.following_id)
            .collect())
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<Entry>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, AppError> {
        let state = self.state.lock().unwrap();

        let mut entries: Vec<Entry> = state
            .entries
            .iter()
            .filter(|e| e.user_id == filter.owner_id)
            .filter(|e| filter.visibilities.contains(&e.visibility))
            .filter(|e| filter.since.map_or(true, |since| e.created_at >= since))
            .cloned()
            .collect();

        entries.sort_by_key(|e| e.created_at);
        if filter.order == SortOrder::Desc {
            entries.reverse();
        }
        Ok(entries)
    }

    async fn list_feed_entries(
        &self,
        authors: &[Uuid],
        visibilities: &[Visibility],
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AuthoredEntry>, AppError> {
        let state = self.state.lock().unwrap();

        let mut entries: Vec<&Entry> = state
            .entries
            .iter()
            .filter(|e| authors.contains(&e.user_id))
            .filter(|e| visibilities.contains(&e.visibility))
            .filter(|e| e.created_at >= since)
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(entries
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .filter_map(|e| state.author(e))
            .collect())
    }

    async fn engagement(
        &self,
        viewer_id: Uuid,
        entry_ids: &[Uuid],
    ) -> Result<Vec<Engagement>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(entry_ids
            .iter()
            .map(|&entry_id| Engagement {
                entry_id,
                likes_count: state
                    .likes
                    .iter()
                    .filter(|m| m.entry_id == entry_id)
                    .count() as i64,
                comments_count: state
                    .comments
                    .iter()
                    .filter(|(_, e)| *e == entry_id)
                    .count() as i64,
                is_liked: state.marks(MembershipKind::Like, viewer_id, entry_id),
                is_saved: state.marks(MembershipKind::Save, viewer_id, entry_id),
            })
            .collect())
    }

    async fn insert_membership(
        &self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Membership, AppError> {
        let mut state = self.state.lock().unwrap();

        if !state.entries.iter().any(|e| e.id == entry_id) {
            return Err(AppError::NotFound("Entry not found".to_string()));
        }
        if state.marks(kind, user_id, entry_id) {
            return Err(AppError::Conflict(kind.conflict_message().to_string()));
        }

        Ok(state.push_membership(kind, user_id, entry_id))
    }

    async fn delete_membership(
        &self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let rows = state.memberships(kind);
        let before = rows.len();
        rows.retain(|m| !(m.user_id == user_id && m.entry_id == entry_id));
        Ok(rows.len() < before)
    }

    async fn list_saved(&self, user_id: Uuid) -> Result<Vec<SavedEntry>, AppError> {
        let state = self.state.lock().unwrap();

        let mut saved: Vec<SavedEntry> = state
            .saved
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                let entry = state.entries.iter().find(|e| e.id == m.entry_id)?;
                Some(SavedEntry {
                    saved_at: m.created_at,
                    source: state.author(entry)?,
                })
            })
            .collect();

        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saved)
    }
}
