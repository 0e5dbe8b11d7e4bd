//! Which entries a viewer may read.
//!
//! | viewer \ entry | private | friends | public |
//! |----------------|---------|---------|--------|
//! | owner          | yes     | yes     | yes    |
//! | accepted       | no      | yes     | yes    |
//! | pending        | no      | no      | yes    |
//! | none           | no      | no      | yes    |

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::{
    entries::{Entry, EntryFilter, FeedEntry, SortOrder, Visibility},
    error::AppError,
    follows::{service::relationship_of, Relationship},
    store::SocialStore,
};

pub const FEED_PAGE_SIZE: i64 = 50;
pub const DEFAULT_FEED_DAYS: i64 = 7;

/// Standing of a viewer towards an owner's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    Viewer(Relationship),
}

impl Access {
    pub fn permits(self, visibility: Visibility) -> bool {
        match (self, visibility) {
            (Access::Owner, _) => true,
            (Access::Viewer(_), Visibility::Public) => true,
            (Access::Viewer(Relationship::Accepted), Visibility::Friends) => true,
            (Access::Viewer(_), _) => false,
        }
    }

    /// Visibilities this access may read, narrowed to `requested` when given.
    pub fn readable(self, requested: Option<Visibility>) -> Vec<Visibility> {
        Visibility::ALL
            .into_iter()
            .filter(|v| self.permits(*v))
            .filter(|v| requested.map_or(true, |r| r == *v))
            .collect()
    }
}

pub async fn access_of(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    owner_id: Uuid,
) -> Result<Access, AppError> {
    if viewer_id == owner_id {
        return Ok(Access::Owner);
    }
    Ok(Access::Viewer(
        relationship_of(store, viewer_id, owner_id).await?,
    ))
}

/// Start of a trailing window of `days` days.
pub fn window_start(days: i64) -> Result<DateTime<Utc>, AppError> {
    if days < 0 {
        return Err(AppError::BadRequest(
            "days must be a non-negative integer".to_string(),
        ));
    }
    Duration::try_days(days)
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .ok_or(AppError::BadRequest("days is out of range".to_string()))
}

pub async fn visible_entry_filter(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    target_id: Uuid,
    requested: Option<Visibility>,
    window_days: Option<i64>,
    order: SortOrder,
) -> Result<EntryFilter, AppError> {
    let since = window_days.map(window_start).transpose()?;
    let access = access_of(store, viewer_id, target_id).await?;

    Ok(EntryFilter {
        owner_id: target_id,
        visibilities: access.readable(requested),
        since,
        order,
    })
}

/// Entries of `target_id` readable by `viewer_id`, re-derived on every call.
pub async fn list_visible_entries(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    target_id: Uuid,
    requested: Option<Visibility>,
    window_days: Option<i64>,
    order: SortOrder,
) -> Result<Vec<Entry>, AppError> {
    if viewer_id != target_id && store.find_user(target_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let filter =
        visible_entry_filter(store, viewer_id, target_id, requested, window_days, order).await?;
    if filter.visibilities.is_empty() {
        return Ok(Vec::new());
    }

    store.list_entries(&filter).await
}

/// Loads an entry if `viewer_id` may read it. Unreadable entries look absent.
pub async fn ensure_readable(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    entry_id: Uuid,
) -> Result<Entry, AppError> {
    let not_found = || AppError::NotFound("Entry not found".to_string());

    let entry = store.find_entry(entry_id).await?.ok_or_else(not_found)?;
    let access = access_of(store, viewer_id, entry.user_id).await?;

    if access.permits(entry.visibility) {
        Ok(entry)
    } else {
        Err(not_found())
    }
}

/// Keeps the items whose entry `viewer_id` may read right now.
pub async fn retain_readable<T>(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    items: Vec<T>,
    entry_of: impl Fn(&T) -> &Entry,
) -> Result<Vec<T>, AppError> {
    let following: HashSet<Uuid> = store
        .accepted_following_ids(viewer_id)
        .await?
        .into_iter()
        .collect();

    Ok(items
        .into_iter()
        .filter(|item| {
            let entry = entry_of(item);
            // Pending reads the same set as no relationship
            let access = if entry.user_id == viewer_id {
                Access::Owner
            } else if following.contains(&entry.user_id) {
                Access::Viewer(Relationship::Accepted)
            } else {
                Access::Viewer(Relationship::None)
            };
            access.permits(entry.visibility)
        })
        .collect())
}

/// Newest readable entries from everyone the viewer follows with an accepted edge.
pub async fn build_feed(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    window_days: i64,
) -> Result<Vec<FeedEntry>, AppError> {
    let since = window_start(window_days)?;

    let following = store.accepted_following_ids(viewer_id).await?;
    if following.is_empty() {
        return Ok(Vec::new());
    }

    let visibilities = Access::Viewer(Relationship::Accepted).readable(None);
    let entries = store
        .list_feed_entries(&following, &visibilities, since, FEED_PAGE_SIZE)
        .await?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = entries.iter().map(|e| e.entry.id).collect();
    let engagement: HashMap<Uuid, _> = store
        .engagement(viewer_id, &ids)
        .await?
        .into_iter()
        .map(|e| (e.entry_id, e))
        .collect();

    Ok(entries
        .into_iter()
        .map(|source| {
            let stats = engagement.get(&source.entry.id);
            FeedEntry::project(source, stats)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follows::{
        service::{request_follow, respond_to_request},
        FollowAction,
    };
    use crate::store::memory::MemoryStore;

    fn ids(entries: &[Entry]) -> Vec<Uuid> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn truth_table() {
        use Relationship::{Accepted, Pending};
        use Visibility::*;
        let stranger = Relationship::None;

        let cases = [
            (Access::Owner, Private, true),
            (Access::Owner, Friends, true),
            (Access::Owner, Public, true),
            (Access::Viewer(Accepted), Private, false),
            (Access::Viewer(Accepted), Friends, true),
            (Access::Viewer(Accepted), Public, true),
            (Access::Viewer(Pending), Private, false),
            (Access::Viewer(Pending), Friends, false),
            (Access::Viewer(Pending), Public, true),
            (Access::Viewer(stranger), Private, false),
            (Access::Viewer(stranger), Friends, false),
            (Access::Viewer(stranger), Public, true),
        ];

        for (access, visibility, expected) in cases {
            assert_eq!(
                access.permits(visibility),
                expected,
                "{:?} reading {:?}",
                access,
                visibility
            );
        }
    }

    #[test]
    fn requested_visibility_only_narrows() {
        let stranger = Access::Viewer(Relationship::None);
        assert!(stranger.readable(Some(Visibility::Private)).is_empty());
        assert_eq!(
            stranger.readable(Some(Visibility::Public)),
            vec![Visibility::Public]
        );
        assert_eq!(
            Access::Owner.readable(Some(Visibility::Private)),
            vec![Visibility::Private]
        );
        assert_eq!(Access::Owner.readable(None), Visibility::ALL.to_vec());
    }

    #[test]
    fn negative_window_is_rejected() {
        assert!(matches!(window_start(-1), Err(AppError::BadRequest(_))));
        assert!(window_start(0).unwrap() <= Utc::now());
    }

    #[tokio::test]
    async fn pending_follower_sees_friends_entries_only_after_accept() {
        let store = MemoryStore::new();
        let a = store.add_user("A", false);
        let b = store.add_user("B", false);
        let friends = store.add_entry(b, Visibility::Friends);
        let public = store.add_entry(b, Visibility::Public);

        let follow = request_follow(&store, a, b).await.unwrap();
        let before = list_visible_entries(&store, a, b, None, None, SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(ids(&before), vec![public.id]);

        respond_to_request(&store, b, follow.id, FollowAction::Accept)
            .await
            .unwrap();
        let after = list_visible_entries(&store, a, b, None, None, SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(ids(&after), vec![public.id, friends.id]);
    }

    #[tokio::test]
    async fn private_entries_never_reach_other_viewers() {
        let store = MemoryStore::new();
        let a = store.add_user("A", true);
        let b = store.add_user("B", true);
        let private = store.add_entry(b, Visibility::Private);
        request_follow(&store, a, b).await.unwrap();

        let seen = list_visible_entries(&store, a, b, None, None, SortOrder::Desc)
            .await
            .unwrap();
        assert!(seen.is_empty());

        let asked = list_visible_entries(
            &store,
            a,
            b,
            Some(Visibility::Private),
            None,
            SortOrder::Desc,
        )
        .await
        .unwrap();
        assert!(asked.is_empty());

        assert!(matches!(
            ensure_readable(&store, a, private.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn owner_sees_everything_and_can_narrow() {
        let store = MemoryStore::new();
        let b = store.add_user("B", false);
        let private = store.add_entry(b, Visibility::Private);
        let friends = store.add_entry(b, Visibility::Friends);
        let public = store.add_entry(b, Visibility::Public);

        let all = list_visible_entries(&store, b, b, None, None, SortOrder::Asc)
            .await
            .unwrap();
        assert_eq!(ids(&all), vec![private.id, friends.id, public.id]);

        let narrowed = list_visible_entries(
            &store,
            b,
            b,
            Some(Visibility::Private),
            None,
            SortOrder::Desc,
        )
        .await
        .unwrap();
        assert_eq!(ids(&narrowed), vec![private.id]);

        assert_eq!(ensure_readable(&store, b, private.id).await.unwrap(), private);
    }

    #[tokio::test]
    async fn time_window_composes_with_visibility() {
        let store = MemoryStore::new();
        let a = store.add_user("A", false);
        let b = store.add_user("B", false);
        let old_public = store.add_entry_at(b, Visibility::Public, Utc::now() - Duration::days(10));
        let new_public = store.add_entry_at(b, Visibility::Public, Utc::now() - Duration::days(1));
        store.add_entry_at(b, Visibility::Friends, Utc::now() - Duration::days(1));

        let recent = list_visible_entries(&store, a, b, None, Some(3), SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(ids(&recent), vec![new_public.id]);

        let all = list_visible_entries(&store, a, b, None, None, SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(ids(&all), vec![new_public.id, old_public.id]);
    }

    #[tokio::test]
    async fn reads_are_rederived_per_request() {
        let store = MemoryStore::new();
        let a = store.add_user("A", false);
        let b = store.add_user("B", false);
        let entry = store.add_entry(b, Visibility::Public);

        assert_eq!(ensure_readable(&store, a, entry.id).await.unwrap().id, entry.id);

        store.set_visibility(entry.id, Visibility::Private);
        assert!(ensure_readable(&store, a, entry.id).await.is_err());
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let store = MemoryStore::new();
        let a = store.add_user("A", false);

        let err = list_visible_entries(&store, a, Uuid::new_v4(), None, None, SortOrder::Desc)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn feed_is_empty_without_accepted_follows() {
        let store = MemoryStore::new();
        let viewer = store.add_user("Viewer", false);
        let private = store.add_user("Private", false);
        store.add_entry(private, Visibility::Public);
        request_follow(&store, viewer, private).await.unwrap();

        let feed = build_feed(&store, viewer, DEFAULT_FEED_DAYS).await.unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn feed_only_contains_followed_users_in_window() {
        let store = MemoryStore::new();
        let viewer = store.add_user("Viewer", false);
        let x = store.add_user("X", true);
        let y = store.add_user("Y", true);
        let stranger = store.add_user("Stranger", true);

        request_follow(&store, viewer, x).await.unwrap();
        request_follow(&store, viewer, y).await.unwrap();

        let older = store.add_entry_at(x, Visibility::Friends, Utc::now() - Duration::days(2));
        let newer = store.add_entry_at(x, Visibility::Public, Utc::now() - Duration::hours(1));
        store.add_entry_at(x, Visibility::Private, Utc::now() - Duration::hours(2));
        store.add_entry_at(y, Visibility::Public, Utc::now() - Duration::days(30));
        store.add_entry(stranger, Visibility::Public);

        let feed = build_feed(&store, viewer, 7).await.unwrap();
        let feed_ids: Vec<Uuid> = feed.iter().map(|f| f.entry.id).collect();

        assert_eq!(feed_ids, vec![newer.id, older.id]);
        assert!(feed.iter().all(|f| f.author.id == x));
    }

    #[tokio::test]
    async fn feed_does_not_require_follow_back() {
        let store = MemoryStore::new();
        let viewer = store.add_user("Viewer", false);
        let x = store.add_user("X", false);
        let friends = store.add_entry(x, Visibility::Friends);

        let follow = request_follow(&store, viewer, x).await.unwrap();
        respond_to_request(&store, x, follow.id, FollowAction::Accept)
            .await
            .unwrap();

        let feed = build_feed(&store, viewer, 1).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].entry.id, friends.id);

        // The followee does not see the viewer's entries in their own feed
        store.add_entry(viewer, Visibility::Public);
        assert!(build_feed(&store, x, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn feed_is_capped_at_page_size() {
        let store = MemoryStore::new();
        let viewer = store.add_user("Viewer", false);
        let x = store.add_user("X", true);
        request_follow(&store, viewer, x).await.unwrap();

        for _ in 0..(FEED_PAGE_SIZE + 5) {
            store.add_entry(x, Visibility::Public);
        }

        let feed = build_feed(&store, viewer, 1).await.unwrap();
        assert_eq!(feed.len() as i64, FEED_PAGE_SIZE);
        assert!(feed
            .windows(2)
            .all(|pair| pair[0].entry.created_at > pair[1].entry.created_at));
    }

    #[tokio::test]
    async fn feed_annotations_are_per_viewer() {
        let store = MemoryStore::new();
        let viewer = store.add_user("Viewer", false);
        let other = store.add_user("Other", false);
        let x = store.add_user("X", true);
        request_follow(&store, viewer, x).await.unwrap();
        request_follow(&store, other, x).await.unwrap();

        let entry = store.add_entry(x, Visibility::Public);
        store.like(viewer, entry.id);
        store.like(other, entry.id);
        store.save(other, entry.id);
        store.comment(other, entry.id);

        let mine = build_feed(&store, viewer, 1).await.unwrap();
        let theirs = build_feed(&store, other, 1).await.unwrap();

        assert!(mine[0].is_liked && !mine[0].is_saved);
        assert!(theirs[0].is_liked && theirs[0].is_saved);
        for item in [&mine[0], &theirs[0]] {
            assert_eq!(item.likes_count, 2);
            assert_eq!(item.comments_count, 1);
        }
    }
}
