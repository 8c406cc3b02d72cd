use std::mem;

use tracing::trace;

use super::PostAction;
use crate::entities::post::{Post, PostId};

/// Folds one action into the list. Pure: the result depends only on the inputs.
///
/// Matching is by id only. Should several posts share an id, `Update` replaces
/// all of them and `Delete` drops all of them.
pub fn reduce(posts: Vec<Post>, action: PostAction) -> Vec<Post> {
    match action {
        PostAction::FetchAll(fetched) => fetched,
        PostAction::Create(post) => {
            let mut posts = posts;
            posts.push(post);
            posts
        }
        PostAction::Update(updated) => posts
            .into_iter()
            .map(|post| {
                if post.id == updated.id {
                    updated.clone()
                } else {
                    post
                }
            })
            .collect(),
        PostAction::Delete(id) => posts.into_iter().filter(|post| post.id != id).collect(),
        PostAction::Unknown => posts,
    }
}

/// Current client view, updated one dispatched action at a time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostList {
    posts: Vec<Post>,
}

impl PostList {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn dispatch(&mut self, action: PostAction) {
        trace!("{action:?}");
        let posts = mem::take(&mut self.posts);
        self.posts = reduce(posts, action);
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::*;
    use crate::entities::post::Document;

    fn post(id: u64, title: &str) -> Post {
        let mut fields = Document::new();
        fields.insert("title".to_string(), Value::from(title));
        Post {
            id: PostId::new(id),
            like_count: 0,
            fields,
        }
    }

    fn post_strategy() -> impl Strategy<Value = Post> {
        (1u64..50, "[a-z]{0,6}", 0u64..10).prop_map(|(id, title, likes)| {
            let mut post = post(id, &title);
            post.like_count = likes;
            post
        })
    }

    fn unique_posts() -> impl Strategy<Value = Vec<Post>> {
        prop::collection::btree_map(1u64..50, "[a-z]{0,6}", 0..12).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(id, title)| post(id, &title))
                .collect()
        })
    }

    #[test]
    fn create_on_empty_list_yields_single_post() {
        let created = post(1, "A");
        assert_eq!(
            reduce(Vec::new(), PostAction::Create(created.clone())),
            vec![created]
        );
    }

    #[test]
    fn update_swaps_in_place() {
        let list = vec![post(1, "a"), post(2, "b"), post(3, "c")];
        let mut changed = post(2, "B");
        changed.like_count = 5;

        let out = reduce(list, PostAction::Update(changed.clone()));
        assert_eq!(out, vec![post(1, "a"), changed, post(3, "c")]);
    }

    #[test]
    fn update_without_match_is_a_no_op() {
        let list = vec![post(1, "a")];
        assert_eq!(reduce(list.clone(), PostAction::Update(post(9, "z"))), list);
    }

    #[test]
    fn duplicate_ids_are_all_replaced_or_removed() {
        let list = vec![post(4, "x"), post(1, "a"), post(4, "y")];

        let updated = reduce(list.clone(), PostAction::Update(post(4, "new")));
        assert_eq!(updated, vec![post(4, "new"), post(1, "a"), post(4, "new")]);

        let deleted = reduce(list, PostAction::Delete(PostId::new(4)));
        assert_eq!(deleted, vec![post(1, "a")]);
    }

    #[test]
    fn every_action_accepts_an_empty_list() {
        assert!(reduce(Vec::new(), PostAction::FetchAll(Vec::new())).is_empty());
        assert!(reduce(Vec::new(), PostAction::Update(post(1, "a"))).is_empty());
        assert!(reduce(Vec::new(), PostAction::Delete(PostId::new(1))).is_empty());
        assert!(reduce(Vec::new(), PostAction::Unknown).is_empty());
    }

    #[test]
    fn unknown_action_passes_state_through() {
        let list = vec![post(1, "a"), post(2, "b")];
        assert_eq!(reduce(list.clone(), PostAction::Unknown), list);
    }

    #[test]
    fn actions_decode_from_tagged_payloads() {
        let fetch: PostAction = serde_json::from_value(json!({
            "type": "FETCH_ALL",
            "payload": [{ "_id": "1", "title": "a" }]
        }))
        .unwrap();
        assert_eq!(fetch, PostAction::FetchAll(vec![post(1, "a")]));

        let delete: PostAction =
            serde_json::from_value(json!({ "type": "DELETE", "payload": "7" })).unwrap();
        assert_eq!(delete, PostAction::Delete(PostId::new(7)));

        let update: PostAction = serde_json::from_value(json!({
            "type": "UPDATE",
            "payload": { "_id": "2", "title": "b", "likeCount": 0 }
        }))
        .unwrap();
        assert_eq!(update, PostAction::Update(post(2, "b")));
    }

    #[test]
    fn unhandled_tags_decode_to_unknown_whatever_the_payload() {
        for raw in [
            json!({ "type": "LIKE", "payload": { "_id": "1" } }),
            json!({ "type": "LIKE", "payload": [1, 2, 3] }),
            json!({ "type": "START_LOADING", "payload": "x" }),
            json!({ "type": "END_LOADING", "payload": null }),
            json!({ "type": "END_LOADING" }),
        ] {
            let action: PostAction = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(action, PostAction::Unknown, "{raw}");
        }

        let list = vec![post(1, "a")];
        let action: PostAction =
            serde_json::from_value(json!({ "type": "LIKE", "payload": { "_id": "1" } })).unwrap();
        assert_eq!(reduce(list.clone(), action), list);
    }

    #[test]
    fn known_tags_with_bad_payloads_still_fail() {
        assert!(serde_json::from_value::<PostAction>(json!({ "type": "DELETE", "payload": "abc" })).is_err());
        assert!(serde_json::from_value::<PostAction>(json!({ "type": "CREATE" })).is_err());
        assert!(serde_json::from_value::<PostAction>(json!({ "payload": [] })).is_err());
    }

    #[test]
    fn actions_serialize_to_tagged_payloads() {
        let value = serde_json::to_value(PostAction::Delete(PostId::new(7))).unwrap();
        assert_eq!(value, json!({ "type": "DELETE", "payload": "7" }));
    }

    #[test]
    fn post_list_dispatches_in_order() {
        let mut list = PostList::default();
        list.dispatch(PostAction::FetchAll(vec![post(1, "a"), post(2, "b")]));
        list.dispatch(PostAction::Create(post(3, "c")));
        list.dispatch(PostAction::Update(post(1, "A")));
        list.dispatch(PostAction::Delete(PostId::new(2)));

        assert_eq!(list.posts(), &[post(1, "A"), post(3, "c")]);
        assert_eq!(list.get(PostId::new(3)), Some(&post(3, "c")));
        assert_eq!(list.get(PostId::new(2)), None);
    }

    proptest! {
        #[test]
        fn create_appends_at_the_end(list in prop::collection::vec(post_strategy(), 0..10), created in post_strategy()) {
            let out = reduce(list.clone(), PostAction::Create(created.clone()));
            prop_assert_eq!(out.len(), list.len() + 1);
            prop_assert_eq!(&out[..list.len()], &list[..]);
            prop_assert_eq!(out.last(), Some(&created));
        }

        #[test]
        fn update_keeps_length_and_position(list in unique_posts(), pick in any::<prop::sample::Index>(), title in "[a-z]{0,6}") {
            prop_assume!(!list.is_empty());
            let at = pick.index(list.len());
            let replacement = post(list[at].id.get(), &title);

            let out = reduce(list.clone(), PostAction::Update(replacement.clone()));
            prop_assert_eq!(out.len(), list.len());
            prop_assert_eq!(&out[at], &replacement);
            for (i, (before, after)) in list.iter().zip(&out).enumerate() {
                if i != at {
                    prop_assert_eq!(before, after);
                }
            }
        }

        #[test]
        fn update_twice_equals_once(list in unique_posts(), replacement in post_strategy()) {
            let once = reduce(list, PostAction::Update(replacement.clone()));
            let twice = reduce(once.clone(), PostAction::Update(replacement));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn delete_of_absent_id_changes_nothing(list in unique_posts(), id in 50u64..100) {
            let out = reduce(list.clone(), PostAction::Delete(PostId::new(id)));
            prop_assert_eq!(out, list);
        }

        #[test]
        fn delete_is_idempotent(list in prop::collection::vec(post_strategy(), 0..10), id in 1u64..50) {
            let once = reduce(list, PostAction::Delete(PostId::new(id)));
            prop_assert!(once.iter().all(|p| p.id != PostId::new(id)));
            let twice = reduce(once.clone(), PostAction::Delete(PostId::new(id)));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn fetch_all_replaces_everything(list in prop::collection::vec(post_strategy(), 0..10), fetched in prop::collection::vec(post_strategy(), 0..10)) {
            let out = reduce(list, PostAction::FetchAll(fetched.clone()));
            prop_assert_eq!(out, fetched);
        }
    }
}
