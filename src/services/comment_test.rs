use super::*;

fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn node(id: u128, parent: Option<u128>) -> CommentNode {
    CommentNode {
        id: uid(id),
        story_id: uid(900),
        author: CommentAuthor { id: uid(id + 1000), username: format!("user{id}"), avatar_url: None },
        text: format!("comment {id}"),
        parent_comment_id: parent.map(uid),
        created_at: "2026-08-05T12:00:00Z".into(),
        replies: Vec::new(),
    }
}

#[test]
fn replies_land_under_their_parent() {
    let parents = vec![node(1, None), node(2, None)];
    let replies = vec![node(10, Some(1)), node(11, Some(2)), node(12, Some(1))];

    let thread = attach_replies(parents, replies);

    assert_eq!(thread.len(), 2);
    let first: Vec<Uuid> = thread[0].replies.iter().map(|r| r.id).collect();
    assert_eq!(first, vec![uid(10), uid(12)]);
    assert_eq!(thread[1].replies.len(), 1);
    assert_eq!(thread[1].replies[0].id, uid(11));
}

#[test]
fn reply_order_is_preserved() {
    let parents = vec![node(1, None)];
    let replies = vec![node(12, Some(1)), node(10, Some(1)), node(11, Some(1))];

    let thread = attach_replies(parents, replies);

    let ids: Vec<Uuid> = thread[0].replies.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![uid(12), uid(10), uid(11)]);
}

#[test]
fn replies_never_carry_children() {
    let parents = vec![node(1, None)];
    let replies = vec![node(10, Some(1)), node(11, Some(1))];

    let thread = attach_replies(parents, replies);

    assert!(thread[0].replies.iter().all(|r| r.replies.is_empty()));
}

#[test]
fn parent_without_replies_has_empty_list() {
    let thread = attach_replies(vec![node(1, None)], vec![]);
    assert!(thread[0].replies.is_empty());
}

#[test]
fn reply_to_missing_parent_is_dropped() {
    let thread = attach_replies(vec![node(1, None)], vec![node(10, Some(99))]);
    assert!(thread[0].replies.is_empty());
}

#[test]
fn comment_serializes_with_nested_replies() {
    let thread = attach_replies(vec![node(1, None)], vec![node(10, Some(1))]);
    let json = serde_json::to_value(&thread).unwrap();
    assert_eq!(json[0]["replies"][0]["id"], serde_json::to_value(uid(10)).unwrap());
    assert_eq!(json[0]["author"]["username"], "user1");
}
