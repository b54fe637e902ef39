use super::*;

#[test]
fn missing_rows_map_to_404() {
    assert_eq!(
        comment_error_to_status(&CommentError::StoryNotFound(Uuid::nil())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        comment_error_to_status(&CommentError::CommentNotFound(Uuid::nil())),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn bad_input_maps_to_400() {
    assert_eq!(comment_error_to_status(&CommentError::EmptyText), StatusCode::BAD_REQUEST);
    assert_eq!(comment_error_to_status(&CommentError::InvalidParent), StatusCode::BAD_REQUEST);
}

#[test]
fn policy_rejections_map_to_403() {
    assert_eq!(comment_error_to_status(&CommentError::Forbidden), StatusCode::FORBIDDEN);
    assert_eq!(
        comment_error_to_status(&CommentError::CommentsDisabled),
        StatusCode::FORBIDDEN
    );
}

#[test]
fn add_comment_body_parent_is_optional() {
    let body: AddCommentBody = serde_json::from_str(r#"{"text": "legal!"}"#).unwrap();
    assert!(body.parent_comment_id.is_none());

    let body: AddCommentBody = serde_json::from_str(
        r#"{"text": "resposta", "parent_comment_id": "00000000-0000-0000-0000-000000000001"}"#,
    )
    .unwrap();
    assert!(body.parent_comment_id.is_some());
}
