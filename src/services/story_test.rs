use super::*;

fn text_payload() -> TextStoryPayload {
    TextStoryPayload {
        text: "Bom dia, Vale!".into(),
        bgcolor: "#000000".into(),
        color: "#FFFFFF".into(),
        font_size: "24px".into(),
    }
}

fn new_story(media_type: MediaType) -> NewStory {
    NewStory {
        media_type,
        media_url: None,
        text: None,
        link_url: None,
        duration_secs: None,
        comments_enabled: true,
    }
}

// =============================================================================
// storage_url
// =============================================================================

#[test]
fn text_story_serializes_payload_with_legacy_field_names() {
    let new = NewStory { text: Some(text_payload()), ..new_story(MediaType::Text) };
    let stored = storage_url(&new).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(value["text"], "Bom dia, Vale!");
    assert_eq!(value["bgcolor"], "#000000");
    assert_eq!(value["color"], "#FFFFFF");
    // The legacy client wrote camelCase here; rows must keep decoding.
    assert_eq!(value["fontSize"], "24px");
}

#[test]
fn text_story_without_payload_is_invalid() {
    assert!(matches!(storage_url(&new_story(MediaType::Text)), Err(StoryError::InvalidMedia)));
}

#[test]
fn text_story_with_blank_text_is_invalid() {
    let payload = TextStoryPayload { text: "   ".into(), ..text_payload() };
    let new = NewStory { text: Some(payload), ..new_story(MediaType::Text) };
    assert!(matches!(storage_url(&new), Err(StoryError::InvalidMedia)));
}

#[test]
fn image_story_applies_dropbox_transform() {
    let new = NewStory {
        media_url: Some("https://www.dropbox.com/s/abc/photo.png?dl=0".into()),
        ..new_story(MediaType::Image)
    };
    assert_eq!(storage_url(&new).unwrap(), "https://www.dropbox.com/s/abc/photo.png?dl=1");
}

#[test]
fn video_story_keeps_plain_urls() {
    let new = NewStory {
        media_url: Some("https://cdn.example.com/clip.mp4".into()),
        ..new_story(MediaType::Video)
    };
    assert_eq!(storage_url(&new).unwrap(), "https://cdn.example.com/clip.mp4");
}

#[test]
fn media_story_without_url_is_invalid() {
    assert!(matches!(storage_url(&new_story(MediaType::Image)), Err(StoryError::InvalidMedia)));
    let blank = NewStory { media_url: Some("   ".into()), ..new_story(MediaType::Video) };
    assert!(matches!(storage_url(&blank), Err(StoryError::InvalidMedia)));
}

#[test]
fn media_url_is_trimmed() {
    let new = NewStory {
        media_url: Some("  https://cdn.example.com/a.png ".into()),
        ..new_story(MediaType::Image)
    };
    assert_eq!(storage_url(&new).unwrap(), "https://cdn.example.com/a.png");
}

// =============================================================================
// MediaType
// =============================================================================

#[test]
fn media_type_column_values() {
    assert_eq!(MediaType::Image.as_str(), "image");
    assert_eq!(MediaType::Video.as_str(), "video");
    assert_eq!(MediaType::Text.as_str(), "text");
}

#[test]
fn media_type_deserializes_lowercase() {
    assert_eq!(serde_json::from_str::<MediaType>("\"image\"").unwrap(), MediaType::Image);
    assert_eq!(serde_json::from_str::<MediaType>("\"video\"").unwrap(), MediaType::Video);
    assert_eq!(serde_json::from_str::<MediaType>("\"text\"").unwrap(), MediaType::Text);
    assert!(serde_json::from_str::<MediaType>("\"gif\"").is_err());
}

#[test]
fn text_payload_round_trips() {
    let payload = text_payload();
    let json = serde_json::to_string(&payload).unwrap();
    let restored: TextStoryPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, payload);
}
