use super::*;

fn config() -> DropboxConfig {
    DropboxConfig {
        app_key: "app123".into(),
        app_secret: "secret456".into(),
        redirect_uri: "https://example.com/auth/dropbox/callback".into(),
    }
}

// =============================================================================
// authorize_url
// =============================================================================

#[test]
fn authorize_url_carries_code_flow_params() {
    let url = config().authorize_url("csrf789");
    assert!(url.starts_with("https://www.dropbox.com/oauth2/authorize?"));
    assert!(url.contains("client_id=app123"));
    assert!(url.contains("redirect_uri=https://example.com/auth/dropbox/callback"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("token_access_type=offline"));
    assert!(url.contains("state=csrf789"));
    assert!(!url.contains("secret456"));
}

// =============================================================================
// entry parsing
// =============================================================================

#[test]
fn parse_entries_maps_files_and_folders() {
    let body = serde_json::json!({
        "entries": [
            {
                ".tag": "folder",
                "id": "id:folder1",
                "name": "Fotos",
                "path_display": "/Fotos",
                "path_lower": "/fotos"
            },
            {
                ".tag": "file",
                "id": "id:file1",
                "name": "praia.png",
                "path_display": "/Fotos/praia.png",
                "size": 204800
            }
        ]
    });

    let entries = parse_entries(&body);
    assert_eq!(entries.len(), 2);

    assert!(entries[0].is_folder);
    assert_eq!(entries[0].path, "/Fotos");
    assert_eq!(entries[0].size, None);

    assert!(!entries[1].is_folder);
    assert_eq!(entries[1].name, "praia.png");
    assert_eq!(entries[1].size, Some(204_800));
}

#[test]
fn parse_entry_falls_back_to_path_lower_and_name_id() {
    let entry = serde_json::json!({
        ".tag": "file",
        "name": "clip.mp4",
        "path_lower": "/videos/clip.mp4",
        "size": 1
    });
    let parsed = parse_entry(&entry).unwrap();
    assert_eq!(parsed.path, "/videos/clip.mp4");
    assert_eq!(parsed.id, "clip.mp4");
}

#[test]
fn parse_entry_without_name_is_none() {
    assert!(parse_entry(&serde_json::json!({ ".tag": "file" })).is_none());
}

#[test]
fn parse_entries_with_no_entries_is_empty() {
    assert!(parse_entries(&serde_json::json!({})).is_empty());
    assert!(parse_entries(&serde_json::json!({ "entries": [] })).is_empty());
}

// =============================================================================
// shared links
// =============================================================================

#[test]
fn pick_shared_link_takes_the_first_existing_link() {
    let listed = serde_json::json!({
        "links": [
            { "url": "https://www.dropbox.com/s/abc/a.png?dl=0" },
            { "url": "https://www.dropbox.com/s/def/b.png?dl=0" }
        ]
    });
    assert_eq!(
        pick_shared_link(&listed).as_deref(),
        Some("https://www.dropbox.com/s/abc/a.png?dl=0")
    );
}

#[test]
fn pick_shared_link_with_no_links_is_none() {
    assert_eq!(pick_shared_link(&serde_json::json!({ "links": [] })), None);
    assert_eq!(pick_shared_link(&serde_json::json!({})), None);
}

// =============================================================================
// upload_path
// =============================================================================

#[test]
fn upload_path_roots_bare_names() {
    assert_eq!(upload_path("", "a.png"), "/a.png");
    assert_eq!(upload_path("/Fotos", "a.png"), "/Fotos/a.png");
}
