use super::*;

// =============================================================================
// transform_dropbox_url
// =============================================================================

#[test]
fn trailing_zero_becomes_one() {
    assert_eq!(
        transform_dropbox_url("https://www.dropbox.com/s/abc/photo.png?dl=0"),
        "https://www.dropbox.com/s/abc/photo.png?dl=1"
    );
}

#[test]
fn only_the_final_character_changes() {
    let input = "https://www.dropbox.com/s/a0b0c0/video.mp4?dl=0";
    let output = transform_dropbox_url(input);
    assert_eq!(&output[..output.len() - 1], &input[..input.len() - 1]);
    assert!(output.ends_with('1'));
}

#[test]
fn trailing_one_is_unchanged() {
    let url = "https://www.dropbox.com/s/abc/photo.png?dl=1";
    assert_eq!(transform_dropbox_url(url), url);
}

#[test]
fn non_dropbox_url_ending_in_zero_is_unchanged() {
    let url = "https://example.com/files/photo0";
    assert_eq!(transform_dropbox_url(url), url);
}

#[test]
fn direct_content_host_does_not_match() {
    // "dl.dropboxusercontent.com" does not contain the "dropbox.com" needle.
    let url = "https://dl.dropboxusercontent.com/s/abc/photo.png?dl=0";
    assert_eq!(transform_dropbox_url(url), url);
}

#[test]
fn empty_string_is_unchanged() {
    assert_eq!(transform_dropbox_url(""), "");
}

// =============================================================================
// direct_link_url
// =============================================================================

#[test]
fn share_host_is_rewritten() {
    assert_eq!(
        direct_link_url("https://www.dropbox.com/s/abc/photo.png"),
        "https://dl.dropboxusercontent.com/s/abc/photo.png"
    );
}

#[test]
fn other_hosts_are_unchanged() {
    let url = "https://cdn.example.com/photo.png";
    assert_eq!(direct_link_url(url), url);
}
