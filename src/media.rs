// src/media.rs
//! Media extraction: pick at most one image or video reference for an item.
//!
//! Rules run in priority order and the first hit wins:
//! 1. structured descriptor that is a video (explicit kind/MIME, or video extension)
//! 2. structured descriptor that is an image (explicit kind/MIME, or image extension)
//! 3. enclosure identified as video, then one identified as image
//! 4. first inline `<img src="...">` in the body
//!
//! Descriptors without a usable URL are skipped, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::feed::{Enclosure, MediaDescriptor, RawItem};
use crate::types::{Media, MediaKind};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "ogv", "m3u8"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "bmp"];

static RE_IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).unwrap());

pub fn extract_media(item: &RawItem) -> Option<Media> {
    descriptor_of_kind(&item.media, MediaKind::Video)
        .or_else(|| descriptor_of_kind(&item.media, MediaKind::Image))
        .or_else(|| enclosure_of_kind(&item.enclosures, MediaKind::Video))
        .or_else(|| enclosure_of_kind(&item.enclosures, MediaKind::Image))
        .or_else(|| item.content.as_deref().and_then(first_inline_image))
}

fn descriptor_of_kind(descriptors: &[MediaDescriptor], kind: MediaKind) -> Option<Media> {
    descriptors.iter().find_map(|d| {
        let url = usable_url(d.url.as_deref())?;
        let declared = declared_kind(d.medium.as_deref()).or_else(|| mime_kind(d.mime_type.as_deref()));
        let is_kind = declared == Some(kind) || extension_kind(url) == Some(kind);
        is_kind.then(|| Media {
            kind,
            url: url.to_string(),
        })
    })
}

fn enclosure_of_kind(enclosures: &[Enclosure], kind: MediaKind) -> Option<Media> {
    enclosures.iter().find_map(|enc| {
        let url = usable_url(enc.url.as_deref())?;
        let found = mime_kind(enc.mime_type.as_deref()).or_else(|| extension_kind(url))?;
        (found == kind).then(|| Media {
            kind,
            url: url.to_string(),
        })
    })
}

/// First `<img src>` in an HTML fragment.
pub fn first_inline_image(html: &str) -> Option<Media> {
    let caps = RE_IMG_SRC.captures(html)?;
    let src = html_escape::decode_html_entities(caps.get(1)?.as_str().trim()).to_string();
    if src.is_empty() {
        return None;
    }
    Some(Media::image(src))
}

fn usable_url(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|u| !u.is_empty())
}

fn declared_kind(medium: Option<&str>) -> Option<MediaKind> {
    match medium?.trim().to_ascii_lowercase().as_str() {
        "video" => Some(MediaKind::Video),
        "image" => Some(MediaKind::Image),
        _ => None,
    }
}

fn mime_kind(mime: Option<&str>) -> Option<MediaKind> {
    let m = mime?.trim().to_ascii_lowercase();
    if m.starts_with("video/") {
        Some(MediaKind::Video)
    } else if m.starts_with("image/") {
        Some(MediaKind::Image)
    } else {
        None
    }
}

/// Classify by file extension, ignoring query string, fragment and case.
fn extension_kind(url: &str) -> Option<MediaKind> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let (_, ext) = path.rsplit_once('.')?;
    if ext.contains('/') {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else {
        None
    }
}
