use std::path::Path;
use url::Url;

/// Longest file name most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

/// Characters rejected by at least one common filesystem
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows reserves regardless of extension
const RESERVED_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Returns the last path segment of a URL, without query or fragment.
///
/// `None` when the URL does not parse or its path ends in `/`.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if last.is_empty() {
        None
    } else {
        Some(last.to_string())
    }
}

/// Check if a name can be used as-is for a file in the destination directory.
///
/// The rules are the union of what Unix filesystems and NTFS reject, so a
/// name accepted here is valid on both.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name.len() <= MAX_FILENAME_BYTES
        && !name.ends_with(['.', ' '])
        && !is_reserved_device_name(name)
        && !name
            .chars()
            .any(|c| c.is_control() || ILLEGAL_FILENAME_CHARS.contains(&c))
}

/// `CON`, `nul.png`, `Com1.tar.gz` and the like
fn is_reserved_device_name(name: &str) -> bool {
    let base = name.split('.').next().unwrap_or(name).trim_end();
    RESERVED_DEVICE_NAMES
        .iter()
        .any(|reserved| base.eq_ignore_ascii_case(reserved))
}

/// Generates a random file name, keeping `extension` when it is a short
/// alphanumeric suffix.
pub fn random_filename(extension: Option<&str>) -> String {
    let stem = uuid::Uuid::new_v4().simple().to_string();
    match extension {
        Some(ext)
            if !ext.is_empty()
                && ext.len() <= 10
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!("{}.{}", stem, ext)
        }
        _ => stem,
    }
}

/// Picks the file name an image URL should be stored under, before any
/// collision handling.
pub fn candidate_filename(url: &str) -> String {
    match filename_from_url(url) {
        Some(name) if is_safe_filename(&name) => name,
        Some(name) => {
            let extension = name.rsplit_once('.').map(|(_, ext)| ext);
            let replacement = random_filename(extension);
            ::log::debug!(
                "File name {:?} from {} is not filesystem-safe, using {}",
                name,
                url,
                replacement
            );
            replacement
        }
        None => random_filename(None),
    }
}

/// Inserts a collision token before the extension: `photo.jpg` becomes
/// `photo (1).jpg`, `README` becomes `README (1)`.
///
/// The stem is shortened when needed so the result never exceeds
/// `MAX_FILENAME_BYTES`.
pub fn with_collision_token(name: &str, attempt: u32) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let suffix = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(" ({}).{}", attempt, ext),
        None => format!(" ({})", attempt),
    };

    let budget = MAX_FILENAME_BYTES.saturating_sub(suffix.len());
    format!("{}{}", truncate_to_boundary(stem, budget), suffix)
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a character
fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("http://www.chami.com/html-kit/i/g/cached/tmp10.jpg").as_deref(),
            Some("tmp10.jpg")
        );
        assert_eq!(
            filename_from_url("https://example.com/a/b.png?w=100#frag").as_deref(),
            Some("b.png")
        );
        assert_eq!(filename_from_url("https://example.com/"), None);
        assert_eq!(filename_from_url("https://example.com"), None);
        assert_eq!(filename_from_url("https://example.com/dir/"), None);
        assert_eq!(filename_from_url("not a url"), None);
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("tmp10.jpg"));
        assert!(is_safe_filename("my%20photo.png"));
        assert!(is_safe_filename(".hidden"));

        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("."));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("a:b.png"));
        assert!(!is_safe_filename("what?.png"));
        assert!(!is_safe_filename("star*.gif"));
        assert!(!is_safe_filename("tab\there.png"));
        assert!(!is_safe_filename(&"x".repeat(300)));
    }

    #[test]
    fn test_windows_reserved_names_are_unsafe() {
        for name in ["CON", "nul", "Com1.png", "LPT9.tar.gz", "aux .jpg", "photo.", "photo "] {
            assert!(!is_safe_filename(name), "{:?} should be unsafe", name);
        }

        // Reserved words as part of a longer stem are fine
        for name in ["console.png", "null.gif", "com10.jpg", "icon.png"] {
            assert!(is_safe_filename(name), "{:?} should be safe", name);
        }

        let replaced = candidate_filename("https://example.com/img/CON.png");
        assert_ne!(replaced, "CON.png");
        assert!(replaced.ends_with(".png"));
    }

    #[test]
    fn test_random_filename() {
        let a = random_filename(Some("png"));
        let b = random_filename(Some("png"));
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert!(is_safe_filename(&a));

        assert!(!random_filename(None).contains('.'));
        // Suspicious extensions are dropped
        assert!(!random_filename(Some("p|ng")).contains('.'));
    }

    #[test]
    fn test_candidate_filename() {
        assert_eq!(candidate_filename("https://example.com/img/cat.jpg"), "cat.jpg");

        let replaced = candidate_filename("https://example.com/img/a%3Cb%3E.jpg");
        assert_eq!(replaced, "a%3Cb%3E.jpg");

        let replaced = candidate_filename("https://example.com/img/a:b.jpg");
        assert_ne!(replaced, "a:b.jpg");
        assert!(replaced.ends_with(".jpg"));
        assert!(is_safe_filename(&replaced));

        let generated = candidate_filename("https://example.com/gallery/");
        assert!(is_safe_filename(&generated));
    }

    #[test]
    fn test_with_collision_token() {
        assert_eq!(with_collision_token("photo.jpg", 1), "photo (1).jpg");
        assert_eq!(with_collision_token("photo.jpg", 12), "photo (12).jpg");
        assert_eq!(with_collision_token("README", 1), "README (1)");
        assert_eq!(with_collision_token("archive.tar.gz", 2), "archive.tar (2).gz");
    }

    #[test]
    fn test_collision_token_respects_name_length_limit() {
        let longest = format!("{}.png", "a".repeat(251));
        assert_eq!(longest.len(), MAX_FILENAME_BYTES);
        assert!(is_safe_filename(&longest));

        for attempt in [1, 42, 9999] {
            let renamed = with_collision_token(&longest, attempt);
            assert!(renamed.len() <= MAX_FILENAME_BYTES, "{} bytes", renamed.len());
            assert!(renamed.ends_with(&format!(" ({}).png", attempt)));
            assert!(is_safe_filename(&renamed));
        }

        // Multi-byte stems are cut on a character boundary
        let wide = format!("{}.jpg", "é".repeat(125));
        let renamed = with_collision_token(&wide, 3);
        assert!(renamed.len() <= MAX_FILENAME_BYTES);
        assert!(renamed.ends_with(" (3).jpg"));
    }
}
