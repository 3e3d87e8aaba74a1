//! `{placeholder}` expansion for artifact URLs

use keg_types::{PlatformTag, Version};

/// Expand `{name}`, `{version}` and `{platform}` in a URL template.
///
/// Returns `None` if the template contains an unknown or unterminated
/// placeholder.
#[must_use]
pub fn expand_url(
    template: &str,
    name: &str,
    version: &Version,
    platform: PlatformTag,
) -> Option<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}')?;
        match &after[..end] {
            "name" => out.push_str(name),
            "version" => out.push_str(&version.to_string()),
            "platform" => out.push_str(platform.as_str()),
            _ => return None,
        }
        rest = &after[end + 1..];
    }

    if rest.contains('}') {
        return None;
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_all_placeholders() {
        let url = expand_url(
            "https://example.com/{name}/releases/download/v{version}/{name}-v{version}-{platform}",
            "oxidux",
            &Version::new(0, 4, 0),
            PlatformTag::Osx,
        )
        .unwrap();
        assert_eq!(
            url,
            "https://example.com/oxidux/releases/download/v0.4.0/oxidux-v0.4.0-osx"
        );
    }

    #[test]
    fn literal_urls_pass_through() {
        let url = "https://example.com/oxidux-v0.3.0-linux";
        assert_eq!(
            expand_url(url, "oxidux", &Version::new(0, 3, 0), PlatformTag::Linux).as_deref(),
            Some(url)
        );
    }

    #[test]
    fn rejects_unknown_or_broken_placeholders() {
        let v = Version::new(1, 0, 0);
        assert!(expand_url("https://x/{arch}", "a", &v, PlatformTag::Osx).is_none());
        assert!(expand_url("https://x/{name", "a", &v, PlatformTag::Osx).is_none());
        assert!(expand_url("https://x/name}", "a", &v, PlatformTag::Osx).is_none());
    }
}
