//! Project names from remote URLs.

/// Derive a project name from a remote URL.
///
/// Everything after the host is kept, so `git@host:foo/bar.git` and
/// `ssh://git@host:2222/foo/bar.git` both give `foo/bar.git`. `file://` URLs
/// and plain paths give their last component.
///
/// ```
/// use tether_git::name_from_url;
///
/// assert_eq!(name_from_url("git@git:foo/bar.git"), "foo/bar.git");
/// assert_eq!(name_from_url("https://example.com/foo/bar.git"), "foo/bar.git");
/// ```
#[must_use]
pub fn name_from_url(url: &str) -> &str {
    if let Some(path) = url.strip_prefix("file://") {
        let sep = if cfg!(windows) && path.contains('\\') {
            '\\'
        } else {
            '/'
        };
        return path.rsplit(sep).next().unwrap_or(path);
    }

    if let Some((_, rest)) = url.split_once("://") {
        // ssh://host:port/path keeps only what follows the port.
        let rest = rest.rsplit(':').next().unwrap_or(rest);
        return rest.split_once('/').map_or(rest, |(_, path)| path);
    }

    if let Some((_, path)) = url.rsplit_once(':') {
        return path;
    }
    url.rsplit('/').next().unwrap_or(url)
}
