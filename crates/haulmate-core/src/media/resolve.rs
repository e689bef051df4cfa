//! Pure path transforms between at-rest filenames and absolute paths.
//!
//! No I/O happens here; the managed-directory location is passed in by the
//! caller. External URIs (web, platform asset library) are never rewritten
//! in either direction.

use std::path::Path;

/// Name of the private subdirectory holding all attachment files.
pub const MANAGED_DIR_NAME: &str = "user_files";

/// URI schemes that are stored and read verbatim.
const EXTERNAL_SCHEMES: &[&str] = &["http://", "https://", "assets-library://"];

/// True if the value carries a recognized external scheme.
pub fn is_external(value: &str) -> bool {
    EXTERNAL_SCHEMES
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

/// Strip an optional `file://` scheme from a camera/picker URI.
///
/// `file:///tmp/a.jpg` becomes `/tmp/a.jpg`; values without the scheme pass
/// through untouched.
pub fn strip_file_scheme(value: &str) -> &str {
    value.strip_prefix("file://").unwrap_or(value)
}

/// The trailing filename of a path or URI.
pub fn file_name_of(value: &str) -> &str {
    value.rsplit('/').next().unwrap_or(value)
}

/// Map a stored value to an absolute path under the given managed directory.
///
/// - empty values and external URIs pass through unchanged;
/// - a path already inside the current managed directory is kept as-is
///   (minus any `file://` scheme);
/// - a path containing the managed-directory name but rooted elsewhere is a
///   leftover from a previous storage root: its trailing filename is
///   re-joined with the current directory;
/// - anything else is treated as a bare filename and joined with the
///   current directory (joining leaves an absolute path untouched).
pub fn resolve_with_root(dir: &Path, value: &str) -> String {
    if value.is_empty() || is_external(value) {
        return value.to_string();
    }

    let stripped = strip_file_scheme(value);

    if Path::new(stripped).starts_with(dir) {
        return stripped.to_string();
    }

    let stale_marker = format!("/{MANAGED_DIR_NAME}/");
    if stripped.contains(&stale_marker) {
        return dir.join(file_name_of(stripped)).display().to_string();
    }

    dir.join(stripped).display().to_string()
}

/// Map a value to its at-rest form under the given managed directory.
///
/// Paths inside the managed directory (current or stale root) are stripped
/// down to the bare filename; everything else, external URIs included,
/// passes through unchanged.
pub fn relative_with_root(dir: &Path, value: &str) -> String {
    if value.is_empty() || is_external(value) {
        return value.to_string();
    }

    let stripped = strip_file_scheme(value);
    let stale_marker = format!("/{MANAGED_DIR_NAME}/");

    if Path::new(stripped).starts_with(dir) || stripped.contains(&stale_marker) {
        return file_name_of(stripped).to_string();
    }

    value.to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dir() -> PathBuf {
        PathBuf::from("/data/haulmate/user_files")
    }

    #[test]
    fn resolve_empty_is_empty() {
        assert_eq!(resolve_with_root(&dir(), ""), "");
    }

    #[test]
    fn resolve_bare_filename_joins_current_dir() {
        assert_eq!(
            resolve_with_root(&dir(), "123-abc.jpg"),
            "/data/haulmate/user_files/123-abc.jpg"
        );
    }

    #[test]
    fn resolve_current_root_path_unchanged() {
        let absolute = "/data/haulmate/user_files/123-abc.jpg";
        assert_eq!(resolve_with_root(&dir(), absolute), absolute);
    }

    #[test]
    fn resolve_strips_file_scheme() {
        assert_eq!(
            resolve_with_root(&dir(), "file:///data/haulmate/user_files/a.jpg"),
            "/data/haulmate/user_files/a.jpg"
        );
    }

    #[test]
    fn resolve_migrates_stale_root() {
        // Same filename, different (pre-reinstall) storage root.
        let stale = "/old-sandbox/Documents/user_files/123-abc.jpg";
        assert_eq!(
            resolve_with_root(&dir(), stale),
            "/data/haulmate/user_files/123-abc.jpg"
        );
    }

    #[test]
    fn resolve_never_touches_external_uris() {
        let web = "https://example.com/photo.jpg";
        let asset = "assets-library://asset/asset.JPG?id=1";
        assert_eq!(resolve_with_root(&dir(), web), web);
        assert_eq!(resolve_with_root(&dir(), asset), asset);
    }

    #[test]
    fn relative_strips_to_filename_inside_managed_dir() {
        assert_eq!(
            relative_with_root(&dir(), "/data/haulmate/user_files/123-abc.jpg"),
            "123-abc.jpg"
        );
    }

    #[test]
    fn relative_strips_stale_root_to_filename() {
        assert_eq!(
            relative_with_root(&dir(), "/old-root/user_files/123-abc.jpg"),
            "123-abc.jpg"
        );
    }

    #[test]
    fn relative_passes_through_unmanaged_paths() {
        assert_eq!(relative_with_root(&dir(), "/tmp/abc.jpg"), "/tmp/abc.jpg");
    }

    #[test]
    fn relative_never_touches_external_uris() {
        let web = "http://example.com/photo.jpg";
        assert_eq!(relative_with_root(&dir(), web), web);
    }

    #[test]
    fn roundtrip_filename_at_rest() {
        // to_relative(resolve(x)) == to_relative(x) for filenames at rest.
        let name = "123-abc.jpg";
        let resolved = resolve_with_root(&dir(), name);
        assert_eq!(relative_with_root(&dir(), &resolved), name);
    }

    #[test]
    fn resolve_is_idempotent_after_one_cycle() {
        // resolve(to_relative(resolve(x))) == resolve(x)
        let inputs = [
            "123-abc.jpg",
            "/old-root/user_files/123-abc.jpg",
            "https://example.com/photo.jpg",
        ];
        for input in inputs {
            let once = resolve_with_root(&dir(), input);
            let again = resolve_with_root(&dir(), &relative_with_root(&dir(), &once));
            assert_eq!(once, again, "input: {input}");
        }
    }

    #[test]
    fn file_name_of_handles_plain_names() {
        assert_eq!(file_name_of("abc.jpg"), "abc.jpg");
        assert_eq!(file_name_of("/a/b/abc.jpg"), "abc.jpg");
    }
}
