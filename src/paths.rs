/// Replace Windows separators with forward slashes.
///
/// Doubled backslashes (as they arrive from escaped input) collapse to a single `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace("\\\\", "/").replace('\\', "/")
}

/// Drop the Windows extended-length prefix that `canonicalize` adds, so
/// `\\?\C:\data` becomes `C:\data` and `\\?\UNC\srv\share` becomes
/// `\\srv\share`. Other paths are returned unchanged.
pub fn strip_verbatim_prefix(path: &str) -> String {
    if let Some(unc) = path.strip_prefix(r"\\?\UNC\") {
        format!(r"\\{}", unc)
    } else if let Some(rest) = path.strip_prefix(r"\\?\") {
        rest.to_string()
    } else {
        path.to_string()
    }
}

/// Prefix a backend-relative path with the root it was computed against.
pub fn compose(root_path: &str, relative: &str) -> String {
    format!("{}/{}", root_path, relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_single_and_doubled_backslashes() {
        assert_eq!(normalize_separators(r"C:\Users\me"), "C:/Users/me");
        assert_eq!(normalize_separators(r"C:\\Users\\me"), "C:/Users/me");
        assert_eq!(normalize_separators("/already/unix"), "/already/unix");
    }

    #[test]
    fn strips_extended_length_prefixes() {
        assert_eq!(strip_verbatim_prefix(r"\\?\C:\data\inbox"), r"C:\data\inbox");
        assert_eq!(strip_verbatim_prefix(r"\\?\UNC\srv\share\x"), r"\\srv\share\x");
        assert_eq!(strip_verbatim_prefix("/home/me"), "/home/me");
        assert_eq!(
            normalize_separators(&strip_verbatim_prefix(r"\\?\C:\data")),
            "C:/data"
        );
    }

    #[test]
    fn composes_root_and_relative() {
        assert_eq!(compose("/r", "a/b.txt"), "/r/a/b.txt");
        assert_eq!(compose("/r", "c/b.txt"), "/r/c/b.txt");
    }
}
