// file: src/serializer/mode.rs
// description: execute permission detection from unix file mode bits

use std::fs::Metadata;

const EXECUTE_BITS: u32 = 0o111;

/// True when any of the user, group or other execute bits is set.
pub fn is_executable(mode: Option<u32>) -> bool {
    mode.is_some_and(|mode| mode & EXECUTE_BITS != 0)
}

#[cfg(unix)]
pub fn file_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
pub fn file_mode(_metadata: &Metadata) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_executable() {
        assert!(!is_executable(Some(0o644)));
        assert!(is_executable(Some(0o755)));
        assert!(!is_executable(None));
    }

    #[test]
    fn test_any_execute_bit_counts() {
        assert!(is_executable(Some(0o100)));
        assert!(is_executable(Some(0o010)));
        assert!(is_executable(Some(0o001)));
        assert!(is_executable(Some(0o100_644 | 0o001)));
        assert!(!is_executable(Some(0o100_666)));
        assert!(!is_executable(Some(0)));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_mode_reads_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o750)).unwrap();

        let metadata = std::fs::metadata(temp.path()).unwrap();
        assert_eq!(file_mode(&metadata).map(|m| m & 0o777), Some(0o750));
    }
}
