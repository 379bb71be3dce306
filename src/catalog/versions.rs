use std::cmp::Ordering;

use crate::error::{AppError, Result};

const GAME_VERSIONS: &[&str] = &["1.16.5", "1.20.1", "1.18.2", "1.20.4", "1.19.4"];

fn compare_newest_first(a: &str, b: &str) -> Ordering {
    let av = semver::Version::parse(a.trim_start_matches('v')).ok();
    let bv = semver::Version::parse(b.trim_start_matches('v')).ok();

    match (av, bv) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}

/// Offered game versions, newest first.
pub fn supported_versions() -> Vec<&'static str> {
    let mut versions = GAME_VERSIONS.to_vec();
    versions.sort_by(|a, b| compare_newest_first(a, b));
    versions
}

pub fn latest_version() -> &'static str {
    GAME_VERSIONS
        .iter()
        .copied()
        .min_by(|a, b| compare_newest_first(a, b))
        .unwrap_or("1.20.4")
}

pub fn ensure_supported_version(version: &str) -> Result<()> {
    if GAME_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(AppError::version_not_supported(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_sorted_newest_first() {
        assert_eq!(
            supported_versions(),
            vec!["1.20.4", "1.20.1", "1.19.4", "1.18.2", "1.16.5"]
        );
        assert_eq!(latest_version(), "1.20.4");
    }

    #[test]
    fn rejects_versions_outside_catalog() {
        assert!(ensure_supported_version("1.19.4").is_ok());
        let err = ensure_supported_version("1.8.9").expect_err("unsupported");
        assert_eq!(err.kind(), crate::error::ErrorKind::VersionNotSupported);
    }
}
