//! Target-collection resolution.

use crate::error::IndexError;

/// Decides which named collection an operation acts on.
///
/// Priority: the request-level override when non-empty, else the configured
/// default when non-empty, else [`IndexError::NoTargetCollection`]. Empty and
/// whitespace-only names count as absent. The ingest and query paths both call
/// this function, so the priority order cannot drift between them.
pub fn resolve_collection(
    request_override: Option<&str>,
    configured_default: Option<&str>,
) -> Result<String, IndexError> {
    [request_override, configured_default]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(IndexError::NoTargetCollection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_override_wins() {
        assert_eq!(resolve_collection(Some("A"), Some("B")).unwrap(), "A");
    }

    #[test]
    fn empty_override_falls_back_to_default() {
        assert_eq!(resolve_collection(Some(""), Some("B")).unwrap(), "B");
        assert_eq!(resolve_collection(Some("   "), Some("B")).unwrap(), "B");
        assert_eq!(resolve_collection(None, Some("B")).unwrap(), "B");
    }

    #[test]
    fn nothing_resolvable_is_a_client_error() {
        let err = resolve_collection(None, None).unwrap_err();
        assert!(matches!(err, IndexError::NoTargetCollection));
        assert!(err.is_client_error());

        assert!(resolve_collection(Some(""), None).is_err());
        assert!(resolve_collection(Some(""), Some("  ")).is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(resolve_collection(Some(" docs "), None).unwrap(), "docs");
    }
}
