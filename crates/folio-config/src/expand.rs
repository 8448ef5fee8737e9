//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.
//!
//! Bare `$VAR` is left alone so URLs containing `$` survive untouched.

use crate::ConfigError;

/// Unset variable reported by the lookup closure.
struct UnsetVar(String);

/// Expand environment variable references in `value`.
///
/// `field` names the configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(resolved) => Ok(Some(resolved)),
        Err(_) => Err(UnsetVar(name.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional value in place.
pub(crate) fn expand_optional(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_variable() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_TEST_SITE_HOST", "docs.example.com");
        }
        let result = expand_env("https://${FOLIO_TEST_SITE_HOST}/", "site.url").unwrap();
        assert_eq!(result, "https://docs.example.com/");
        unsafe {
            std::env::remove_var("FOLIO_TEST_SITE_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_TEST_BRANCH");
        }
        let result = expand_env("edit/${FOLIO_TEST_BRANCH:-main}/docs/", "repo.edit_uri").unwrap();
        assert_eq!(result, "edit/main/docs/");
    }

    #[test]
    fn test_expand_value_wins_over_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_TEST_REF", "release");
        }
        let result = expand_env("${FOLIO_TEST_REF:-main}", "repo.edit_uri").unwrap();
        assert_eq!(result, "release");
        unsafe {
            std::env::remove_var("FOLIO_TEST_REF");
        }
    }

    #[test]
    fn test_missing_variable_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_TEST_MISSING");
        }
        let err = expand_env("${FOLIO_TEST_MISSING}", "repo.url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("FOLIO_TEST_MISSING"));
        assert!(msg.contains("repo.url"));
    }

    #[test]
    fn test_bare_dollar_untouched() {
        assert_eq!(
            expand_env("https://example.com/$ref", "repo.url").unwrap(),
            "https://example.com/$ref"
        );
    }

    #[test]
    fn test_expand_optional_none() {
        let mut value = None;
        expand_optional(&mut value, "site.url").unwrap();
        assert_eq!(value, None);
    }
}
