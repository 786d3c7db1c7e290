//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// `${VAR}` fails when VAR is unset, while `${VAR:-default}` substitutes the
/// default. Bare `$VAR` is left alone so URLs and keys containing dollar
/// signs pass through untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that was referenced without a default but is unset.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_api_key_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DIAGEN_TEST_KEY", "sk-test");
        }
        let result = expand_env("${DIAGEN_TEST_KEY}", "providers.openai.api_key").unwrap();
        assert_eq!(result, "sk-test");
        unsafe {
            std::env::remove_var("DIAGEN_TEST_KEY");
        }
    }

    #[test]
    fn test_expand_empty_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DIAGEN_UNSET_KEY");
        }
        let result = expand_env("${DIAGEN_UNSET_KEY:-}", "providers.claude.api_key").unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_expand_default_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DIAGEN_UNSET_URL");
        }
        let result = expand_env(
            "${DIAGEN_UNSET_URL:-https://api.deepseek.com}",
            "providers.deepseek.base_url",
        )
        .unwrap();
        assert_eq!(result, "https://api.deepseek.com");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DIAGEN_MISSING");
        }
        let err = expand_env("${DIAGEN_MISSING}", "export.renderer").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("DIAGEN_MISSING"));
        assert!(err.to_string().contains("export.renderer"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("sk-$abc", "providers.openai.api_key").unwrap();
        assert_eq!(result, "sk-$abc");
    }
}
