//! Operator identity seam.
//!
//! Inspections record who ran them and ticket transitions record who acted.
//! Resolution never blocks an inspection: failures fall back to a placeholder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

/// A resolved person acting on the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current user, or `None` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<Operator>, DatabaseError>;
}

/// A fixed identity, for tests and explicit `--operator`-style overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<String>);

impl StaticIdentity {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<Option<Operator>, DatabaseError> {
        Ok(self.0.clone().map(|name| Operator { name }))
    }
}

/// Reads the first non-blank variable among `CHARIOT_OPERATOR` and `USER`.
#[derive(Debug, Clone)]
pub struct EnvIdentity {
    vars: Vec<String>,
}

impl Default for EnvIdentity {
    fn default() -> Self {
        Self::with_vars(["CHARIOT_OPERATOR", "USER"])
    }
}

impl EnvIdentity {
    pub fn with_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for EnvIdentity {
    async fn current_user(&self) -> Result<Option<Operator>, DatabaseError> {
        Ok(self
            .vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .map(|name| Operator {
                name: name.trim().to_string(),
            }))
    }
}

/// Display name of the current user, or `placeholder` if the provider fails,
/// returns nobody, or returns a blank name.
pub async fn resolve_operator(provider: &dyn IdentityProvider, placeholder: &str) -> String {
    match provider.current_user().await {
        Ok(Some(operator)) if !operator.name.trim().is_empty() => operator.name.trim().to_string(),
        Ok(_) => {
            tracing::warn!(placeholder, "no operator identity; using placeholder");
            placeholder.to_string()
        }
        Err(error) => {
            tracing::warn!(%error, placeholder, "identity lookup failed; using placeholder");
            placeholder.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    struct BrokenIdentity;

    #[async_trait]
    impl IdentityProvider for BrokenIdentity {
        async fn current_user(&self) -> Result<Option<Operator>, DatabaseError> {
            Err(DatabaseError::Store("directory unreachable".into()))
        }
    }

    #[rstest]
    #[case(StaticIdentity::named("Alex"), "Alex")]
    #[case(StaticIdentity::named("  Sam  "), "Sam")]
    #[case(StaticIdentity::named("   "), "Operator")]
    #[case(StaticIdentity(None), "Operator")]
    #[tokio::test]
    async fn static_identity_resolution(#[case] identity: StaticIdentity, #[case] expected: &str) {
        assert_eq!(resolve_operator(&identity, "Operator").await, expected);
    }

    #[tokio::test]
    async fn failing_provider_falls_back() {
        assert_eq!(resolve_operator(&BrokenIdentity, "Night shift").await, "Night shift");
    }

    #[tokio::test]
    async fn env_identity_skips_unset_vars() {
        let identity = EnvIdentity::with_vars(["CHARIOT_TEST_SURELY_UNSET_VAR", "PATH"]);
        let user = identity.current_user().await.unwrap();
        assert!(user.is_some());
    }
}
