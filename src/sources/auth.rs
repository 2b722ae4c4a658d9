//! Authentication headers for archive downloads.
//!
//! Credentials are resolved on every call rather than at load time, so a
//! rotated token in the environment is picked up without reloading config.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};

use crate::sources::{AuthConfig, AuthKind, SourceError};

/// HTTP headers to attach to a download request.
pub type AuthHeaders = BTreeMap<String, String>;

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("credential reference regex is valid")
});

/// Build headers for a source's auth config using the process environment.
pub fn build_auth_headers(auth: Option<&AuthConfig>) -> Result<AuthHeaders, SourceError> {
    build_auth_headers_with(auth, |var| std::env::var(var).ok())
}

/// Build headers, resolving `${VAR}` references through `lookup`.
pub fn build_auth_headers_with<F>(auth: Option<&AuthConfig>, lookup: F) -> Result<AuthHeaders, SourceError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut headers = AuthHeaders::new();

    let Some(auth) = auth else {
        return Ok(headers);
    };

    match auth.kind {
        AuthKind::None => {}
        AuthKind::Bearer => {
            let token = required(auth.token.as_deref(), "bearer", "token")?;
            let token = resolve_credential(token, &lookup)?;
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        AuthKind::Basic => {
            let username = required(auth.username.as_deref(), "basic", "username")?;
            let password = required(auth.password.as_deref(), "basic", "password")?;
            let username = resolve_credential(username, &lookup)?;
            let password = resolve_credential(password, &lookup)?;
            let encoded = STANDARD.encode(format!("{}:{}", username, password));
            headers.insert("Authorization".to_string(), format!("Basic {}", encoded));
        }
    }

    Ok(headers)
}

fn required<'a>(
    value: Option<&'a str>,
    kind: &'static str,
    field: &'static str,
) -> Result<&'a str, SourceError> {
    value.ok_or(SourceError::IncompleteAuth { kind, field })
}

/// Expand every `${VAR}` reference in a credential.
fn resolve_credential<F>(value: &str, lookup: &F) -> Result<String, SourceError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let resolved = ENV_REF.replace_all(value, |caps: &Captures<'_>| {
        let var = &caps[1];
        match lookup(var) {
            Some(v) => v,
            None => {
                missing.get_or_insert_with(|| var.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(SourceError::MissingCredential(var)),
        None => Ok(resolved.into_owned()),
    }
}
