//! Syntax rules for the individual metadata fields.
//!
//! Each rule returns a human-readable reason on failure. Length bounds are
//! checked by the caller, see [`EntityMetadata::validate_basic_with`].
//!
//! [`EntityMetadata::validate_basic_with`]: crate::EntityMetadata::validate_basic_with

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Pattern shared by the keybase and twitter handles.
pub const HANDLE_PATTERN: &str = r"^[A-Za-z0-9_]+$";

fn handle_regex() -> &'static Regex {
    static HANDLE: OnceLock<Regex> = OnceLock::new();
    HANDLE.get_or_init(|| Regex::new(HANDLE_PATTERN).expect("handle pattern is a valid regex"))
}

/// An absolute `https` URL using the default port, without query or fragment.
pub fn validate_url(raw: &str) -> Result<(), String> {
    let parsed = Url::parse(raw).map_err(|e| e.to_string())?;

    if parsed.scheme() != "https" {
        return Err(format!("must use the https scheme (scheme: {})", parsed.scheme()));
    }

    // The parser drops a default port, so look at the raw authority as well.
    if let Some(port) = parsed.port() {
        return Err(format!("must use the default port (port: {port})"));
    }
    if let Some(port) = explicit_port(raw) {
        return Err(format!("must use the default port (port: {port})"));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err("must not contain query values or fragments".into());
    }

    Ok(())
}

/// The non-empty port string written in the authority of `raw`, if any.
fn explicit_port(raw: &str) -> Option<&str> {
    let (_, rest) = raw.split_once("://")?;
    let authority = rest
        .split(|c: char| matches!(c, '/' | '?' | '#' | '\\'))
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    let port = match host_port.rfind(']') {
        // IPv6 literal: the port can only follow the closing bracket.
        Some(end) => host_port[end + 1..].strip_prefix(':')?,
        None => host_port.rsplit_once(':')?.1,
    };
    (!port.is_empty()).then_some(port)
}

/// A single mailbox with an empty display name: `local@domain`,
/// `<local@domain>` or `"" <local@domain>`.
pub fn validate_email(raw: &str) -> Result<(), String> {
    let mut addr = raw.trim();
    if let Some(rest) = addr.strip_prefix("\"\"") {
        addr = rest.trim_start();
        if !addr.starts_with('<') {
            return Err("empty display name must be followed by an angle address".into());
        }
    }

    let addr_spec = if let Some(inner) = addr.strip_prefix('<') {
        inner
            .strip_suffix('>')
            .ok_or_else(|| "unterminated angle address".to_string())?
    } else if addr.contains('<') {
        return Err("must not contain a name".into());
    } else {
        addr
    };

    let (local, domain) = addr_spec
        .rsplit_once('@')
        .ok_or_else(|| "missing @ in address".to_string())?;

    if local.is_empty() {
        return Err("missing local part".into());
    }
    if !is_dot_atom(local) {
        return Err(format!("invalid local part: {local:?}"));
    }
    if domain.is_empty() {
        return Err("missing domain".into());
    }
    if !is_dot_atom(domain) {
        return Err(format!("invalid domain: {domain:?}"));
    }

    Ok(())
}

/// RFC 5322 dot-atom: non-empty atoms of atext joined by single dots.
fn is_dot_atom(s: &str) -> bool {
    s.split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c) || !c.is_ascii()
}

/// A keybase or twitter handle: ASCII letters, digits and underscores.
pub fn validate_handle(raw: &str) -> Result<(), String> {
    if handle_regex().is_match(raw) {
        Ok(())
    } else {
        Err(format!("must match {HANDLE_PATTERN}"))
    }
}
