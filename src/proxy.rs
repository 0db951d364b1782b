//! Path rewrites that forward requests to the external tour and media host.
//!
//! The virtual tour and several images are served by a third-party panel.
//! The page references them through same-origin prefixes (`/isp-proxy/…`,
//! `/media/…`) and the host rewrites those to the panel's origin. Rules are
//! declared in `config.toml` and rendered to a Netlify/Cloudflare-style
//! `_redirects` file next to `index.html`.
//!
//! ```toml
//! [[proxy.rewrites]]
//! source = "/isp-proxy/:path*"
//! destination = "https://pavilionsquarekl.com/ISP/:path*"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder for the rest of the request path.
pub const WILDCARD: &str = ":path*";

#[derive(Error, Debug, PartialEq)]
pub enum ProxyError {
    #[error("rewrite source '{0}' must be an absolute path ending in /:path*")]
    BadSource(String),
    #[error("rewrite destination '{0}' must be an http(s) URL containing :path*")]
    BadDestination(String),
    #[error("rewrite source '{0}' is declared twice")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
    pub source: String,
    pub destination: String,
}

impl RewriteRule {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Source with the trailing `/:path*` removed, e.g. `/media`.
    pub fn prefix(&self) -> &str {
        self.source
            .strip_suffix(WILDCARD)
            .and_then(|s| s.strip_suffix('/'))
            .unwrap_or(&self.source)
    }

    pub fn validate(&self) -> Result<(), ProxyError> {
        let prefix_ok = self.source.starts_with('/')
            && self.source.ends_with(&format!("/{WILDCARD}"))
            && self.prefix().len() > 1;
        if !prefix_ok {
            return Err(ProxyError::BadSource(self.source.clone()));
        }
        let dest_ok = (self.destination.starts_with("https://")
            || self.destination.starts_with("http://"))
            && self.destination.contains(WILDCARD);
        if !dest_ok {
            return Err(ProxyError::BadDestination(self.destination.clone()));
        }
        Ok(())
    }

    /// Destination for `path` if this rule matches it.
    ///
    /// Matching is on whole segments: `/media` and `/media/x` match
    /// `/media/:path*`, `/mediakit` does not.
    pub fn resolve(&self, path: &str) -> Option<String> {
        let prefix = self.prefix();
        let rest = path.strip_prefix(prefix)?;
        let rest = match rest.strip_prefix('/') {
            Some(r) => r,
            None if rest.is_empty() => "",
            None => return None,
        };
        Some(self.destination.replace(WILDCARD, rest))
    }

    /// One `_redirects` line: `/media/*  https://…/media/:splat  200`.
    pub fn redirect_line(&self) -> String {
        format!(
            "{}/*  {}  200",
            self.prefix(),
            self.destination.replace(WILDCARD, ":splat")
        )
    }
}

/// The rules the site ships with.
pub fn default_rules() -> Vec<RewriteRule> {
    vec![
        RewriteRule::new(
            "/isp-proxy/:path*",
            "https://pavilionsquarekl.com/ISP/:path*",
        ),
        RewriteRule::new(
            "/media/:path*",
            "https://pavilionsquarekl.com/ISP/media/:path*",
        ),
    ]
}

pub fn validate_rules(rules: &[RewriteRule]) -> Result<(), ProxyError> {
    for (i, rule) in rules.iter().enumerate() {
        rule.validate()?;
        if rules[..i].iter().any(|r| r.prefix() == rule.prefix()) {
            return Err(ProxyError::Duplicate(rule.source.clone()));
        }
    }
    Ok(())
}

/// First matching rule's destination.
pub fn resolve(rules: &[RewriteRule], path: &str) -> Option<String> {
    rules.iter().find_map(|r| r.resolve(path))
}

/// Contents of the `_redirects` file, one rule per line.
pub fn render_redirects(rules: &[RewriteRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.redirect_line());
        out.push('\n');
    }
    out
}
