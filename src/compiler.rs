//! Route pattern compiler.
//!
//! Turns a pattern such as `/users/@id:int/posts/@slug` into an anchored
//! regex with one named capture per placeholder:
//!
//! | Segment        | Captures         |
//! |----------------|------------------|
//! | `@name`        | `[\w.-]+`        |
//! | `@name:int`    | `\d+`            |
//! | `@name:string` | `[a-zA-Z]+`      |
//! | anything else  | itself, literally |
//!
//! Every segment is emitted followed by `/`, then the end anchor. The
//! artifact at the end is normalized by whether the pattern itself ends in a
//! slash: `/users/` keeps exactly one required trailing slash (`//$` → `/$`),
//! `/users` accepts no trailing slash at all (`/$` → `$`).
//!
//! Compilation is pure. Problems with the pattern are reported as
//! [`Error::InvalidRoute`] at boot, never discovered per request.

use std::collections::HashMap;

use regex::Regex;

use crate::error::Error;

/// Default capture for an untyped `@name` placeholder.
const ANY_SEGMENT: &str = r"[\w.-]+";

/// A compiled route pattern: the matcher plus its placeholder names in
/// order of appearance.
#[derive(Clone, Debug)]
pub struct CompiledRoute {
    matcher: Regex,
    params: Vec<String>,
}

impl CompiledRoute {
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }

    /// Matches `url` and returns its named captures, or `None` if the URL
    /// does not match.
    pub fn captures(&self, url: &str) -> Option<HashMap<String, String>> {
        let caps = self.matcher.captures(url)?;
        let params = self.params.iter()
            .filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_owned())))
            .collect::<HashMap<_, _>>();
        if params.len() != self.params.len() {
            tracing::debug!(url, expected = self.params.len(), got = params.len(), "partial captures");
        }
        Some(params)
    }
}

/// Compiles `pattern` into a [`CompiledRoute`].
///
/// ```rust
/// let route = trowel::compile("/email/verify/@id").unwrap();
/// assert_eq!(route.matcher().as_str(), r"^/email/verify/(?P<id>[\w.-]+)$");
/// assert_eq!(route.param_names(), ["id"]);
/// ```
pub fn compile(pattern: &str) -> Result<CompiledRoute, Error> {
    let invalid = |reason: String| Error::InvalidRoute { pattern: pattern.to_owned(), reason };

    if !pattern.starts_with('/') {
        return Err(invalid("must start with `/`".to_owned()));
    }

    let mut regex = String::from("^");
    let mut params: Vec<String> = Vec::new();

    for segment in pattern.split('/') {
        match segment.strip_prefix('@') {
            Some(placeholder) => {
                let (name, class) = match placeholder.split_once(':') {
                    None => (placeholder, ANY_SEGMENT),
                    Some((name, "int")) => (name, r"\d+"),
                    Some((name, "string")) => (name, "[a-zA-Z]+"),
                    Some((_, other)) => return Err(invalid(format!("unknown parameter type `{other}`"))),
                };
                if !is_capture_name(name) {
                    return Err(invalid(format!("invalid parameter name `{name}`")));
                }
                if params.iter().any(|p| p == name) {
                    return Err(invalid(format!("duplicate parameter `{name}`")));
                }
                regex.push_str(&format!("(?P<{name}>{class})/"));
                params.push(name.to_owned());
            }
            None => {
                regex.push_str(&regex::escape(segment));
                regex.push('/');
            }
        }
    }
    regex.push('$');

    let regex = if pattern.ends_with('/') {
        replace_suffix(&regex, "//$", "/$")
    } else {
        replace_suffix(&regex, "/$", "$")
    };

    let matcher = Regex::new(&regex).map_err(|e| invalid(e.to_string()))?;
    Ok(CompiledRoute { matcher, params })
}

fn replace_suffix(s: &str, from: &str, to: &str) -> String {
    match s.strip_suffix(from) {
        Some(head) => format!("{head}{to}"),
        None => s.to_owned(),
    }
}

fn is_capture_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
