//! Tolerant parsing of stored policy documents
//!
//! Operators hand-edit the stored document, and the control plane accepts a
//! JSON superset: `//` and `/* */` comments plus trailing commas. Both are
//! stripped with a string-aware scanner before structural parsing, so a
//! comment marker inside a string value (a URL in `hosts`, say) survives.
//! Any parse failure degrades to the empty policy instead of failing the
//! caller's sync.

use crate::policy::{AclPolicy, PolicyError};
use tracing::warn;

/// Parse a stored policy document, degrading to empty on any failure.
pub fn parse_hujson(document: &str) -> AclPolicy {
    if document.trim().is_empty() {
        return AclPolicy::default();
    }

    let cleaned = strip_trailing_commas(&strip_comments(document));
    match serde_json::from_str(&cleaned) {
        Ok(policy) => policy,
        Err(err) => {
            warn!("stored policy is malformed, treating as empty: {}", err);
            AclPolicy::default()
        }
    }
}

/// Serialize a policy with stable 2-space indentation.
pub fn to_hujson(policy: &AclPolicy) -> Result<String, PolicyError> {
    Ok(serde_json::to_string_pretty(policy)?)
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                i += 1;
                out.push(chars[i]);
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}
