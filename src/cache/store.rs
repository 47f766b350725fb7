//! Cache store abstraction shared by the Redis and in-memory backends

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Key/value store holding serialized aggregates.
///
/// Each call is assumed atomic on its own; nothing is transactional across
/// calls. Implementations report connectivity problems as
/// `WellbeingError::CacheUnavailable`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a raw value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a raw value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// All live keys matching a glob pattern (`*`, `?`, `[...]`).
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Delete the given keys, returning how many existed.
    async fn delete_many(&self, keys: &[String]) -> Result<usize>;
}

/// Redis-style glob matching used by stores without native pattern support.
///
/// Supports `*`, `?`, character classes `[abc]`, ranges `[a-z]`, negation
/// `[^a]` and backslash escapes.
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    match_from(&p, &t)
}

fn match_from(p: &[char], t: &[char]) -> bool {
    let (mut pi, mut ti) = (0usize, 0usize);
    // Backtrack point for the most recent '*'
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next)) = match_class(p, pi, t[ti]) {
                        if matched {
                            pi = next;
                            ti += 1;
                            continue;
                        }
                    } else if t[ti] == '[' {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
                '\\' if pi + 1 < p.len() => {
                    if p[pi + 1] == t[ti] {
                        pi += 2;
                        ti += 1;
                        continue;
                    }
                }
                c => {
                    if c == t[ti] {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
            }
        }
        match star {
            Some((spi, sti)) => {
                pi = spi + 1;
                ti = sti + 1;
                star = Some((spi, sti + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Evaluate a `[...]` class starting at `p[start]`.
///
/// Returns `(matched, index after the class)` or `None` when the class is unterminated.
fn match_class(p: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = i < p.len() && p[i] == '^';
    if negate {
        i += 1;
    }
    let mut matched = false;
    while i < p.len() && p[i] != ']' {
        if p[i] == '\\' && i + 1 < p.len() {
            matched |= p[i + 1] == c;
            i += 2;
        } else if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            let (lo, hi) = if p[i] <= p[i + 2] {
                (p[i], p[i + 2])
            } else {
                (p[i + 2], p[i])
            };
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= p[i] == c;
            i += 1;
        }
    }
    if i >= p.len() {
        return None;
    }
    Some((matched != negate, i + 1))
}
