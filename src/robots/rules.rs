//! In-memory parsed `robots.txt` rules: agent selection and path matching
//! (spec §3 `RobotsRules`, §4.2).

use regex::Regex;
use std::time::Duration;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Allow,
    Disallow,
}

#[derive(Debug, Clone)]
struct Pattern {
    kind: Directive,
    raw: String,
    regex: Regex,
    specificity: usize,
}

/// A single `user-agent` group: the agents it applies to, its ordered
/// allow/disallow patterns, and an optional crawl-delay.
#[derive(Debug, Clone)]
pub struct Group {
    agents: Vec<String>,
    patterns: Vec<Pattern>,
    crawl_delay: Option<Duration>,
}

/// An ordered sequence of groups. An empty ruleset is the "allow-all"
/// identity.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    groups: Vec<Group>,
}

/// A disallow-all ruleset, used by `RobotsManager` as the "temporary
/// disallow" fallback on fetch failure (spec §4.3 step 7).
pub fn disallow_all() -> RobotsRules {
    let pattern = Pattern {
        kind: Directive::Disallow,
        raw: "/".to_string(),
        regex: pattern_to_regex("/", false),
        specificity: 1,
    };
    RobotsRules {
        groups: vec![Group {
            agents: vec!["*".to_string()],
            patterns: vec![pattern],
            crawl_delay: None,
        }],
    }
}

/// Escape regex metacharacters except `*` (wildcard) and a trailing `$`
/// (end anchor), then compile as an anchored regex.
fn pattern_to_regex(pattern: &str, end_anchor: bool) -> Regex {
    let mut escaped = String::with_capacity(pattern.len() * 2);
    for ch in pattern.chars() {
        if ch == '*' {
            escaped.push_str(".*");
        } else {
            escaped.push_str(&regex::escape(&ch.to_string()));
        }
    }
    let body = if end_anchor {
        format!("^{escaped}$")
    } else {
        format!("^{escaped}")
    };
    Regex::new(&body).unwrap_or_else(|_| Regex::new("^$").unwrap())
}

fn specificity_of(pattern: &str) -> usize {
    pattern.trim_end_matches('$').chars().filter(|c| *c != '*').count()
}

impl RobotsRules {
    /// Parse a `robots.txt` body. Line-oriented, case-insensitive directive
    /// keys, comments (`#`) and blanks skipped. A new `user-agent` line
    /// after any rule line closes the current group and opens a new one.
    pub fn parse(body: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current_agents: Vec<String> = Vec::new();
        let mut current_patterns: Vec<Pattern> = Vec::new();
        let mut current_delay: Option<Duration> = None;
        let mut seen_rule_line = false;

        let flush = |groups: &mut Vec<Group>,
                     agents: &mut Vec<String>,
                     patterns: &mut Vec<Pattern>,
                     delay: &mut Option<Duration>| {
            if !agents.is_empty() {
                groups.push(Group {
                    agents: std::mem::take(agents),
                    patterns: std::mem::take(patterns),
                    crawl_delay: delay.take(),
                });
            } else {
                agents.clear();
                patterns.clear();
                *delay = None;
            }
        };

        for raw_line in body.lines() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if seen_rule_line {
                        flush(
                            &mut groups,
                            &mut current_agents,
                            &mut current_patterns,
                            &mut current_delay,
                        );
                        seen_rule_line = false;
                    }
                    current_agents.push(value.to_ascii_lowercase());
                }
                "allow" | "disallow" if !value.is_empty() || key == "disallow" => {
                    seen_rule_line = true;
                    if value.is_empty() {
                        // "Disallow:" with empty value means allow-all for this group.
                        continue;
                    }
                    let end_anchor = value.ends_with('$');
                    let regex = pattern_to_regex(value, end_anchor);
                    let kind = if key == "allow" {
                        Directive::Allow
                    } else {
                        Directive::Disallow
                    };
                    current_patterns.push(Pattern {
                        kind,
                        raw: value.to_string(),
                        regex,
                        specificity: specificity_of(value),
                    });
                }
                "crawl-delay" => {
                    seen_rule_line = true;
                    if let Ok(secs) = value.parse::<f64>() {
                        if secs.is_finite() && secs >= 0.0 {
                            current_delay = Some(Duration::from_secs_f64(secs));
                        }
                    }
                }
                _ => {}
            }
        }
        flush(
            &mut groups,
            &mut current_agents,
            &mut current_patterns,
            &mut current_delay,
        );

        Self { groups }
    }

    /// Select the group whose agent tokens best match `ua`. A token matches
    /// when it is `*` (score 0) or a case-insensitive substring of `ua`
    /// (score = token length). Highest score wins; ties go to first
    /// occurrence.
    fn select_group(&self, ua: &str) -> Option<&Group> {
        let ua_lower = ua.trim().to_ascii_lowercase();
        let mut best: Option<(&Group, i64)> = None;
        for group in &self.groups {
            let mut group_score: Option<i64> = None;
            for token in &group.agents {
                let score = if token == "*" {
                    Some(0)
                } else if ua_lower.contains(token.as_str()) {
                    Some(token.len() as i64)
                } else {
                    None
                };
                if let Some(s) = score {
                    group_score = Some(group_score.map_or(s, |existing| existing.max(s)));
                }
            }
            if let Some(s) = group_score {
                if best.is_none_or(|(_, best_score)| s > best_score) {
                    best = Some((group, s));
                }
            }
        }
        best.map(|(g, _)| g)
    }

    /// Whether `ua` is allowed to fetch `path_with_query`. Missing group
    /// match or no matching directive both default to allow.
    pub fn is_allowed(&self, ua: &str, path_with_query: &str) -> bool {
        let Some(group) = self.select_group(ua) else {
            return true;
        };

        let mut best: Option<(&Pattern, usize)> = None;
        for pattern in &group.patterns {
            if pattern.regex.is_match(path_with_query) {
                let spec = pattern.specificity;
                let better = match best {
                    None => true,
                    Some((best_pattern, best_spec)) => {
                        spec > best_spec
                            || (spec == best_spec
                                && pattern.kind == Directive::Allow
                                && best_pattern.kind == Directive::Disallow)
                    }
                };
                if better {
                    best = Some((pattern, spec));
                }
            }
        }

        match best {
            None => true,
            Some((pattern, _)) => pattern.kind == Directive::Allow,
        }
    }

    pub fn crawl_delay_for(&self, ua: &str) -> Option<Duration> {
        self.select_group(ua).and_then(|g| g.crawl_delay)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn raw_patterns_for(&self, ua: &str) -> Vec<(&str, bool)> {
        self.select_group(ua)
            .map(|g| {
                g.patterns
                    .iter()
                    .map(|p| (p.raw.as_str(), p.kind == Directive::Allow))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}
