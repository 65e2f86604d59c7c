//! Text command grammar.
//!
//! Parsing is pure: a line either maps to a [`Command`] or to `None`, and
//! `None` means the line is left alone without a reply.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    ListChannels { filter: Option<String> },
    Bind { index: i64, alias: String },
    ListAliases,
    DeleteAlias { alias: String },
    Search { alias: String, query: String, count: u64 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::ListChannels { .. } => "list-channels",
            Command::Bind { .. } => "bind",
            Command::ListAliases => "list-aliases",
            Command::DeleteAlias { .. } => "delete-alias",
            Command::Search { .. } => "search",
        }
    }
}

const HELP_SPELLINGS: &[&str] = &["/help", "/start", "/ayuda"];
const LIST_ALIASES: &str = "/aliases";

struct Patterns {
    channels: Regex,
    bind: Regex,
    delete_alias: Regex,
    search: Regex,
}

// Keywords match case-insensitively; alias names stay ASCII-only.
fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        channels: Regex::new(r"^/(?i:channels|canales)(?:\s+(.+))?$").expect("valid regex"),
        bind: Regex::new(r"^/(?i:bind|setcanal)\s+(-?[0-9]+)\s+(?i:alias)=([A-Za-z0-9_]{1,32})\s*$")
            .expect("valid regex"),
        delete_alias: Regex::new(r"^/(?i:delalias)\s+([A-Za-z0-9_]{1,32})\s*$")
            .expect("valid regex"),
        search: Regex::new(r#"^/(?i:search|buscar)\s+([A-Za-z0-9_]{1,32})\s+"(.+?)"\s+([0-9]+)\s*$"#)
            .expect("valid regex"),
    })
}

/// Classify one line of text.
pub fn parse(text: &str) -> Option<Command> {
    let text = text.trim();
    let lower = text.to_lowercase();

    if HELP_SPELLINGS.contains(&lower.as_str()) {
        return Some(Command::Help);
    }

    let p = patterns();

    if let Some(c) = p.channels.captures(text) {
        let filter = c
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|f| !f.is_empty());
        return Some(Command::ListChannels { filter });
    }

    if let Some(c) = p.bind.captures(text) {
        return Some(Command::Bind {
            index: parse_index(&c[1]),
            alias: c[2].to_string(),
        });
    }

    if lower == LIST_ALIASES {
        return Some(Command::ListAliases);
    }

    if let Some(c) = p.delete_alias.captures(text) {
        return Some(Command::DeleteAlias {
            alias: c[1].to_string(),
        });
    }

    if let Some(c) = p.search.captures(text) {
        return Some(Command::Search {
            alias: c[1].to_string(),
            query: c[2].to_string(),
            count: c[3].parse::<u64>().unwrap_or(u64::MAX),
        });
    }

    None
}

// Out-of-range digits saturate; such an index is never present in a listing.
fn parse_index(digits: &str) -> i64 {
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(index: i64, alias: &str) -> Option<Command> {
        Some(Command::Bind {
            index,
            alias: alias.to_string(),
        })
    }

    #[test]
    fn help_spellings() {
        for s in ["/help", "/HELP", "/start", "/Ayuda", "  /help  "] {
            assert_eq!(parse(s), Some(Command::Help), "{s}");
        }
        assert_eq!(parse("/help me"), None);
    }

    #[test]
    fn list_channels_with_and_without_filter() {
        assert_eq!(
            parse("/channels"),
            Some(Command::ListChannels { filter: None })
        );
        assert_eq!(
            parse("/CANALES   Kubernetes news "),
            Some(Command::ListChannels {
                filter: Some("Kubernetes news".to_string())
            })
        );
        assert_eq!(parse("/channelsfoo"), None);
    }

    #[test]
    fn bind_shapes() {
        assert_eq!(parse("/bind 3 alias=k8s"), bind(3, "k8s"));
        assert_eq!(parse("/SetCanal  12   ALIAS=Rust_News "), bind(12, "Rust_News"));
        assert_eq!(parse("/bind 0 alias=zero"), bind(0, "zero"));
        assert_eq!(parse("/bind -2 alias=neg"), bind(-2, "neg"));
        assert_eq!(
            parse("/bind 99999999999999999999999 alias=big"),
            bind(i64::MAX, "big")
        );
    }

    #[test]
    fn bind_rejects_bad_alias_names() {
        assert_eq!(parse("/bind 3 alias="), None);
        assert_eq!(parse("/bind 3 alias=has-dash"), None);
        assert_eq!(parse("/bind 3 alias=ñ"), None);
        assert_eq!(parse(&format!("/bind 3 alias={}", "a".repeat(33))), None);
        assert_eq!(
            parse(&format!("/bind 3 alias={}", "a".repeat(32))),
            bind(3, &"a".repeat(32))
        );
        assert_eq!(parse("/bind x alias=k8s"), None);
        assert_eq!(parse("/bind 3"), None);
    }

    #[test]
    fn alias_names_are_ascii_even_with_case_folding() {
        // KELVIN SIGN folds to 'k' under Unicode case-insensitive matching.
        assert_eq!(parse("/bind 1 alias=\u{212A}8s"), None);
    }

    #[test]
    fn list_aliases_is_exact() {
        assert_eq!(parse("/aliases"), Some(Command::ListAliases));
        assert_eq!(parse("/Aliases "), Some(Command::ListAliases));
        assert_eq!(parse("/aliases all"), None);
    }

    #[test]
    fn delete_alias_shapes() {
        assert_eq!(
            parse("/delalias k8s"),
            Some(Command::DeleteAlias {
                alias: "k8s".to_string()
            })
        );
        assert_eq!(parse("/delalias"), None);
        assert_eq!(parse("/delalias a b"), None);
    }

    #[test]
    fn search_shapes() {
        assert_eq!(
            parse(r#"/search k8s "error 500" 5"#),
            Some(Command::Search {
                alias: "k8s".to_string(),
                query: "error 500".to_string(),
                count: 5,
            })
        );
        assert_eq!(
            parse(r#"/BUSCAR k8s "say "hi" now" 0"#),
            Some(Command::Search {
                alias: "k8s".to_string(),
                query: r#"say "hi" now"#.to_string(),
                count: 0,
            })
        );
        assert_eq!(
            parse(r#"/search k8s "x" 123456789012345678901234567890"#),
            Some(Command::Search {
                alias: "k8s".to_string(),
                query: "x".to_string(),
                count: u64::MAX,
            })
        );
    }

    #[test]
    fn search_rejects_incomplete_forms() {
        assert_eq!(parse(r#"/search k8s "" 5"#), None);
        assert_eq!(parse(r#"/search k8s error 5"#), None);
        assert_eq!(parse(r#"/search k8s "error""#), None);
        assert_eq!(parse(r#"/search k8s "error" -1"#), None);
    }

    #[test]
    fn ordinary_notes_do_not_match() {
        for s in [
            "",
            "buy milk",
            "help",
            "/unknown",
            "see /help later",
            "/help\n/aliases",
        ] {
            assert_eq!(parse(s), None, "{s:?}");
        }
    }
}
