//! Static tables the Effect Analyzer consults to classify call sites by
//! name. Mirrors the teacher's use of `once_cell` for lazy-built lookup
//! tables (trusted library allowlists).

use std::collections::HashSet;

use once_cell::sync::Lazy;

static PURE_BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "len", "str", "int", "float", "bool", "abs", "min", "max", "sum", "sorted", "map",
        "filter", "zip", "enumerate", "range", "list", "dict", "set", "tuple", "isinstance",
    ]
    .into_iter()
    .collect()
});

static IO_CALLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["print", "open", "read", "write", "input", "os.remove", "os.rename", "shutil.copy"]
        .into_iter()
        .collect()
});

static LOG_PREFIXES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["log.", "logger.", "logging.", "tracing::"]);

static DB_HINTS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["query", "select", "fetch", "execute", "cursor", "session.commit"]);

static WRITE_VERBS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["insert", "update", "delete", "save", "write", "commit", "upsert"]);

static NETWORK_HINTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["http", "requests.", "fetch", "urlopen", "socket", "grpc", "graphql"]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    Pure,
    Io,
    Log,
    DbRead,
    DbWrite,
    Network,
    Unknown,
}

/// Classify a call site by callee name (fully-qualified or bare).
pub fn classify_call(callee_fqn: &str) -> CallClass {
    let lower = callee_fqn.to_ascii_lowercase();
    let bare = lower.rsplit('.').next().unwrap_or(&lower);

    if PURE_BUILTINS.contains(bare) {
        return CallClass::Pure;
    }
    if IO_CALLS.iter().any(|c| lower == *c || lower.ends_with(&format!(".{c}"))) {
        return CallClass::Io;
    }
    if LOG_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return CallClass::Log;
    }
    if DB_HINTS.iter().any(|h| lower.contains(h)) {
        if WRITE_VERBS.iter().any(|v| lower.contains(v)) {
            return CallClass::DbWrite;
        }
        return CallClass::DbRead;
    }
    if NETWORK_HINTS.iter().any(|h| lower.contains(h)) {
        return CallClass::Network;
    }
    CallClass::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_builtin_classified_as_pure() {
        assert_eq!(classify_call("len"), CallClass::Pure);
    }

    #[test]
    fn logging_call_classified_as_log() {
        assert_eq!(classify_call("logger.info"), CallClass::Log);
    }

    #[test]
    fn db_write_verb_wins_over_generic_query_hint() {
        assert_eq!(classify_call("session.insert"), CallClass::DbWrite);
        assert_eq!(classify_call("cursor.fetchall"), CallClass::DbRead);
    }

    #[test]
    fn network_call_classified_as_network() {
        assert_eq!(classify_call("requests.post"), CallClass::Network);
    }

    #[test]
    fn unrecognized_call_is_unknown() {
        assert_eq!(classify_call("some_module.do_thing"), CallClass::Unknown);
    }
}
