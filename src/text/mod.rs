//! Shared text normalization and classification rules
//!
//! Both the context extractor and the content analyzer run through these
//! tables. Technology-set comparisons in the scorer are only meaningful if
//! both sides were normalized by the same rules, so this module is the single
//! place they live.

use crate::context::models::{ContentType, ContextType, Difficulty, Intent};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Alias -> canonical technology name
const TECH_ALIASES: &[(&str, &str)] = &[
    ("node", "node.js"),
    ("nodejs", "node.js"),
    ("js", "javascript"),
    ("es6", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("golang", "go"),
    ("rustlang", "rust"),
    ("k8s", "kubernetes"),
    ("postgres", "postgresql"),
    ("psql", "postgresql"),
    ("mongo", "mongodb"),
    ("ml", "machine-learning"),
    ("ai", "machine-learning"),
    ("dl", "deep-learning"),
    ("tf", "tensorflow"),
    ("sklearn", "scikit-learn"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("nextjs", "next.js"),
    ("dotnet", ".net"),
    ("csharp", "c#"),
    ("cpp", "c++"),
    ("objc", "objective-c"),
    ("tfjs", "tensorflow"),
    ("rn", "react-native"),
];

/// Canonical technology vocabulary recognized in free text
const KNOWN_TECHNOLOGIES: &[&str] = &[
    "java",
    "python",
    "rust",
    "go",
    "c",
    "c++",
    "c#",
    ".net",
    "swift",
    "kotlin",
    "scala",
    "ruby",
    "php",
    "elixir",
    "haskell",
    "asm",
    "javascript",
    "typescript",
    "node.js",
    "react",
    "react-native",
    "vue",
    "angular",
    "next.js",
    "svelte",
    "django",
    "flask",
    "fastapi",
    "spring",
    "rails",
    "laravel",
    "kubernetes",
    "docker",
    "terraform",
    "aws",
    "azure",
    "gcp",
    "linux",
    "bash",
    "git",
    "postgresql",
    "mysql",
    "sqlite",
    "mongodb",
    "redis",
    "kafka",
    "rabbitmq",
    "elasticsearch",
    "graphql",
    "grpc",
    "rest",
    "html",
    "css",
    "sass",
    "webpack",
    "vite",
    "machine-learning",
    "deep-learning",
    "tensorflow",
    "pytorch",
    "scikit-learn",
    "numpy",
    "pandas",
    "spark",
    "hadoop",
    "sql",
    "objective-c",
];

static ALIAS_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TECH_ALIASES.iter().copied().collect());

static KNOWN_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| KNOWN_TECHNOLOGIES.iter().copied().collect());

/// Intent keyword rules, ordered: first rule with a hit wins
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::Troubleshooting,
        &["fix", "bug", "error", "crash", "broken", "debug", "failing", "exception", "not working"],
    ),
    (
        Intent::Optimization,
        &["optimize", "optimization", "performance", "slow", "faster", "profiling", "latency", "throughput"],
    ),
    (
        Intent::Research,
        &["research", "compare", "comparison", "evaluate", "versus", "alternatives", "survey", "state of the art"],
    ),
    (
        Intent::Learning,
        &["learn", "learning", "tutorial", "course", "study", "understand", "introduction", "basics"],
    ),
    (
        Intent::Implementation,
        &["implement", "build", "building", "create", "develop", "integrate", "add feature", "set up", "setup"],
    ),
];

/// Difficulty keyword rules, ordered: first rule with a hit wins
const DIFFICULTY_RULES: &[(Difficulty, &[&str])] = &[
    (
        Difficulty::Advanced,
        &["advanced", "expert", "deep dive", "internals", "under the hood", "low-level", "production-grade"],
    ),
    (
        Difficulty::Beginner,
        &["beginner", "basics", "introduction", "intro to", "getting started", "first steps", "simple", "101"],
    ),
    (
        Difficulty::Intermediate,
        &["intermediate", "practical", "beyond the basics", "in depth"],
    ),
];

/// Content-type keyword rules, ordered: first rule with a hit wins
const CONTENT_TYPE_RULES: &[(ContentType, &[&str])] = &[
    (ContentType::Video, &["video", "watch", "screencast", "youtube", "talk"]),
    (ContentType::Course, &["course", "curriculum", "bootcamp", "lesson"]),
    (
        ContentType::Tutorial,
        &["tutorial", "how to", "walkthrough", "step by step", "guide"],
    ),
    (
        ContentType::Documentation,
        &["documentation", "docs", "reference", "api reference", "manual", "spec"],
    ),
    (ContentType::Tool, &["tool", "library", "framework", "cli", "sdk", "plugin"]),
    (ContentType::Article, &["article", "blog", "post", "essay", "writeup"]),
];

/// Context-type keyword heuristics, used when no project/task id is present
const CONTEXT_TYPE_RULES: &[(ContextType, &[&str])] = &[
    (
        ContextType::Research,
        &["research", "investigate", "compare", "evaluate", "survey", "explore"],
    ),
    (
        ContextType::Practice,
        &["practice", "exercise", "challenge", "kata", "drill", "interview prep"],
    ),
    (
        ContextType::Learning,
        &["learn", "study", "tutorial", "course", "understand"],
    ),
];

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could", "did", "do",
    "does", "for", "from", "had", "has", "have", "how", "i", "if", "in", "into", "is", "it",
    "its", "just", "like", "may", "me", "might", "more", "most", "my", "no", "not", "of", "on",
    "or", "our", "out", "over", "should", "so", "some", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "to", "up", "us", "use", "using", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "why", "will", "with", "would",
    "you", "your", "about", "all", "also", "any", "need", "want", "get", "make", "new", "one",
    "two", "very", "via",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Normalize a single technology token through the alias table.
///
/// Returns `None` for tokens too short or empty after trimming.
pub fn normalize_technology(raw: &str) -> Option<String> {
    let token = raw
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric() && !matches!(c, '.' | '#' | '+' | '-'))
        .to_lowercase();
    if token.is_empty() {
        return None;
    }
    if let Some(canonical) = ALIAS_TABLE.get(token.as_str()) {
        return Some((*canonical).to_string());
    }
    // Single letters other than the known languages are noise.
    if token.len() == 1 && token != "c" {
        return None;
    }
    Some(token)
}

/// Normalize a free-text technology list (comma, slash, or whitespace separated)
pub fn normalize_tech_list(raw: &str) -> BTreeSet<String> {
    raw.split(|c: char| matches!(c, ',' | '/' | ';' | '|') || c.is_whitespace())
        .filter_map(normalize_technology)
        .collect()
}

/// Detect known technologies mentioned anywhere in free text
pub fn detect_technologies(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .into_iter()
        .filter_map(|t| normalize_technology(&t))
        .filter(|t| KNOWN_SET.contains(t.as_str()))
        .collect()
}

/// Classify intent: ordered rules, first match wins, default `General`
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    for &(intent, keywords) in INTENT_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return intent;
        }
    }
    Intent::General
}

/// Classify difficulty: ordered rules, first match wins, default `Unknown`
pub fn classify_difficulty(text: &str) -> Difficulty {
    let lower = text.to_lowercase();
    for &(difficulty, keywords) in DIFFICULTY_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return difficulty;
        }
    }
    Difficulty::Unknown
}

/// Classify content type: ordered rules, first match wins, `None` when silent
pub fn classify_content_type(text: &str) -> Option<ContentType> {
    let lower = text.to_lowercase();
    for &(content_type, keywords) in CONTENT_TYPE_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(content_type);
        }
    }
    None
}

/// Keyword heuristic for context type; `None` means no signal
pub fn classify_context_type(text: &str) -> Option<ContextType> {
    let lower = text.to_lowercase();
    for &(context_type, keywords) in CONTEXT_TYPE_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(context_type);
        }
    }
    None
}

/// Split text into lowercase word tokens, keeping tech punctuation (`.#+-`)
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && !matches!(c, '.' | '#' | '+' | '-'))
        .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '-')))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Extract the top-`limit` frequent non-stopword tokens.
///
/// Ordering is frequency descending, first occurrence breaking ties, so the
/// result is deterministic for a given input text.
pub fn key_concepts(text: &str, limit: usize) -> Vec<String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for token in tokenize(text) {
        if token.len() < 3 || STOPWORD_SET.contains(token.as_str()) {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut ranked: Vec<(usize, String, usize)> = counts
        .into_iter()
        .enumerate()
        .map(|(pos, (word, count))| (pos, word, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(_, word, _)| word).collect()
}
