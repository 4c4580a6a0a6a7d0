// src/pipeline/rules.rs

use regex::{Regex, RegexBuilder};

use crate::data_model::{DESCRIPTION_COLUMN, TITLE_COLUMN, URL_COLUMN};
use crate::error::{PipelineError, Result};

/// Domain tokens of search engines, social networks, marketplaces, classifieds,
/// chain retailers, media/government sites, banks, and file/CDN hosts.
pub const BAD_DOMAINS: &[&str] = &[
    r"\b(?:google|yandex|bing|mail|yahoo|facebook|instagram|threads)\b",
    r"\b(?:2gis|ozon|vk|youtube|tiktok|twitter|whatsapp|telegram|aliexpress|avito|wildberries)\b",
    r"\b(?:ebay|amazon|etsy|alibaba|craigslist|craiglist|gumtree|yandex\.market|kaspi|otvertka|all\.biz)\b",
    r"\b(?:kolesa|olx|drom|zoon|flagma|cdek|prom|rabota|hh|satu|yellowpages|goldpages|allbiz|optoviki|factories)\b",
    r"\b(?:ostin|maag|zara|lamoda|asos|ikea|mvideo|eldorado|technopark|dns)\b",
    r"\b(?:media|news|travel|blog|wiki|forum|gov)\b",
    r"\b(?:sber(?:bank)?|tinkoff|vtb|gazprombank|alfa|rosbank|raiffeisen|unicredit|homecredit|pochta|kurs)\b",
    r"\b(?:(?:files|docs|images|media|static|cdn|assets|content|download|archive|backup|storage)\.(?:ru|ua|com))\b",
];

/// Error pages, sitemaps, catalog/list pages, rate tables, "official" pages.
pub const BAD_TITLES: &[&str] = &[
    r"\b(?:страница\s+не\s+найдена|404|ошибка|доступ\s+запрещён|not\s+found)\b",
    r"\b(?:карта\s+сайта|site\s+map)\b",
    r"\b(?:каталог|список|товаров|услуг|предприятий|компаний)\b",
    r"\b(?:курс[а]?\s+валют|свежие\s+данные|топ-?\w+)\b",
    r"\b(?:официальн(?:ый|ые|ая))",
];

/// Snippets that open with a relative timestamp ("3 дня назад"), i.e. news and listings.
pub const BAD_DESCRIPTIONS: &[&str] = &[r"^\s*\d+\s*(?:дн|день|дней|час|часов|минут|мин|секунд)"];

// Keeps large Unicode-aware alternations (`\w`, `\b`, case folding) under the limit.
const REGEX_SIZE_LIMIT: usize = 64 * (1 << 20);

/// The three fields that ship with built-in rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleField {
    Url,
    Title,
    Description,
}

impl RuleField {
    pub fn column(&self) -> &'static str {
        match self {
            RuleField::Url => URL_COLUMN,
            RuleField::Title => TITLE_COLUMN,
            RuleField::Description => DESCRIPTION_COLUMN,
        }
    }

    pub fn defaults(&self) -> &'static [&'static str] {
        match self {
            RuleField::Url => BAD_DOMAINS,
            RuleField::Title => BAD_TITLES,
            RuleField::Description => BAD_DESCRIPTIONS,
        }
    }
}

/// Compiles one pattern case-insensitively, naming the field on failure.
pub fn compile_pattern(field: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|source| PipelineError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// An ordered list of patterns for one column, compiled once into a single
/// case-insensitive alternation. Immutable after construction.
#[derive(Debug, Clone)]
pub struct RuleSet {
    field: String,
    patterns: Vec<String>,
    matcher: Option<Regex>,
}

impl RuleSet {
    /// Compiles `patterns` for `field`.
    ///
    /// Each pattern is checked on its own first so a bad one is reported by
    /// name rather than as a position inside the merged alternation. An empty
    /// list matches nothing.
    pub fn compile(field: &str, patterns: Vec<String>) -> Result<Self> {
        for pattern in &patterns {
            compile_pattern(field, pattern)?;
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            let alternation = patterns
                .iter()
                .map(|p| format!("(?:{})", p))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile_pattern(field, &alternation)?)
        };

        Ok(RuleSet {
            field: field.to_string(),
            patterns,
            matcher,
        })
    }

    /// A fresh copy of the built-in list for `field` with `extra` appended.
    pub fn with_defaults(field: RuleField, extra: &[String]) -> Result<Self> {
        let mut patterns: Vec<String> = field.defaults().iter().map(|p| p.to_string()).collect();
        patterns.extend(extra.iter().cloned());
        Self::compile(field.column(), patterns)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(text))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
