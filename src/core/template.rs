//! Template pool: battle line templates, their placeholders, loading and
//! validation.

use ron::extensions::Extensions;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

use crate::schema::loadout::{EVADE_TAG, GENERAL_TAG};

/// English battle text shipped with the crate.
const BUILTIN_POOL: &str = include_str!("../../content/battle_text.ron");

const DEFAULT_EXCLAMATION: &str = "!!";

/// Key prefix of battle lines in the flat text table.
const FLAT_KEY_PREFIX: &str = "text_battle_";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("required template bucket '{category}.{tag}' is missing or empty")]
    EmptyTemplateCategory {
        category: TemplateCategory,
        tag: &'static str,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// The kinds of battle line a template can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateCategory {
    Attack,
    Hit,
    Shield,
    Color,
    /// Words substituted into `{hittyped}` inside hit lines.
    HitType,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 5] = [
        TemplateCategory::Attack,
        TemplateCategory::Hit,
        TemplateCategory::Shield,
        TemplateCategory::Color,
        TemplateCategory::HitType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Hit => "hit",
            Self::Shield => "shield",
            Self::Color => "color",
            Self::HitType => "hittype",
        }
    }

    pub fn from_name(name: &str) -> Option<TemplateCategory> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buckets that must exist so every round can always be rendered.
pub const REQUIRED_BUCKETS: [(TemplateCategory, &str); 4] = [
    (TemplateCategory::Attack, GENERAL_TAG),
    (TemplateCategory::Hit, GENERAL_TAG),
    (TemplateCategory::Shield, EVADE_TAG),
    (TemplateCategory::Color, GENERAL_TAG),
];

/// A named slot in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    Aggressor,
    Victim,
    HitTyped,
    Winner,
}

impl Placeholder {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aggressor => "aggressor",
            Self::Victim => "victim",
            Self::HitTyped => "hittyped",
            Self::Winner => "winner",
        }
    }

    pub fn from_name(name: &str) -> Option<Placeholder> {
        match name {
            "aggressor" => Some(Self::Aggressor),
            "victim" => Some(Self::Victim),
            "hittyped" => Some(Self::HitTyped),
            "winner" => Some(Self::Winner),
            _ => None,
        }
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSegment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A parsed battle line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

/// Values substituted into placeholders. Unbound placeholders are written
/// back out verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    pub aggressor: Option<&'a str>,
    pub victim: Option<&'a str>,
    pub hit_type: Option<&'a str>,
    pub winner: Option<&'a str>,
}

impl<'a> Bindings<'a> {
    fn get(&self, placeholder: Placeholder) -> Option<&'a str> {
        match placeholder {
            Placeholder::Aggressor => self.aggressor,
            Placeholder::Victim => self.victim,
            Placeholder::HitTyped => self.hit_type,
            Placeholder::Winner => self.winner,
        }
    }
}

impl Template {
    /// Parse a template string.
    ///
    /// `{name}` is a placeholder and must be one of `aggressor`, `victim`,
    /// `hittyped` or `winner`; `{{` and `}}` are literal braces.
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => {
                                return Err(TemplateError::TemplateParse(format!(
                                    "nested brace in '{}'",
                                    input
                                )))
                            }
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(TemplateError::TemplateParse(format!(
                                    "unclosed brace in '{}'",
                                    input
                                )))
                            }
                        }
                    }
                    let placeholder = Placeholder::from_name(&name).ok_or_else(|| {
                        TemplateError::TemplateParse(format!(
                            "unknown placeholder '{{{}}}' in '{}'",
                            name, input
                        ))
                    })?;
                    if !literal.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(TemplateSegment::Placeholder(placeholder));
                }
                '}' => {
                    return Err(TemplateError::TemplateParse(format!(
                        "unmatched closing brace in '{}'",
                        input
                    )))
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(TemplateSegment::Literal(literal));
        }

        Ok(Template { segments })
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, TemplateSegment::Placeholder(p) if *p == placeholder))
    }

    pub fn render(&self, bindings: &Bindings<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Placeholder(p) => match bindings.get(*p) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(p.name());
                        out.push('}');
                    }
                },
            }
        }
        out
    }
}

fn default_battle_won() -> &'static Template {
    static TEMPLATE: OnceLock<Template> = OnceLock::new();
    TEMPLATE.get_or_init(|| Template {
        segments: vec![
            TemplateSegment::Placeholder(Placeholder::Winner),
            TemplateSegment::Literal(" wins the battle!!".to_string()),
        ],
    })
}

/// All battle line templates, bucketed by category and weapon/shield tag.
///
/// Loaded once before any battle is narrated and never mutated while
/// sessions are using it.
#[derive(Debug, Clone, Default)]
pub struct TemplatePool {
    buckets: FxHashMap<TemplateCategory, FxHashMap<String, Vec<Template>>>,
    battle_won: Option<Template>,
    exclamation: Option<String>,
}

// RON document shape: one map of tag → lines per category.
#[derive(Debug, Deserialize)]
#[serde(rename = "BattleText")]
struct RonPool {
    #[serde(default)]
    battle_won: Option<String>,
    #[serde(default)]
    exclamation: Option<String>,
    #[serde(default)]
    attack: HashMap<String, Vec<String>>,
    #[serde(default)]
    hit: HashMap<String, Vec<String>>,
    #[serde(default)]
    shield: HashMap<String, Vec<String>>,
    #[serde(default)]
    color: HashMap<String, Vec<String>>,
    #[serde(default)]
    hittype: HashMap<String, Vec<String>>,
}

impl TemplatePool {
    /// The English battle text shipped with the crate, validated.
    pub fn builtin() -> Result<TemplatePool, TemplateError> {
        let pool = Self::parse_ron(BUILTIN_POOL)?;
        pool.validate()?;
        Ok(pool)
    }

    /// Load a pool from a RON file. The result is not validated, so that
    /// partial pools can be merged over a base.
    pub fn load_from_ron(path: &Path) -> Result<TemplatePool, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<TemplatePool, TemplateError> {
        // Optional fields such as `battle_won` are written as bare strings.
        let raw: RonPool = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(input)?;
        let mut pool = TemplatePool::default();

        let categories = [
            (TemplateCategory::Attack, raw.attack),
            (TemplateCategory::Hit, raw.hit),
            (TemplateCategory::Shield, raw.shield),
            (TemplateCategory::Color, raw.color),
            (TemplateCategory::HitType, raw.hittype),
        ];
        for (category, tags) in categories {
            for (tag, lines) in tags {
                for line in lines {
                    pool.insert(category, &tag, Template::parse(&line)?);
                }
            }
        }

        if let Some(text) = raw.battle_won {
            pool.battle_won = Some(Template::parse(&text)?);
        }
        pool.exclamation = raw.exclamation;

        tracing::debug!(templates = pool.len(), "parsed template pool");
        Ok(pool)
    }

    /// Build a pool from the flat localisation table used by the web client,
    /// where keys look like `text_battle_<category>_<tag>_<n>` and the
    /// victory line is `text_battle_battle_won`.
    ///
    /// Entries are bucketed in iteration order; keys outside the battle
    /// categories are ignored.
    pub fn from_flat_entries<'a, I>(entries: I) -> Result<TemplatePool, TemplateError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pool = TemplatePool::default();

        for (key, text) in entries {
            let Some(rest) = key.strip_prefix(FLAT_KEY_PREFIX) else {
                continue;
            };
            let mut parts = rest.split('_');
            let (Some(kind), Some(tag)) = (parts.next(), parts.next()) else {
                continue;
            };

            if kind == "battle" && tag == "won" {
                pool.battle_won = Some(Template::parse(text)?);
            } else if let Some(category) = TemplateCategory::from_name(kind) {
                pool.insert(category, tag, Template::parse(text)?);
            } else {
                tracing::trace!(key, "skipping non-battle text entry");
            }
        }

        Ok(pool)
    }

    /// Append a template to the `category.tag` bucket.
    pub fn insert(&mut self, category: TemplateCategory, tag: &str, template: Template) {
        self.buckets
            .entry(category)
            .or_default()
            .entry(tag.to_string())
            .or_default()
            .push(template);
    }

    /// Merge another pool into this one. Buckets in `other` replace buckets
    /// with the same category and tag; the victory line and exclamation
    /// are replaced only when `other` defines them.
    pub fn merge(&mut self, other: TemplatePool) {
        for (category, tags) in other.buckets {
            let bucket = self.buckets.entry(category).or_default();
            for (tag, templates) in tags {
                bucket.insert(tag, templates);
            }
        }
        if other.battle_won.is_some() {
            self.battle_won = other.battle_won;
        }
        if other.exclamation.is_some() {
            self.exclamation = other.exclamation;
        }
    }

    /// Check that every fallback bucket exists and is non-empty.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for (category, tag) in REQUIRED_BUCKETS {
            if self.bucket(category, tag).is_none() {
                return Err(TemplateError::EmptyTemplateCategory { category, tag });
            }
        }
        Ok(())
    }

    /// Templates for `category.tag`, or `None` if the bucket is absent or empty.
    pub fn bucket(&self, category: TemplateCategory, tag: &str) -> Option<&[Template]> {
        self.buckets
            .get(&category)
            .and_then(|tags| tags.get(tag))
            .map(Vec::as_slice)
            .filter(|templates| !templates.is_empty())
    }

    /// Tags with a bucket in `category`, sorted.
    pub fn tags(&self, category: TemplateCategory) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .buckets
            .get(&category)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default();
        tags.sort_unstable();
        tags
    }

    pub fn battle_won(&self) -> &Template {
        match &self.battle_won {
            Some(template) => template,
            None => default_battle_won(),
        }
    }

    /// Suffix appended to color commentary lines.
    pub fn exclamation(&self) -> &str {
        self.exclamation.as_deref().unwrap_or(DEFAULT_EXCLAMATION)
    }

    /// Total number of templates across all buckets.
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|tags| tags.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
