//! Shared typed models used across the scoring models and batch utilities.
//!
//! Input records are produced by the external data collectors and are never
//! mutated here. Result records are derived once per item and returned by
//! value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cost-per-click assumed when the collector did not report one.
pub const DEFAULT_CPC: f64 = 1.0;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Search intent category of a keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIntent {
    Transactional,
    Commercial,
    Informational,
    Navigational,
    #[default]
    #[serde(other)]
    Unknown,
}

impl SearchIntent {
    /// Lenient parse; anything unrecognised becomes `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "transactional" => SearchIntent::Transactional,
            "commercial" => SearchIntent::Commercial,
            "informational" => SearchIntent::Informational,
            "navigational" => SearchIntent::Navigational,
            _ => SearchIntent::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIntent::Transactional => "transactional",
            SearchIntent::Commercial => "commercial",
            SearchIntent::Informational => "informational",
            SearchIntent::Navigational => "navigational",
            SearchIntent::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    VeryEasy,
    Easy,
    Moderate,
    Hard,
    VeryHard,
}

impl DifficultyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::VeryEasy => "very_easy",
            DifficultyTier::Easy => "easy",
            DifficultyTier::Moderate => "moderate",
            DifficultyTier::Hard => "hard",
            DifficultyTier::VeryHard => "very_hard",
        }
    }
}

/// How the site's authority compares to the pages already ranking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitiveGap {
    Advantage,
    Neutral,
    Disadvantage,
}

impl CompetitiveGap {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitiveGap::Advantage => "advantage",
            CompetitiveGap::Neutral => "neutral",
            CompetitiveGap::Disadvantage => "disadvantage",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    QuickWin,
    Strategic,
    LongTerm,
    Maintain,
    LowPriority,
}

impl OpportunityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityType::QuickWin => "quick_win",
            OpportunityType::Strategic => "strategic",
            OpportunityType::LongTerm => "long_term",
            OpportunityType::Maintain => "maintain",
            OpportunityType::LowPriority => "low_priority",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecaySeverity {
    None,
    Light,
    Moderate,
    Severe,
    Critical,
}

impl DecaySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecaySeverity::None => "none",
            DecaySeverity::Light => "light",
            DecaySeverity::Moderate => "moderate",
            DecaySeverity::Severe => "severe",
            DecaySeverity::Critical => "critical",
        }
    }
}

/// Keep / Update / Consolidate / Kill recommendation for a decaying page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    Keep,
    Update,
    Consolidate,
    Kill,
}

impl ContentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentAction::Keep => "keep",
            ContentAction::Update => "update",
            ContentAction::Consolidate => "consolidate",
            ContentAction::Kill => "kill",
        }
    }
}

// ---------------------------------------------------------------------------
// Keyword / domain inputs
// ---------------------------------------------------------------------------

/// Raw metrics for a single keyword as delivered by the collector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub keyword: String,
    #[serde(default)]
    pub search_volume: u64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub intent: SearchIntent,
    #[serde(default)]
    pub cpc: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl KeywordMetrics {
    pub fn new(keyword: impl Into<String>, search_volume: u64, difficulty: f64) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume,
            difficulty,
            position: None,
            intent: SearchIntent::Unknown,
            cpc: None,
            category: None,
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_intent(mut self, intent: SearchIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_cpc(mut self, cpc: f64) -> Self {
        self.cpc = Some(cpc);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Current position, treating 0 as "not ranking".
    pub fn ranking_position(&self) -> Option<u32> {
        self.position.filter(|p| *p > 0)
    }

    pub fn cpc_or_default(&self) -> f64 {
        match self.cpc {
            Some(cpc) if cpc.is_finite() && cpc >= 0.0 => cpc,
            _ => DEFAULT_CPC,
        }
    }
}

/// A topical category the domain already ranks for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicalCategory {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub keyword_count: u64,
}

impl TopicalCategory {
    pub fn new(name: impl Into<String>, keyword_count: u64) -> Self {
        Self {
            name: name.into(),
            code: None,
            keyword_count,
        }
    }
}

/// Site-level authority context, fixed for one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub domain: String,
    #[serde(default)]
    pub domain_rank: i64,
    #[serde(default)]
    pub organic_traffic: u64,
    #[serde(default)]
    pub organic_keywords: u64,
    #[serde(default)]
    pub categories: Vec<TopicalCategory>,
}

impl DomainProfile {
    pub fn new(domain: impl Into<String>, domain_rank: i64) -> Self {
        Self {
            domain: domain.into(),
            domain_rank,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: TopicalCategory) -> Self {
        self.categories.push(category);
        self
    }
}

/// Aggregate signals about the current top-10 results for a keyword.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerpContext {
    #[serde(default)]
    pub avg_domain_rank: Option<f64>,
    #[serde(default)]
    pub avg_backlinks: Option<f64>,
    #[serde(default)]
    pub has_news_results: bool,
    #[serde(default)]
    pub avg_content_age_days: Option<f64>,
}

// ---------------------------------------------------------------------------
// Difficulty / opportunity results
// ---------------------------------------------------------------------------

/// Decomposition of the authority advantage; each term is bounded on its own.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorityAdvantage {
    pub rank_advantage: f64,
    pub topical_bonus: f64,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAnalysis {
    pub keyword: String,
    pub base_difficulty: f64,
    pub personalized_difficulty: u32,
    pub avg_serp_rank: f64,
    pub serp_rank_estimated: bool,
    pub rank_gap: f64,
    pub authority_advantage: AuthorityAdvantage,
    pub matched_category: Option<String>,
    pub tier: DifficultyTier,
    pub months_to_rank: u32,
    pub competitive_gap: CompetitiveGap,
}

impl DifficultyAnalysis {
    /// Points of difficulty removed (negative when the site is weaker than the SERP).
    pub fn reduction(&self) -> f64 {
        self.base_difficulty - f64::from(self.personalized_difficulty)
    }
}

/// The five 0–100 opportunity components.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub volume: f64,
    pub difficulty: f64,
    pub intent: f64,
    pub position_gap: f64,
    pub topical: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessEstimate {
    pub traffic_gain: f64,
    pub monthly_value: f64,
    pub months_to_rank: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpportunityAnalysis {
    pub keyword: String,
    pub search_volume: u64,
    pub current_position: Option<u32>,
    pub intent: SearchIntent,
    pub difficulty: DifficultyAnalysis,
    pub components: ComponentScores,
    pub freshness_modifier: f64,
    pub opportunity_score: u32,
    pub opportunity_type: OpportunityType,
    pub estimates: BusinessEstimate,
}

impl OpportunityAnalysis {
    /// Monthly value earned per month of effort; used for ROI ordering.
    pub fn roi(&self) -> f64 {
        self.estimates.monthly_value / f64::from(self.estimates.months_to_rank.max(1))
    }
}

// ---------------------------------------------------------------------------
// Content decay inputs / results
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    pub date: NaiveDate,
    #[serde(default)]
    pub traffic: f64,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub ctr: f64,
}

/// Current performance of one URL plus its ordered history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentPerformance {
    pub url: String,
    #[serde(default)]
    pub current_traffic: f64,
    #[serde(default)]
    pub current_position: Option<f64>,
    #[serde(default)]
    pub current_ctr: f64,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
    #[serde(default)]
    pub history: Vec<HistoricalSnapshot>,
}

impl ContentPerformance {
    pub fn new(url: impl Into<String>, current_traffic: f64) -> Self {
        Self {
            url: url.into(),
            current_traffic,
            current_position: None,
            current_ctr: 0.0,
            last_updated: None,
            history: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayComponents {
    pub traffic: f64,
    pub position: f64,
    pub ctr: f64,
    pub age: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayAnalysis {
    pub url: String,
    pub current_traffic: f64,
    pub peak_traffic: f64,
    pub current_position: Option<f64>,
    pub peak_position: Option<f64>,
    pub months_since_update: f64,
    pub components: DecayComponents,
    pub decay_score: f64,
    pub severity: DecaySeverity,
    pub action: ContentAction,
    pub lost_traffic: f64,
    pub recovery_rate: f64,
    pub recoverable_traffic: f64,
}
