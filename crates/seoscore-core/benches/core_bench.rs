//! Criterion benchmarks for seoscore-core.
//!
//! Everything here runs against the pure-Rust API, so no Python runtime is
//! needed (the `python` feature stays off).
//!
//! ## Benchmark groups
//!
//! 1. **curves** -- Volume normalization, CTR lookup, tier classification.
//! 2. **single_item** -- One keyword through difficulty and opportunity, one
//!    page through decay.
//! 3. **batch** -- Rayon-backed batch scoring at several input sizes.
//! 4. **quality_gates** -- The default enforcer over a realistic report.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/seoscore-core/Cargo.toml
//! # Run only the batch group:
//! cargo bench --manifest-path crates/seoscore-core/Cargo.toml -- batch
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use _seoscore_core::config::ScoringConfig;
use _seoscore_core::models::{
    ContentPerformance, DomainProfile, HistoricalSnapshot, KeywordMetrics, SearchIntent,
    SerpContext, TopicalCategory,
};
use _seoscore_core::quality::QualityGateEnforcer;
use _seoscore_core::scoring::curves::{
    classify_decay, classify_difficulty, get_ctr_for_position, normalize_volume, VolumeMethod,
};
use _seoscore_core::scoring::decay::{calculate_batch_decay, calculate_decay_score};
use _seoscore_core::scoring::difficulty::calculate_personalized_difficulty;
use _seoscore_core::scoring::opportunity::{
    calculate_batch_opportunities, calculate_opportunity_score,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const INTENTS: [SearchIntent; 4] = [
    SearchIntent::Transactional,
    SearchIntent::Commercial,
    SearchIntent::Informational,
    SearchIntent::Navigational,
];

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn sample_domain() -> DomainProfile {
    DomainProfile::new("example.com", 55)
        .with_category(TopicalCategory::new("Project Management Software", 420))
        .with_category(TopicalCategory::new("Team Collaboration", 180))
}

fn synthetic_keywords(count: usize) -> Vec<KeywordMetrics> {
    (0..count)
        .map(|i| {
            let mut kw = KeywordMetrics::new(
                format!("keyword {i}"),
                ((i * 7919) % 50_000) as u64 + 10,
                ((i * 37) % 100) as f64,
            )
            .with_intent(INTENTS[i % INTENTS.len()])
            .with_cpc(0.5 + (i % 20) as f64 * 0.25);
            if i % 3 != 0 {
                kw = kw.with_position((i % 60) as u32 + 1);
            }
            if i % 4 == 0 {
                kw = kw.with_category("Project Management");
            }
            kw
        })
        .collect()
}

fn synthetic_pages(count: usize) -> Vec<ContentPerformance> {
    (0..count)
        .map(|i| {
            let peak = 200.0 + (i % 50) as f64 * 40.0;
            let mut page = ContentPerformance::new(
                format!("https://example.com/blog/post-{i}"),
                peak * (0.1 + (i % 9) as f64 * 0.1),
            );
            page.current_position = Some(3.0 + (i % 25) as f64);
            page.current_ctr = 0.02 + (i % 5) as f64 * 0.01;
            page.last_updated = NaiveDate::from_ymd_opt(2021 + (i % 3) as i32, 1 + (i % 12) as u32, 15);
            page.history = (0..12)
                .map(|m| HistoricalSnapshot {
                    date: NaiveDate::from_ymd_opt(2023, m + 1, 1).unwrap(),
                    traffic: peak * (1.0 - m as f64 * 0.05),
                    position: Some(2.0 + m as f64 * 0.5),
                    ctr: 0.08 - m as f64 * 0.004,
                })
                .collect();
            page
        })
        .collect()
}

fn sample_report() -> Value {
    let findings: Vec<Value> = (0..12)
        .map(|i| {
            json!({
                "id": format!("f{i}"),
                "title": format!("Finding {i}"),
                "evidence": "Search console export",
                "metrics": {"clicks": 1200 - i * 50},
            })
        })
        .collect();
    let priorities = ["critical", "high", "medium", "low"];
    let recommendations: Vec<Value> = (0..10)
        .map(|i| {
            json!({
                "title": format!("Recommendation {i}"),
                "action": format!("Optimize landing page cluster {i}"),
                "priority": priorities[i % priorities.len()],
                "expected_impact": format!("+{}% clicks", 5 + i),
                "related_findings": [format!("f{i}")],
            })
        })
        .collect();
    json!({
        "executive_summary": {"overview": "Steady growth.", "total_findings": 12, "total_recommendations": 10},
        "domain_classification": {"industry": "saas", "business_model": "b2b"},
        "findings": findings,
        "recommendations": recommendations,
        "keyword_analysis": {"tracked": 1800},
        "competitor_analysis": {"competitors": ["rival.com", "other.io"]},
        "ai_visibility": {
            "platforms_checked": ["chatgpt", "perplexity"],
            "brand_mentions": 14,
            "citation_rate": 0.12,
            "competitor_comparison": {"rival.com": 0.2},
            "recommendations": ["Publish comparison pages"],
        },
        "technical_audit": {
            "core_web_vitals": {"lcp": 2.4}, "crawlability": "ok", "indexation": "96%",
            "schema_markup": "partial", "mobile_usability": "ok", "site_speed": "fair",
        },
    })
}

// ---------------------------------------------------------------------------
// 1. Curves
// ---------------------------------------------------------------------------

fn bench_curves(c: &mut Criterion) {
    let mut group = c.benchmark_group("curves");

    group.bench_function("normalize_volume_log", |b| {
        b.iter(|| normalize_volume(black_box(12_500.0), black_box(90_000.0), VolumeMethod::Logarithmic))
    });
    group.bench_function("normalize_volume_sqrt", |b| {
        b.iter(|| normalize_volume(black_box(12_500.0), black_box(90_000.0), VolumeMethod::SquareRoot))
    });
    group.bench_function("ctr_for_position", |b| {
        b.iter(|| {
            (1..=30u32)
                .map(|p| get_ctr_for_position(black_box(Some(p))))
                .sum::<f64>()
        })
    });
    group.bench_function("classify", |b| {
        b.iter(|| {
            (
                classify_difficulty(black_box(47.0)),
                classify_decay(black_box(0.42)),
            )
        })
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Single-item models
// ---------------------------------------------------------------------------

fn bench_single_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_item");
    let domain = sample_domain();
    let config = ScoringConfig::default();
    let keyword = KeywordMetrics::new("project management software", 18_000, 62.0)
        .with_position(14)
        .with_intent(SearchIntent::Commercial)
        .with_category("Project Management");
    let serp = SerpContext {
        avg_domain_rank: Some(64.0),
        avg_content_age_days: Some(420.0),
        ..Default::default()
    };
    let page = synthetic_pages(1).remove(0);

    group.bench_function("difficulty", |b| {
        b.iter(|| calculate_personalized_difficulty(black_box(&keyword), &domain, Some(&serp)))
    });
    group.bench_function("opportunity", |b| {
        b.iter(|| {
            calculate_opportunity_score(black_box(&keyword), &domain, 90_000, Some(&serp), &config)
        })
    });
    group.bench_function("decay", |b| {
        b.iter(|| calculate_decay_score(black_box(&page), as_of(), &config))
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 3. Batch scoring
// ---------------------------------------------------------------------------

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let domain = sample_domain();
    let config = ScoringConfig::default();
    let no_serp: HashMap<String, SerpContext> = HashMap::new();

    for size in &[100usize, 1_000, 10_000] {
        let keywords = synthetic_keywords(*size);
        group.bench_with_input(BenchmarkId::new("opportunities", size), size, |b, _| {
            b.iter(|| calculate_batch_opportunities(black_box(&keywords), &domain, &no_serp, &config))
        });

        let pages = synthetic_pages(*size);
        group.bench_with_input(BenchmarkId::new("decay", size), size, |b, _| {
            b.iter(|| calculate_batch_decay(black_box(&pages), as_of(), &config))
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 4. Quality gates
// ---------------------------------------------------------------------------

fn bench_quality_gates(c: &mut Criterion) {
    let mut group = c.benchmark_group("quality_gates");
    let enforcer = QualityGateEnforcer::with_defaults().unwrap();
    let report = sample_report();

    group.bench_function("run_all_gates", |b| {
        b.iter(|| enforcer.run_all_gates(black_box(&report), None))
    });
    group.bench_function("run_gate_actionability", |b| {
        b.iter(|| enforcer.run_gate("actionability", black_box(&report), None))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_curves,
    bench_single_item,
    bench_batch,
    bench_quality_gates,
);
criterion_main!(benches);
