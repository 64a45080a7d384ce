//! Knowledge discovery: short topic cards and their expanded explanations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::fallback::{CURATED_CARDS, GENERIC_DETAIL_SECTIONS};
use crate::generation::prompts::{DISCOVERY_CARDS_TEMPLATE, DISCOVERY_DETAILS_TEMPLATE};
use crate::generation::{generate_or_fallback, non_blank, GenerationError, Generated};
use crate::llm_client::prompts::ACCURACY_INSTRUCTION;
use crate::llm_client::LlmBackend;

pub const DEFAULT_CARD_COUNT: usize = 6;
pub const MAX_CARD_COUNT: usize = 12;
const DEFAULT_READ_TIME_MINUTES: u32 = 3;
const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryCard {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub difficulty: String,
    pub read_time_minutes: u32,
    pub tags: Vec<String>,
    pub fun_fact: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailSection {
    pub heading: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryDetails {
    pub title: String,
    pub category: String,
    pub overview: String,
    pub sections: Vec<DetailSection>,
    pub key_points: Vec<String>,
    pub related_topics: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CardParams {
    pub category: String,
    pub count: usize,
}

impl CardParams {
    pub fn new(category: Option<String>, count: Option<usize>) -> Self {
        Self {
            category: non_blank(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            count: count.unwrap_or(DEFAULT_CARD_COUNT).clamp(1, MAX_CARD_COUNT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetailParams {
    pub title: String,
    pub category: String,
    pub summary: Option<String>,
}

impl DetailParams {
    pub fn new(title: String, category: Option<String>, summary: Option<String>) -> Self {
        Self {
            title: title.trim().to_string(),
            category: non_blank(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            summary: non_blank(summary),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCards {
    #[serde(default)]
    cards: Vec<RawCard>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    id: Option<Value>,
    title: Option<String>,
    summary: Option<String>,
    category: Option<String>,
    difficulty: Option<String>,
    read_time_minutes: Option<Value>,
    #[serde(default)]
    tags: Vec<String>,
    fun_fact: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    title: Option<String>,
    overview: Option<String>,
    #[serde(default)]
    sections: Vec<RawSection>,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    related_topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    heading: Option<String>,
    content: Option<String>,
}

pub async fn generate_cards(llm: &dyn LlmBackend, params: &CardParams) -> Generated<Vec<DiscoveryCard>> {
    let prompt = DISCOVERY_CARDS_TEMPLATE
        .replace("{accuracy_instruction}", ACCURACY_INSTRUCTION)
        .replace("{count}", &params.count.to_string())
        .replace("{category}", &params.category);
    generate_or_fallback(
        llm,
        "discovery_cards",
        &prompt,
        |raw: RawCards| finish_cards(params, raw),
        || fallback_cards(params),
    )
    .await
}

pub async fn generate_details(llm: &dyn LlmBackend, params: &DetailParams) -> Generated<DiscoveryDetails> {
    let summary = params
        .summary
        .as_deref()
        .unwrap_or("(no summary provided)");
    let prompt = DISCOVERY_DETAILS_TEMPLATE
        .replace("{accuracy_instruction}", ACCURACY_INSTRUCTION)
        .replace("{title}", &params.title)
        .replace("{category}", &params.category)
        .replace("{summary}", summary);
    generate_or_fallback(
        llm,
        "discovery_details",
        &prompt,
        |raw: RawDetails| finish_details(params, raw),
        || fallback_details(params),
    )
    .await
}

fn finish_cards(params: &CardParams, raw: RawCards) -> Result<Vec<DiscoveryCard>, GenerationError> {
    let now = Utc::now();
    let cards: Vec<DiscoveryCard> = raw
        .cards
        .into_iter()
        .filter(|card| has_text(&card.title) && has_text(&card.summary))
        .take(params.count)
        .enumerate()
        .map(|(i, card)| finish_card(card, i, params, now))
        .collect();

    if cards.is_empty() {
        return Err(GenerationError::Empty("cards"));
    }
    Ok(cards)
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn finish_card(card: RawCard, index: usize, params: &CardParams, now: DateTime<Utc>) -> DiscoveryCard {
    DiscoveryCard {
        id: card
            .id
            .as_ref()
            .and_then(card_id)
            .unwrap_or_else(|| format!("card-{}", index + 1)),
        title: non_blank(card.title).unwrap_or_default(),
        summary: non_blank(card.summary).unwrap_or_default(),
        category: non_blank(card.category).unwrap_or_else(|| params.category.clone()),
        difficulty: non_blank(card.difficulty)
            .map(|d| d.to_lowercase())
            .unwrap_or_else(|| "beginner".to_string()),
        read_time_minutes: card
            .read_time_minutes
            .as_ref()
            .and_then(read_minutes)
            .unwrap_or(DEFAULT_READ_TIME_MINUTES),
        tags: clean_list(card.tags),
        fun_fact: non_blank(card.fun_fact),
        created_at: now,
    }
}

fn card_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(format!("card-{n}")),
        _ => None,
    }
}

fn read_minutes(value: &Value) -> Option<u32> {
    let minutes = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.split_whitespace().next()?.parse().ok(),
        _ => None,
    }?;
    u32::try_from(minutes).ok().filter(|m| *m > 0)
}

fn finish_details(params: &DetailParams, raw: RawDetails) -> Result<DiscoveryDetails, GenerationError> {
    let sections: Vec<DetailSection> = raw
        .sections
        .into_iter()
        .filter_map(|s| {
            Some(DetailSection {
                heading: non_blank(s.heading)?,
                content: non_blank(s.content)?,
            })
        })
        .collect();
    if sections.is_empty() {
        return Err(GenerationError::Empty("sections"));
    }

    let overview = non_blank(raw.overview).unwrap_or_else(|| sections[0].content.clone());
    Ok(DiscoveryDetails {
        title: non_blank(raw.title).unwrap_or_else(|| params.title.clone()),
        category: params.category.clone(),
        overview,
        sections,
        key_points: clean_list(raw.key_points),
        related_topics: clean_list(raw.related_topics),
        generated_at: Utc::now(),
    })
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Curated cards in the requested category, or all of them when none match.
pub fn fallback_cards(params: &CardParams) -> Vec<DiscoveryCard> {
    let now = Utc::now();
    let wanted = params.category.to_lowercase();
    let matching: Vec<_> = CURATED_CARDS
        .iter()
        .filter(|card| card.2 == wanted)
        .collect();
    let pool: Vec<_> = if matching.is_empty() {
        CURATED_CARDS.iter().collect()
    } else {
        matching
    };

    pool.into_iter()
        .take(params.count)
        .enumerate()
        .map(
            |(i, (title, summary, category, difficulty, minutes, tags, fun_fact))| DiscoveryCard {
                id: format!("curated-{}", i + 1),
                title: title.to_string(),
                summary: summary.to_string(),
                category: category.to_string(),
                difficulty: difficulty.to_string(),
                read_time_minutes: *minutes,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                fun_fact: Some(fun_fact.to_string()),
                created_at: now,
            },
        )
        .collect()
}

pub fn fallback_details(params: &DetailParams) -> DiscoveryDetails {
    let sections: Vec<DetailSection> = GENERIC_DETAIL_SECTIONS
        .iter()
        .map(|(heading, content)| DetailSection {
            heading: heading.to_string(),
            content: content.replace("{title}", &params.title),
        })
        .collect();
    DiscoveryDetails {
        title: params.title.clone(),
        category: params.category.clone(),
        overview: params
            .summary
            .clone()
            .unwrap_or_else(|| sections[0].content.clone()),
        sections,
        key_points: vec![
            format!("Identify the core problem {} solves", params.title),
            "Work a small example by hand".to_string(),
            "Connect the theory to a system you use every day".to_string(),
        ],
        related_topics: Vec::new(),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedLlm;

    #[tokio::test]
    async fn cards_are_backfilled() {
        let reply = r#"{"cards": [
            {"title": "Fourier Transforms", "summary": "Every signal is a sum of sines.", "read_time_minutes": "5 min", "tags": [" signals ", ""]},
            {"title": "", "summary": "dropped"},
            {"id": 9, "title": "Op-Amps", "summary": "The analog workhorse.", "difficulty": "Advanced", "category": "electronics"}
        ]}"#;
        let llm = ScriptedLlm::replying(reply);
        let params = CardParams::new(Some("science".into()), Some(4));
        let out = generate_cards(&llm, &params).await;

        assert!(!out.fallback);
        let cards = out.payload;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "card-1");
        assert_eq!(cards[0].category, "science");
        assert_eq!(cards[0].read_time_minutes, 5);
        assert_eq!(cards[0].difficulty, "beginner");
        assert_eq!(cards[0].tags, vec!["signals"]);
        assert_eq!(cards[1].id, "card-9");
        assert_eq!(cards[1].difficulty, "advanced");
        assert_eq!(cards[1].read_time_minutes, DEFAULT_READ_TIME_MINUTES);
    }

    #[tokio::test]
    async fn failing_llm_serves_curated_cards_for_category() {
        let llm = ScriptedLlm::failing();
        let params = CardParams::new(Some("Science".into()), None);
        let out = generate_cards(&llm, &params).await;
        assert!(out.fallback);
        assert!(!out.payload.is_empty());
        assert!(out.payload.iter().all(|c| c.category == "science"));
    }

    #[test]
    fn unknown_category_falls_back_to_all_curated_cards() {
        let params = CardParams::new(Some("medieval poetry".into()), Some(50));
        let cards = fallback_cards(&params);
        assert_eq!(cards.len(), CURATED_CARDS.len().min(MAX_CARD_COUNT));
    }

    #[tokio::test]
    async fn details_need_at_least_one_complete_section() {
        let llm = ScriptedLlm::replying(r#"{"sections": [{"heading": "Only heading"}]}"#);
        let params = DetailParams::new("Kalman Filters".into(), None, None);
        let out = generate_details(&llm, &params).await;
        assert!(out.fallback);
        assert_eq!(out.payload.sections.len(), GENERIC_DETAIL_SECTIONS.len());
        assert!(out.payload.sections[0].content.contains("Kalman Filters"));
    }

    #[tokio::test]
    async fn details_overview_defaults_to_first_section() {
        let reply = r#"{"sections": [{"heading": "Idea", "content": "Blend prediction with measurement."}], "key_points": ["", "Weighted average"]}"#;
        let llm = ScriptedLlm::replying(reply);
        let params = DetailParams::new("Kalman Filters".into(), Some("control".into()), None);
        let out = generate_details(&llm, &params).await;
        assert!(!out.fallback);
        assert_eq!(out.payload.title, "Kalman Filters");
        assert_eq!(out.payload.overview, "Blend prediction with measurement.");
        assert_eq!(out.payload.key_points, vec!["Weighted average"]);
    }
}
