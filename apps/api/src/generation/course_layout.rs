//! Course outline generation (chapters → topics).

use serde::{Deserialize, Serialize};

use crate::generation::prompts::COURSE_LAYOUT_TEMPLATE;
use crate::generation::{generate_or_fallback, non_blank, GenerationError, Generated};
use crate::llm_client::prompts::ACCURACY_INSTRUCTION;
use crate::llm_client::LlmBackend;

pub const DEFAULT_CHAPTER_COUNT: usize = 5;
pub const MAX_CHAPTER_COUNT: usize = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub chapter_name: String,
    pub about: String,
    pub duration: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseLayout {
    pub course_name: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub include_video: bool,
    pub banner_image_prompt: Option<String>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub name: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub no_of_chapters: usize,
    pub include_video: bool,
}

impl LayoutParams {
    pub fn new(
        name: String,
        description: Option<String>,
        category: Option<String>,
        level: Option<String>,
        no_of_chapters: Option<usize>,
        include_video: Option<bool>,
    ) -> Self {
        let name = name.trim().to_string();
        Self {
            description: non_blank(description).unwrap_or_else(|| format!("An introduction to {name}.")),
            category: non_blank(category).unwrap_or_else(|| "general".to_string()),
            level: non_blank(level)
                .map(|l| l.to_lowercase())
                .unwrap_or_else(|| "beginner".to_string()),
            no_of_chapters: no_of_chapters
                .unwrap_or(DEFAULT_CHAPTER_COUNT)
                .clamp(1, MAX_CHAPTER_COUNT),
            include_video: include_video.unwrap_or(false),
            name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    course_name: Option<String>,
    description: Option<String>,
    banner_image_prompt: Option<String>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    chapter_name: Option<String>,
    about: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

pub async fn generate_layout(llm: &dyn LlmBackend, params: &LayoutParams) -> Generated<CourseLayout> {
    let prompt = COURSE_LAYOUT_TEMPLATE
        .replace("{accuracy_instruction}", ACCURACY_INSTRUCTION)
        .replace("{name}", &params.name)
        .replace("{description}", &params.description)
        .replace("{category}", &params.category)
        .replace("{level}", &params.level)
        .replace("{no_of_chapters}", &params.no_of_chapters.to_string())
        .replace("{include_video}", if params.include_video { "yes" } else { "no" });
    generate_or_fallback(
        llm,
        "course_layout",
        &prompt,
        |raw: RawLayout| finish_layout(params, raw),
        || fallback_layout(params),
    )
    .await
}

fn finish_layout(params: &LayoutParams, raw: RawLayout) -> Result<CourseLayout, GenerationError> {
    let chapters: Vec<Chapter> = raw
        .chapters
        .into_iter()
        .filter_map(|c| {
            let chapter_name = non_blank(c.chapter_name)?;
            let topics: Vec<String> = c
                .topics
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if topics.is_empty() {
                return None;
            }
            Some(Chapter {
                about: non_blank(c.about).unwrap_or_default(),
                duration: non_blank(c.duration).unwrap_or_else(|| "30 minutes".to_string()),
                chapter_name,
                topics,
            })
        })
        .take(params.no_of_chapters)
        .collect();

    if chapters.is_empty() {
        return Err(GenerationError::Empty("chapters"));
    }

    Ok(CourseLayout {
        course_name: non_blank(raw.course_name).unwrap_or_else(|| params.name.clone()),
        description: non_blank(raw.description).unwrap_or_else(|| params.description.clone()),
        category: params.category.clone(),
        level: params.level.clone(),
        include_video: params.include_video,
        banner_image_prompt: non_blank(raw.banner_image_prompt),
        chapters,
    })
}

/// A generic outline: introduction, core chapters, and a closing project.
pub fn fallback_layout(params: &LayoutParams) -> CourseLayout {
    let n = params.no_of_chapters;
    let name = &params.name;
    let chapters = (1..=n)
        .map(|i| {
            let (chapter_name, topics) = if i == 1 {
                (
                    format!("Introduction to {name}"),
                    vec![
                        format!("What is {name}?"),
                        "Why it matters".to_string(),
                        "Course roadmap".to_string(),
                    ],
                )
            } else if i == n {
                (
                    format!("{name} in Practice"),
                    vec![
                        "Capstone project".to_string(),
                        "Common pitfalls".to_string(),
                        "Where to go next".to_string(),
                    ],
                )
            } else {
                (
                    format!("{name}: Core Concepts {}", i - 1),
                    vec![
                        "Key definitions".to_string(),
                        "Worked examples".to_string(),
                        "Practice exercises".to_string(),
                    ],
                )
            };
            Chapter {
                chapter_name,
                about: String::new(),
                duration: "30 minutes".to_string(),
                topics,
            }
        })
        .collect();

    CourseLayout {
        course_name: name.clone(),
        description: params.description.clone(),
        category: params.category.clone(),
        level: params.level.clone(),
        include_video: params.include_video,
        banner_image_prompt: None,
        chapters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedLlm;

    fn params(chapters: usize) -> LayoutParams {
        LayoutParams::new("Digital Logic".into(), None, Some("electronics".into()), Some("Intermediate".into()), Some(chapters), None)
    }

    #[test]
    fn params_get_defaults() {
        let p = LayoutParams::new("  Signals  ".into(), Some(" ".into()), None, None, Some(99), Some(true));
        assert_eq!(p.name, "Signals");
        assert_eq!(p.description, "An introduction to Signals.");
        assert_eq!(p.level, "beginner");
        assert_eq!(p.no_of_chapters, MAX_CHAPTER_COUNT);
        assert!(p.include_video);
    }

    #[tokio::test]
    async fn chapters_without_topics_are_dropped() {
        let reply = r#"{"chapters": [
            {"chapter_name": "Boolean Algebra", "topics": ["Laws", "Minimisation"]},
            {"chapter_name": "Empty", "topics": []},
            {"chapter_name": "Flip-Flops", "duration": "1 hour", "topics": ["SR", "JK", "D"]}
        ]}"#;
        let llm = ScriptedLlm::replying(reply);
        let out = generate_layout(&llm, &params(4)).await;
        assert!(!out.fallback);
        let layout = out.payload;
        assert_eq!(layout.course_name, "Digital Logic");
        assert_eq!(layout.level, "intermediate");
        assert_eq!(layout.chapters.len(), 2);
        assert_eq!(layout.chapters[0].duration, "30 minutes");
        assert_eq!(layout.chapters[1].duration, "1 hour");
    }

    #[tokio::test]
    async fn failure_yields_requested_number_of_chapters() {
        let llm = ScriptedLlm::failing();
        let out = generate_layout(&llm, &params(4)).await;
        assert!(out.fallback);
        let names: Vec<_> = out.payload.chapters.iter().map(|c| c.chapter_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Introduction to Digital Logic",
                "Digital Logic: Core Concepts 1",
                "Digital Logic: Core Concepts 2",
                "Digital Logic in Practice"
            ]
        );
    }

    #[test]
    fn single_chapter_fallback_is_an_introduction() {
        let layout = fallback_layout(&params(1));
        assert_eq!(layout.chapters.len(), 1);
        assert_eq!(layout.chapters[0].chapter_name, "Introduction to Digital Logic");
    }
}
