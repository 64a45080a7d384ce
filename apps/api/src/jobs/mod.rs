//! Job board: a fixed catalog of mock postings ranked against a candidate's skills.
//!
//! Ranking: a posting's relevance score is the number of its skills that
//! overlap with any candidate skill, case-insensitively. A posting skill
//! overlaps when it contains the candidate skill as a substring, or when the
//! candidate skill contains it as whole words ("Embedded C programming"
//! covers "C" but "react" does not). Postings are sorted by score
//! descending; ties keep catalog order.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod handlers;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: String,
    pub skills: Vec<String>,
    pub description: String,
    pub posted_at: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub posting: JobPosting,
    /// Absent when no candidate skills were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_skills: Option<Vec<String>>,
}

/// Ranks `catalog` against `skills`. Blank skills are ignored; with none left
/// the catalog comes back unscored in its original order.
pub fn rank_jobs(catalog: &[JobPosting], skills: &[String]) -> Vec<RankedJob> {
    let wanted: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if wanted.is_empty() {
        return catalog
            .iter()
            .cloned()
            .map(|posting| RankedJob {
                posting,
                relevance_score: None,
                matching_skills: None,
            })
            .collect();
    }

    let mut ranked: Vec<RankedJob> = catalog
        .iter()
        .cloned()
        .map(|posting| {
            let matching: Vec<String> = posting
                .skills
                .iter()
                .filter(|skill| {
                    let skill = skill.to_lowercase();
                    wanted
                        .iter()
                        .any(|w| skill.contains(w.as_str()) || contains_words(w, &skill))
                })
                .cloned()
                .collect();
            RankedJob {
                posting,
                relevance_score: Some(matching.len()),
                matching_skills: Some(matching),
            }
        })
        .collect();

    // sort_by is stable, so equal scores keep catalog order.
    ranked.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    ranked
}

fn words(s: &str) -> Vec<&str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when the words of `needle` appear as a contiguous run of words in `haystack`.
fn contains_words(haystack: &str, needle: &str) -> bool {
    let needle = words(needle);
    if needle.is_empty() {
        return false;
    }
    words(haystack)
        .windows(needle.len())
        .any(|run| run == needle.as_slice())
}

/// Simulates fetching postings from job boards, then ranks them.
pub async fn scrape_jobs(skills: &[String], delay: Duration) -> Vec<RankedJob> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let catalog = mock_catalog();
    let ranked = rank_jobs(&catalog, skills);
    tracing::info!(
        postings = ranked.len(),
        skills = skills.len(),
        "job board scraped"
    );
    ranked
}

fn posting(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    job_type: &str,
    salary: &str,
    skills: &[&str],
    description: &str,
    posted_at: &str,
) -> JobPosting {
    JobPosting {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        job_type: job_type.to_string(),
        salary: salary.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        description: description.to_string(),
        posted_at: posted_at.to_string(),
        url: format!("https://jobs.campus-lms.app/postings/{id}"),
    }
}

/// The fixed posting catalog.
pub fn mock_catalog() -> Vec<JobPosting> {
    vec![
        posting(
            "job-001",
            "Embedded Systems Intern",
            "Circuitry Labs",
            "Bengaluru",
            "internship",
            "₹25,000 / month",
            &["C", "Embedded C", "Microcontrollers", "RTOS"],
            "Write firmware for low-power sensor boards and help bring up new hardware.",
            "2026-10-01",
        ),
        posting(
            "job-002",
            "Frontend Developer",
            "Pixel Forge",
            "Remote",
            "full-time",
            "₹8–12 LPA",
            &["React", "TypeScript", "CSS", "REST APIs"],
            "Build accessible, fast interfaces for a learning platform used by millions of students.",
            "2026-10-03",
        ),
        posting(
            "job-003",
            "Full Stack Engineer",
            "Nimbus Cloud",
            "Hyderabad",
            "full-time",
            "₹12–18 LPA",
            &["React", "Node.js", "PostgreSQL", "Docker"],
            "Own features end to end across a React frontend and Node.js services.",
            "2026-10-05",
        ),
        posting(
            "job-004",
            "Structural Design Engineer",
            "Arch & Beam Consultants",
            "Pune",
            "full-time",
            "₹6–9 LPA",
            &["AutoCAD", "STAAD Pro", "Structural Analysis"],
            "Design and verify reinforced concrete and steel structures for commercial buildings.",
            "2026-09-28",
        ),
        posting(
            "job-005",
            "Backend Developer",
            "LedgerLoop",
            "Chennai",
            "full-time",
            "₹10–15 LPA",
            &["Node.js", "Express", "MongoDB", "Redis"],
            "Build payment APIs with strict latency and reliability requirements.",
            "2026-10-07",
        ),
        posting(
            "job-006",
            "Data Analyst",
            "Metricly",
            "Remote",
            "contract",
            "₹60,000 / month",
            &["Python", "SQL", "Pandas", "Tableau"],
            "Turn product usage data into dashboards and weekly insight reports.",
            "2026-10-02",
        ),
        posting(
            "job-007",
            "Power Systems Engineer",
            "GridWorks Energy",
            "Ahmedabad",
            "full-time",
            "₹7–10 LPA",
            &["MATLAB", "Power Systems", "Simulink", "PLC"],
            "Model substations and support commissioning of renewable energy projects.",
            "2026-09-30",
        ),
        posting(
            "job-008",
            "Machine Learning Intern",
            "Cortex AI",
            "Bengaluru",
            "internship",
            "₹40,000 / month",
            &["Python", "PyTorch", "Machine Learning", "Git"],
            "Train and evaluate vision models alongside the applied research team.",
            "2026-10-06",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn overlapping_postings_outrank_unrelated_ones() {
        let ranked = rank_jobs(&mock_catalog(), &skills(&["react", "node"]));

        assert_eq!(ranked[0].posting.id, "job-003");
        assert_eq!(ranked[0].relevance_score, Some(2));
        assert_eq!(
            ranked[0].matching_skills.as_deref(),
            Some(&["React".to_string(), "Node.js".to_string()][..])
        );

        let position = |id: &str| ranked.iter().position(|j| j.posting.id == id).unwrap();
        for unrelated in ["job-004", "job-006", "job-007"] {
            assert!(position("job-003") < position(unrelated));
            assert!(position("job-002") < position(unrelated));
            assert!(position("job-005") < position(unrelated));
        }
    }

    #[test]
    fn scores_are_non_increasing_and_ties_keep_catalog_order() {
        let ranked = rank_jobs(&mock_catalog(), &skills(&["python"]));
        let scores: Vec<usize> = ranked.iter().map(|j| j.relevance_score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(ranked[0].posting.id, "job-006");
        assert_eq!(ranked[1].posting.id, "job-008");
        assert_eq!(ranked[2].posting.id, "job-001");
    }

    #[test]
    fn no_skills_returns_catalog_unscored_in_order() {
        let catalog = mock_catalog();
        for input in [skills(&[]), skills(&["", "   "])] {
            let ranked = rank_jobs(&catalog, &input);
            let ids: Vec<_> = ranked.iter().map(|j| j.posting.id.clone()).collect();
            let expected: Vec<_> = catalog.iter().map(|p| p.id.clone()).collect();
            assert_eq!(ids, expected);
            assert!(ranked.iter().all(|j| j.relevance_score.is_none()));
        }
    }

    #[test]
    fn candidate_skill_containing_posting_skill_as_words_matches() {
        // "embedded c programming" holds both "C" and "Embedded C" as whole words.
        let ranked = rank_jobs(&mock_catalog(), &skills(&["Embedded C programming"]));
        assert_eq!(ranked[0].posting.id, "job-001");
        assert_eq!(ranked[0].relevance_score, Some(2));
    }

    #[test]
    fn single_letter_posting_skill_does_not_match_inside_a_word() {
        let ranked = rank_jobs(&mock_catalog(), &skills(&["react", "node"]));
        let job = |id: &str| {
            let position = ranked.iter().position(|j| j.posting.id == id).unwrap();
            (position, &ranked[position])
        };

        let (embedded_at, embedded) = job("job-001");
        let (frontend_at, frontend) = job("job-002");
        assert_eq!(embedded.relevance_score, Some(0));
        assert_eq!(embedded.matching_skills, Some(Vec::new()));
        assert_eq!(frontend.relevance_score, Some(1));
        assert!(frontend_at < embedded_at);
    }

    #[test]
    fn word_runs_must_be_contiguous() {
        assert!(contains_words("embedded c programming", "embedded c"));
        assert!(contains_words("node.js / react", "js"));
        assert!(!contains_words("embedded systems in c", "embedded c"));
        assert!(!contains_words("react", "c"));
        assert!(!contains_words("react", ""));
    }

    #[test]
    fn unscored_postings_serialize_without_derived_fields() {
        let ranked = rank_jobs(&mock_catalog(), &[]);
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert!(json.get("relevance_score").is_none());
        assert_eq!(json["id"], "job-001");
    }

    #[tokio::test(start_paused = true)]
    async fn scrape_applies_the_artificial_delay() {
        let start = tokio::time::Instant::now();
        let ranked = scrape_jobs(&skills(&["sql"]), Duration::from_millis(800)).await;
        assert!(start.elapsed() >= Duration::from_millis(800));
        assert_eq!(ranked.len(), mock_catalog().len());
    }
}
