//! Match scoring — pluggable source for the optional `matchScore` display field.
//!
//! Default: `SkillOverlapScorer` (deterministic, no LLM call).
//! With scoring disabled, `NoScorer` leaves the field absent.

use crate::models::internship::MatchRecord;

/// Carried by the pipeline as `Arc<dyn MatchScorer>`.
pub trait MatchScorer: Send + Sync {
    /// Returns 0 – 100, or `None` when there is nothing to score against.
    fn score(&self, resume: &str, record: &MatchRecord) -> Option<u8>;
}

pub struct NoScorer;

impl MatchScorer for NoScorer {
    fn score(&self, _resume: &str, _record: &MatchRecord) -> Option<u8> {
        None
    }
}

/// Share of the record's listed skills that the CV text mentions.
///
/// `skillsRequired` is split on `,` `;` `/` `|` and newlines. A skill counts when
/// it appears in the CV as a whole term (case-insensitive).
pub struct SkillOverlapScorer;

impl MatchScorer for SkillOverlapScorer {
    fn score(&self, resume: &str, record: &MatchRecord) -> Option<u8> {
        let skills = split_skills(&record.skills_required);
        if skills.is_empty() {
            return None;
        }
        let resume = resume.to_lowercase();
        let matched = skills
            .iter()
            .filter(|skill| contains_term(&resume, skill))
            .count();
        let pct = (matched as f64 / skills.len() as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }
}

fn split_skills(raw: &str) -> Vec<String> {
    let mut skills: Vec<String> = raw
        .split([',', ';', '/', '|', '\n'])
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    skills.sort();
    skills.dedup();
    skills
}

/// True when `term` occurs in `haystack` not glued to other alphanumerics.
fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
