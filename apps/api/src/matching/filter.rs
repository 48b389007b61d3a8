use serde::Deserialize;

use crate::models::internship::MatchResult;

/// Client-side view filter over a result list. Both criteria are optional and
/// case-insensitive; blank criteria match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultFilter {
    /// Free text searched in company, role, skills and match reason.
    #[serde(default)]
    pub q: Option<String>,
    /// Substring of the location, e.g. "remote".
    #[serde(default)]
    pub location: Option<String>,
}

impl ResultFilter {
    /// Keeps matching results in their original order.
    pub fn apply(&self, results: &[MatchResult]) -> Vec<MatchResult> {
        let query = normalized(&self.q);
        let location = normalized(&self.location);

        results
            .iter()
            .filter(|result| {
                let record = &result.record;
                let query_ok = query.as_deref().map_or(true, |q| {
                    [
                        &record.company,
                        &record.role,
                        &record.skills_required,
                        &record.cv_match_reason,
                    ]
                    .iter()
                    .any(|field| field.to_lowercase().contains(q))
                });
                let location_ok = location
                    .as_deref()
                    .map_or(true, |l| record.location.to_lowercase().contains(l));
                query_ok && location_ok
            })
            .cloned()
            .collect()
    }
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}
