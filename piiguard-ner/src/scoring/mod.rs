// piiguard-ner/src/scoring/mod.rs
use crate::EvidenceScore;

/// Weights for the evidence calculation.
#[derive(Debug, Clone)]
pub struct EvidenceWeights {
    pub honorific: f64,
    pub given_name: f64,
    pub capitalized_follower: f64,
    pub org_suffix: f64,
    pub geo_feature: f64,
    pub gazetteer: f64,
    pub calendar: f64,
}

impl Default for EvidenceWeights {
    fn default() -> Self {
        Self {
            honorific: 0.7,
            given_name: 0.6,
            capitalized_follower: 0.25,
            org_suffix: 0.8,
            geo_feature: 0.6,
            gazetteer: 0.9,
            calendar: 0.9,
        }
    }
}

/// The cues observed for one candidate entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evidence {
    pub honorific: bool,
    pub given_name: bool,
    /// Number of capitalised words following the anchor word.
    pub capitalized_followers: usize,
    pub org_suffix: bool,
    pub geo_feature: bool,
    pub gazetteer: bool,
    pub calendar: bool,
}

/// Calculates an evidence score (0.0 - 1.0) for a candidate entity.
pub fn calculate_evidence(evidence: &Evidence, weights: &EvidenceWeights) -> EvidenceScore {
    let mut score = 0.0;
    if evidence.honorific {
        score += weights.honorific;
    }
    if evidence.given_name {
        score += weights.given_name;
    }
    if evidence.org_suffix {
        score += weights.org_suffix;
    }
    if evidence.geo_feature {
        score += weights.geo_feature;
    }
    if evidence.gazetteer {
        score += weights.gazetteer;
    }
    if evidence.calendar {
        score += weights.calendar;
    }
    score += weights.capitalized_follower * evidence.capitalized_followers.min(2) as f64;

    score.min(1.0)
}
