pub mod authenticity;
pub mod evidence;

use serde::Serialize;

/// Risk tier derived from an authenticity score. Lower bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=100 => RiskLevel::Low,
            60..=84 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RiskLevel::Low => "✅ Image metadata appears consistent. No strong signs of tampering.",
            RiskLevel::Medium => {
                "⚠️ Some metadata inconsistencies detected. Manual review recommended."
            }
            RiskLevel::High => {
                "❌ Multiple signs of metadata tampering. Treat this image as untrusted."
            }
        }
    }
}

/// Verdict label of the independent evidence scorer. Lower bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "Likely Authentic")]
    LikelyAuthentic,
    #[serde(rename = "Possibly Tampered")]
    PossiblyTampered,
    #[serde(rename = "Likely Tampered")]
    LikelyTampered,
}

impl Verdict {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=100 => Verdict::LikelyAuthentic,
            60..=84 => Verdict::PossiblyTampered,
            _ => Verdict::LikelyTampered,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub authenticity_score: u8,
    pub risk_level: RiskLevel,
    pub flags: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceReport {
    pub confidence_score: u8,
    pub verdict: Verdict,
    pub evidence: Vec<String>,
}

/// One triggered rule: points to subtract plus the human-readable reason.
#[derive(Debug, Clone)]
pub(crate) struct Deduction {
    pub points: u32,
    pub text: String,
}

impl Deduction {
    pub fn new(points: u32, text: impl Into<String>) -> Self {
        Deduction {
            points,
            text: text.into(),
        }
    }
}

/// Starts at 100 and subtracts every deduction, clamped to [0, 100].
pub(crate) fn settle_score(deductions: &[Deduction]) -> u8 {
    let total: i64 = deductions.iter().map(|d| d.points as i64).sum();
    (100i64 - total).clamp(0, 100) as u8
}

/// A make/model value that carries no identifying information.
pub(crate) fn is_generic(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    lowered.is_empty() || lowered == "unknown" || lowered == "generic"
}
