//! Scripted assistant tools
//!
//! Concept merging, cost optimization and keyword answers. Every result is
//! looked up from fixed tables; nothing here calls a model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolkitError {
    #[error("Both concepts are required")]
    MissingConcepts,
    #[error("Components list is required")]
    MissingComponents,
    #[error("Message is required")]
    MissingMessage,
}

pub type ToolkitResult<T> = Result<T, ToolkitError>;

// ============================================================================
// Concept merge
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeResult {
    pub title: String,
    pub synergy_score: u32,
    pub innovation_score: u32,
    pub feasibility_score: u32,
    pub description: String,
    pub estimated_cost: u32,
    pub difficulty: String,
    pub key_components: Vec<String>,
}

struct KnownMerge {
    pair: (&'static str, &'static str),
    title: &'static str,
    scores: (u32, u32, u32),
    description: &'static str,
    estimated_cost: u32,
    difficulty: &'static str,
    key_components: [&'static str; 4],
}

const KNOWN_MERGES: &[KnownMerge] = &[
    KnownMerge {
        pair: ("flying", "robot"),
        title: "Autonomous Flying Robot",
        scores: (95, 85, 70),
        description: "A self-navigating drone with obstacle avoidance and GPS tracking",
        estimated_cost: 300,
        difficulty: "Advanced",
        key_components: ["Flight Controller", "GPS Module", "Ultrasonic Sensors", "Camera"],
    },
    KnownMerge {
        pair: ("smart", "lighting"),
        title: "Intelligent Lighting System",
        scores: (88, 75, 90),
        description: "Adaptive lighting that responds to occupancy, time, and ambient conditions",
        estimated_cost: 120,
        difficulty: "Intermediate",
        key_components: ["Smart Bulbs", "Motion Sensors", "Light Sensors", "Microcontroller"],
    },
    KnownMerge {
        pair: ("plant", "monitoring"),
        title: "Smart Plant Care System",
        scores: (92, 80, 85),
        description: "Automated plant monitoring with soil moisture, light, and nutrient tracking",
        estimated_cost: 80,
        difficulty: "Beginner",
        key_components: ["Soil Sensors", "pH Meter", "Water Pump", "Arduino"],
    },
];

impl KnownMerge {
    fn matches(&self, a: &str, b: &str) -> bool {
        self.pair == (a, b) || self.pair == (b, a)
    }

    fn to_result(&self) -> MergeResult {
        let (synergy_score, innovation_score, feasibility_score) = self.scores;
        MergeResult {
            title: self.title.to_string(),
            synergy_score,
            innovation_score,
            feasibility_score,
            description: self.description.to_string(),
            estimated_cost: self.estimated_cost,
            difficulty: self.difficulty.to_string(),
            key_components: self.key_components.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Combine two concepts into a project idea
///
/// Known pairs match in either order, ignoring case. Anything else gets a
/// generic result built from the two names.
pub fn merge_concepts(first: &str, second: &str) -> ToolkitResult<MergeResult> {
    if first.trim().is_empty() || second.trim().is_empty() {
        return Err(ToolkitError::MissingConcepts);
    }

    let a = first.to_lowercase();
    let b = second.to_lowercase();
    if let Some(known) = KNOWN_MERGES.iter().find(|m| m.matches(&a, &b)) {
        return Ok(known.to_result());
    }

    Ok(MergeResult {
        title: format!("Smart {} {} System", title_case(first), title_case(second)),
        synergy_score: 75,
        innovation_score: 70,
        feasibility_score: 80,
        description: format!("An innovative project combining {first} and {second} technologies"),
        estimated_cost: 150,
        difficulty: "Intermediate".to_string(),
        key_components: ["Microcontroller", "Sensors", "Actuators", "Power Supply"]
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

/// Capitalize the first letter of every word and lowercase the rest
///
/// A word starts after any non-alphabetic character, so "3d-printer"
/// becomes "3D-Printer".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

// ============================================================================
// Cost optimization
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub original: String,
    pub alternative: String,
    pub original_price: f64,
    pub optimized_price: f64,
    pub savings: f64,
    pub savings_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub optimizations: Vec<Substitution>,
    pub total_savings: f64,
    /// Share of the original total saved, one decimal
    pub total_savings_percent: f64,
}

/// Substitute cheaper parts for each component
///
/// The first matching substring rule wins, checked in order: "arduino",
/// "raspberry pi", "sensor", then a generic fallback.
pub fn optimize_costs<S: AsRef<str>>(components: &[S]) -> ToolkitResult<CostReport> {
    if components.is_empty() {
        return Err(ToolkitError::MissingComponents);
    }

    let optimizations: Vec<Substitution> = components
        .iter()
        .map(|c| substitute(c.as_ref()))
        .collect();

    let total_savings: f64 = optimizations.iter().map(|o| o.savings).sum();
    let total_original: f64 = optimizations.iter().map(|o| o.original_price).sum();
    let total_savings_percent = (total_savings / total_original * 1000.0).round() / 10.0;

    Ok(CostReport {
        optimizations,
        total_savings,
        total_savings_percent,
    })
}

fn substitute(component: &str) -> Substitution {
    let lower = component.to_lowercase();
    let (alternative, original_price, optimized_price, savings_percent) =
        if lower.contains("arduino") {
            ("Generic Arduino Compatible Board".to_string(), 25.0, 12.0, 52)
        } else if lower.contains("raspberry pi") {
            ("Orange Pi or Banana Pi".to_string(), 75.0, 45.0, 40)
        } else if lower.contains("sensor") {
            ("Generic Sensor Module".to_string(), 15.0, 8.0, 47)
        } else {
            (format!("Generic {component}"), 20.0, 15.0, 25)
        };

    Substitution {
        original: component.to_string(),
        alternative,
        original_price,
        optimized_price,
        savings: original_price - optimized_price,
        savings_percent,
    }
}

// ============================================================================
// Quick answers
// ============================================================================

const CONCEPT_ANSWER: &str = "I can help you merge concepts! For example, combining 'smart lighting' with 'motion detection' creates an intelligent home automation system that automatically adjusts lighting based on occupancy and time of day. The synergy score for this combination would be around 88% with high feasibility.";
const COST_ANSWER: &str = "I'm constantly monitoring component prices across multiple suppliers. For Arduino projects, I've found that generic boards can save you 40-60% compared to official ones while maintaining compatibility. I can also suggest alternative components that provide similar functionality at lower costs.";
const PROJECT_ANSWER: &str = "Based on your interests, I recommend starting with a Smart Home Security System. It's perfect for intermediate makers and costs around $150. The project includes facial recognition, motion detection, and mobile alerts. I can provide detailed component lists and step-by-step instructions.";
const HELP_ANSWER: &str = "I'm TechCraft Genius AI! I can help you with project recommendations, concept merging, cost optimization, and technical guidance. What would you like to build today? I specialize in IoT, robotics, Arduino, Raspberry Pi, and smart home projects.";
const FLYING_ROBOT_ANSWER: &str = "The Autonomous Flying Robot is one of our most advanced projects! It combines flight control, GPS navigation, and obstacle avoidance. The estimated cost is $300 with a synergy score of 95% between 'flying' and 'robot' concepts. I can break down the components and provide the complete code.";
const LEARNING_ANSWER: &str = "I continuously learn from web sources, user feedback, and price monitoring. Today I've discovered 23 new projects, merged 5 concepts, and updated 127 component prices. My learning progress shows 87% web discovery, 92% concept integration, and 95% user adaptation.";

/// Keyword groups in priority order; substring match on the lowercased text
const ANSWER_RULES: &[(&[&str], &str)] = &[
    (&["merge", "combine", "concept"], CONCEPT_ANSWER),
    (&["cost", "price", "cheap", "budget"], COST_ANSWER),
    (&["flying", "drone", "robot"], FLYING_ROBOT_ANSWER),
    (&["learn", "learning", "ai"], LEARNING_ANSWER),
    (&["project", "build", "make", "create"], PROJECT_ANSWER),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAnswer {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Pick a canned answer by keyword
pub fn quick_answer(message: &str, at: DateTime<Utc>) -> ToolkitResult<QuickAnswer> {
    if message.trim().is_empty() {
        return Err(ToolkitError::MissingMessage);
    }

    let lower = message.to_lowercase();
    let response = ANSWER_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(HELP_ANSWER, |&(_, answer)| answer);

    Ok(QuickAnswer {
        response: response.to_string(),
        timestamp: at,
    })
}
