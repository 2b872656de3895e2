//! Catalog schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    difficulty TEXT NOT NULL,
    cost REAL NOT NULL,
    duration TEXT NOT NULL,
    category TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    rating REAL NOT NULL DEFAULT 0.0,
    views INTEGER NOT NULL DEFAULT 0,
    likes INTEGER NOT NULL DEFAULT 0,
    components TEXT NOT NULL DEFAULT '[]',
    skills TEXT NOT NULL DEFAULT '[]',
    code_content TEXT,
    instructions TEXT,
    circuit_diagram TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_category ON projects(category);

CREATE TABLE IF NOT EXISTS learning_activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    activity_type TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activities_timestamp ON learning_activities(timestamp DESC);

CREATE TABLE IF NOT EXISTS community_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name TEXT NOT NULL,
    user_avatar TEXT NOT NULL,
    content TEXT NOT NULL,
    likes INTEGER NOT NULL DEFAULT 0,
    comments INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_created ON community_posts(created_at DESC);
";

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(Difficulty::Beginner),
            "Intermediate" => Ok(Difficulty::Intermediate),
            "Advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A DIY project in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub cost: f64,
    pub duration: String,
    pub category: String,
    pub tags: Vec<String>,
    pub rating: f64,
    pub views: i64,
    pub likes: i64,
    pub components: Vec<String>,
    pub skills: Vec<String>,
    pub code_content: Option<String>,
    pub instructions: Option<String>,
    pub circuit_diagram: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate figures across every project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_projects: i64,
    pub total_views: i64,
    pub total_likes: i64,
    /// Mean rating rounded to two decimals, 0.0 with no projects
    pub average_rating: f64,
}

// ============================================================================
// Learning feed
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Discovery,
    Merge,
    Price,
    Feedback,
    Generation,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityKind::Discovery => "discovery",
            ActivityKind::Merge => "merge",
            ActivityKind::Price => "price",
            ActivityKind::Feedback => "feedback",
            ActivityKind::Generation => "generation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(ActivityKind::Discovery),
            "merge" => Ok(ActivityKind::Merge),
            "price" => Ok(ActivityKind::Price),
            "feedback" => Ok(ActivityKind::Feedback),
            "generation" => Ok(ActivityKind::Generation),
            other => Err(format!("unknown activity type: {other}")),
        }
    }
}

/// One line of the "what the AI has been learning" feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningActivity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(rename = "activity")]
    pub description: String,
    /// Relative age, e.g. "5 minutes ago"
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub impact: Impact,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub category: String,
    pub connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConnection {
    pub source: String,
    pub target: String,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub connections: Vec<GraphConnection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub date: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSpeed {
    pub concepts_per_hour: f64,
    pub projects_analyzed_per_day: u32,
    pub price_updates_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSatisfaction {
    pub current_rating: f64,
    pub improvement_rate: f64,
    pub feedback_volume: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub accuracy_trend: Vec<AccuracyPoint>,
    pub learning_speed: LearningSpeed,
    pub user_satisfaction: UserSatisfaction,
}

// ============================================================================
// Community
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: i64,
    pub user: String,
    pub avatar: String,
    pub content: String,
    pub likes: i64,
    pub comments: i64,
    pub time: String,
}

/// One page of the community feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<CommunityPost>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub avatar: String,
    pub projects: u32,
    pub contributions: u32,
    pub reputation: u32,
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub posts: u32,
    pub growth: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub participants: u32,
    pub deadline: String,
    pub prize: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityEvent {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub attendees: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Human-readable age of `then` as seen from `now`
///
/// Future timestamps read as "0 seconds ago".
pub fn relative_time(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 60 {
        format!("{secs} seconds ago")
    } else if secs < 3600 {
        format!("{} minutes ago", secs / 60)
    } else if secs < 86_400 {
        format!("{} hours ago", secs / 3600)
    } else {
        format!("{} days ago", secs / 86_400)
    }
}

/// Age of a community post; posts are never younger than "0 minutes ago"
pub fn post_age(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 3600 {
        format!("{} minutes ago", secs / 60)
    } else {
        relative_time(now, then)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "0 seconds ago");
        assert_eq!(relative_time(now, now - Duration::seconds(59)), "59 seconds ago");
        assert_eq!(relative_time(now, now - Duration::seconds(60)), "1 minutes ago");
        assert_eq!(relative_time(now, now - Duration::minutes(5)), "5 minutes ago");
        assert_eq!(relative_time(now, now - Duration::minutes(60)), "1 hours ago");
        assert_eq!(relative_time(now, now - Duration::hours(23)), "23 hours ago");
        assert_eq!(relative_time(now, now - Duration::hours(48)), "2 days ago");
    }

    #[test]
    fn test_post_age_starts_at_minutes() {
        let now = Utc::now();
        assert_eq!(post_age(now, now - Duration::seconds(30)), "0 minutes ago");
        assert_eq!(post_age(now, now - Duration::seconds(90)), "1 minutes ago");
        assert_eq!(post_age(now, now - Duration::hours(2)), "2 hours ago");
        assert_eq!(post_age(now, now - Duration::days(3)), "3 days ago");
        assert_eq!(post_age(now, now + Duration::minutes(3)), "0 minutes ago");
    }

    #[test]
    fn test_relative_time_future_clamps() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now + Duration::minutes(3)), "0 seconds ago");
    }

    #[test]
    fn test_enum_text_round_trip() {
        for kind in [
            ActivityKind::Discovery,
            ActivityKind::Merge,
            ActivityKind::Price,
            ActivityKind::Feedback,
            ActivityKind::Generation,
        ] {
            assert_eq!(kind.to_string().parse::<ActivityKind>(), Ok(kind));
        }
        assert_eq!("Advanced".parse::<Difficulty>(), Ok(Difficulty::Advanced));
        assert!("Expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_activity_wire_names() {
        let activity = LearningActivity {
            id: 1,
            kind: ActivityKind::Merge,
            description: "merged".to_string(),
            time: "2 minutes ago".to_string(),
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "merge");
        assert_eq!(json["activity"], "merged");
    }
}
