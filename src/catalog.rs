//! Read-only sample catalog
//!
//! Projects, the learning feed and the community feed live in an in-memory
//! SQLite database seeded at startup. Nothing is written after seeding.

mod pulse;
mod sample;
mod schema;

pub use pulse::{
    community_stats, learning_progress, learning_stats, CommunityStats, LearningProgress,
    LearningStats,
};
pub use schema::*;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Page size cap for the community feed
pub const MAX_PER_PAGE: u64 = 100;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Stored JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Project not found: {0}")]
    ProjectNotFound(i64),
    #[error("Catalog lock poisoned")]
    LockPoisoned,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Source of the sample content shown next to the chat
///
/// Static tables have default implementations; a provider only has to
/// answer the queries backed by real rows.
pub trait CatalogProvider: Send + Sync {
    fn projects(&self) -> CatalogResult<Vec<Project>>;

    fn project(&self, id: i64) -> CatalogResult<Project>;

    /// Distinct categories in first-seen order
    fn categories(&self) -> CatalogResult<Vec<String>>;

    fn project_stats(&self) -> CatalogResult<ProjectStats>;

    /// Newest activities first, at most `limit`
    fn recent_activities(
        &self,
        limit: u32,
        now: DateTime<Utc>,
    ) -> CatalogResult<Vec<LearningActivity>>;

    /// One page of posts, newest first. `page` is 1-based.
    fn community_posts(&self, page: u64, per_page: u64, now: DateTime<Utc>)
        -> CatalogResult<PostPage>;

    fn discoveries(&self, now: DateTime<Utc>) -> Vec<Discovery> {
        sample::discoveries(now)
    }

    fn knowledge_graph(&self) -> KnowledgeGraph {
        sample::knowledge_graph()
    }

    fn performance_metrics(&self) -> PerformanceMetrics {
        sample::performance_metrics()
    }

    fn top_contributors(&self) -> Vec<Contributor> {
        sample::top_contributors()
    }

    fn trending_topics(&self) -> Vec<TrendingTopic> {
        sample::trending_topics()
    }

    fn challenges(&self) -> Vec<Challenge> {
        sample::challenges()
    }

    fn events(&self) -> Vec<CommunityEvent> {
        sample::events()
    }
}

/// Thread-safe catalog handle over an in-memory database
#[derive(Clone)]
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Create the schema and load the sample rows, timestamped relative to `now`
    pub fn open_seeded(now: DateTime<Utc>) -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        let catalog = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        catalog.seed(now)?;
        Ok(catalog)
    }

    fn conn(&self) -> CatalogResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    fn seed(&self, now: DateTime<Utc>) -> CatalogResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let stamp = now.to_rfc3339();

        for p in sample::SAMPLE_PROJECTS {
            tx.execute(
                "INSERT INTO projects (title, description, difficulty, cost, duration, category, tags, rating, views, likes, components, skills, code_content, instructions, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
                params![
                    p.title,
                    p.description,
                    p.difficulty.to_string(),
                    p.cost,
                    p.duration,
                    p.category,
                    serde_json::to_string(p.tags)?,
                    p.rating,
                    p.views,
                    p.likes,
                    serde_json::to_string(p.components)?,
                    serde_json::to_string(p.skills)?,
                    p.code_content.trim(),
                    p.instructions.trim(),
                    stamp,
                ],
            )?;
        }

        for a in sample::SAMPLE_ACTIVITIES {
            tx.execute(
                "INSERT INTO learning_activities (activity_type, description, timestamp) VALUES (?1, ?2, ?3)",
                params![
                    a.kind.to_string(),
                    a.description,
                    (now - Duration::minutes(a.minutes_ago)).to_rfc3339(),
                ],
            )?;
        }

        for p in sample::SAMPLE_POSTS {
            tx.execute(
                "INSERT INTO community_posts (user_name, user_avatar, content, likes, comments, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    p.user_name,
                    p.user_avatar,
                    p.content,
                    p.likes,
                    p.comments,
                    (now - Duration::hours(p.hours_ago)).to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        tracing::debug!(
            projects = sample::SAMPLE_PROJECTS.len(),
            activities = sample::SAMPLE_ACTIVITIES.len(),
            posts = sample::SAMPLE_POSTS.len(),
            "Seeded catalog"
        );
        Ok(())
    }
}

const PROJECT_COLUMNS: &str = "id, title, description, difficulty, cost, duration, category, tags, rating, views, likes, components, skills, code_content, instructions, circuit_diagram, created_at, updated_at";

impl CatalogProvider for SqliteCatalog {
    fn projects(&self) -> CatalogResult<Vec<Project>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id ASC"))?;
        let rows = stmt.query_map([], read_project_row)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row??);
        }
        Ok(projects)
    }

    fn project(&self, id: i64) -> CatalogResult<Project> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"))?;
        stmt.query_row(params![id], read_project_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CatalogError::ProjectNotFound(id),
                other => CatalogError::Sqlite(other),
            })?
    }

    fn categories(&self) -> CatalogResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT category FROM projects GROUP BY category ORDER BY MIN(id)")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<String>, _>>()
            .map_err(CatalogError::from)
    }

    fn project_stats(&self) -> CatalogResult<ProjectStats> {
        let conn = self.conn()?;
        let (total_projects, total_views, total_likes, average): (i64, i64, i64, f64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(views), 0), COALESCE(SUM(likes), 0), COALESCE(AVG(rating), 0.0) FROM projects",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;
        Ok(ProjectStats {
            total_projects,
            total_views,
            total_likes,
            average_rating: (average * 100.0).round() / 100.0,
        })
    }

    fn recent_activities(
        &self,
        limit: u32,
        now: DateTime<Utc>,
    ) -> CatalogResult<Vec<LearningActivity>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, activity_type, description, timestamp FROM learning_activities
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut activities = Vec::new();
        for row in rows {
            let (id, kind, description, timestamp) = row?;
            let Ok(kind) = kind.parse::<ActivityKind>() else {
                tracing::warn!(id, kind = %kind, "Skipping activity with unknown type");
                continue;
            };
            activities.push(LearningActivity {
                id,
                kind,
                description,
                time: relative_time(now, parse_datetime(&timestamp)),
            });
        }
        Ok(activities)
    }

    fn community_posts(
        &self,
        page: u64,
        per_page: u64,
        now: DateTime<Utc>,
    ) -> CatalogResult<PostPage> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);

        let conn = self.conn()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM community_posts", [], |row| {
            row.get(0)
        })?;
        let total = u64::try_from(total).unwrap_or(0);

        let offset = (page - 1).saturating_mul(per_page);
        let mut stmt = conn.prepare(
            "SELECT id, user_name, user_avatar, content, likes, comments, created_at
             FROM community_posts ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        // SQLite integers are signed; anything past i64::MAX is off the end anyway
        let limit = i64::try_from(per_page).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit, offset], |row| {
            Ok(CommunityPost {
                id: row.get(0)?,
                user: row.get(1)?,
                avatar: row.get(2)?,
                content: row.get(3)?,
                likes: row.get(4)?,
                comments: row.get(5)?,
                time: post_age(now, parse_datetime(&row.get::<_, String>(6)?)),
            })
        })?;
        let posts = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(PostPage {
            posts,
            total,
            pages: total.div_ceil(per_page),
            current_page: page,
        })
    }
}

/// Decode a project row; the outer result is SQLite's, the inner one covers
/// the JSON list columns
fn read_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogResult<Project>> {
    let difficulty: String = row.get(3)?;
    let tags: String = row.get(7)?;
    let components: String = row.get(11)?;
    let skills: String = row.get(12)?;

    let (tags, components, skills) = match decode_lists(&tags, &components, &skills) {
        Ok(lists) => lists,
        Err(e) => return Ok(Err(e)),
    };

    Ok(Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        difficulty: difficulty.parse().unwrap_or(Difficulty::Beginner),
        cost: row.get(4)?,
        duration: row.get(5)?,
        category: row.get(6)?,
        tags,
        rating: row.get(8)?,
        views: row.get(9)?,
        likes: row.get(10)?,
        components,
        skills,
        code_content: row.get(13)?,
        instructions: row.get(14)?,
        circuit_diagram: row.get(15)?,
        created_at: parse_datetime(&row.get::<_, String>(16)?),
        updated_at: parse_datetime(&row.get::<_, String>(17)?),
    }))
}

type StringLists = (Vec<String>, Vec<String>, Vec<String>);

fn decode_lists(tags: &str, components: &str, skills: &str) -> CatalogResult<StringLists> {
    Ok((
        serde_json::from_str(tags)?,
        serde_json::from_str(components)?,
        serde_json::from_str(skills)?,
    ))
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
