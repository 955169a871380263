//! SQLite-backed store for sessions, product info and generated scripts.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use tracing::{debug, info};
use uuid::Uuid;

use crate::schema::SCHEMA_SQL;
use vidscript_core::{
    Error, Industry, ProductInfo, Result, ScriptContent, ScriptTemplateType, ScriptUpdate, Session,
    VideoPurpose,
};

pub const EXPORT_HEADER: &str = "短视频脚本导出";
const EXPORT_RULE_WIDTH: usize = 50;

pub struct ScriptStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl ScriptStore {
    /// Open or create the database file at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        info!(
            "ScriptStore initialized: {} sessions, path={}",
            store.count_sessions()?,
            store.db_path.display()
        );
        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    // ---------------------------------------------------------------
    // Sessions
    // ---------------------------------------------------------------

    pub fn create_session(&self) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            created_at: now(),
        };
        let conn = self.conn.lock();
        conn.prepare_cached("INSERT INTO sessions (id, created_at) VALUES (?1, ?2)")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![session.id, session.created_at])
            .map_err(|e| Error::Database(e.to_string()))?;
        debug!("Created session {}", session.id);
        Ok(session)
    }

    /// Make sure a session row exists for a client-supplied id.
    pub fn ensure_session(&self, session_id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached("INSERT OR IGNORE INTO sessions (id, created_at) VALUES (?1, ?2)")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![session_id, now()])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    pub fn session_exists(&self, session_id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let found = conn
            .prepare_cached("SELECT 1 FROM sessions WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![session_id], |_| Ok(()))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    pub fn count_sessions(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Product info
    // ---------------------------------------------------------------

    /// Store a product record for a session. Returns the new row id.
    pub fn save_product_info(&self, session_id: &str, info: &ProductInfo) -> Result<i64> {
        let selling_points = serde_json::to_string(&info.selling_points)?;
        let platforms = serde_json::to_string(&info.platforms)?;

        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO product_info (
                    session_id, brand_name, selling_points, promotion_info, industry,
                    target_audience, video_purpose, platforms, forbidden_words, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                session_id,
                info.brand_name,
                selling_points,
                info.promotion_info,
                info.industry.label(),
                info.target_audience,
                info.video_purpose.label(),
                platforms,
                info.forbidden_words,
                now(),
            ])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(id)
    }

    /// Most recently saved product record of a session.
    pub fn latest_product_info(&self, session_id: &str) -> Result<Option<ProductInfo>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT * FROM product_info WHERE session_id = ?1 ORDER BY id DESC LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![session_id], Self::row_to_product_info)
            .optional()
            .map_err(|e| Error::Database(e.to_string()));
        row
    }

    // ---------------------------------------------------------------
    // Scripts
    // ---------------------------------------------------------------

    /// Insert a script; returns it with `id` and `created_at` filled in.
    pub fn add_script(&self, script: &ScriptContent) -> Result<ScriptContent> {
        let created_at = now();
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO scripts (
                    session_id, template_type, title, cover_suggestion, hook,
                    content, shooting_guide, performance_metrics, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                script.session_id,
                script.template_type.as_str(),
                script.title,
                script.cover_suggestion,
                script.hook,
                script.content,
                script.shooting_guide,
                script.performance_metrics,
                created_at,
            ])
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(ScriptContent {
            id: Some(id),
            created_at: Some(created_at),
            ..script.clone()
        })
    }

    /// Scripts of a session in insertion order.
    pub fn list_scripts(&self, session_id: &str) -> Result<Vec<ScriptContent>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM scripts WHERE session_id = ?1 ORDER BY id ASC")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![session_id], Self::row_to_script)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn get_script(&self, script_id: i64) -> Result<Option<ScriptContent>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM scripts WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![script_id], Self::row_to_script)
            .optional()
            .map_err(|e| Error::Database(e.to_string()));
        row
    }

    /// Apply a partial update. Returns false if no script has that id.
    pub fn update_script(&self, script_id: i64, update: &ScriptUpdate) -> Result<bool> {
        if update.is_empty() {
            return Err(Error::Validation("没有需要更新的字段".into()));
        }

        let candidates: [(&str, &Option<String>); 6] = [
            ("title", &update.title),
            ("cover_suggestion", &update.cover_suggestion),
            ("hook", &update.hook),
            ("content", &update.content),
            ("shooting_guide", &update.shooting_guide),
            ("performance_metrics", &update.performance_metrics),
        ];

        let mut assignments = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();
        for (column, value) in candidates {
            if let Some(value) = value {
                values.push(value);
                assignments.push(format!("{} = ?{}", column, values.len()));
            }
        }
        values.push(&script_id);
        let sql = format!(
            "UPDATE scripts SET {} WHERE id = ?{}",
            assignments.join(", "),
            values.len()
        );

        let conn = self.conn.lock();
        let changed = conn
            .execute(&sql, values.as_slice())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Plain-text export of a session's scripts, newest first.
    pub fn export_scripts_text(&self, session_id: &str) -> Result<String> {
        let mut scripts = self.list_scripts(session_id)?;
        if scripts.is_empty() {
            return Err(Error::NotFound("没有找到脚本内容".into()));
        }
        scripts.reverse();

        let mut out = format!(
            "{}\n生成时间: {}\n\n",
            EXPORT_HEADER,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        for (idx, script) in scripts.iter().enumerate() {
            out.push_str(&format!("脚本 {}:\n", idx + 1));
            out.push_str(&format!("标题: {}\n", script.title));
            out.push_str(&format!("封面建议: {}\n", script.cover_suggestion));
            out.push_str(&format!("黄金3s钩子: {}\n", script.hook));
            out.push_str(&format!("内容文案:\n{}\n", script.content));
            out.push_str(&format!("拍摄建议: {}\n", script.shooting_guide));
            out.push_str(&format!("爆款属性: {}\n", script.performance_metrics));
            out.push_str(&format!("\n{}\n\n", "=".repeat(EXPORT_RULE_WIDTH)));
        }
        Ok(out)
    }

    // ---------------------------------------------------------------
    // Row mapping
    // ---------------------------------------------------------------

    fn row_to_script(row: &Row<'_>) -> rusqlite::Result<ScriptContent> {
        let template: String = row.get("template_type")?;
        let template_type = ScriptTemplateType::parse(&template).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("unknown template type: {}", template).into(),
            )
        })?;

        Ok(ScriptContent {
            id: Some(row.get("id")?),
            session_id: row.get("session_id")?,
            template_type,
            title: row.get("title")?,
            cover_suggestion: row.get("cover_suggestion")?,
            hook: row.get("hook")?,
            content: row.get("content")?,
            shooting_guide: row.get("shooting_guide")?,
            performance_metrics: row.get("performance_metrics")?,
            created_at: Some(row.get("created_at")?),
        })
    }

    fn row_to_product_info(row: &Row<'_>) -> rusqlite::Result<ProductInfo> {
        let selling_points: String = row.get("selling_points")?;
        let platforms: String = row.get("platforms")?;
        let industry: String = row.get("industry")?;
        let purpose: String = row.get("video_purpose")?;

        Ok(ProductInfo {
            brand_name: row.get("brand_name")?,
            selling_points: json_column(3, &selling_points)?,
            promotion_info: row.get("promotion_info")?,
            industry: Industry::from_label(&industry).unwrap_or_default(),
            target_audience: row.get("target_audience")?,
            video_purpose: VideoPurpose::from_label(&purpose).unwrap_or_default(),
            platforms: json_column(8, &platforms)?,
            forbidden_words: row.get("forbidden_words")?,
        })
    }
}

fn json_column<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
