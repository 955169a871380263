//! Database schema SQL.

/// Sessions, extracted product records and generated scripts.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS product_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    brand_name TEXT NOT NULL,
    selling_points TEXT NOT NULL,
    promotion_info TEXT NOT NULL DEFAULT '',
    industry TEXT NOT NULL,
    target_audience TEXT NOT NULL DEFAULT '',
    video_purpose TEXT NOT NULL,
    platforms TEXT NOT NULL,
    forbidden_words TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scripts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    template_type TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    cover_suggestion TEXT NOT NULL DEFAULT '',
    hook TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    shooting_guide TEXT NOT NULL DEFAULT '',
    performance_metrics TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_info_session ON product_info(session_id);
CREATE INDEX IF NOT EXISTS idx_scripts_session ON scripts(session_id);
"#;
