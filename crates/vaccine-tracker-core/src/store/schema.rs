//! SQLite schema definition.

/// Schema for the device-local key-value store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-Value Store
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- serialized payload (JSON)
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
