// src/db.rs - Database migrations and setup

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys and WAL mode
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL CHECK(length(date) > 0),
            time TEXT NOT NULL CHECK(length(time) > 0),
            machine TEXT NOT NULL CHECK(length(machine) > 0),
            party TEXT NOT NULL CHECK(length(party) > 0),
            color TEXT NOT NULL CHECK(length(color) > 0),
            lot_no TEXT NOT NULL CHECK(length(lot_no) > 0),
            quantity TEXT NOT NULL CHECK(length(quantity) > 0),
            duration TEXT NOT NULL CHECK(length(duration) > 0),
            priority TEXT NOT NULL DEFAULT 'medium' CHECK(
                priority IN ('high', 'medium', 'low')
            ),
            status TEXT NOT NULL DEFAULT 'scheduled' CHECK(
                status IN ('scheduled', 'in-progress', 'completed', 'cancelled')
            ),
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE CHECK(length(name) > 0 AND length(name) <= 255),
            category TEXT NOT NULL CHECK(category IN ('Dye', 'Chemical')),
            stock REAL NOT NULL CHECK(stock >= 0),
            min_threshold REAL NOT NULL DEFAULT 100 CHECK(min_threshold >= 0),
            max_capacity REAL NOT NULL DEFAULT 500 CHECK(max_capacity > 0),
            usage_sun REAL NOT NULL DEFAULT 0,
            usage_mon REAL NOT NULL DEFAULT 0,
            usage_tue REAL NOT NULL DEFAULT 0,
            usage_wed REAL NOT NULL DEFAULT 0,
            usage_thu REAL NOT NULL DEFAULT 0,
            usage_fri REAL NOT NULL DEFAULT 0,
            stock_level INTEGER NOT NULL DEFAULT 100,
            status TEXT NOT NULL DEFAULT 'ok' CHECK(
                status IN ('ok', 'low', 'critical')
            ),
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS machines (
            id TEXT PRIMARY KEY,
            machine_id TEXT NOT NULL UNIQUE CHECK(length(machine_id) > 0),
            name TEXT NOT NULL CHECK(length(name) > 0 AND length(name) <= 255),
            status TEXT NOT NULL DEFAULT 'idle' CHECK(
                status IN ('idle', 'running', 'maintenance')
            ),
            party TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT '',
            lot_no TEXT NOT NULL DEFAULT '',
            quantity TEXT NOT NULL DEFAULT '',
            stage TEXT NOT NULL DEFAULT '',
            efficiency INTEGER NOT NULL DEFAULT 0 CHECK(efficiency >= 0 AND efficiency <= 100),
            runtime TEXT NOT NULL DEFAULT '',
            start_time DATETIME,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inspections (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL CHECK(length(date) > 0),
            color TEXT NOT NULL CHECK(length(color) > 0),
            client TEXT NOT NULL CHECK(length(client) > 0),
            lot_no TEXT NOT NULL CHECK(length(lot_no) > 0),
            delta_e REAL CHECK(delta_e IS NULL OR delta_e >= 0),
            status TEXT NOT NULL DEFAULT 'pending' CHECK(
                status IN ('pending', 'approved', 'rejected')
            ),
            notes TEXT NOT NULL DEFAULT '' CHECK(length(notes) <= 1000),
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL CHECK(type IN ('critical', 'warning', 'info')),
            category TEXT NOT NULL CHECK(
                category IN ('inventory', 'machine', 'quality', 'production', 'maintenance')
            ),
            title TEXT NOT NULL CHECK(length(title) > 0 AND length(title) <= 255),
            message TEXT NOT NULL CHECK(length(message) > 0 AND length(message) <= 1000),
            read INTEGER NOT NULL DEFAULT 0 CHECK(read IN (0, 1)),
            actionable INTEGER NOT NULL DEFAULT 0 CHECK(actionable IN (0, 1)),
            related_id TEXT,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the hot list/filter paths
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_schedules_date ON schedules (date, time)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inventory_status ON inventory (status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_machines_status ON machines (status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inspections_status ON inspections (status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts (created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_alerts_unread ON alerts (category, related_id) WHERE read = 0",
    )
    .execute(pool)
    .await?;

    log::info!("Database migrations completed");

    Ok(())
}
