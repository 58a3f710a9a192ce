use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    // The maintenance commands may run while the server holds the file.
    conn.busy_timeout(Duration::from_secs(5))?;
    register_fold(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS suppliers(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // article_exists is the review flag: NULL = not reviewed, 1 = exists, 0 = does not exist.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS articles(
            id INTEGER PRIMARY KEY,
            input_code TEXT NOT NULL,
            input_designation TEXT,
            article_id TEXT NOT NULL,
            article_no TEXT NOT NULL,
            product_name TEXT NOT NULL,
            has_multiple INTEGER NOT NULL DEFAULT 0,
            article_exists INTEGER,
            supplier_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(supplier_id) REFERENCES suppliers(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_articles_input_code ON articles(input_code)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_articles_exists_input_code ON articles(article_exists, input_code)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_articles_supplier ON articles(supplier_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS oem_numbers(
            id INTEGER PRIMARY KEY,
            article_id INTEGER NOT NULL,
            oem_brand TEXT NOT NULL,
            oem_number TEXT NOT NULL,
            FOREIGN KEY(article_id) REFERENCES articles(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_oem_numbers_article ON oem_numbers(article_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_oem_numbers_brand ON oem_numbers(oem_brand)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS product_images(
            id INTEGER PRIMARY KEY,
            article_id INTEGER NOT NULL UNIQUE,
            original_url TEXT NOT NULL,
            local_path TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_size INTEGER,
            mime_type TEXT,
            FOREIGN KEY(article_id) REFERENCES articles(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS not_found_articles(
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL,
            designation TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_not_found_articles_created ON not_found_articles(created_at)",
        [],
    )?;

    Ok(conn)
}

/// Case folding for search: `fold(text)` is the Unicode lowercase of `text`.
/// SQLite's own `lower()` only changes ASCII letters, so `É` would never meet `é`.
/// Callers fold the needle with [`fold`] as well.
fn register_fold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold(&t)))
        },
    )
}

pub fn fold(text: &str) -> String {
    text.to_lowercase()
}
