use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension, Row};
use std::collections::HashMap;

use crate::db::fold;
use crate::filter::{CategoryFilter, Conditions, GroupSize};
use crate::logo;
use crate::model::{
    Article, ArticleGroup, FilterCounts, NotFoundArticle, OemNumber, ProductImage, ReviewStats,
    Supplier,
};

const ARTICLE_COLUMNS: &str = "a.id, a.input_code, a.input_designation, a.article_id,
    a.article_no, a.product_name, a.has_multiple, a.article_exists, a.created_at,
    a.updated_at, a.supplier_id, s.name";

const ARTICLE_ORDER: &str = "ORDER BY a.input_code ASC, a.product_name ASC, a.id ASC";

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn sql_int(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

fn flag_value(exists: bool) -> i64 {
    if exists {
        1
    } else {
        0
    }
}

/// Distinct unmarked group keys passing `filter` whose member count fits
/// `size`, ordered by key.
pub fn group_keys(
    conn: &Connection,
    filter: CategoryFilter,
    size: GroupSize,
) -> anyhow::Result<Vec<String>> {
    let mut cond = Conditions::unmarked();
    cond.category(filter);
    let sql = format!(
        "SELECT a.input_code
         FROM articles a
         {}
         GROUP BY a.input_code
         {}
         ORDER BY a.input_code ASC",
        cond.where_sql(),
        size.having()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(cond.binds()), |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(rows)
}

/// Full unmarked records for `keys`, grouped in key order. Members not passing
/// `filter` are left out, matching how the keys were counted.
pub fn load_groups(
    conn: &Connection,
    filter: CategoryFilter,
    keys: &[String],
) -> anyhow::Result<Vec<ArticleGroup>> {
    let mut cond = Conditions::unmarked();
    cond.category(filter);
    cond.input_code_in(keys);
    let articles = query_articles(conn, &cond, None)?;

    let mut by_key: HashMap<String, Vec<Article>> = HashMap::new();
    for article in articles {
        by_key
            .entry(article.input_code.clone())
            .or_default()
            .push(article);
    }
    Ok(keys
        .iter()
        .map(|key| ArticleGroup {
            input_code: key.clone(),
            articles: by_key.remove(key).unwrap_or_default(),
        })
        .collect())
}

pub fn load_article(conn: &Connection, id: i64) -> anyhow::Result<Option<Article>> {
    let mut cond = Conditions::default();
    cond.push_bound("a.id = ?", [Value::Integer(id)]);
    Ok(query_articles(conn, &cond, None)?.into_iter().next())
}

/// Article rows matching `cond`, ordered for display, with relations attached.
pub fn query_articles(
    conn: &Connection,
    cond: &Conditions,
    window: Option<(usize, usize)>,
) -> anyhow::Result<Vec<Article>> {
    let mut sql = format!(
        "SELECT {}
         FROM articles a
         JOIN suppliers s ON s.id = a.supplier_id
         {}
         {}",
        ARTICLE_COLUMNS,
        cond.where_sql(),
        ARTICLE_ORDER
    );
    let mut binds: Vec<Value> = cond.binds().to_vec();
    if let Some((offset, limit)) = window {
        sql.push_str(" LIMIT ? OFFSET ?");
        binds.push(sql_int(limit));
        binds.push(sql_int(offset));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut articles = stmt
        .query_map(params_from_iter(binds), article_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    attach_relations(conn, &mut articles)?;
    Ok(articles)
}

pub fn count_articles(conn: &Connection, cond: &Conditions) -> anyhow::Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM articles a {}", cond.where_sql());
    let n: i64 = conn.query_row(&sql, params_from_iter(cond.binds()), |r| r.get(0))?;
    Ok(n as usize)
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let supplier_id: i64 = row.get(10)?;
    let supplier_name: String = row.get(11)?;
    let has_multiple: i64 = row.get(6)?;
    let flag: Option<i64> = row.get(7)?;
    Ok(Article {
        id: row.get(0)?,
        input_code: row.get(1)?,
        input_designation: row.get(2)?,
        article_id: row.get(3)?,
        article_no: row.get(4)?,
        product_name: row.get(5)?,
        has_multiple: has_multiple != 0,
        exists: flag.map(|v| v != 0),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        supplier_id,
        supplier: Supplier {
            id: supplier_id,
            logo: logo::logo_path(&supplier_name),
            name: supplier_name,
        },
        oem_numbers: Vec::new(),
        product_image: None,
    })
}

fn attach_relations(conn: &Connection, articles: &mut [Article]) -> anyhow::Result<()> {
    if articles.is_empty() {
        return Ok(());
    }
    let index: HashMap<i64, usize> = articles
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id, i))
        .collect();
    let placeholders = vec!["?"; articles.len()].join(", ");
    let ids: Vec<Value> = articles.iter().map(|a| Value::Integer(a.id)).collect();

    let sql = format!(
        "SELECT article_id, id, oem_brand, oem_number
         FROM oem_numbers
         WHERE article_id IN ({})
         ORDER BY article_id, id",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let oems = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            let article_id: i64 = row.get(0)?;
            Ok((
                article_id,
                OemNumber {
                    id: row.get(1)?,
                    oem_brand: row.get(2)?,
                    oem_number: row.get(3)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (article_id, oem) in oems {
        if let Some(&i) = index.get(&article_id) {
            articles[i].oem_numbers.push(oem);
        }
    }

    let sql = format!(
        "SELECT article_id, id, original_url, local_path, file_name, file_size, mime_type
         FROM product_images
         WHERE article_id IN ({})",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let images = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            let article_id: i64 = row.get(0)?;
            Ok((
                article_id,
                ProductImage {
                    id: row.get(1)?,
                    original_url: row.get(2)?,
                    local_path: row.get(3)?,
                    file_name: row.get(4)?,
                    file_size: row.get(5)?,
                    mime_type: row.get(6)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (article_id, image) in images {
        if let Some(&i) = index.get(&article_id) {
            articles[i].product_image = Some(image);
        }
    }

    Ok(())
}

/// Sets the flag on one article regardless of its current state or group.
/// Returns `None` when no article has that id.
pub fn set_article_exists(
    conn: &Connection,
    id: i64,
    exists: bool,
) -> anyhow::Result<Option<Article>> {
    let changed = conn.execute(
        "UPDATE articles SET article_exists = ?, updated_at = ? WHERE id = ?",
        (flag_value(exists), now_rfc3339(), id),
    )?;
    if changed == 0 {
        return Ok(None);
    }
    load_article(conn, id)
}

/// Sets the flag on every still-unmarked article of a group in one statement.
/// Already reviewed members keep their flag. Returns the number of rows changed.
pub fn bulk_set_exists(conn: &Connection, input_code: &str, exists: bool) -> anyhow::Result<usize> {
    let changed = conn.execute(
        "UPDATE articles
         SET article_exists = ?, updated_at = ?
         WHERE input_code = ? AND article_exists IS NULL",
        (flag_value(exists), now_rfc3339(), input_code),
    )?;
    Ok(changed)
}

/// Clears every review flag. Returns the number of rows touched.
pub fn reset_all_flags(conn: &Connection) -> anyhow::Result<usize> {
    let changed = conn.execute(
        "UPDATE articles SET article_exists = NULL, updated_at = ?",
        [now_rfc3339()],
    )?;
    Ok(changed)
}

pub fn not_found_count(conn: &Connection) -> anyhow::Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM not_found_articles", [], |r| r.get(0))?;
    Ok(n as usize)
}

/// One page of import failures, newest first.
pub fn not_found_page(
    conn: &Connection,
    offset: usize,
    limit: usize,
) -> anyhow::Result<Vec<NotFoundArticle>> {
    not_found_rows(conn, "", Vec::new(), offset, limit)
}

/// Import failures whose code or designation contains `term`
/// (case-insensitive), newest first. Returns the page and the total number
/// of matches.
pub fn search_not_found(
    conn: &Connection,
    term: &str,
    offset: usize,
    limit: usize,
) -> anyhow::Result<(Vec<NotFoundArticle>, usize)> {
    let where_sql = "WHERE instr(fold(code), ?) > 0
        OR instr(fold(coalesce(designation, '')), ?) > 0";
    let needle = Value::Text(fold(term));
    let binds = vec![needle.clone(), needle];

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM not_found_articles {}", where_sql),
        params_from_iter(binds.iter()),
        |r| r.get(0),
    )?;
    let rows = not_found_rows(conn, where_sql, binds, offset, limit)?;
    Ok((rows, total as usize))
}

fn not_found_rows(
    conn: &Connection,
    where_sql: &str,
    mut binds: Vec<Value>,
    offset: usize,
    limit: usize,
) -> anyhow::Result<Vec<NotFoundArticle>> {
    let sql = format!(
        "SELECT id, code, designation, status, created_at
         FROM not_found_articles
         {}
         ORDER BY created_at DESC, id DESC
         LIMIT ? OFFSET ?",
        where_sql
    );
    binds.push(sql_int(limit));
    binds.push(sql_int(offset));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(binds), |row| {
            Ok(NotFoundArticle {
                id: row.get(0)?,
                code: row.get(1)?,
                designation: row.get(2)?,
                status: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn review_stats(conn: &Connection) -> anyhow::Result<ReviewStats> {
    let (total, existing, not_existing, unmarked) = conn.query_row(
        "SELECT
           COUNT(*),
           COALESCE(SUM(CASE WHEN article_exists = 1 THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN article_exists = 0 THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN article_exists IS NULL THEN 1 ELSE 0 END), 0)
         FROM articles",
        [],
        |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, i64>(3)?,
            ))
        },
    )?;
    Ok(ReviewStats {
        total,
        existing,
        not_existing,
        unmarked,
        not_found: not_found_count(conn)? as i64,
    })
}

/// Number of multiple-member groups per category filter, plus single groups.
pub fn filter_counts(conn: &Connection) -> anyhow::Result<FilterCounts> {
    let multiple = |f| group_keys(conn, f, GroupSize::Multiple).map(|g| g.len());
    Ok(FilterCounts {
        all: multiple(CategoryFilter::All)?,
        renault_nissan_dacia: multiple(CategoryFilter::BrandOrNoRefs)?,
        renault_nissan_dacia_only: multiple(CategoryFilter::BrandOnly)?,
        no_oem: multiple(CategoryFilter::NoRefs)?,
        single: group_keys(conn, CategoryFilter::All, GroupSize::Single)?.len(),
    })
}

/// Whether a group key is present at all, reviewed or not.
pub fn input_code_known(conn: &Connection, input_code: &str) -> anyhow::Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM articles WHERE input_code = ? LIMIT 1",
            [input_code],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}
