use rusqlite::types::Value;

use crate::db::fold;

/// OEM brands that make an article relevant for the brand views.
pub const BRAND_SET: [&str; 3] = ["RENAULT", "NISSAN", "DACIA"];

/// Category restriction shared by the list and search views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Brand-set member OR no OEM refs at all.
    BrandOrNoRefs,
    BrandOnly,
    NoRefs,
}

impl CategoryFilter {
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::BrandOrNoRefs,
        CategoryFilter::BrandOnly,
        CategoryFilter::NoRefs,
    ];

    /// Unknown or missing values fall back to `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("renault-nissan-dacia") => CategoryFilter::BrandOrNoRefs,
            Some("renault-nissan-dacia-only") => CategoryFilter::BrandOnly,
            Some("no-oem") => CategoryFilter::NoRefs,
            _ => CategoryFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::BrandOrNoRefs => "renault-nissan-dacia",
            CategoryFilter::BrandOnly => "renault-nissan-dacia-only",
            CategoryFilter::NoRefs => "no-oem",
        }
    }

    /// SQL condition on the `a` (articles) alias, `None` for no restriction.
    pub fn condition(&self) -> Option<String> {
        let brand = brand_member_condition();
        let no_refs = "NOT EXISTS (SELECT 1 FROM oem_numbers o WHERE o.article_id = a.id)";
        match self {
            CategoryFilter::All => None,
            CategoryFilter::BrandOrNoRefs => Some(format!("({} OR {})", brand, no_refs)),
            CategoryFilter::BrandOnly => Some(brand),
            CategoryFilter::NoRefs => Some(no_refs.to_string()),
        }
    }
}

fn brand_member_condition() -> String {
    let brands = BRAND_SET
        .iter()
        .map(|b| format!("'{}'", b))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "EXISTS (SELECT 1 FROM oem_numbers o WHERE o.article_id = a.id AND o.oem_brand IN ({}))",
        brands
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSize {
    /// Exactly one unmarked member.
    Single,
    /// More than one unmarked member.
    Multiple,
}

impl GroupSize {
    pub fn having(&self) -> &'static str {
        match self {
            GroupSize::Single => "HAVING COUNT(*) = 1",
            GroupSize::Multiple => "HAVING COUNT(*) > 1",
        }
    }
}

/// What the search endpoint looks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Category(CategoryFilter),
    /// Articles whose group has exactly one unmarked member.
    Single,
    /// The import-failure list instead of articles.
    NotFound,
}

impl SearchScope {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("single") => SearchScope::Single,
            Some("not-found") => SearchScope::NotFound,
            other => SearchScope::Category(CategoryFilter::parse(other)),
        }
    }
}

/// AND-joined WHERE clauses with their positional bind values.
#[derive(Debug, Default)]
pub struct Conditions {
    clauses: Vec<String>,
    binds: Vec<Value>,
}

impl Conditions {
    /// Every article view only looks at rows nobody has reviewed yet.
    pub fn unmarked() -> Self {
        let mut c = Conditions::default();
        c.push("a.article_exists IS NULL");
        c
    }

    pub fn push(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    pub fn push_bound(&mut self, clause: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.binds.extend(values);
    }

    pub fn category(&mut self, filter: CategoryFilter) {
        if let Some(cond) = filter.condition() {
            self.push(cond);
        }
    }

    /// `a.input_code IN (...)`; an empty key list matches nothing.
    pub fn input_code_in(&mut self, keys: &[String]) {
        if keys.is_empty() {
            self.push("0");
            return;
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        self.push_bound(
            format!("a.input_code IN ({})", placeholders),
            keys.iter().map(|k| Value::Text(k.clone())),
        );
    }

    /// Case-insensitive literal substring match over the searchable article
    /// columns. Needs the `fold` SQL function registered by `db::open_db`.
    pub fn text_match(&mut self, term: &str) {
        let needle = fold(term);
        let clause = "(instr(fold(coalesce(a.input_designation, '')), ?) > 0
            OR instr(fold(a.article_no), ?) > 0
            OR instr(fold(a.product_name), ?) > 0
            OR EXISTS (SELECT 1 FROM suppliers s2
                       WHERE s2.id = a.supplier_id AND instr(fold(s2.name), ?) > 0)
            OR EXISTS (SELECT 1 FROM oem_numbers o
                       WHERE o.article_id = a.id
                         AND (instr(fold(o.oem_number), ?) > 0 OR instr(fold(o.oem_brand), ?) > 0)))";
        self.push_bound(clause, std::iter::repeat(Value::Text(needle)).take(6));
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn binds(&self) -> &[Value] {
        &self.binds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_falls_back_to_all() {
        assert_eq!(CategoryFilter::parse(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(Some("bogus")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(Some("renault-nissan-dacia")),
            CategoryFilter::BrandOrNoRefs
        );
        assert_eq!(CategoryFilter::parse(Some("no-oem")), CategoryFilter::NoRefs);
        for f in CategoryFilter::ALL {
            assert_eq!(CategoryFilter::parse(Some(f.as_str())), f);
        }
    }

    #[test]
    fn search_scope_keeps_category_vocabulary() {
        assert_eq!(SearchScope::parse(Some("single")), SearchScope::Single);
        assert_eq!(SearchScope::parse(Some("not-found")), SearchScope::NotFound);
        assert_eq!(
            SearchScope::parse(Some("renault-nissan-dacia-only")),
            SearchScope::Category(CategoryFilter::BrandOnly)
        );
        assert_eq!(
            SearchScope::parse(None),
            SearchScope::Category(CategoryFilter::All)
        );
    }

    #[test]
    fn combined_filter_is_or_of_brand_and_no_refs() {
        let combined = CategoryFilter::BrandOrNoRefs.condition().expect("condition");
        let brand = CategoryFilter::BrandOnly.condition().expect("brand");
        let no_refs = CategoryFilter::NoRefs.condition().expect("no refs");
        assert_eq!(combined, format!("({} OR {})", brand, no_refs));
        assert!(brand.contains("'RENAULT', 'NISSAN', 'DACIA'"));
        assert!(CategoryFilter::All.condition().is_none());
    }

    #[test]
    fn conditions_bind_values_line_up_with_placeholders() {
        let mut c = Conditions::unmarked();
        c.input_code_in(&["A1".to_string(), "B2".to_string()]);
        c.text_match("ÉTRIER Bosch");
        let sql = c.where_sql();
        assert_eq!(sql.matches('?').count(), c.binds().len());
        assert_eq!(c.binds()[2], Value::Text("étrier bosch".into()));
        assert!(sql.starts_with("WHERE a.article_exists IS NULL AND "));
    }

    #[test]
    fn empty_key_list_matches_nothing() {
        let mut c = Conditions::default();
        c.input_code_in(&[]);
        assert_eq!(c.where_sql(), "WHERE 0");
        assert!(c.binds().is_empty());
    }
}
