use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    /// Public path of the supplier logo; `None` means the UI shows its generic icon.
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OemNumber {
    pub id: i64,
    pub oem_brand: String,
    pub oem_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: i64,
    pub original_url: String,
    pub local_path: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// One catalog line item as returned to the review UI.
///
/// `exists` carries the review flag: `None` until an operator marks the
/// article, then `Some(true)` / `Some(false)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub input_code: String,
    pub input_designation: Option<String>,
    pub article_id: String,
    pub article_no: String,
    pub product_name: String,
    pub has_multiple: bool,
    pub exists: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
    pub supplier_id: i64,
    pub supplier: Supplier,
    pub oem_numbers: Vec<OemNumber>,
    pub product_image: Option<ProductImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleGroup {
    pub input_code: String,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundArticle {
    pub id: i64,
    pub code: String,
    pub designation: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total: i64,
    pub existing: i64,
    pub not_existing: i64,
    pub unmarked: i64,
    pub not_found: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    pub all: usize,
    pub renault_nissan_dacia: usize,
    pub renault_nissan_dacia_only: usize,
    pub no_oem: usize,
    pub single: usize,
}

/// Groups articles by input code, keeping first-seen key order.
pub fn group_by_input_code(articles: Vec<Article>) -> Vec<ArticleGroup> {
    let mut groups: Vec<ArticleGroup> = Vec::new();
    for article in articles {
        match groups.iter_mut().find(|g| g.input_code == article.input_code) {
            Some(group) => group.articles.push(article),
            None => groups.push(ArticleGroup {
                input_code: article.input_code.clone(),
                articles: vec![article],
            }),
        }
    }
    groups
}
