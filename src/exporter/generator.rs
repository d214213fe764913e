// ==========================================
// MatShop Catalog Pipeline - export generator
// ==========================================
// Inverse of the import path: one category row followed by all of its
// product rows, repeated per category. Categories come out in display
// order, products in name order.
// ==========================================

use crate::config::CatalogSettings;
use crate::domain::catalog::{CatalogStats, CategoryRecord, ProductRecord};
use crate::exporter::error::ExportError;
use crate::repository::CatalogRepository;
use regex::Regex;
use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Column order mirrors the importer's fixed positions.
pub const EXPORT_HEADER: [&str; 7] = [
    "identifier",
    "name",
    "title",
    "price",
    "description",
    "meta description",
    "image",
];

// ==========================================
// ExportFormat
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

// ==========================================
// ExportGenerator
// ==========================================
pub struct ExportGenerator<R>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
    separator: char,
    preview_len: usize,
    tag_pattern: Regex,
}

impl<R> ExportGenerator<R>
where
    R: CatalogRepository,
{
    pub fn new(repo: Arc<R>, settings: &CatalogSettings) -> Self {
        Self {
            repo,
            separator: settings.category_separator,
            preview_len: settings.description_preview_len,
            // markup tags only; text between them is kept
            tag_pattern: Regex::new(r"<[^>]*>").expect("static pattern"),
        }
    }

    /// Generate the full catalog as one tabular byte stream.
    pub async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, Box<dyn Error>> {
        let rows = self.build_rows().await?;
        info!(rows = rows.len(), format = ?format, "catalog export generated");
        let bytes = match format {
            ExportFormat::Csv => write_csv(&rows)?,
            ExportFormat::Xlsx => write_xlsx(&rows)?,
        };
        Ok(bytes)
    }

    /// Read-only counts shown before an export is generated.
    pub async fn stats(&self) -> Result<CatalogStats, Box<dyn Error>> {
        self.repo.catalog_stats().await
    }

    /// Logical export rows in category -> products order.
    async fn build_rows(&self) -> Result<Vec<[String; 7]>, Box<dyn Error>> {
        let mut rows = Vec::new();

        for category in self.repo.list_categories().await? {
            rows.push(self.category_row(&category));

            let mut synthesized_counter: u32 = 0;
            for product in self.repo.list_products_by_category(category.id).await? {
                rows.push(self.product_row(&category, &product, &mut synthesized_counter));
            }
        }

        Ok(rows)
    }

    fn category_row(&self, category: &CategoryRecord) -> [String; 7] {
        [
            format!("{}{}{}", category.id, self.separator, category.name),
            category.display_name.clone(),
            category.title.clone(),
            String::new(),
            self.flatten_text(&category.description),
            self.flatten_text(&category.meta_description),
            base_file_name(category.image_path.as_deref()),
        ]
    }

    fn product_row(
        &self,
        category: &CategoryRecord,
        product: &ProductRecord,
        synthesized_counter: &mut u32,
    ) -> [String; 7] {
        let sku = if product.sku.trim().is_empty() {
            // running counter keeps synthesized SKUs unique within the
            // category, though not across categories
            *synthesized_counter += 1;
            let synthesized = synthesized_sku(category.id, *synthesized_counter);
            warn!(
                product_id = product.id,
                category = %category.name,
                sku = %synthesized,
                "product has no SKU, emitting synthesized one"
            );
            synthesized
        } else {
            product.sku.clone()
        };

        [
            sku,
            product.name.clone(),
            product.title.clone(),
            format_price(product.price),
            self.flatten_text(&product.description),
            self.flatten_text(&product.meta_description),
            base_file_name(product.image_path.as_deref()),
        ]
    }

    /// Flatten rich text to a plain preview: tags stripped, whitespace
    /// collapsed, truncated with an ellipsis marker.
    fn flatten_text(&self, rich: &str) -> String {
        let stripped = self.tag_pattern.replace_all(rich, " ");
        let stripped = stripped.replace("&nbsp;", " ").replace("&amp;", "&");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.chars().count() <= self.preview_len {
            collapsed
        } else {
            let mut truncated: String = collapsed.chars().take(self.preview_len).collect();
            truncated.push('…');
            truncated
        }
    }
}

/// Deterministic SKU for products imported without one.
fn synthesized_sku(category_key: i64, counter: u32) -> String {
    (category_key * 10_000 + counter as i64).to_string()
}

/// Image cells carry only the bare filename, never a storage path.
fn base_file_name(path: Option<&str>) -> String {
    path.and_then(|p| Path::new(p).file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

fn format_price(price: f64) -> String {
    if price == 0.0 {
        String::new()
    } else {
        format!("{price}")
    }
}

fn write_csv(rows: &[[String; 7]]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::CsvError(e.to_string()))
}

fn write_xlsx(rows: &[[String; 7]]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(idx as u32 + 1, col as u16, value)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    Ok(bytes)
}
