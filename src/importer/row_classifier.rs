// ==========================================
// MatShop Catalog Pipeline - row classifier
// ==========================================
// Classification rule: a row is a category iff its identifier contains
// the configured separator (e.g. "1.BMW"); everything else is a product
// and its identifier is the SKU verbatim. No other heuristic is consulted.
// ==========================================

use crate::domain::import::{ClassifiedRow, RawRow, RowKind};

pub struct RowClassifier {
    separator: char,
}

impl RowClassifier {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Clean category name: everything after the last separator,
    /// upper-cased for matching.
    fn clean_category_name(&self, identifier: &str) -> String {
        identifier
            .rsplit(self.separator)
            .next()
            .unwrap_or(identifier)
            .trim()
            .to_uppercase()
    }

    pub fn classify(&self, raw: RawRow) -> ClassifiedRow {
        let (kind, key) = if raw.identifier.contains(self.separator) {
            (RowKind::Category, self.clean_category_name(&raw.identifier))
        } else {
            (RowKind::Product, raw.identifier.trim().to_string())
        };

        ClassifiedRow {
            row_number: raw.row_number,
            kind,
            key,
            name: raw.name,
            title: raw.title,
            price_raw: raw.price,
            description: raw.description,
            meta_description: raw.meta_description,
            image: raw.image,
        }
    }

    /// Classify rows preserving their original sheet order; the order is
    /// load-bearing for the reconciler's carry-forward pass.
    pub fn classify_rows(&self, rows: Vec<RawRow>) -> Vec<ClassifiedRow> {
        rows.into_iter().map(|row| self.classify(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(identifier: &str) -> RawRow {
        RawRow {
            row_number: 2,
            identifier: identifier.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_separator_marks_category() {
        let classifier = RowClassifier::new('.');
        let row = classifier.classify(raw("1.BMW"));
        assert_eq!(row.kind, RowKind::Category);
        assert_eq!(row.key, "BMW");
    }

    #[test]
    fn test_no_separator_is_product_sku_verbatim() {
        let classifier = RowClassifier::new('.');
        let row = classifier.classify(raw("10001"));
        assert_eq!(row.kind, RowKind::Product);
        assert_eq!(row.key, "10001");
    }

    #[test]
    fn test_clean_name_uses_last_separator() {
        let classifier = RowClassifier::new('.');
        let row = classifier.classify(raw("1.2.Audi q7"));
        assert_eq!(row.kind, RowKind::Category);
        assert_eq!(row.key, "AUDI Q7");
    }

    #[test]
    fn test_custom_separator() {
        let classifier = RowClassifier::new('#');
        assert_eq!(classifier.classify(raw("3#Lada")).kind, RowKind::Category);
        // '.' is just part of the SKU under a '#' separator
        assert_eq!(classifier.classify(raw("1.BMW")).kind, RowKind::Product);
    }

    #[test]
    fn test_order_preserved() {
        let classifier = RowClassifier::new('.');
        let rows = vec![raw("1.BMW"), raw("10001"), raw("2.AUDI")];
        let classified = classifier.classify_rows(rows);
        assert_eq!(classified[0].key, "BMW");
        assert_eq!(classified[1].key, "10001");
        assert_eq!(classified[2].key, "AUDI");
    }
}
