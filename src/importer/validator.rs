// ==========================================
// MatShop Catalog Pipeline - row validator
// ==========================================
// Validation is intentionally minimal: the only hard requirement is a
// non-empty identifier. Absent name/description/price fields are kept
// empty or zero rather than defaulted to placeholder text.
// ==========================================

use crate::domain::import::{ClassifiedRow, RowError, ValidatedRow};
use tracing::warn;

// ==========================================
// ValidationOutput
// ==========================================
#[derive(Debug, Default)]
pub struct ValidationOutput {
    /// Valid rows in original sheet order, kinds interleaved
    pub rows: Vec<ValidatedRow>,
    /// Rejected rows (empty identifier)
    pub invalid: Vec<RowError>,
    /// Normalization notes (unparseable prices)
    pub warnings: Vec<RowError>,
}

// ==========================================
// RowValidator
// ==========================================
pub struct RowValidator;

impl RowValidator {
    /// Lenient price normalization: keep digits, comma and dot; treat
    /// comma as a decimal separator; when several dots remain, only the
    /// final one is the decimal point ("1.234.50" -> 1234.50).
    ///
    /// Returns None when nothing numeric can be extracted.
    pub fn normalize_price(raw: &str) -> Option<f64> {
        let filtered: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();
        if filtered.is_empty() {
            return None;
        }

        let dotted = filtered.replace(',', ".");
        let normalized = match dotted.matches('.').count() {
            0 | 1 => dotted,
            _ => {
                let last = dotted.rfind('.').unwrap_or(0);
                let (integral, fraction) = dotted.split_at(last);
                format!("{}{}", integral.replace('.', ""), fraction)
            }
        };

        normalized.parse::<f64>().ok()
    }

    pub fn validate(&self, classified: Vec<ClassifiedRow>) -> ValidationOutput {
        let mut output = ValidationOutput::default();

        for row in classified {
            if row.key.is_empty() {
                output
                    .invalid
                    .push(RowError::new(row.row_number, "identifier is empty"));
                continue;
            }

            let price_raw = row.price_raw.trim();
            let price = if price_raw.is_empty() {
                0.0
            } else {
                match Self::normalize_price(price_raw) {
                    Some(value) => value,
                    None => {
                        warn!(
                            row = row.row_number,
                            raw = price_raw,
                            "price not parseable, using 0"
                        );
                        output.warnings.push(RowError::new(
                            row.row_number,
                            format!("price \"{price_raw}\" not parseable, using 0"),
                        ));
                        0.0
                    }
                }
            };

            output.rows.push(ValidatedRow {
                row_number: row.row_number,
                kind: row.kind,
                key: row.key,
                name: row.name,
                title: row.title,
                price,
                description: row.description,
                meta_description: row.meta_description,
                image: row.image,
            });
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::RowKind;

    fn classified(key: &str, price: &str) -> ClassifiedRow {
        ClassifiedRow {
            row_number: 2,
            kind: RowKind::Product,
            key: key.to_string(),
            name: String::new(),
            title: String::new(),
            price_raw: price.to_string(),
            description: String::new(),
            meta_description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_price_with_currency_and_thousands() {
        assert_eq!(
            RowValidator::normalize_price("1 234,50 руб"),
            Some(1234.50)
        );
    }

    #[test]
    fn test_price_plain_integer() {
        assert_eq!(RowValidator::normalize_price("999"), Some(999.0));
    }

    #[test]
    fn test_price_multiple_dots_keep_final() {
        assert_eq!(RowValidator::normalize_price("1.234.50"), Some(1234.50));
    }

    #[test]
    fn test_price_garbage_is_none() {
        assert_eq!(RowValidator::normalize_price("abc"), None);
        assert_eq!(RowValidator::normalize_price("."), None);
        assert_eq!(RowValidator::normalize_price(""), None);
    }

    #[test]
    fn test_empty_price_is_silent_zero() {
        let output = RowValidator.validate(vec![classified("10001", "  ")]);
        assert_eq!(output.rows[0].price, 0.0);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_unparseable_price_zeroes_with_warning() {
        let output = RowValidator.validate(vec![classified("10001", "abc")]);
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.rows[0].price, 0.0);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].row, 2);
    }

    #[test]
    fn test_empty_identifier_is_the_only_rejection() {
        let output = RowValidator.validate(vec![
            classified("", "100"),
            classified("10001", ""), // empty everything else is fine
        ]);
        assert_eq!(output.invalid.len(), 1);
        assert_eq!(output.rows.len(), 1);
    }

    #[test]
    fn test_counts_are_conserved() {
        let rows = vec![
            classified("A", "1"),
            classified("", "2"),
            classified("B", "x"),
        ];
        let total = rows.len();
        let output = RowValidator.validate(rows);
        assert_eq!(output.rows.len() + output.invalid.len(), total);
    }
}
