use chrono::NaiveDate;
use intake_core::{Amount, DocumentRecord, DocumentType};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::ExtractionError;

/// JSON keys the extraction prompt asks for. This is the only accepted schema.
pub const RECORD_KEYS: [&str; 8] = [
    "document_type",
    "document_number",
    "date",
    "supplier",
    "concept",
    "tax_base",
    "taxes",
    "total",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    document_type: Value,
    document_number: Value,
    date: Value,
    supplier: Value,
    concept: Value,
    tax_base: Value,
    taxes: Value,
    total: Value,
}

/// Parses the model's message content into a record.
///
/// Tolerates a surrounding markdown code fence. Any missing or null field is
/// replaced by its default; only content that is not a JSON object fails.
pub fn parse_record(content: &str) -> Result<DocumentRecord, ExtractionError> {
    let body = strip_code_fence(content);
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;
    if !value.is_object() {
        return Err(ExtractionError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }
    let raw: RawRecord = serde_json::from_value(value)
        .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;
    Ok(normalize(raw))
}

fn normalize(raw: RawRecord) -> DocumentRecord {
    let document_number = text(&raw.document_number);
    DocumentRecord {
        document_type: DocumentType::from_label(&text(&raw.document_type)),
        document_number: (!document_number.is_empty()).then_some(document_number),
        date: normalize_date(&text(&raw.date)),
        supplier: text(&raw.supplier),
        concept: concept(&raw.concept),
        tax_base: amount(&raw.tax_base),
        taxes: amount(&raw.taxes),
        total: amount(&raw.total),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// Some models answer with a list of line items instead of a summary.
fn concept(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => text(other),
    }
}

fn amount(value: &Value) -> Amount {
    match value {
        Value::Number(n) => {
            let raw = n.to_string();
            raw.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(&raw))
                .map(Amount::from_decimal)
                .unwrap_or_else(|_| Amount::parse(&raw))
        }
        Value::String(s) => Amount::parse(s),
        _ => Amount::zero(),
    }
}

/// ISO dates become DD/MM/YYYY; anything else is kept as written.
fn normalize_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_record_is_mapped() {
        let content = r#"{
            "document_type": "Factura",
            "document_number": "F-2024-001",
            "date": "15/03/2024",
            "supplier": "Ferretería López",
            "concept": "Material de obra",
            "tax_base": "100,00 €",
            "taxes": "21,00 €",
            "total": "121,00 €"
        }"#;
        let record = parse_record(content).unwrap();
        assert_eq!(record.document_type, DocumentType::Factura);
        assert_eq!(record.document_number.as_deref(), Some("F-2024-001"));
        assert_eq!(record.date, "15/03/2024");
        assert_eq!(record.supplier, "Ferretería López");
        assert_eq!(record.total.display, "121,00 €");
        assert_eq!(record.total.value.to_string(), "121.00");
        assert!(record.totals_consistent());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let record = parse_record(r#"{"supplier": "Bar Pepe", "total": 12.5}"#).unwrap();
        assert_eq!(record.document_type, DocumentType::Otro);
        assert_eq!(record.document_number, None);
        assert_eq!(record.date, "");
        assert_eq!(record.concept, "");
        assert!(record.tax_base.is_zero());
        assert!(record.taxes.is_zero());
        assert_eq!(record.total.display, "12.50");
    }

    #[test]
    fn nulls_and_lists_are_tolerated() {
        let content = r#"{"document_type": null, "concept": ["café", "tostada"], "date": "2024-03-15"}"#;
        let record = parse_record(content).unwrap();
        assert_eq!(record.document_type, DocumentType::Otro);
        assert_eq!(record.concept, "café, tostada");
        assert_eq!(record.date, "15/03/2024");
    }

    #[test]
    fn exponent_numbers_keep_their_value() {
        let tiny: Value = serde_json::from_str("1.5e-7").unwrap();
        assert_eq!(amount(&tiny).value, "0.00000015".parse::<Decimal>().unwrap());

        let large: Value = serde_json::from_str("1e21").unwrap();
        assert_eq!(
            amount(&large).value,
            "1000000000000000000000".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn fenced_content_is_unwrapped() {
        let record = parse_record("```json\n{\"supplier\": \"Renfe\"}\n```").unwrap();
        assert_eq!(record.supplier, "Renfe");
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(
            parse_record("[1, 2]"),
            Err(ExtractionError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_record("I could not read the image"),
            Err(ExtractionError::MalformedResponse(_))
        ));
    }
}
