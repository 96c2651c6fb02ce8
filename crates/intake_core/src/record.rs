use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Ticket,
    Factura,
    Albaran,
    Presupuesto,
    #[default]
    Otro,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Ticket => "TICKET",
            DocumentType::Factura => "FACTURA",
            DocumentType::Albaran => "ALBARAN",
            DocumentType::Presupuesto => "PRESUPUESTO",
            DocumentType::Otro => "OTRO",
        }
    }

    /// Total parse: unknown or empty labels classify as [`DocumentType::Otro`].
    pub fn from_label(label: &str) -> Self {
        let upper = label.trim().to_uppercase().replace('Á', "A");
        match upper.as_str() {
            "TICKET" | "RECEIPT" | "TIQUE" => DocumentType::Ticket,
            "FACTURA" | "INVOICE" => DocumentType::Factura,
            "ALBARAN" | "DELIVERY NOTE" | "DELIVERY_NOTE" => DocumentType::Albaran,
            "PRESUPUESTO" | "QUOTE" | "ESTIMATE" => DocumentType::Presupuesto,
            _ => DocumentType::Otro,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monetary amount carrying both the human-readable form and its numeric value.
///
/// `display` is what the document (or the vendor) printed, e.g. `"1.234,50 €"`;
/// `value` is the normalized decimal used for sums and for the webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Amount {
    pub display: String,
    pub value: Decimal,
}

impl Amount {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Keeps `display` verbatim (trimmed) and derives the numeric value from it.
    /// Unparseable text yields a zero value.
    pub fn parse(display: &str) -> Self {
        let display = display.trim();
        Self {
            display: display.to_string(),
            value: parse_decimal(display).unwrap_or(Decimal::ZERO),
        }
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self {
            display: format!("{value:.2}"),
            value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display.is_empty() {
            write!(f, "{:.2}", self.value)
        } else {
            f.write_str(&self.display)
        }
    }
}

/// Normalized extraction result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub document_type: DocumentType,
    pub document_number: Option<String>,
    /// DD/MM/YYYY, not calendar-validated.
    pub date: String,
    pub supplier: String,
    pub concept: String,
    pub tax_base: Amount,
    pub taxes: Amount,
    pub total: Amount,
}

impl DocumentRecord {
    /// Soft check of `total ≈ tax_base + taxes`, one cent of tolerance.
    /// Records without a breakdown (both parts zero) are considered consistent.
    pub fn totals_consistent(&self) -> bool {
        if self.tax_base.is_zero() && self.taxes.is_zero() {
            return true;
        }
        let expected = self.tax_base.value + self.taxes.value;
        (expected - self.total.value).abs() <= Decimal::new(1, 2)
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let first_digit = raw.find(|c: char| c.is_ascii_digit())?;
    let negative = raw[..first_digit].contains('-');

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if dot > comma {
                cleaned.replace(',', "")
            } else {
                cleaned.replace('.', "").replace(',', ".")
            }
        }
        (None, Some(_)) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (None, Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let normalized = normalized.trim_end_matches('.');
    let normalized = if normalized.starts_with('.') {
        format!("0{normalized}")
    } else {
        normalized.to_string()
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}
