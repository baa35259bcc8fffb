//! # CSV Quote Exporter
//!
//! Renders a persisted quote as a spreadsheet-compatible CSV document.
//!
//! The sales team shares quotes over email and most clients open them in a
//! spreadsheet, so CSV is the baseline format. A PDF renderer can implement
//! the same [`QuoteExporter`] trait later without touching the session.

use async_trait::async_trait;

use crate::gateway::{ExportArtifact, GatewayError, QuoteExporter};
use cotizador_core::{Money, Quote};

/// Exports quotes as semicolon-separated CSV (the spreadsheet convention
/// for locales where comma is the decimal separator).
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    fn render(quote: &Quote) -> String {
        let mut out = String::new();

        out.push_str(&format!("Cotización;{}\n", quote.sequence_number));
        out.push_str(&format!("Cliente;{}\n", csv_field(&quote.client.legal_name)));
        out.push_str(&format!("RUT;{}\n", csv_field(&quote.client.tax_id)));
        out.push_str(&format!("Vendedor;{}\n", csv_field(&quote.seller_name)));
        if let Some(valid_until) = quote.valid_until {
            out.push_str(&format!("Válida hasta;{}\n", valid_until.format("%d-%m-%Y")));
        }
        out.push('\n');

        out.push_str("Código;Descripción;Unidad;Cantidad;Precio unitario;Descuento %;Subtotal\n");
        for item in &quote.items {
            out.push_str(&format!(
                "{};{};{};{};{};{};{}\n",
                csv_field(&item.code),
                csv_field(&item.description),
                csv_field(&item.unit),
                item.quantity,
                item.unit_price().format_clp(),
                // Basis points to percent with two decimals
                format_bps(item.discount_bps),
                item.line_subtotal().format_clp(),
            ));
        }
        out.push('\n');

        let t = &quote.totals;
        out.push_str(&format!("Subtotal;{}\n", Money::from_pesos(t.subtotal_pesos)));
        if t.total_discount_pesos > 0 {
            out.push_str(&format!(
                "Descuentos;{}\n",
                Money::from_pesos(t.total_discount_pesos)
            ));
        }
        out.push_str(&format!("Neto;{}\n", Money::from_pesos(t.net_pesos)));
        out.push_str(&format!("IVA;{}\n", Money::from_pesos(t.tax_pesos)));
        if t.shipping_pesos > 0 {
            out.push_str(&format!("Despacho;{}\n", Money::from_pesos(t.shipping_pesos)));
        }
        out.push_str(&format!("TOTAL;{}\n", Money::from_pesos(t.grand_total_pesos)));

        out
    }
}

#[async_trait]
impl QuoteExporter for CsvExporter {
    async fn export(&self, quote: &Quote) -> Result<ExportArtifact, GatewayError> {
        let body = Self::render(quote);

        Ok(ExportArtifact {
            filename: format!("{}.csv", quote.sequence_number),
            mime: "text/csv; charset=utf-8",
            bytes: body.into_bytes(),
        })
    }
}

/// Escapes a field that may contain the separator or quotes.
fn csv_field(value: &str) -> String {
    if value.contains(';') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Basis points rendered as a percentage ("5" for 500 bps, "2,50" for 250).
fn format_bps(bps: u32) -> String {
    if bps % 100 == 0 {
        format!("{}", bps / 100)
    } else {
        format!("{},{:02}", bps / 100, bps % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cotizador_core::{
        ClientInfo, CommercialTerms, LineItem, QuoteStatus, QuoteTotals, DEFAULT_TAX_RATE_BPS,
    };

    fn test_quote() -> Quote {
        let now = Utc::now();
        Quote {
            id: "q-1".to_string(),
            sequence_number: "COT-2026-0042".to_string(),
            status: QuoteStatus::Sent,
            seller_id: "u-1".to_string(),
            seller_name: "Valentina Rojas".to_string(),
            client: ClientInfo {
                legal_name: "Constructora Andes Ltda.".to_string(),
                tax_id: "76.543.210-K".to_string(),
                address: "Av. Las Obras 123".to_string(),
                ..ClientInfo::default()
            },
            items: vec![LineItem {
                id: "i-1".to_string(),
                product_id: None,
                code: "CEM-25KG".to_string(),
                description: "Cemento 25kg".to_string(),
                unit: "saco".to_string(),
                quantity: 100,
                unit_price_pesos: 8_500,
                discount_bps: 500,
            }],
            delivery: None,
            terms: CommercialTerms::default(),
            global_discount_bps: 0,
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            totals: QuoteTotals {
                subtotal_pesos: 807_500,
                line_discount_pesos: 42_500,
                net_pesos: 807_500,
                tax_pesos: 153_425,
                grand_total_pesos: 960_925,
                total_discount_pesos: 42_500,
                ..QuoteTotals::default()
            },
            notes: None,
            valid_until: None,
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_export_contains_header_items_and_totals() {
        let artifact = CsvExporter::new().export(&test_quote()).await.unwrap();
        assert_eq!(artifact.filename, "COT-2026-0042.csv");

        let body = String::from_utf8(artifact.bytes).unwrap();
        assert!(body.contains("Cotización;COT-2026-0042"));
        assert!(body.contains("Constructora Andes Ltda."));
        assert!(body.contains("CEM-25KG;Cemento 25kg;saco;100;$8.500;5;$807.500"));
        assert!(body.contains("TOTAL;$960.925"));
    }

    #[test]
    fn test_format_bps() {
        assert_eq!(format_bps(500), "5");
        assert_eq!(format_bps(250), "2,50");
        assert_eq!(format_bps(10_000), "100");
        assert_eq!(format_bps(0), "0");
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a;b"), "\"a;b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
