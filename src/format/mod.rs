//! Output formatting for collected records and settings (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::feishu::SyncOutcome;
use crate::page::ProductRecord;
use crate::settings::SyncSettings;

/// Number of records listed in table and markdown previews.
pub const PREVIEW_LIMIT: usize = 15;

/// Formats records and settings for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats collected records.
    pub fn format_records(&self, records: &[ProductRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    /// Formats stored settings. Secrets are masked except in JSON.
    pub fn format_settings(&self, settings: &SyncSettings) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(settings).unwrap_or_else(|_| "{}".to_string())
            }
            _ => self.table_settings(settings),
        }
    }

    /// Formats the result of a sync.
    pub fn format_synced(&self, outcome: &SyncOutcome) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
            }
            _ => format!("Synced {} records to Feishu.", outcome.synced),
        }
    }

    // JSON formatting

    fn json_records(&self, records: &[ProductRecord]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_records(&self, records: &[ProductRecord]) -> String {
        let id_width = 20;
        let price_width = 10;
        let title_width = 40;

        let mut lines = Vec::new();

        lines.push(format!("{:<id_width$}  {:>price_width$}  {}", "Product ID", "Price", "Title"));
        lines.push(format!("{:-<id_width$}  {:-<price_width$}  {:-<title_width$}", "", "", ""));

        for record in records.iter().take(PREVIEW_LIMIT) {
            let price = if record.price.is_empty() { "-" } else { record.price.as_str() };
            let title = if record.title.is_empty() {
                "(untitled)".to_string()
            } else {
                truncate(&record.title, title_width)
            };

            lines.push(format!(
                "{:<id_width$}  {:>price_width$}  {}",
                record.product_id, price, title
            ));
        }

        if records.len() > PREVIEW_LIMIT {
            lines.push(format!("... {} more", records.len() - PREVIEW_LIMIT));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", records.len()));

        lines.join("\n")
    }

    fn table_settings(&self, settings: &SyncSettings) -> String {
        let expiry = if settings.token_expired_at == 0 {
            "-".to_string()
        } else {
            settings.token_expired_at.to_string()
        };

        let rows = [
            ("App ID", display_or_dash(&settings.app_id)),
            ("App secret", mask(&settings.app_secret)),
            ("App token", display_or_dash(&settings.app_token)),
            ("Table ID", display_or_dash(&settings.table_id)),
            ("ID column", display_or_dash(&settings.field_product_id)),
            ("Cover column", display_or_dash(&settings.field_cover)),
            ("Tenant token", mask(&settings.tenant_access_token)),
            ("Token expires", expiry),
        ];

        rows.iter()
            .map(|(label, value)| format!("{:<14} {}", format!("{}:", label), value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| Product ID | Price | Title | Cover |".to_string());
        lines.push("|------------|-------|-------|-------|".to_string());

        for record in records.iter().take(PREVIEW_LIMIT) {
            let title = if record.source_url.is_empty() {
                truncate(&record.title, 40)
            } else {
                format!("[{}]({})", truncate(&record.title, 40), record.source_url)
            };

            lines.push(format!(
                "| {} | {} | {} | ![cover]({}) |",
                record.product_id, record.price, title, record.cover
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "product_id,cover,title,price,source_url".to_string()
    }

    fn csv_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for record in records {
            lines.push(format!(
                "{},{},{},{},{}",
                record.product_id,
                Self::csv_escape(&record.cover),
                Self::csv_escape(&record.title),
                Self::csv_escape(&record.price),
                Self::csv_escape(&record.source_url)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens `s` to at most `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn display_or_dash(s: &str) -> String {
    if s.is_empty() { "-".to_string() } else { s.to_string() }
}

fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "-".to_string();
    }
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> ProductRecord {
        ProductRecord {
            product_id: "6543210987".to_string(),
            cover: "https://img.example.com/a.jpg".to_string(),
            title: "Ceramic Mug, Blue".to_string(),
            price: "59.90".to_string(),
            source_url: "https://www.example.com/goods/6543210987".to_string(),
        }
    }

    fn make_minimal_record() -> ProductRecord {
        ProductRecord::new("1234567", "https://img.example.com/b.jpg")
    }

    fn many(n: usize) -> Vec<ProductRecord> {
        (0..n)
            .map(|i| ProductRecord::new(format!("{}", 9_000_000 + i), "https://img/x.jpg"))
            .collect()
    }

    #[test]
    fn test_json_records() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format_records(&[make_record()]);

        assert!(output.starts_with('['));
        assert!(output.contains("\"productId\": \"6543210987\""));
        assert!(output.contains("\"sourceUrl\""));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_records(&[]), "[]");
        assert_eq!(Formatter::new(OutputFormat::Table).format_records(&[]), "No products found.");
        assert_eq!(
            Formatter::new(OutputFormat::Csv).format_records(&[]),
            "product_id,cover,title,price,source_url"
        );
    }

    #[test]
    fn test_table_records() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_record(), make_minimal_record()]);

        assert!(output.contains("Product ID"));
        assert!(output.contains("6543210987"));
        assert!(output.contains("59.90"));
        assert!(output.contains("Ceramic Mug, Blue"));
        assert!(output.contains("(untitled)"));
        assert!(output.contains("Total: 2 products"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn test_table_preview_limit() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&many(20));

        assert!(output.contains("9000014"));
        assert!(!output.contains("9000015"));
        assert!(output.contains("... 5 more"));
        assert!(output.contains("Total: 20 products"));
    }

    #[test]
    fn test_table_truncates_by_chars() {
        let mut record = make_record();
        record.title = "超".repeat(60);

        let output = Formatter::new(OutputFormat::Table).format_records(&[record]);
        assert!(output.contains(&format!("{}...", "超".repeat(37))));
    }

    #[test]
    fn test_markdown_records() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        let output = formatter.format_records(&[make_record(), make_minimal_record()]);

        assert!(output.contains("| Product ID | Price | Title | Cover |"));
        assert!(output.contains("[Ceramic Mug, Blue](https://www.example.com/goods/6543210987)"));
        assert!(output.contains("![cover](https://img.example.com/b.jpg)"));
        assert!(output.contains("*2 products found*"));
    }

    #[test]
    fn test_csv_escapes_commas() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let output = formatter.format_records(&[make_record()]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "6543210987,https://img.example.com/a.jpg,\"Ceramic Mug, Blue\",59.90,https://www.example.com/goods/6543210987"
        );
    }

    #[test]
    fn test_csv_lists_every_record() {
        let output = Formatter::new(OutputFormat::Csv).format_records(&many(20));
        assert_eq!(output.lines().count(), 21);
    }

    #[test]
    fn test_settings_masks_secrets() {
        let settings = SyncSettings {
            app_id: "cli_a1b2".to_string(),
            app_secret: "supersecretvalue".to_string(),
            tenant_access_token: "t-abc".to_string(),
            token_expired_at: 1_700_000_000_000,
            ..SyncSettings::default()
        };

        let output = Formatter::new(OutputFormat::Table).format_settings(&settings);

        assert!(output.contains("cli_a1b2"));
        assert!(output.contains("****alue"));
        assert!(!output.contains("supersecretvalue"));
        assert!(output.contains("****-abc"));
        assert!(output.contains("商品ID"));
        assert!(output.contains("1700000000000"));
    }

    #[test]
    fn test_settings_json_is_raw() {
        let settings = SyncSettings { app_secret: "s".to_string(), ..SyncSettings::default() };
        let output = Formatter::new(OutputFormat::Json).format_settings(&settings);
        assert!(output.contains("\"appSecret\": \"s\""));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(""), "-");
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("abcdef"), "****cdef");
    }

    #[test]
    fn test_synced() {
        let outcome = SyncOutcome { synced: 25 };
        assert_eq!(Formatter::new(OutputFormat::Table).format_synced(&outcome), "Synced 25 records to Feishu.");
        assert!(Formatter::new(OutputFormat::Json).format_synced(&outcome).contains("\"synced\": 25"));
    }
}
