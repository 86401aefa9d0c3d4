//! Output formatting for records (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::export::HEADER;
use crate::rakuten::Record;
use anyhow::Result;
use tracing::warn;

/// Formats records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats multiple records.
    pub fn format_records(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_records(records),
                _ => "該当する商品がありませんでした (no products found)".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    // JSON formatting

    fn json_records(&self, records: &[Record]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_records(&self, records: &[Record]) -> String {
        let name_width = 40;
        let shop_width = 20;

        let mut lines = Vec::new();

        lines.push(format!(
            "{}  {}  {}",
            pad(HEADER[0], name_width),
            pad(HEADER[1], shop_width),
            HEADER[2]
        ));
        lines.push(format!("{:-<name_width$}  {:-<shop_width$}  {:-<10}", "", "", ""));

        for record in records {
            lines.push(format!(
                "{}  {}  {}",
                pad(&truncate(&record.name, name_width), name_width),
                pad(&truncate(&record.shop, shop_width), shop_width),
                record.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("{} 商品が見つかりました ({} products)", records.len(), records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[Record]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("| # | {} | {} | {} |", HEADER[0], HEADER[1], HEADER[2]));
        lines.push("|---|---|---|---|".to_string());

        for (i, record) in records.iter().enumerate() {
            let link = if record.url.is_empty() {
                String::new()
            } else {
                format!("[link]({})", record.url)
            };
            lines.push(format!(
                "| {} | {} | {} | {} |",
                i + 1,
                escape_markdown(&record.name),
                escape_markdown(&record.shop),
                link
            ));
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_records(&self, records: &[Record]) -> String {
        csv_text(records).unwrap_or_else(|e| {
            warn!("Failed to render CSV: {}", e);
            HEADER.join(",")
        })
    }
}

/// Same quoting rules as the exported file, without the BOM.
fn csv_text(records: &[Record]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record([&record.name, &record.shop, &record.url])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let text = String::from_utf8(bytes)?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

/// Display width, counting East Asian wide characters as two columns.
fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

fn char_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3041..=0x33FF | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF | 0xA000..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

/// Cuts `s` to at most `width` columns, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = char_width(c);
        if used + w > width.saturating_sub(3) {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, shop: &str, url: &str) -> Record {
        Record { name: name.to_string(), shop: shop.to_string(), url: url.to_string() }
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_records(&[]), "[]");
        assert_eq!(Formatter::new(OutputFormat::Csv).format_records(&[]), "商品名,店舗名,URL");
        assert!(Formatter::new(OutputFormat::Table).format_records(&[]).contains("no products found"));
    }

    #[test]
    fn test_json_records() {
        let output = Formatter::new(OutputFormat::Json)
            .format_records(&[record("Mug", "S店", "https://x/1")]);
        assert!(output.starts_with('['));
        let parsed: Vec<Record> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0].shop, "S店");
    }

    #[test]
    fn test_table_records() {
        let output = Formatter::new(OutputFormat::Table)
            .format_records(&[record("Mug", "S店", "https://x/1"), record("Cup", "T", "")]);
        assert!(output.contains("商品名"));
        assert!(output.contains("https://x/1"));
        assert!(output.contains("2 商品が見つかりました"));
    }

    #[test]
    fn test_table_truncates_wide_text_on_char_boundary() {
        let long = "珈琲".repeat(40);
        let output =
            Formatter::new(OutputFormat::Table).format_records(&[record(&long, "S", "u")]);
        let row = output.lines().nth(2).unwrap();
        assert!(row.contains("..."));
        assert!(!row.contains(&long));
    }

    #[test]
    fn test_markdown_records() {
        let output = Formatter::new(OutputFormat::Markdown)
            .format_records(&[record("A|B", "S", "https://x/1"), record("C", "T", "")]);
        assert!(output.contains("| 1 | A\\|B | S | [link](https://x/1) |"));
        assert!(output.contains("| 2 | C | T |  |"));
    }

    #[test]
    fn test_csv_quotes_commas_and_quotes() {
        let output = Formatter::new(OutputFormat::Csv)
            .format_records(&[record("Mug, \"big\"", "S", "u")]);
        assert_eq!(output, "商品名,店舗名,URL\n\"Mug, \"\"big\"\"\",S,u");
    }

    #[test]
    fn test_csv_quotes_carriage_return() {
        let records = [record("Mug\rLarge", "S店", "u"), record("Cup", "T", "")];
        let output = Formatter::new(OutputFormat::Csv).format_records(&records);

        let mut reader = csv::Reader::from_reader(output.as_bytes());
        let header: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(header, vec!["商品名", "店舗名", "URL"]);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|row| row.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows, vec![vec!["Mug\rLarge", "S店", "u"], vec!["Cup", "T", ""]]);
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("楽天"), 4);
        assert_eq!(display_width("ｱ"), 1);
        assert_eq!(pad("楽天", 6), "楽天  ");
    }
}
