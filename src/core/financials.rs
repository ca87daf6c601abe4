use crate::domain::model::FinanceRecord;
use crate::utils::error::{Result, ShopperError};
use crate::utils::validation::validate_file_extension;
use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "csv"];

/// Checks that a user-supplied spreadsheet path exists and has an accepted extension.
pub fn validate_financials_path(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(ShopperError::FinancialsError {
            path: path.display().to_string(),
            message: "file not found".to_string(),
        });
    }
    validate_file_extension("financials", path, &ACCEPTED_EXTENSIONS)
}

/// Reads every data row of a financial spreadsheet; the first row is the header.
pub fn load_financials(path: &Path) -> Result<Vec<FinanceRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let wrap = |e: ShopperError| match e {
        ShopperError::UnsupportedFormat { .. } | ShopperError::FinancialsError { .. } => e,
        other => ShopperError::FinancialsError {
            path: path.display().to_string(),
            message: other.to_string(),
        },
    };

    let records = match extension.as_str() {
        "xlsx" => read_xlsx(path).map_err(wrap)?,
        "csv" => read_csv(path).map_err(wrap)?,
        _ => return Err(ShopperError::UnsupportedFormat { extension }),
    };

    tracing::info!("📄 Loaded {} financial rows from {}", records.len(), path.display());
    Ok(records)
}

fn read_csv(path: &Path) -> Result<Vec<FinanceRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let mut record = FinanceRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = row.get(idx).map(typed_value).unwrap_or(Value::Null);
            record.insert(header.to_string(), value);
        }
        records.push(record);
    }

    Ok(records)
}

/// Numbers become JSON numbers (integral ones as integers), blanks become null.
fn typed_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => number_value(n),
        _ => Value::String(raw.to_string()),
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Excel's last column, XFD.
const MAX_COLUMNS: usize = 16_384;

/// Largest serial Excel renders as a date (9999-12-31).
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

struct XmlPatterns {
    shared_item: Regex,
    text_run: Regex,
    row: Regex,
    cell: Regex,
    attribute: Regex,
    value: Regex,
    sheet: Regex,
    relationship: Regex,
    num_fmt: Regex,
    cell_xfs: Regex,
    xf: Regex,
}

fn xml() -> &'static XmlPatterns {
    static PATTERNS: OnceLock<XmlPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| XmlPatterns {
        shared_item: Regex::new(r"(?s)<si\b[^>]*>(.*?)</si>").expect("valid pattern"),
        text_run: Regex::new(r"(?s)<t\b[^>]*>(.*?)</t>").expect("valid pattern"),
        row: Regex::new(r"(?s)<row\b([^>]*?)(?:/>|>(.*?)</row>)").expect("valid pattern"),
        cell: Regex::new(r"(?s)<c\b([^>]*?)(?:/>|>(.*?)</c>)").expect("valid pattern"),
        attribute: Regex::new(r#"([A-Za-z:]+)="([^"]*)""#).expect("valid pattern"),
        value: Regex::new(r"(?s)<v>(.*?)</v>").expect("valid pattern"),
        sheet: Regex::new(r"<sheet\b([^>]*?)/?>").expect("valid pattern"),
        relationship: Regex::new(r"<Relationship\b([^>]*?)/?>").expect("valid pattern"),
        num_fmt: Regex::new(r"<numFmt\b([^>]*?)/?>").expect("valid pattern"),
        cell_xfs: Regex::new(r"(?s)<cellXfs\b[^>]*>(.*?)</cellXfs>").expect("valid pattern"),
        xf: Regex::new(r"<xf\b([^>]*?)/?>").expect("valid pattern"),
    })
}

fn attr<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    xml()
        .attribute
        .captures_iter(attrs)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn read_entry<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Zip entry for a relationship target such as `worksheets/sheet1.xml` or `/xl/worksheets/sheet1.xml`.
fn sheet_entry_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Path of the first sheet in workbook order. Falls back to the lowest-named worksheet entry.
fn first_sheet_name<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>) -> Result<Option<String>> {
    let workbook = read_entry(archive, "xl/workbook.xml")?;
    let rels = read_entry(archive, "xl/_rels/workbook.xml.rels")?;

    if let (Some(workbook), Some(rels)) = (workbook, rels) {
        let first_id = xml()
            .sheet
            .captures(&workbook)
            .and_then(|caps| attr(caps.get(1)?.as_str(), "r:id").map(str::to_string));

        if let Some(id) = first_id {
            let target = xml()
                .relationship
                .captures_iter(&rels)
                .find(|caps| attr(&caps[1], "Id") == Some(id.as_str()))
                .and_then(|caps| attr(caps.get(1)?.as_str(), "Target").map(sheet_entry_path));
            if target.is_some() {
                return Ok(target);
            }
        }
    }

    let mut sheets: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    sheets.sort();
    Ok(sheets.into_iter().next())
}

fn parse_shared_strings(xml_text: &str) -> Vec<String> {
    xml()
        .shared_item
        .captures_iter(xml_text)
        .map(|item| {
            xml()
                .text_run
                .captures_iter(&item[1])
                .map(|run| unescape(&run[1]))
                .collect::<String>()
        })
        .collect()
}

/// Built-in date ids 14-22 and 45-47, or a custom code with y/m/d outside literals.
fn is_date_format(id: u32, code: Option<&str>) -> bool {
    if matches!(id, 14..=22 | 45..=47) {
        return true;
    }
    let Some(code) = code else {
        return false;
    };

    let mut plain = String::with_capacity(code.len());
    let mut in_quote = false;
    let mut in_bracket = false;
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if in_bracket => in_bracket = false,
            '\\' if !in_quote => {
                chars.next();
            }
            _ if in_quote || in_bracket => {}
            c => plain.push(c.to_ascii_lowercase()),
        }
    }
    plain.contains(['y', 'm', 'd'])
}

/// For each cell style index, whether its number format renders a date.
fn parse_date_styles(styles: &str) -> Vec<bool> {
    let custom: HashMap<u32, String> = xml()
        .num_fmt
        .captures_iter(styles)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let id = attr(attrs, "numFmtId")?.parse().ok()?;
            Some((id, unescape(attr(attrs, "formatCode")?)))
        })
        .collect();

    let Some(xfs) = xml().cell_xfs.captures(styles) else {
        return Vec::new();
    };
    xml()
        .xf
        .captures_iter(&xfs[1])
        .map(|caps| {
            let id = attr(&caps[1], "numFmtId")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            is_date_format(id, custom.get(&id).map(String::as_str))
        })
        .collect()
}

/// Serial day count from the 1899-12-30 epoch to an ISO timestamp; time-only below 1.
fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !(0.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = Duration::try_seconds((serial * 86_400.0).round() as i64)?;
    let moment = epoch.checked_add_signed(seconds)?;

    let format = if serial < 1.0 { "%H:%M:%S" } else { "%Y-%m-%dT%H:%M:%S" };
    Some(moment.format(format).to_string())
}

/// "B12" -> 1. Letters only; the row number is ignored. Columns past XFD are rejected.
fn column_index(reference: &str) -> std::result::Result<Option<usize>, String> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return Ok(None);
    }

    let mut index = 0usize;
    for letter in letters {
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add((letter - b'A' + 1) as usize))
            .filter(|i| *i <= MAX_COLUMNS)
            .ok_or_else(|| format!("cell reference '{}' is beyond column XFD", reference))?;
    }
    Ok(Some(index - 1))
}

/// Lookup tables shared by every cell of the sheet.
struct SheetContext {
    shared: Vec<String>,
    date_styles: Vec<bool>,
}

impl SheetContext {
    fn is_date_style(&self, attrs: &str) -> bool {
        attr(attrs, "s")
            .and_then(|s| s.parse::<usize>().ok())
            .and_then(|idx| self.date_styles.get(idx).copied())
            .unwrap_or(false)
    }
}

fn cell_value(attrs: &str, body: &str, ctx: &SheetContext) -> Value {
    let kind = attr(attrs, "t").unwrap_or_default();

    if kind == "inlineStr" {
        let text: String = xml()
            .text_run
            .captures_iter(body)
            .map(|run| unescape(&run[1]))
            .collect();
        return Value::String(text);
    }

    let Some(raw) = xml().value.captures(body).map(|caps| unescape(&caps[1])) else {
        return Value::Null;
    };

    match kind {
        "s" => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| ctx.shared.get(idx))
            .map(|s| Value::String(s.clone()))
            .unwrap_or(Value::Null),
        "b" => Value::Bool(raw.trim() == "1"),
        "str" | "e" | "d" => Value::String(raw),
        _ if ctx.is_date_style(attrs) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(excel_serial_to_iso)
            .map(Value::String)
            .unwrap_or_else(|| typed_value(&raw)),
        _ => typed_value(&raw),
    }
}

/// Cells of one row placed by column, gaps filled with null.
fn parse_row(row_xml: &str, ctx: &SheetContext) -> std::result::Result<Vec<Value>, String> {
    let mut cells: Vec<Value> = Vec::new();
    let mut next_col = 0usize;

    for caps in xml().cell.captures_iter(row_xml) {
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let col = match attr(attrs, "r") {
            Some(reference) => column_index(reference)?.unwrap_or(next_col),
            None => next_col,
        };
        if col >= MAX_COLUMNS {
            return Err(format!("row has more than {} columns", MAX_COLUMNS));
        }

        if cells.len() <= col {
            cells.resize(col + 1, Value::Null);
        }
        cells[col] = cell_value(attrs, body, ctx);
        next_col = col + 1;
    }

    Ok(cells)
}

fn header_name(value: &Value, idx: usize) -> String {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Null => format!("Unnamed: {}", idx),
        other => other.to_string(),
    }
}

fn read_xlsx(path: &Path) -> Result<Vec<FinanceRecord>> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let broken = |message: String| ShopperError::FinancialsError {
        path: path.display().to_string(),
        message,
    };

    let ctx = SheetContext {
        shared: read_entry(&mut archive, "xl/sharedStrings.xml")?
            .map(|content| parse_shared_strings(&content))
            .unwrap_or_default(),
        date_styles: read_entry(&mut archive, "xl/styles.xml")?
            .map(|content| parse_date_styles(&content))
            .unwrap_or_default(),
    };
    let sheet_name = first_sheet_name(&mut archive)?
        .ok_or_else(|| broken("workbook has no worksheets".to_string()))?;
    tracing::debug!("📄 Reading worksheet {} ({} shared strings)", sheet_name, ctx.shared.len());

    let sheet = read_entry(&mut archive, &sheet_name)?
        .ok_or_else(|| broken(format!("worksheet {} is missing", sheet_name)))?;

    let mut rows = Vec::new();
    for caps in xml().row.captures_iter(&sheet) {
        let cells = match caps.get(2) {
            Some(m) => parse_row(m.as_str(), &ctx).map_err(&broken)?,
            None => Vec::new(),
        };
        if cells.iter().any(|v| !v.is_null()) {
            rows.push(cells);
        }
    }

    let mut rows = rows.into_iter();
    let Some(header_cells) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_cells
        .iter()
        .enumerate()
        .map(|(idx, v)| header_name(v, idx))
        .collect();

    let records = rows
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| (header.clone(), cells.get(idx).cloned().unwrap_or(Value::Null)))
                .collect::<FinanceRecord>()
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    const WORKBOOK: &str = r#"<workbook><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    const WORKBOOK_RELS: &str = r#"<?xml version="1.0"?><Relationships><Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    fn write_xlsx(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Ok(Some(0)));
        assert_eq!(column_index("C7"), Ok(Some(2)));
        assert_eq!(column_index("aa10"), Ok(Some(26)));
        assert_eq!(column_index("XFD1"), Ok(Some(16_383)));
        assert_eq!(column_index("12"), Ok(None));
        assert!(column_index("XFE1").is_err());
        assert!(column_index("ZZZZZZZZZZZZZZZZ1").is_err());
    }

    #[test]
    fn test_date_formats() {
        assert!(is_date_format(14, None));
        assert!(is_date_format(22, None));
        assert!(!is_date_format(2, None));
        assert!(is_date_format(164, Some(r"yyyy\-mm\-dd;@")));
        assert!(is_date_format(165, Some("[$-409]d-mmm-yy")));
        assert!(!is_date_format(166, Some(r#"#,##0.00 "days""#)));
        assert!(!is_date_format(167, Some("[Red]0.00")));
    }

    #[test]
    fn test_excel_serial_to_iso() {
        assert_eq!(excel_serial_to_iso(46204.0).as_deref(), Some("2026-07-01T00:00:00"));
        assert_eq!(excel_serial_to_iso(46204.5).as_deref(), Some("2026-07-01T12:00:00"));
        assert_eq!(excel_serial_to_iso(0.25).as_deref(), Some("06:00:00"));
        assert_eq!(excel_serial_to_iso(-1.0), None);
        assert_eq!(excel_serial_to_iso(1e12), None);
    }

    #[test]
    fn test_load_xlsx_with_shared_and_inline_strings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.xlsx");
        let shared = r#"<sst><si><t>Month</t></si><si><t>Income</t></si><si><t>Expenses</t></si><si><r><t>Rent &amp; </t></r><r><t>Food</t></r></si></sst>"#;
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c><c r="D1" t="inlineStr"><is><t>Note</t></is></c></row>
<row r="2"><c r="A2" t="str"><v>2026-07</v></c><c r="B2"><v>4200</v></c><c r="C2"><v>3150.5</v></c><c r="D2" t="s"><v>3</v></c></row>
<row r="3"/>
<row r="4"><c r="A4" t="str"><v>2026-08</v></c><c r="C4"><v>2980</v></c></row>
</sheetData></worksheet>"#;
        write_xlsx(
            &path,
            &[
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/sharedStrings.xml", shared),
                ("xl/worksheets/sheet1.xml", sheet),
            ],
        );

        let records = load_financials(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            serde_json::to_value(&records[0]).unwrap(),
            json!({"Month": "2026-07", "Income": 4200, "Expenses": 3150.5, "Note": "Rent & Food"})
        );
        assert_eq!(records[1]["Income"], Value::Null);
        assert_eq!(records[1]["Expenses"], json!(2980));
        assert_eq!(records[1]["Note"], Value::Null);
        assert_eq!(
            records[0].keys().collect::<Vec<_>>(),
            vec!["Month", "Income", "Expenses", "Note"]
        );
    }

    #[test]
    fn test_load_xlsx_converts_date_styled_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.xlsx");
        let styles = r#"<styleSheet><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd;@"/></numFmts>
<cellXfs count="4"><xf numFmtId="0" fontId="0"/><xf numFmtId="14" fontId="0" applyNumberFormat="1"/><xf numFmtId="164" fontId="0" applyNumberFormat="1"/><xf numFmtId="2" fontId="0"/></cellXfs></styleSheet>"#;
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Date</t></is></c><c r="B1" t="inlineStr"><is><t>Amount</t></is></c><c r="C1" t="inlineStr"><is><t>Posted</t></is></c></row>
<row r="2"><c r="A2" s="1"><v>46204</v></c><c r="B2" s="3"><v>-42.5</v></c><c r="C2" s="2"><v>46234.75</v></c></row>
</sheetData></worksheet>"#;
        write_xlsx(
            &path,
            &[
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/styles.xml", styles),
                ("xl/worksheets/sheet1.xml", sheet),
            ],
        );

        let records = load_financials(&path).unwrap();

        assert_eq!(
            serde_json::to_value(&records[0]).unwrap(),
            json!({"Date": "2026-07-01T00:00:00", "Amount": -42.5, "Posted": "2026-07-31T18:00:00"})
        );
    }

    #[test]
    fn test_first_sheet_follows_workbook_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.xlsx");
        let workbook = r#"<workbook><sheets><sheet name="Transactions" sheetId="2" r:id="rId7"/><sheet name="Notes" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        let rels = r#"<Relationships><Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId7" Type="worksheet" Target="/xl/worksheets/sheet2.xml"/></Relationships>"#;
        write_xlsx(
            &path,
            &[
                ("xl/workbook.xml", workbook),
                ("xl/_rels/workbook.xml.rels", rels),
                (
                    "xl/worksheets/sheet1.xml",
                    r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Note</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>ignore me</t></is></c></row></sheetData></worksheet>"#,
                ),
                (
                    "xl/worksheets/sheet2.xml",
                    r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Income</t></is></c></row><row r="2"><c r="A2"><v>4200</v></c></row></sheetData></worksheet>"#,
                ),
            ],
        );

        let records = load_financials(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Income"], json!(4200));
    }

    #[test]
    fn test_out_of_range_cell_reference_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.xlsx");
        write_xlsx(
            &path,
            &[
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                (
                    "xl/worksheets/sheet1.xml",
                    r#"<worksheet><sheetData><row r="1"><c r="ZZZZZZZZZZZZZZZZ1"><v>1</v></c></row></sheetData></worksheet>"#,
                ),
            ],
        );

        match load_financials(&path) {
            Err(ShopperError::FinancialsError { message, .. }) => assert!(message.contains("beyond column XFD")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.csv");
        std::fs::write(&path, "Month,Income,Expenses\n2026-07, 4200 ,3150.75\n,,\n2026-08,4300,\n").unwrap();

        let records = load_financials(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Income"], json!(4200));
        assert_eq!(records[0]["Expenses"], json!(3150.75));
        assert_eq!(records[1]["Expenses"], Value::Null);
    }

    #[test]
    fn test_unsupported_and_broken_files() {
        let dir = TempDir::new().unwrap();

        let xls = dir.path().join("legacy.xls");
        std::fs::write(&xls, b"\xD0\xCF\x11\xE0").unwrap();
        assert!(matches!(
            load_financials(&xls),
            Err(ShopperError::UnsupportedFormat { .. })
        ));

        let fake = dir.path().join("fake.xlsx");
        std::fs::write(&fake, b"not a zip").unwrap();
        assert!(matches!(
            load_financials(&fake),
            Err(ShopperError::FinancialsError { .. })
        ));
    }

    #[test]
    fn test_validate_financials_path() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("bank.csv");
        std::fs::write(&good, "Month\n").unwrap();
        let wrong = dir.path().join("bank.pdf");
        std::fs::write(&wrong, "x").unwrap();

        assert!(validate_financials_path(&good).is_ok());
        assert!(validate_financials_path(&wrong).is_err());
        assert!(validate_financials_path(&dir.path().join("missing.xlsx")).is_err());
    }
}
