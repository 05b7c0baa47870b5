// This is the table module - it contains the shared delimited-text parser.
// Notice how this module has NO Discord-specific code (no serenity, no poise
// imports) and performs no I/O. Every caller that touches sheet data (slash
// commands, the Activity data API) goes through this one implementation
// instead of re-rolling its own field splitter.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A single parsed row: header name paired with the field value, in header
/// order. The column set is only known at runtime (it depends on the fetched
/// sheet's header row), so this stays a generic string-keyed container rather
/// than a per-sheet record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<(String, String)>);

#[allow(dead_code)]
impl Row {
    /// Look up a field by header name. Returns the first match when the
    /// header row contained duplicates.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(header, value)` pairs in header order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate values in header order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Rows serialize as JSON objects with keys in header order, so the HTTP API
// can hand a table straight to the webview.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// An ordered header plus one `Row` per non-blank data record.
///
/// Constructed fresh on every parse; owns no external resources and never
/// mutates after construction, so it can be built concurrently from any
/// number of request-handling tasks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl SheetTable {
    /// Parse raw delimited text (`,` field separator, newline record
    /// separator) into a table.
    ///
    /// Total over any input: malformed quoting degrades to a best-effort
    /// split instead of erroring. Empty input and header-only input both
    /// yield an empty table.
    ///
    /// Quote state is tracked across line boundaries, so a quoted field
    /// containing a literal newline comes back as one field of one row.
    pub fn parse(text: &str) -> Self {
        let mut records = scan_records(text);
        records.retain(|fields| !is_blank_record(fields));

        let mut records = records.into_iter();
        let headers: Vec<String> = match records.next() {
            Some(header_fields) => header_fields.iter().map(|t| clean_header(t)).collect(),
            None => return Self::default(),
        };

        let rows = records
            .map(|fields| build_row(&headers, fields))
            .collect();

        Self { headers, rows }
    }

    /// Build a table from a pre-tokenized 2-D cell grid, e.g. the `values`
    /// array returned by the Sheets API. Same shape rules as [`parse`]:
    /// first non-blank row is the header, short rows are padded with empty
    /// strings, long rows are truncated.
    ///
    /// [`parse`]: SheetTable::parse
    pub fn from_cells(cells: Vec<Vec<String>>) -> Self {
        let mut rows_in = cells;
        rows_in.retain(|cells| !cells.iter().all(|c| c.trim().is_empty()));

        let mut rows_in = rows_in.into_iter();
        let headers: Vec<String> = match rows_in.next() {
            Some(header_cells) => header_cells.iter().map(|c| c.trim().to_string()).collect(),
            None => return Self::default(),
        };

        let rows = rows_in.map(|cells| build_row(&headers, cells)).collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows. Callers decide whether that
    /// means "no data found" or just an empty-but-valid result.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize back to CSV: header line plus one line per row, quoting any
    /// field that contains a comma, quote, or newline.
    #[allow(dead_code)]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_line(&mut out, self.headers.iter().map(String::as_str));
        for row in &self.rows {
            push_csv_line(&mut out, row.values());
        }
        out
    }
}

// Tables serialize as a JSON array of row objects.
impl Serialize for SheetTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.iter())
    }
}

// ============================================================================
// FIELD SPLITTING
// ============================================================================

/// Split a document into records of fields with a single left-to-right scan.
///
/// - `"` toggles the in-quotes flag and is not emitted.
/// - `""` while inside quotes emits one literal `"` (spreadsheet exports
///   escape quotes this way).
/// - `,` outside quotes closes the current field.
/// - `\n` outside quotes closes the current record; a `\r` immediately
///   before it is dropped so CRLF exports behave like plain `\n`.
/// - Everything else, including separators inside quotes, is accumulated
///   verbatim. The final accumulator is always flushed, even when empty.
fn scan_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            '\n' if !in_quotes => {
                if current.ends_with('\r') {
                    current.pop();
                }
                fields.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut fields));
            }
            _ => current.push(ch),
        }
    }

    // Flush a final record when the text does not end in a newline.
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push(fields);
    }

    records
}

/// A record is blank when the whole source line trimmed to nothing: a single
/// field of pure whitespace. A line like `" , ,"` still produces a row.
fn is_blank_record(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0].trim().is_empty()
}

/// Header tokens are trimmed, and one symmetric surrounding quote pair is
/// stripped if both halves are present. Data fields get neither treatment;
/// that asymmetry is load-bearing for callers that expect raw cell text.
fn clean_header(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pair fields with headers positionally: missing fields become empty
/// strings, extra fields are dropped.
fn build_row(headers: &[String], fields: Vec<String>) -> Row {
    let mut fields = fields.into_iter();
    Row(headers
        .iter()
        .map(|header| (header.clone(), fields.next().unwrap_or_default()))
        .collect())
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;

        if field.contains(',') || field.contains('"') || field.contains('\n') {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row_pairs(row: &Row) -> Vec<(&str, &str)> {
        row.fields().collect()
    }

    #[test]
    fn parses_simple_table_in_header_order() {
        let table = SheetTable::parse("team,wins,losses\nAlpha,3,1\nBravo,2,2\n");

        assert_eq!(table.headers(), &["team", "wins", "losses"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            row_pairs(&table.rows()[0]),
            vec![("team", "Alpha"), ("wins", "3"), ("losses", "1")]
        );
        assert_eq!(table.rows()[1].get("team"), Some("Bravo"));
    }

    #[test]
    fn quoted_field_keeps_embedded_comma() {
        let table = SheetTable::parse("name,note\nAlice,\"hello, world\"");

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("name"), Some("Alice"));
        assert_eq!(table.rows()[0].get("note"), Some("hello, world"));
    }

    #[test]
    fn doubled_quote_becomes_literal_quote() {
        let table = SheetTable::parse("a,b\n\"say \"\"hi\"\"\",2");

        assert_eq!(table.rows()[0].get("a"), Some("say \"hi\""));
        assert_eq!(table.rows()[0].get("b"), Some("2"));
    }

    #[test]
    fn short_rows_are_padded_with_empty_strings() {
        let table = SheetTable::parse("a,b,c\n1,2");

        assert_eq!(
            row_pairs(&table.rows()[0]),
            vec![("a", "1"), ("b", "2"), ("c", "")]
        );
    }

    #[test]
    fn long_rows_are_truncated_to_the_header() {
        let table = SheetTable::parse("a,b\n1,2,3,4");

        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(row_pairs(&table.rows()[0]), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn trailing_blank_lines_change_nothing() {
        let with = SheetTable::parse("a,b\n1,2\n\n");
        let without = SheetTable::parse("a,b\n1,2");

        assert_eq!(with, without);
    }

    #[test]
    fn whitespace_only_lines_are_dropped_not_turned_into_rows() {
        let table = SheetTable::parse("a,b\n   \n1,2\n\t\n");

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("a"), Some("1"));
    }

    #[test]
    fn empty_and_header_only_inputs_yield_empty_tables() {
        assert!(SheetTable::parse("").is_empty());
        assert!(SheetTable::parse("a,b").is_empty());
        assert_eq!(SheetTable::parse("a,b").headers(), &["a", "b"]);
    }

    #[test]
    fn header_tokens_are_trimmed_and_unquoted() {
        let table = SheetTable::parse(" \"Team Name\" , Points \nAlpha,10");

        assert_eq!(table.headers(), &["Team Name", "Points"]);
        assert_eq!(table.rows()[0].get("Team Name"), Some("Alpha"));
    }

    #[test]
    fn data_fields_keep_their_whitespace() {
        // Only header tokens are trimmed; data cells come back verbatim.
        let table = SheetTable::parse("a,b\n  padded  ,   ");

        assert_eq!(table.rows()[0].get("a"), Some("  padded  "));
        assert_eq!(table.rows()[0].get("b"), Some("   "));
    }

    #[test]
    fn quoted_field_spanning_lines_stays_one_row() {
        let table = SheetTable::parse("a,b\n1,\"first\nsecond\"\n2,x");

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("b"), Some("first\nsecond"));
        assert_eq!(table.rows()[1].get("a"), Some("2"));
    }

    #[test]
    fn unbalanced_quotes_degrade_instead_of_erroring() {
        // Odd quote count: everything after the stray quote folds into the
        // last field of the final record.
        let table = SheetTable::parse("a,b\n1,\"oops\n2,3");

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("b"), Some("oops\n2,3"));
    }

    #[test]
    fn crlf_input_parses_like_lf() {
        let table = SheetTable::parse("a,b\r\n1,2\r\n");

        assert_eq!(table.headers(), &["a", "b"]);
        assert_eq!(table.rows()[0].get("b"), Some("2"));
    }

    #[test]
    fn duplicate_headers_keep_both_columns() {
        let table = SheetTable::parse("x,x\n1,2");

        assert_eq!(table.headers(), &["x", "x"]);
        assert_eq!(row_pairs(&table.rows()[0]), vec![("x", "1"), ("x", "2")]);
        // Keyed lookup returns the first match.
        assert_eq!(table.rows()[0].get("x"), Some("1"));
    }

    #[test]
    fn from_cells_mirrors_parse_semantics() {
        let cells = vec![
            vec![String::new(), String::new()],
            vec!["team ".to_string(), " pts".to_string()],
            vec!["Alpha".to_string(), "10".to_string(), "extra".to_string()],
            vec!["Bravo".to_string()],
            vec!["  ".to_string(), String::new()],
        ];
        let table = SheetTable::from_cells(cells);

        assert_eq!(table.headers(), &["team", "pts"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            row_pairs(&table.rows()[0]),
            vec![("team", "Alpha"), ("pts", "10")]
        );
        assert_eq!(
            row_pairs(&table.rows()[1]),
            vec![("team", "Bravo"), ("pts", "")]
        );
    }

    #[test]
    fn from_cells_of_nothing_is_empty() {
        assert!(SheetTable::from_cells(Vec::new()).is_empty());
        assert!(SheetTable::from_cells(vec![vec![" ".to_string()]]).is_empty());
    }

    #[test]
    fn csv_round_trip_preserves_row_values() {
        let original = SheetTable::parse("name,note\nAlice,\"hello, world\"\nBob,plain");
        let reparsed = SheetTable::parse(&original.to_csv());

        assert_eq!(original, reparsed);
    }

    #[test]
    fn to_csv_escapes_embedded_quotes_and_newlines() {
        let table = SheetTable::parse("a,b\n\"say \"\"hi\"\"\",\"two\nlines\"");
        let csv = table.to_csv();

        assert_eq!(csv, "a,b\n\"say \"\"hi\"\"\",\"two\nlines\"\n");
        assert_eq!(SheetTable::parse(&csv), table);
    }

    #[test]
    fn serializes_as_json_array_of_objects_in_header_order() {
        let table = SheetTable::parse("team,pts\nAlpha,10");
        let json = serde_json::to_string(&table).unwrap();

        assert_eq!(json, r#"[{"team":"Alpha","pts":"10"}]"#);
    }

    #[test]
    fn empty_table_serializes_as_empty_array() {
        let table = SheetTable::parse("team,pts");
        assert_eq!(serde_json::to_string(&table).unwrap(), "[]");
    }

    #[test]
    fn row_count_matches_non_blank_data_lines() {
        let text = "h1,h2\n1,2\n\n3,4\n5,6\n   \n";
        let table = SheetTable::parse(text);
        assert_eq!(table.len(), 3);
    }
}
