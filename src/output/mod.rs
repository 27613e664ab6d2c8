pub mod report;

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

use crate::client::{CountKind, EventCount, Item, ProfilerResult, RuleProfile};
use crate::query::ListKind;
use crate::view::Screen;

pub const NO_DATA: &str = "No data found.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Plain,
    /// Free text; line breaks are kept.
    Text,
    /// Mapping of field name to a list of strings.
    RequestData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: CellKind,
}

const fn col(key: &'static str, title: &'static str) -> Column {
    Column {
        key,
        title,
        kind: CellKind::Plain,
    }
}

const EVENT_COLUMNS: &[Column] = &[
    col("id", "ID"),
    col("sid", "SID"),
    col("timestamp", "Timestamp"),
    col("src_addr", "Source Address"),
    col("src_port", "Source Port"),
    col("dst_addr", "Destination Address"),
    col("dst_port", "Destination Port"),
    col("proto", "Protocol"),
    col("action", "Action"),
    Column {
        key: "msg",
        title: "Message",
        kind: CellKind::Text,
    },
];

const RULE_COLUMNS: &[Column] = &[
    col("id", "ID"),
    col("gid", "GID"),
    col("sid", "SID"),
    col("rev", "Rev"),
    col("action", "Action"),
    Column {
        key: "msg",
        title: "Message",
        kind: CellKind::Text,
    },
];

const REQUEST_LOG_COLUMNS: &[Column] = &[
    col("id", "ID"),
    col("timestamp", "Timestamp"),
    col("user_ip", "User IP"),
    col("http_method", "Method"),
    col("response_status_code", "Status"),
    col("endpoint", "Endpoint"),
    Column {
        key: "request_data",
        title: "Request Data",
        kind: CellKind::RequestData,
    },
];

pub fn columns(kind: ListKind) -> &'static [Column] {
    match kind {
        ListKind::Events => EVENT_COLUMNS,
        ListKind::Rules => RULE_COLUMNS,
        ListKind::RequestsLog => REQUEST_LOG_COLUMNS,
    }
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn request_data_text(value: &Value) -> String {
    let Value::Object(fields) = value else {
        return value_text(value);
    };
    fields
        .iter()
        .map(|(key, values)| {
            let joined = match values {
                Value::Array(items) => items.iter().map(value_text).join(", "),
                other => value_text(other),
            };
            format!("{key}: {joined}")
        })
        .join("\n")
}

/// Plain text of one cell. Line breaks are `\n`.
pub fn cell_text(item: &Item, column: &Column) -> String {
    let Some(value) = item.get(column.key) else {
        return String::new();
    };
    match column.kind {
        CellKind::Plain | CellKind::Text => value_text(value),
        CellKind::RequestData => request_data_text(value),
    }
}

/// Headers and row cells, independent of the output format.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

pub fn items_table(kind: ListKind, items: &[Item]) -> Table {
    let cols = columns(kind);
    let mut table = Table::new(cols.iter().map(|c| c.title));
    for item in items {
        table.push(cols.iter().map(|c| cell_text(item, c)).collect());
    }
    table
}

pub fn events_count_table(kind: CountKind, counts: &[EventCount]) -> Table {
    let mut table = match kind {
        CountKind::Sid => Table::new(["SID", "Count"]),
        CountKind::Addr => Table::new(["Source Address", "Destination Address", "Count"]),
    };
    for entry in counts {
        let row = match entry {
            EventCount::Sid { sid, count } => vec![sid.to_string(), count.to_string()],
            EventCount::Addr {
                src_addr,
                dst_addr,
                count,
            } => vec![src_addr.clone(), dst_addr.clone(), count.to_string()],
        };
        table.push(row);
    }
    table
}

pub fn profiler_rules_table(rules: &[RuleProfile]) -> Table {
    let mut table = Table::new([
        "GID",
        "SID",
        "Rev",
        "Checks",
        "Matches",
        "Alerts",
        "Time (us)",
        "Avg Check",
        "Avg Match",
        "Avg Non-Match",
        "Timeouts",
        "Suspends",
        "Rule Time Percentage",
    ]);
    for r in rules {
        table.push(vec![
            r.gid.to_string(),
            r.sid.to_string(),
            r.rev.to_string(),
            r.checks.to_string(),
            r.matches.to_string(),
            r.alerts.to_string(),
            r.time_us.to_string(),
            r.avg_check.to_string(),
            r.avg_match.to_string(),
            r.avg_non_match.to_string(),
            r.timeouts.to_string(),
            r.suspends.to_string(),
            r.rule_time_percentage.to_string(),
        ]);
    }
    table
}

/// Fixed-width text table. Multi-line cells are flattened with `; `.
pub fn render_text_table(table: &Table) -> String {
    let flatten = |cell: &str| cell.lines().join("; ");
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| flatten(c)).collect())
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in rows.iter() {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", c, width = width)
            })
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(&table.headers));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .join("  "),
    );
    out.push('\n');
    if rows.is_empty() {
        out.push_str(NO_DATA);
        out.push('\n');
    }
    for row in rows.iter() {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

pub fn nav_text(screen: &Screen, page: Option<u32>) -> Option<String> {
    let nav = screen.nav?;
    let prev = if nav.has_prev {
        "[p] Previous page"
    } else {
        "Previous page (disabled)"
    };
    let next = if nav.has_next {
        "[n] Next page"
    } else {
        "Next page (disabled)"
    };
    Some(match page {
        Some(page) => format!("{prev} | page {page} | {next}"),
        None => format!("{prev} | {next}"),
    })
}

/// Text rendering of a list screen: banner, or table plus navigation line.
pub fn render_screen_text(kind: ListKind, screen: &Screen, page: Option<u32>) -> String {
    if let Some(banner) = screen.banner.as_deref() {
        let mut out = banner.to_string();
        out.push('\n');
        return out;
    }
    if screen.nav.is_none() && screen.rows.is_empty() {
        return String::new();
    }
    let mut out = render_text_table(&items_table(kind, &screen.rows));
    if let Some(nav) = nav_text(screen, page) {
        out.push_str(&nav);
        out.push('\n');
    }
    out
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"null".to_vec());
    out.push(b'\n');
    out
}

/// Array responses print one document per entry, objects print `key: value` lines.
pub fn render_perf_text(response: &Value) -> String {
    let pretty = |v: &Value| serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string());
    let mut out = String::new();
    match response {
        Value::Array(docs) => {
            for doc in docs {
                out.push_str(&pretty(doc));
                out.push('\n');
            }
        }
        Value::Object(fields) => {
            for (key, value) in fields {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&pretty(value));
                out.push('\n');
            }
        }
        other => {
            out.push_str(&pretty(other));
            out.push('\n');
        }
    }
    out
}

pub fn render_profiler_text(result: &ProfilerResult) -> String {
    let mut out = format!(
        "Start Time: {}\nEnd Time: {}\n",
        value_text(&result.start_time),
        value_text(&result.end_time)
    );
    if !result.rules.is_empty() {
        out.push_str("\nRules:\n");
        out.push_str(&render_text_table(&profiler_rules_table(&result.rules)));
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::pagination::NavState;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn rule_row_keeps_column_order() {
        let rows = vec![item(json!({
            "msg": "test", "action": "alert", "rev": 3, "sid": 2000001, "gid": 1, "id": 5
        }))];
        let table = items_table(ListKind::Rules, &rows);
        assert_eq!(
            table.rows,
            vec![vec!["5", "1", "2000001", "3", "alert", "test"]]
        );
    }

    #[test]
    fn missing_and_null_fields_render_empty() {
        let rows = vec![item(json!({"id": 1, "src_port": null}))];
        let table = items_table(ListKind::Events, &rows);
        assert_eq!(table.rows[0][0], "1");
        assert_eq!(table.rows[0][4], "");
        assert_eq!(table.rows[0][9], "");
    }

    #[test]
    fn request_data_lists_each_field() {
        let rows = vec![item(json!({
            "id": 7,
            "request_data": {"sid": ["1", "2"], "page": ["3"]}
        }))];
        let table = items_table(ListKind::RequestsLog, &rows);
        assert_eq!(table.rows[0][6], "sid: 1, 2\npage: 3");
    }

    #[test]
    fn empty_table_says_no_data() {
        let text = render_text_table(&Table::new(["SID", "Count"]));
        assert!(text.ends_with("No data found.\n"));
    }

    #[test]
    fn text_table_flattens_multiline_cells() {
        let mut table = Table::new(["A"]);
        table.push(vec!["one\ntwo".to_string()]);
        assert!(render_text_table(&table).contains("one; two"));
    }

    #[test]
    fn banner_replaces_table() {
        let screen = Screen {
            rows: Vec::new(),
            nav: None,
            banner: Some("Error: bad sid".to_string()),
        };
        assert_eq!(
            render_screen_text(ListKind::Events, &screen, Some(1)),
            "Error: bad sid\n"
        );
    }

    #[test]
    fn hidden_navigation_renders_nothing() {
        assert_eq!(
            render_screen_text(ListKind::Events, &Screen::default(), Some(1)),
            ""
        );
    }

    #[test]
    fn nav_line_marks_disabled_controls() {
        let screen = Screen {
            rows: Vec::new(),
            nav: Some(NavState {
                has_prev: false,
                has_next: true,
            }),
            banner: None,
        };
        assert_eq!(
            nav_text(&screen, Some(1)).unwrap(),
            "Previous page (disabled) | page 1 | [n] Next page"
        );
    }

    #[test]
    fn events_count_headers_follow_type() {
        let table = events_count_table(
            CountKind::Sid,
            &[EventCount::Sid {
                sid: 1000,
                count: 2,
            }],
        );
        assert_eq!(table.headers, vec!["SID", "Count"]);
        assert_eq!(table.rows, vec![vec!["1000", "2"]]);
    }

    #[test]
    fn perf_object_prints_key_lines() {
        let text = render_perf_text(&json!({"daq": 1, "stream": {"flows": 2}}));
        assert!(text.starts_with("daq: 1\n"));
        assert!(text.contains("stream: {\n  \"flows\": 2\n}\n"));
    }

    #[test]
    fn perf_array_prints_one_document_per_entry() {
        let text = render_perf_text(&json!([{"a": 1}, {"b": 2}]));
        assert_eq!(text, "{\n  \"a\": 1\n}\n{\n  \"b\": 2\n}\n");
    }

    #[test]
    fn perf_object_keeps_server_key_order() {
        let body: Value = serde_json::from_str(r#"{"stream":{"a":1},"daq":{"b":2}}"#).unwrap();
        let text = render_perf_text(&body);
        let stream = text.find("stream: ").unwrap();
        let daq = text.find("daq: ").unwrap();
        assert!(stream < daq);
    }

    #[test]
    fn profiler_text_shows_times_and_rule_rows() {
        let result: ProfilerResult = serde_json::from_value(json!({
            "startTime": "2024-01-01 10:00:00",
            "endTime": "2024-01-01 10:05:00",
            "rules": [{
                "gid": 1, "sid": 1000, "rev": 2, "checks": 10, "matches": 3,
                "alerts": 1, "timeUs": 250, "avgCheck": 25.0, "avgMatch": 40.5,
                "avgNonMatch": 18.0, "timeouts": 0, "suspends": 0,
                "ruleTimePercentage": 12.5
            }]
        }))
        .unwrap();
        let text = render_profiler_text(&result);
        assert!(text.starts_with("Start Time: 2024-01-01 10:00:00\nEnd Time: 2024-01-01 10:05:00\n"));
        assert!(text.contains("Rule Time Percentage"));
        let row = text.lines().last().unwrap();
        let cells: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(
            cells,
            vec!["1", "1000", "2", "10", "3", "1", "250", "25", "40.5", "18", "0", "0", "12.5"]
        );
    }

    #[test]
    fn profiler_text_without_rules_has_no_table() {
        let result: ProfilerResult =
            serde_json::from_value(json!({"startTime": null, "endTime": "x", "rules": []})).unwrap();
        assert_eq!(render_profiler_text(&result), "Start Time: \nEnd Time: x\n");
    }

    #[test]
    fn output_format_inferred_from_extension() {
        assert_eq!(infer_format_from_path("out.HTML"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("out.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("out"), None);
        assert_eq!(OutputFormat::parse("txt"), Some(OutputFormat::Text));
    }
}
