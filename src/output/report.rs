use super::{items_table, Table, NO_DATA};
use crate::query::ListKind;
use crate::view::Screen;

/// Every server-sourced string goes through here before reaching markup.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped text with line breaks turned into `<br>`.
pub fn text_to_html(value: &str) -> String {
    escape_html(value).replace("\r\n", "\n").replace('\n', "<br>")
}

pub fn render_table_html(table: &Table) -> String {
    let mut out = String::new();
    out.push_str("<table class=\"table table-bordered\">\n  <thead><tr>");
    for h in &table.headers {
        out.push_str(&format!("<th>{}</th>", escape_html(h)));
    }
    out.push_str("</tr></thead>\n  <tbody>\n");
    if table.rows.is_empty() {
        out.push_str(&format!(
            "    <tr><td colspan=\"{}\">{}</td></tr>\n",
            table.headers.len().max(1),
            NO_DATA
        ));
    }
    for row in &table.rows {
        out.push_str("    <tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", text_to_html(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("  </tbody>\n</table>\n");
    out
}

fn render_document(title: &str, body: &str) -> Vec<u8> {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    table {{ border-collapse: collapse; }}
    th, td {{ border: 1px solid #ccc; padding: 0.25rem 0.5rem; vertical-align: top; }}
    .alert-danger {{ color: #842029; background: #f8d7da; padding: 0.5rem; }}
    .page-link.disabled {{ color: #999; }}
  </style>
</head>
<body>
<h1>{title}</h1>
{body}</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
    .into_bytes()
}

pub fn render_table_page(title: &str, table: &Table) -> Vec<u8> {
    render_document(title, &render_table_html(table))
}

pub fn render_text_page(title: &str, text: &str) -> Vec<u8> {
    render_document(title, &format!("<code>{}</code>\n", text_to_html(text)))
}

/// A list screen as a standalone page: banner, table, and navigation state.
pub fn render_screen_html(kind: ListKind, screen: &Screen, page: Option<u32>) -> Vec<u8> {
    let title = format!("Snort {}", kind.label());
    let mut body = String::new();
    if let Some(banner) = screen.banner.as_deref() {
        body.push_str(&format!(
            "<div class=\"alert alert-danger\" role=\"alert\">{}</div>\n",
            escape_html(banner)
        ));
    }
    if screen.banner.is_none() {
        body.push_str(&render_table_html(&items_table(kind, &screen.rows)));
    }
    if let Some(nav) = screen.nav {
        let control = |enabled: bool, label: &str| {
            if enabled {
                format!("<span class=\"page-link\">{label}</span>")
            } else {
                format!("<span class=\"page-link disabled\">{label}</span>")
            }
        };
        body.push_str("<nav>");
        body.push_str(&control(nav.has_prev, "Previous page"));
        if let Some(page) = page {
            body.push_str(&format!(" <span>page {page}</span> "));
        }
        body.push_str(&control(nav.has_next, "Next page"));
        body.push_str("</nav>\n");
    }
    render_document(&title, &body)
}
