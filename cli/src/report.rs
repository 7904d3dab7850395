//! Printable HTML report for a single battery record.

use std::fmt::Write;

use battag_record::timestamp::display_with;
use battag_record::{BatteryRecord, DeviceType, UsageEntry};
use chrono::{NaiveDateTime, Utc};

const STYLE: &str = r#"  :root { --fg:#000; --muted:#222; --line:#000; --bg:#fff; }
  * { box-sizing:border-box; }
  html, body { background:var(--bg); color:var(--fg); }
  body { margin:24px; font:12px/1.35 system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif; }
  h1 { margin:0 0 6px; font-size:16px; font-weight:700; }
  h2 { margin:14px 0 6px; font-size:13px; font-weight:700; }
  .grid { display:grid; grid-template-columns:160px 1fr 120px 1fr; gap:6px 10px; padding:8px; border:1px solid var(--line); }
  .k { color:var(--muted); text-align:right; }
  .code { font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace; }
  table { width:100%; border-collapse:collapse; }
  th,td { border-top:1px solid var(--line); padding:4px 6px; vertical-align:top; }
  thead th { text-align:left; border-top:none; font-size:11px; font-weight:700; }
  .num { text-align:right; font-variant-numeric:tabular-nums; }
  .muted { color:#444; }
  .foot { margin-top:8px; font-size:11px; color:#111; }
  .charger-row { background:#000; color:#fff; }
  @page { size: letter; margin: 0.5in; }
  @media print { body { margin:0; } * { -webkit-print-color-adjust: exact; print-color-adjust: exact; } }
"#;

const PRINT_SCRIPT: &str =
    "<script>window.addEventListener('load',function(){setTimeout(function(){window.print();},100);});</script>";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn device_label(entry: &UsageEntry) -> &'static str {
    entry.device().map(DeviceType::label).unwrap_or("Unknown")
}

fn render_usage_rows(record: &BatteryRecord, max_rows: usize) -> String {
    let rows = record.usage_newest_first();
    let hidden = rows.len().saturating_sub(max_rows);
    let mut out = String::new();

    for entry in rows.iter().take(max_rows) {
        let class = if entry.is_charger() {
            " class='charger-row'"
        } else {
            ""
        };
        let _ = write!(
            out,
            "<tr{}><td class='num'>{}</td><td>{}</td><td>{}</td><td class='num'>{}</td><td class='num'>{}</td></tr>",
            class,
            entry.i,
            escape_html(&display_with(&entry.t, &Utc)),
            device_label(entry),
            entry.e,
            entry.v,
        );
    }

    if rows.is_empty() {
        out.push_str("<tr><td colspan='5' class='muted'>No usage records.</td></tr>");
    }
    if hidden > 0 {
        let _ = write!(
            out,
            "<tr><td colspan='5' class='muted'>(+{} more not shown)</td></tr>",
            hidden
        );
    }

    out
}

/// Render the report. `generated_at` is printed as given.
pub fn render_report(
    record: &BatteryRecord,
    generated_at: NaiveDateTime,
    max_rows: usize,
) -> String {
    let sn = escape_html(&record.sn);
    let first_use = escape_html(&display_with(&record.fu, &Utc));
    let stats = record.summarize();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang='en'><head>\n<meta charset='utf-8' />\n");
    let _ = writeln!(html, "<title>Battery Report &mdash; {}</title>", sn);
    html.push_str("<meta name='viewport' content='width=device-width, initial-scale=1' />\n");
    let _ = writeln!(html, "<style>\n{}</style>", STYLE);
    html.push_str(PRINT_SCRIPT);
    html.push_str("\n</head>\n<body>\n<h1>Battery Report</h1>\n<div class='grid'>\n");

    let _ = writeln!(
        html,
        "  <div class='k'>Serial Number (sn):</div><div class='code'>{}</div>",
        sn
    );
    let _ = writeln!(
        html,
        "  <div class='k'>First Use (fu):</div><div>{}</div>",
        first_use
    );
    let _ = writeln!(
        html,
        "  <div class='k'>Cycle Count (cc):</div><div class='code'>{}</div>",
        record.cc
    );
    let _ = writeln!(
        html,
        "  <div class='k'>Note (n):</div><div class='code'>{} &mdash; {}</div>",
        record.n,
        record.note().label()
    );
    html.push_str("</div>\n\n");

    html.push_str("<h2>Usage</h2>\n<table>\n<thead>\n<tr>\n");
    html.push_str("<th style='width:48px'>#</th>\n<th style='width:160px'>Time</th>\n<th style='width:110px'>Device</th>\n");
    html.push_str("<th class='num' style='width:90px'>e</th>\n<th class='num' style='width:90px'>v</th>\n");
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    html.push_str(&render_usage_rows(record, max_rows));
    html.push_str("\n</tbody>\n</table>\n\n");

    html.push_str("<h2>Stats</h2>\n<div class='grid' style='grid-template-columns:160px 1fr 160px 1fr;'>\n");
    let _ = writeln!(
        html,
        "  <div class='k'>Robot records:</div><div class='code'>{}</div>",
        stats.robot
    );
    let _ = writeln!(
        html,
        "  <div class='k'>Charger records:</div><div class='code'>{}</div>",
        stats.charger
    );
    let _ = writeln!(
        html,
        "  <div class='k'>Total records (u):</div><div class='code'>{}</div>",
        stats.total
    );
    let _ = writeln!(
        html,
        "  <div class='k'>Generated:</div><div>{}</div>",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    html.push_str("</div>\n\n");
    html.push_str(
        "<div class='foot'>This report only represents the data currently stored on the NFC tag.</div>\n",
    );
    html.push_str("</body></html>");

    html
}
