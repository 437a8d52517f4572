// Dweve idfkit - EnergyPlus Model Toolkit
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Tabular report parser for `eplustbl.htm`.
//!
//! Each table is preceded by `Report:` and `For:` paragraphs and a bold
//! title. The first row holds column headers and the first cell of every
//! other row holds the row label.

use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::OnceLock;

/// One table from the HTML report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    pub title: String,
    pub report_name: String,
    pub for_string: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Rows keyed by label, each mapping column header to cell value.
    ///
    /// Rows without a label are skipped. Empty when the table has no
    /// labelled rows.
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for row in &self.rows {
            let Some((label, cells)) = row.split_first() else {
                continue;
            };
            if label.is_empty() {
                continue;
            }
            let mut columns = Map::new();
            for (i, cell) in cells.iter().enumerate() {
                let column = self
                    .header
                    .get(i + 1)
                    .filter(|h| !h.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("Column {}", i + 1));
                columns.insert(column, Value::String(cell.clone()));
            }
            out.insert(label.clone(), Value::Object(columns));
        }
        out
    }
}

/// All tables in a report, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlReport {
    pub tables: Vec<HtmlTable>,
}

impl HtmlReport {
    pub fn parse(html: &str) -> Self {
        let mut tables = Vec::new();
        let mut report_name = String::new();
        let mut for_string = String::new();
        let mut title = String::new();

        for caps in token_regex().captures_iter(html) {
            if let Some(m) = caps.name("report") {
                report_name = clean_text(m.as_str());
            } else if let Some(m) = caps.name("for") {
                for_string = clean_text(m.as_str());
            } else if let Some(m) = caps.name("title") {
                title = clean_text(m.as_str());
            } else if let Some(m) = caps.name("table") {
                let mut rows = parse_rows(m.as_str());
                if rows.is_empty() {
                    continue;
                }
                let header = rows.remove(0);
                tables.push(HtmlTable {
                    title: std::mem::take(&mut title),
                    report_name: report_name.clone(),
                    for_string: for_string.clone(),
                    header,
                    rows,
                });
            }
        }
        Self { tables }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::parse(&crate::read_output_text(path)?))
    }

    /// First table with this title, case-insensitive.
    pub fn table(&self, title: &str) -> Option<&HtmlTable> {
        self.tables
            .iter()
            .find(|t| t.title.eq_ignore_ascii_case(title))
    }

    /// Tables belonging to a report, case-insensitive.
    pub fn tables_for_report<'a>(&'a self, report: &'a str) -> impl Iterator<Item = &'a HtmlTable> {
        self.tables
            .iter()
            .filter(move |t| t.report_name.eq_ignore_ascii_case(report))
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)<p>\s*Report:\s*<b>(?P<report>.*?)</b>|<p>\s*For:\s*<b>(?P<for>.*?)</b>|<b>(?P<title>[^<]*)</b>\s*<br\s*/?>\s*<br\s*/?>|<table[^>]*>(?P<table>.*?)</table>",
        )
        .expect("valid static regex")
    })
}

fn row_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("valid static regex")
    })
}

fn cell_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<t[dh][^>]*>(.*?)</t[dh]>")
            .expect("valid static regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid static regex"))
}

fn parse_rows(table: &str) -> Vec<Vec<String>> {
    row_regex()
        .captures_iter(table)
        .map(|row| {
            cell_regex()
                .captures_iter(&row[1])
                .map(|cell| clean_text(&cell[1]))
                .collect()
        })
        .collect()
}

fn clean_text(raw: &str) -> String {
    let text = tag_regex().replace_all(raw, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
