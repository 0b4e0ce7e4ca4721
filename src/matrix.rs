//! Support matrix table scanner
//!
//! The Talos documentation publishes the support matrix as an HTML table:
//! a header row of Talos versions, then one row per component. The
//! Kubernetes row lists the supported Kubernetes versions in each column.
//! This module walks the raw markup as a stream of tag/text events and
//! collects the versions at the intersection of the Kubernetes row and the
//! column whose header matches the requested Talos version.
//!
//! The page is untrusted input: a structurally absent table, a missing
//! header column or a malformed row all yield an empty set, never an error.
//! Emptiness is the caller's signal to fall back to another source.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<!--.*?-->").unwrap());

/// Version numbers like "1.30" inside free-form cell text
static CELL_VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b1\.(\d+)").unwrap());

/// Kubernetes versions below this minor are end-of-life and never allowed
const MIN_K8S_MINOR: u32 = 30;

/// Scan support matrix markup for the Kubernetes versions supported by the
/// given Talos minor version.
///
/// Returns the empty set when the markup has no table, no header column for
/// the version, or no Kubernetes row - the caller treats that as "try the
/// next source", not as an error.
pub fn scan_support_matrix(html: &str, talos_minor: &str) -> BTreeSet<u32> {
    // Script and style bodies may contain stray angle brackets that would
    // desynchronize the tag walk; drop them up front.
    let content = SCRIPT_RE.replace_all(html, "");
    let content = STYLE_RE.replace_all(&content, "");
    let content = COMMENT_RE.replace_all(&content, "");

    let mut scanner = MatrixScanner::new(talos_minor);
    for_each_event(&content, |event| scanner.handle(event));
    scanner.versions
}

/// One markup event produced by the tokenizer
enum Event<'a> {
    Open(String),
    Close(String),
    Text(&'a str),
}

/// Walk the markup, invoking `handle` for every tag-open, tag-close and
/// text event. Tag names are lowercased; self-closing tags produce an open
/// immediately followed by a close. Attribute values are skipped without
/// interpretation (a quoted `>` does not terminate the tag).
fn for_each_event<'a>(html: &'a str, mut handle: impl FnMut(Event<'a>)) {
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        if lt > 0 {
            handle(Event::Text(&rest[..lt]));
        }
        rest = &rest[lt..];

        let Some(gt) = find_tag_end(rest) else {
            // Unterminated tag; nothing structured can follow.
            return;
        };
        let tag = &rest[1..gt];
        rest = &rest[gt + 1..];

        if let Some(name) = tag.strip_prefix('/') {
            handle(Event::Close(tag_name(name)));
        } else if !tag.starts_with('!') && !tag.starts_with('?') {
            let name = tag_name(tag);
            let self_closing = tag.ends_with('/');
            handle(Event::Open(name.clone()));
            if self_closing {
                handle(Event::Close(name));
            }
        }
    }
    if !rest.is_empty() {
        handle(Event::Text(rest));
    }
}

/// Index of the `>` terminating the tag that starts at the beginning of
/// `s`, ignoring any `>` inside quoted attribute values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn tag_name(tag: &str) -> String {
    tag.split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Decode the handful of entities that show up in table cells
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Explicit state for the table walk.
///
/// The interesting invariant is the per-table reset: a documentation page
/// may contain several unrelated tables, and the header column index found
/// in one must not leak into the next. `header_seen` and `talos_col` are
/// cleared on every `</table>`.
struct MatrixScanner<'a> {
    talos_minor: &'a str,
    versions: BTreeSet<u32>,

    in_table: bool,
    in_row: bool,
    in_cell: bool,
    row_cells: Vec<String>,
    cell_text: Vec<String>,

    talos_col: Option<usize>,
    header_seen: bool,
}

impl<'a> MatrixScanner<'a> {
    fn new(talos_minor: &'a str) -> Self {
        Self {
            talos_minor,
            versions: BTreeSet::new(),
            in_table: false,
            in_row: false,
            in_cell: false,
            row_cells: Vec::new(),
            cell_text: Vec::new(),
            talos_col: None,
            header_seen: false,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Open(name) => match name.as_str() {
                "table" => self.in_table = true,
                "tr" if self.in_table => {
                    self.in_row = true;
                    self.row_cells.clear();
                }
                "td" | "th" if self.in_row => {
                    self.in_cell = true;
                    self.cell_text.clear();
                }
                _ => {}
            },
            Event::Close(name) => match name.as_str() {
                "table" => {
                    self.in_table = false;
                    self.header_seen = false;
                    self.talos_col = None;
                }
                "tr" if self.in_row => {
                    let cells = std::mem::take(&mut self.row_cells);
                    self.process_row(&cells);
                    self.in_row = false;
                }
                "td" | "th" if self.in_cell => {
                    self.row_cells.push(self.cell_text.join(" "));
                    self.in_cell = false;
                }
                _ => {}
            },
            Event::Text(text) => {
                if self.in_cell {
                    let text = decode_entities(text);
                    let text = text.trim();
                    if !text.is_empty() {
                        self.cell_text.push(text.to_string());
                    }
                }
            }
        }
    }

    fn process_row(&mut self, cells: &[String]) {
        if cells.is_empty() {
            return;
        }

        // First row in a table is its header - find the Talos version column
        if !self.header_seen {
            let bare = self.talos_minor.strip_prefix('v').unwrap_or(self.talos_minor);
            let prefixed = format!("v{}", bare);
            for (i, cell) in cells.iter().enumerate() {
                if cell == bare || cell == &prefixed {
                    log::info!("found Talos {} column at index {}", bare, i);
                    self.talos_col = Some(i);
                    break;
                }
            }
            self.header_seen = true;
            return;
        }

        let Some(col) = self.talos_col else {
            return;
        };

        let first = cells[0].to_lowercase();
        if !first.contains("kubernetes") && !first.contains("k8s") {
            return;
        }

        if let Some(cell) = cells.get(col) {
            log::info!("Kubernetes row found, Talos {} cell: {}", self.talos_minor, cell);
            let mut found = 0usize;
            for captures in CELL_VERSION_RE.captures_iter(cell) {
                if let Ok(minor) = captures[1].parse::<u32>()
                    && minor >= MIN_K8S_MINOR
                {
                    self.versions.insert(minor);
                    found += 1;
                }
            }
            if found == 0 {
                log::warn!("no valid Kubernetes versions (>= 1.{}) in cell", MIN_K8S_MINOR);
            }
        }
    }
}
