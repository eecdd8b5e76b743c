use serde_json::Value;

use terminal_size::{terminal_size, Height, Width};

/// Print an API result: an ASCII table when the value is a list of records, JSON otherwise
/// (or always, when `force_json` is set).
pub fn print_result(val: &Value, force_json: bool) {
    if !force_json {
        let termw = get_terminal_width();
        crate::tprintln!("[cli.outputformatter] detected terminal width={} columns", termw);
        if let Some(lines) = render_table(val, termw) {
            for l in lines { println!("{}", l); }
            return;
        }
    }
    let s = serde_json::to_string_pretty(val).unwrap_or_else(|_| val.to_string());
    println!("{}", s);
}

/// Render a list of records (or a `{ "<name>": [..] }` wrapper around one) as table lines.
/// Returns None for shapes that are not tabular or have no rows.
pub fn render_table(val: &Value, termw: usize) -> Option<Vec<String>> {
    let arr = match val {
        Value::Array(a) => a,
        Value::Object(map) if map.len() == 1 => map.values().next()?.as_array()?,
        _ => return None,
    };
    if arr.is_empty() { return None; }
    let (cols, rows) = table_from_array(arr);

    let cell_cap = termw.max(8);
    let mut widths: Vec<usize> = cols.iter().map(|s| s.chars().count().min(cell_cap)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = cell.chars().count();
            if w > widths[i] { widths[i] = w.min(cell_cap); }
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 5);
    let sep = build_separator(&widths);
    out.push(fit_line_to_width(&sep, termw));
    out.push(fit_line_to_width(&build_row_header_colored(&cols, &widths), termw));
    out.push(fit_line_to_width(&sep, termw));
    for r in &rows {
        out.push(fit_line_to_width(&build_row(r, &widths), termw));
    }
    out.push(fit_line_to_width(&sep, termw));
    out.push(format!("rows: {}, cols: {}", rows.len(), cols.len()));
    Some(out)
}

// Objects become one row each over the union of their keys, in first-seen order with `id`
// first; scalars become a single `value` column.
fn table_from_array(arr: &[Value]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut keys: Vec<String> = Vec::new();
    let mut all_objects = true;
    for el in arr {
        match el {
            Value::Object(map) => {
                for k in map.keys() {
                    if !keys.contains(k) { keys.push(k.clone()); }
                }
            }
            _ => all_objects = false,
        }
    }
    if !all_objects || keys.is_empty() {
        let rows = arr.iter().map(|el| vec![to_cell_string(el)]).collect();
        return (vec!["value".to_string()], rows);
    }
    if let Some(pos) = keys.iter().position(|k| k == "id") {
        let id = keys.remove(pos);
        keys.insert(0, id);
    }
    let rows = arr
        .iter()
        .map(|el| keys.iter().map(|k| el.get(k).map(to_cell_string).unwrap_or_default()).collect())
        .collect();
    (keys, rows)
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // nested records show their most human field
        Value::Object(map) => ["name", "full_name", "code", "username"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|x| x.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| v.to_string()),
        Value::Array(items) => items.iter().map(to_cell_string).collect::<Vec<_>>().join(", "),
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let (text, align_right) = (truncate(&cell, *w), is_numeric_like(&cell));
        let pad = w.saturating_sub(visible_len(&text));
        s.push(' ');
        if align_right {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

// Header row with column names colored green. Padding follows visible width.
fn build_row_header_colored(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        s.push(' ');
        s.push_str(&format!("\x1b[32m{}\x1b[0m", text));
        s.push_str(&" ".repeat(w.saturating_sub(visible_len(&text))));
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}

// --- Terminal fitting & ANSI helpers ---

fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), Height(_h))) if w > 4 => (w - 4) as usize,
        _ => 80,
    }
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if visible_len(s) <= maxw { return s.to_string(); }
    elide_end_preserving_ansi(s, maxw)
}

fn visible_len(s: &str) -> usize {
    let mut count = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // CSI: ESC [ ... final letter
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() { break; }
            }
            continue;
        }
        count += 1;
    }
    count
}

fn elide_end_preserving_ansi(s: &str, maxw: usize) -> String {
    let budget = maxw.saturating_sub(1);
    let mut out = String::new();
    let mut shown = 0usize;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            out.push(ch);
            for c in chars.by_ref() {
                out.push(c);
                if c.is_ascii_alphabetic() { break; }
            }
            continue;
        }
        if shown >= budget { break; }
        out.push(ch);
        shown += 1;
    }
    out.push('…');
    // reset color in case an escape sequence was cut
    out.push_str("\x1b[0m");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_render_with_id_first_and_nested_names() {
        let v = json!([
            {"weekday": 1, "id": 7, "course": {"id": 3, "name": "Algebra"}},
            {"weekday": 3, "id": 8, "course": null}
        ]);
        let lines = render_table(&v, 200).unwrap();
        assert!(visible_len(&lines[1]) > 0);
        assert!(lines[1].find("id").unwrap() < lines[1].find("weekday").unwrap());
        assert!(lines[3].contains("Algebra"));
        assert_eq!(lines.last().unwrap(), "rows: 2, cols: 3");
    }

    #[test]
    fn non_tabular_values_fall_back() {
        assert!(render_table(&json!({"status": "ok", "count": 2}), 80).is_none());
        assert!(render_table(&json!([]), 80).is_none());
        assert!(render_table(&json!("x"), 80).is_none());
    }

    #[test]
    fn single_key_wrapper_is_unwrapped() {
        let lines = render_table(&json!({"menus": [{"key": "home", "path": "/student/dashboard"}]}), 200).unwrap();
        assert!(lines[3].contains("/student/dashboard"));
    }

    #[test]
    fn scalars_use_value_column() {
        let lines = render_table(&json!(["ADMIN", "TEACHER"]), 80).unwrap();
        assert!(lines[1].contains("value"));
        assert!(lines[4].contains("TEACHER"));
    }

    #[test]
    fn long_lines_are_fitted() {
        let v = json!([{"id": 1, "description": "x".repeat(300)}]);
        for l in render_table(&v, 40).unwrap() {
            assert!(visible_len(&l) <= 40, "{}", l);
        }
    }

    #[test]
    fn ansi_is_invisible() {
        assert_eq!(visible_len("\x1b[32mabc\x1b[0m"), 3);
        assert!(is_numeric_like("12.5"));
        assert!(!is_numeric_like("A101"));
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
