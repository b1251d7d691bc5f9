/*!
format.rs - human output primitives for the wizard CLI.

Everything here returns strings; callers decide where to print. JSON output
paths never go through these helpers.

Environment:
  NO_COLOR   disable ANSI colors
  NO_EMOJI   drop emoji tags
  COLUMNS    table / box width (clamped to 40..=220, default 100)

API:
  StyleOptions::detect()
  color(role, text, &style)
  emoji(tag, &style)
  box_header(title, subtitle, &style)
  table(headers, rows, TableOpts, &style)
  truncate_ellipsis(s, max_chars)
*/

use std::borrow::Cow;

/* ---- Style ---- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No color, no emoji, fixed width.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Dim,
    Bold,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Dim => "2",
        Role::Bold => "1",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        "rocket" => "🚀",
        "wand" => "🪄",
        "list" => "📜",
        "save" => "💾",
        _ => "",
    }
}

/* ---- Box header ---- */

/// Rounded box around a title line and optional subtitle lines.
/// Long lines are cut with an ellipsis to fit the terminal width.
pub fn box_header(title: impl AsRef<str>, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let max_inner = style.term_width.saturating_sub(4).max(16);

    let mut body: Vec<(String, usize)> = Vec::new();
    let mut push = |text: &str, role: Role| {
        let cut = truncate_ellipsis(text, max_inner);
        let width = cut.chars().count();
        body.push((color(role, cut, style), width));
    };
    push(title.as_ref(), Role::Primary);
    if let Some(sub) = subtitle {
        for line in sub.lines() {
            push(line, Role::Secondary);
        }
    }

    let inner = body.iter().map(|(_, w)| *w).max().unwrap_or(0);
    let rule = "─".repeat(inner + 2);
    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(format!("╭{rule}╮"));
    for (text, width) in body {
        out.push(format!("│ {text}{} │", " ".repeat(inner - width)));
    }
    out.push(format!("╰{rule}╯"));
    out.join("\n")
}

/* ---- Table ---- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    /// 0 means the terminal width
    pub max_width: usize,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0,
            header_sep: true,
            min_col_width: 3,
        }
    }
}

/// Left-aligned columns separated by two spaces. When the table is too wide
/// the widest columns shrink first and their cells are cut with an ellipsis.
pub fn table(headers: &[&str], rows: &[Vec<String>], opts: TableOpts, style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let limit = match opts.max_width {
        0 => style.term_width,
        w => w.min(style.term_width),
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let gaps = (cols - 1) * 2;
    while widths.iter().sum::<usize>() + gaps > limit {
        let Some((idx, w)) = widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, w)| *w)
        else {
            break;
        };
        if w <= opts.min_col_width {
            break;
        }
        widths[idx] = w - 1;
    }

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(color(Role::Accent, render_line(headers, &widths), style));
    if opts.header_sep {
        let sep = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
        out.push(color(Role::Dim, sep, style));
    }
    for row in rows {
        let cells: Vec<&str> = (0..cols).map(|i| row.get(i).map(String::as_str).unwrap_or("")).collect();
        out.push(render_line(&cells, &widths));
    }
    out.join("\n")
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .zip(cells)
        .map(|(w, c)| fit(c, *w))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn fit(cell: &str, width: usize) -> String {
    let plain = strip_ansi(cell);
    let len = plain.chars().count();
    if len > width {
        return truncate_ellipsis(&plain, width);
    }
    format!("{cell}{}", " ".repeat(width - len))
}

/* ---- Text ---- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    match max_chars {
        0 => String::new(),
        1 => "…".into(),
        n => {
            let mut out: String = s.chars().take(n - 1).collect();
            out.push('…');
            out
        }
    }
}

/// Drop `ESC [ ... <letter>` sequences.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_header_aligns_lines() {
        let style = StyleOptions::plain();
        let b = box_header("Flag Wizard", Some("tool: sfdx\nlonger subtitle line"), &style);
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines.len(), 5);
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{b}");
        assert!(lines[1].contains("Flag Wizard"));
    }

    #[test]
    fn table_pads_and_shrinks() {
        let style = StyleOptions::plain();
        let rows = vec![
            vec!["-s".to_string(), "option".to_string(), "the API name of the object".to_string()],
            vec!["--json".to_string(), "boolean".to_string(), "format output as json".to_string()],
        ];
        let t = table(&["SWITCH", "KIND", "DESCRIPTION"], &rows, TableOpts::default(), &style);
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "SWITCH  KIND     DESCRIPTION");
        assert!(lines[2].starts_with("-s      option   the API"));

        let narrow = table(
            &["SWITCH", "KIND", "DESCRIPTION"],
            &rows,
            TableOpts {
                max_width: 30,
                ..TableOpts::default()
            },
            &style,
        );
        assert!(narrow.lines().all(|l| l.chars().count() <= 30), "{narrow}");
        assert!(narrow.contains('…'));
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_ellipsis("abc", 4), "abc");
        assert_eq!(truncate_ellipsis("abc", 0), "");
    }

    #[test]
    fn strip_ansi_removes_sequences() {
        assert_eq!(strip_ansi("\x1b[38;5;45mcyan\x1b[0m"), "cyan");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn plain_style_disables_decoration() {
        let style = StyleOptions::plain();
        assert_eq!(color(Role::Warning, "x", &style), "x");
        assert_eq!(emoji("rocket", &style), "");
    }
}
