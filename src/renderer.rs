use crate::aggregator::AggregatedEntry;

const HEADER: &str = "| Time | Title | Feed | IsNew | IsToday |\n|-----------|-----|-----|-----|-----|\n";

/// Formats ranked entries as a markdown table
pub struct Renderer {
    reader_url: String,
    max_title_length: usize,
}

impl Renderer {
    pub fn new(reader_url: &str, max_title_length: usize) -> Self {
        Self {
            reader_url: reader_url.to_string(),
            max_title_length,
        }
    }

    pub fn render(&self, entries: &[AggregatedEntry]) -> String {
        let mut out = String::from(HEADER);
        for entry in entries {
            self.render_row(&mut out, entry);
        }
        out
    }

    fn render_row(&self, out: &mut String, entry: &AggregatedEntry) {
        let feeds = entry
            .feeds
            .iter()
            .map(|f| format!("[{}]({})", f.tag, f.url))
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "| {} | [{}]({}{}) | {} | {} | {} |\n",
            entry.pub_date,
            sanitize_title(&entry.title, self.max_title_length),
            self.reader_url,
            entry.guid,
            feeds,
            yes_or_blank(entry.is_new),
            yes_or_blank(entry.is_today),
        ));
    }
}

fn yes_or_blank(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        ""
    }
}

/// Make a title safe for a markdown table cell and link text.
///
/// Line breaks become spaces and `|`, `[`, `]` are backslash-escaped. A
/// result longer than `max_len` characters is cut to `max_len` and gets a
/// trailing `...`.
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    let mut clean = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            '\n' | '\r' => clean.push(' '),
            '|' | '[' | ']' => {
                clean.push('\\');
                clean.push(c);
            }
            _ => clean.push(c),
        }
    }

    match clean.char_indices().nth(max_len) {
        Some((cut, _)) => {
            clean.truncate(cut);
            clean.push_str("...");
            clean
        }
        None => clean,
    }
}
