/// Split a reply into chunks of at most `max_units` UTF-16 code units, the
/// unit Telegram counts message length in.
///
/// Breaks on line boundaries where possible; a single line longer than the
/// limit is hard-split between characters.
pub fn split_message(s: &str, max_units: usize) -> Vec<String> {
    // A surrogate pair must fit in one chunk.
    let max_units = max_units.max(2);
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for line in s.split('\n') {
        let line_len = utf16_len(line);
        let sep = usize::from(!cur.is_empty());

        if cur_len + sep + line_len <= max_units {
            if sep == 1 {
                cur.push('\n');
            }
            cur.push_str(line);
            cur_len += sep + line_len;
            continue;
        }

        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
            cur_len = 0;
        }

        if line_len <= max_units {
            cur.push_str(line);
            cur_len = line_len;
            continue;
        }

        for ch in line.chars() {
            if cur_len + ch.len_utf16() > max_units {
                out.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            cur.push(ch);
            cur_len += ch.len_utf16();
        }
    }

    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
