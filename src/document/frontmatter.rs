/// Header delimiter. It must sit alone on its line.
pub const DELIMITER: &str = "---";

/// Ordered `key: value` header of a work document. Keys are case-sensitive;
/// a repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, String)>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the block between the first two `---` lines. A document that does
/// not open with the delimiter, or never closes it, has an empty header.
/// Lines without a `:` are skipped.
pub fn parse_frontmatter(content: &str) -> Frontmatter {
    let mut header = Frontmatter::default();
    let mut lines = content.lines().map(|line| line.trim_end_matches('\r'));

    if lines.next() != Some(DELIMITER) {
        return header;
    }

    let mut body = Vec::new();
    let mut closed = false;
    for line in lines {
        if line == DELIMITER {
            closed = true;
            break;
        }
        body.push(line);
    }
    if !closed {
        return header;
    }

    for line in body {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        header.insert(key, value.trim());
    }
    header
}
