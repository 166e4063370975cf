use crate::{MapError, Result};

/// A compound selector: optional tag, optional `#id`, any number of `.class`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl SimpleSelector {
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() || selector.contains(char::is_whitespace) {
            return Err(MapError::Dom(format!("unsupported selector '{selector}'")));
        }

        let mut parsed = SimpleSelector::default();
        let mut kind = None;
        let mut current = String::new();

        for ch in selector.chars().chain(std::iter::once('\0')) {
            if ch == '.' || ch == '#' || ch == '\0' {
                match kind {
                    None if !current.is_empty() => parsed.tag = Some(current.to_lowercase()),
                    Some('#') if !current.is_empty() => parsed.id = Some(current.clone()),
                    Some('.') if !current.is_empty() => parsed.classes.push(current.clone()),
                    None => {}
                    _ => return Err(MapError::Dom(format!("empty name in selector '{selector}'"))),
                }
                current.clear();
                kind = Some(ch);
            } else {
                current.push(ch);
            }
        }

        Ok(parsed)
    }

    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        self.tag.as_deref().map_or(true, |t| t.eq_ignore_ascii_case(tag))
            && self.id.as_deref().map_or(true, |want| id == Some(want))
            && self.classes.iter().all(|c| classes.contains(c))
    }
}
