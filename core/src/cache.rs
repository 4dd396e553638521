use std::collections::HashMap;
use std::rc::Rc;

use crate::lookup::PreviewPayload;

/// Preview payloads keyed by resolved path, kept for the lifetime of the page.
/// The first payload stored for a path wins.
#[derive(Debug, Default)]
pub struct PreviewCache {
    entries: HashMap<String, Rc<PreviewPayload>>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Rc<PreviewPayload>> {
        self.entries.get(path).cloned()
    }

    pub fn put(&mut self, path: &str, payload: PreviewPayload) -> Rc<PreviewPayload> {
        self.entries
            .entry(path.to_string())
            .or_insert_with(|| Rc::new(payload))
            .clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> PreviewPayload {
        PreviewPayload {
            title: title.to_string(),
            content: format!("<p>{title}</p>"),
        }
    }

    #[test]
    fn put_is_write_once() {
        let mut cache = PreviewCache::new();
        cache.put("notes/x", payload("first"));
        let kept = cache.put("notes/x", payload("second"));
        assert_eq!(kept.title, "first");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("notes/x").map(|p| p.title.clone()).as_deref(), Some("first"));
    }

    #[test]
    fn miss_returns_none() {
        let cache = PreviewCache::new();
        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());
    }
}
