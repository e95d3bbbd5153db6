/// Rendered content of one listed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub markdown: String,
}

impl Page {
    pub fn new(url: String, markdown: String) -> Self {
        Self { url, markdown }
    }
}
