/// Selector options passed verbatim to the API (spec.md §4.2/§6).
#[derive(Debug, Clone, Default)]
pub struct ListOpts {
    pub label_selector: String,
    pub field_selector: String,
}

impl ListOpts {
    pub fn new(label_selector: impl Into<String>, field_selector: impl Into<String>) -> Self {
        Self { label_selector: label_selector.into(), field_selector: field_selector.into() }
    }
}
