use serde_json::Value;

/// A schema-free representation of a single Kubernetes object (spec.md
/// §3's "UnstructuredObject"): a mapping from string to scalar / nested
/// mapping / nested sequence. `serde_json::Value` already models exactly
/// that shape, so this is a thin wrapper adding the conventional
/// accessors (`kind`, `apiVersion`, `name`, `namespace`,
/// `resourceVersion`) spec.md calls out, rather than a distinct value
/// representation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredObject(pub Value);

impl UnstructuredObject {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    fn str_field(&self, path: &[&str]) -> &str {
        let mut cur = &self.0;
        for key in path {
            match cur.get(key) {
                Some(v) => cur = v,
                None => return "",
            }
        }
        cur.as_str().unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.str_field(&["kind"])
    }

    pub fn api_version(&self) -> &str {
        self.str_field(&["apiVersion"])
    }

    pub fn name(&self) -> &str {
        self.str_field(&["metadata", "name"])
    }

    pub fn namespace(&self) -> Option<&str> {
        match self.str_field(&["metadata", "namespace"]) {
            "" => None,
            ns => Some(ns),
        }
    }

    pub fn resource_version(&self) -> &str {
        self.str_field(&["metadata", "resourceVersion"])
    }
}

/// A listed collection of objects, as returned by `ResourceClient::list`.
/// `api_version`/`kind` describe the *list* envelope itself (e.g.
/// `PodList`), distinct from each item's own `kind`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnstructuredList {
    pub api_version: String,
    pub resource_version: String,
    pub items: Vec<UnstructuredObject>,
}
