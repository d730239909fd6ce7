//! Attribute Mapper (spec.md §4.1): pure, deterministic conversion from
//! Kubernetes unstructured data into the pipeline's `Logs` envelope.
//!
//! Grounded in `original_source/unstructured_to_logdata.go`'s
//! `unstructuredListToLogData` / `watchEventToLogData`, carried over
//! attribute-for-attribute, with the empty-list hazard resolved per
//! spec.md §9 (no `items[0]` indexing).

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use kobs_core::{AttributeValue, LogRecord, Logs, UnstructuredList, UnstructuredObject, WatchEvent};

/// Resource- and record-attribute key names the core produces, exactly
/// per spec.md §6.
pub const KIND_KEY: &str = "k8s.object.kind";
pub const API_VERSION_KEY: &str = "k8s.object.api_version";
pub const NAME_KEY: &str = "k8s.object.name";
pub const RESOURCE_VERSION_KEY: &str = "k8s.object.resource_version";
pub const NAMESPACE_KEY: &str = "k8s.namespace.name";

/// Watch-event body keys (spec.md §4.1: `{type: <event-type>, object: <full object>}`).
pub const EVENT_TYPE_KEY: &str = "type";
pub const EVENT_OBJECT_KEY: &str = "object";

/// `mapUnstructuredList` (spec.md §4.1). Returns `Logs` with zero
/// `ResourceLogs`/`LogRecord`s when `list.items` is empty — the
/// stricter resolution of spec.md §9's open question, since deriving
/// `k8s.object.kind` from an absent first item is unsound.
pub fn map_unstructured_list(list: &UnstructuredList) -> Logs {
    if list.items.is_empty() {
        return Logs::empty();
    }

    let mut resource_attributes = BTreeMap::new();
    resource_attributes.insert(KIND_KEY.to_string(), AttributeValue::from(list.items[0].kind()));
    resource_attributes.insert(API_VERSION_KEY.to_string(), AttributeValue::from(list.api_version.as_str()));

    let records = list
        .items
        .iter()
        .map(|item| {
            let mut attributes = BTreeMap::new();
            attributes.insert(NAME_KEY.to_string(), AttributeValue::from(item.name()));
            // The list's own resourceVersion is attached to every record, matching
            // the original implementation's `event.GetResourceVersion()` call inside
            // the per-item loop (not each item's own resourceVersion).
            attributes.insert(RESOURCE_VERSION_KEY.to_string(), AttributeValue::from(list.resource_version.as_str()));
            if let Some(ns) = item.namespace() {
                attributes.insert(NAMESPACE_KEY.to_string(), AttributeValue::from(ns));
            }
            LogRecord { attributes, body: AttributeValue::from(&item.0) }
        })
        .collect();

    Logs::single(resource_attributes, records)
}

/// `mapWatchEvent` (spec.md §4.1).
pub fn map_watch_event(event: &WatchEvent) -> Logs {
    let mut resource_attributes = BTreeMap::new();
    resource_attributes.insert(KIND_KEY.to_string(), AttributeValue::from(event.object.kind()));
    resource_attributes.insert(API_VERSION_KEY.to_string(), AttributeValue::from(event.object.api_version()));

    let mut attributes = BTreeMap::new();
    attributes.insert(NAME_KEY.to_string(), AttributeValue::from(event.object.name()));
    attributes.insert(RESOURCE_VERSION_KEY.to_string(), AttributeValue::from(event.object.resource_version()));
    if let Some(ns) = event.object.namespace() {
        attributes.insert(NAMESPACE_KEY.to_string(), AttributeValue::from(ns));
    }

    let mut body = BTreeMap::new();
    body.insert(EVENT_TYPE_KEY.to_string(), AttributeValue::from(event.event_type.as_str()));
    body.insert(EVENT_OBJECT_KEY.to_string(), AttributeValue::from(&event.object.0));

    Logs::single(resource_attributes, vec![LogRecord { attributes, body: AttributeValue::Map(body) }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use kobs_core::{UnstructuredObject, WatchEventType};
    use serde_json::json;

    fn pod(name: &str, ns: Option<&str>) -> UnstructuredObject {
        let mut meta = json!({ "name": name, "resourceVersion": "7" });
        if let Some(ns) = ns {
            meta["namespace"] = json!(ns);
        }
        UnstructuredObject::new(json!({
            "kind": "Pod",
            "apiVersion": "v1",
            "metadata": meta,
            "spec": { "containers": [{ "name": "app" }] },
        }))
    }

    #[test]
    fn empty_list_produces_no_records_and_no_resource_attrs() {
        let list = UnstructuredList { api_version: "v1".into(), resource_version: "1".into(), items: vec![] };
        let logs = map_unstructured_list(&list);
        assert_eq!(logs.record_count(), 0);
        assert!(logs.resource_logs.is_empty());
    }

    #[test]
    fn list_with_one_item_has_one_record_with_full_body() {
        let list = UnstructuredList {
            api_version: "v1".into(),
            resource_version: "99".into(),
            items: vec![pod("web-0", Some("default"))],
        };
        let logs = map_unstructured_list(&list);
        assert_eq!(logs.record_count(), 1);
        let rl = &logs.resource_logs[0];
        assert_eq!(rl.attributes[KIND_KEY], AttributeValue::from("Pod"));
        assert_eq!(rl.attributes[API_VERSION_KEY], AttributeValue::from("v1"));

        let record = &rl.scope_logs[0].log_records[0];
        assert_eq!(record.attributes[NAME_KEY], AttributeValue::from("web-0"));
        assert_eq!(record.attributes[RESOURCE_VERSION_KEY], AttributeValue::from("99"));
        assert_eq!(record.attributes[NAMESPACE_KEY], AttributeValue::from("default"));
        assert!(record.body.as_map().unwrap().contains_key("spec"));
    }

    #[test]
    fn cluster_scoped_item_omits_namespace_attribute() {
        let list = UnstructuredList {
            api_version: "v1".into(),
            resource_version: "1".into(),
            items: vec![pod("node-a", None)],
        };
        let logs = map_unstructured_list(&list);
        let record = &logs.resource_logs[0].scope_logs[0].log_records[0];
        assert!(!record.attributes.contains_key(NAMESPACE_KEY));
    }

    #[test]
    fn watch_event_wraps_type_and_full_object_in_body() {
        let event = WatchEvent::new(WatchEventType::Added, pod("x", Some("default")));
        let logs = map_watch_event(&event);
        assert_eq!(logs.record_count(), 1);
        let record = &logs.resource_logs[0].scope_logs[0].log_records[0];
        let body = record.body.as_map().unwrap();
        assert_eq!(body[EVENT_TYPE_KEY], AttributeValue::from("ADDED"));
        let obj = body[EVENT_OBJECT_KEY].as_map().unwrap();
        assert_eq!(obj["kind"], AttributeValue::from("Pod"));
        assert_eq!(record.attributes[NAME_KEY], AttributeValue::from("x"));
        assert_eq!(record.attributes[NAMESPACE_KEY], AttributeValue::from("default"));
    }

    #[test]
    fn watch_event_without_namespace_omits_attribute() {
        let event = WatchEvent::new(WatchEventType::Deleted, pod("cluster-thing", None));
        let logs = map_watch_event(&event);
        let record = &logs.resource_logs[0].scope_logs[0].log_records[0];
        assert!(!record.attributes.contains_key(NAMESPACE_KEY));
    }
}
