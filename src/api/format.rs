use serde_json::{json, Map, Value};

use crate::schema::Record;

/// Convert one validated document into the public wire format
/// { id, type, attributes }
pub fn document_to_api_value(id: &str, resource_type: &str, record: &Record) -> Value {
    let mut obj = Map::new();
    obj.insert("id".into(), Value::String(id.to_string()));
    obj.insert("type".into(), Value::String(resource_type.to_string()));
    obj.insert("attributes".into(), Value::Object(build_attributes(record)));
    Value::Object(obj)
}

/// Wrap `data` with a self link: { links: { self }, data }
pub fn envelope(self_link: &str, data: Value) -> Value {
    json!({
        "links": { "self": self_link },
        "data": data
    })
}

pub fn document_envelope(self_link: &str, id: &str, resource_type: &str, record: &Record) -> Value {
    envelope(self_link, document_to_api_value(id, resource_type, record))
}

pub fn collection_envelope<'a, I>(self_link: &str, resource_type: &str, documents: I) -> Value
where
    I: IntoIterator<Item = (&'a str, &'a Record)>,
{
    let data = documents
        .into_iter()
        .map(|(id, record)| document_to_api_value(id, resource_type, record))
        .collect();
    envelope(self_link, Value::Array(data))
}

// `id` lives at the top of the envelope, never inside attributes
fn build_attributes(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .filter(|(k, _)| k.as_str() != "id")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
