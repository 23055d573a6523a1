use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::{KitError, Result};

const TYPE_KEY: &str = "Type";
const ITEM_KEY: &str = "Item";
const DATA_KEY: &str = "Data";
const VERSION_KEY: &str = "Ver";

/// Indentation used when writing a kit back to disk.
///
/// Generated variants have always been written with four spaces while the
/// in-place passes (migrate/substitute) used tabs, so both are kept.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Indent {
    Spaces,
    Tab,
}

impl Indent {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Indent::Spaces => b"    ",
            Indent::Tab => b"\t",
        }
    }
}

/// Moves an array under `Data` out of `fields` into typed nodes. The key
/// stays behind as a placeholder so it keeps its position; a non-array
/// `Data` (null, say) is left in `fields` as is.
fn take_children(fields: &mut Map<String, Value>) -> serde_json::Result<Option<Vec<Node>>> {
    let Some(slot) = fields.get_mut(DATA_KEY) else {
        return Ok(None);
    };
    if !slot.is_array() {
        return Ok(None);
    }
    serde_json::from_value(slot.take()).map(Some)
}

fn serialize_fields<S: Serializer>(
    fields: &Map<String, Value>,
    children: Option<&[Node]>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (key, value) in fields {
        match children {
            Some(children) if key == DATA_KEY => map.serialize_entry(key, children)?,
            _ => map.serialize_entry(key, value)?,
        }
    }
    map.end()
}

fn invalid(msg: &str) -> serde_json::Error {
    de::Error::custom(msg)
}

fn is_reserved(key: &str) -> bool {
    key == TYPE_KEY || key == ITEM_KEY || key == DATA_KEY
}

/// One piece of equipment, or a grouping container such as `Outfit`.
///
/// Every key of the source object is kept, in source order, with its value
/// untouched. `Type` must be a string. A string `Item` is the identifier and
/// an array `Data` holds the children; any other `Item` or `Data` value
/// (e.g. `null`) is carried through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    fields: Map<String, Value>,
    children: Option<Vec<Node>>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_KEY.to_string(), Value::String(kind.into()));
        Self {
            fields,
            children: None,
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> serde_json::Result<Self> {
        if !fields.get(TYPE_KEY).is_some_and(Value::is_string) {
            return Err(invalid("node is missing a string \"Type\""));
        }
        let children = take_children(&mut fields)?;
        Ok(Self { fields, children })
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.set_item(item);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.fields.entry(DATA_KEY).or_insert(Value::Null);
        self.children = Some(children);
        self
    }

    pub fn kind(&self) -> &str {
        self.fields
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The `Item` identifier, e.g. `PrimaryFirearm:BP_SVD_63`.
    pub fn item(&self) -> Option<&str> {
        self.fields.get(ITEM_KEY).and_then(Value::as_str)
    }

    /// Overwrites `Item` in place, or appends it when absent.
    pub fn set_item(&mut self, item: impl Into<String>) {
        self.fields
            .insert(ITEM_KEY.to_string(), Value::String(item.into()));
    }

    /// A missing `Data` key and an empty `Data` array both read as no children.
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        self.children.as_deref_mut().unwrap_or_default()
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Any raw value other than typed children, `Type` and `Item` included.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        if key == DATA_KEY && self.children.is_some() {
            return None;
        }
        self.fields.get(key)
    }

    /// Passthrough keys (everything but `Type`, `Item` and `Data`) in source
    /// order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| !is_reserved(key))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Sets a raw attribute. An existing key keeps its position. Setting
    /// `Data` this way drops any typed children.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key == DATA_KEY {
            self.children = None;
        }
        self.fields.insert(key, value.into());
    }

    /// Copies every key but the children, which are produced by `f`.
    pub(crate) fn map_children<F>(&self, f: F) -> Node
    where
        F: FnMut(&Node) -> Node,
    {
        Node {
            fields: self.fields.clone(),
            children: self
                .children
                .as_ref()
                .map(|children| children.iter().map(f).collect()),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_fields(&self.fields, self.children.as_deref(), serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Node::from_fields(fields).map_err(de::Error::custom)
    }
}

/// A whole kit file: `{"Ver": <int>, "Data": [<Node>, ...]}`, keys kept in
/// source order like [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    fields: Map<String, Value>,
    nodes: Vec<Node>,
}

impl Document {
    pub fn new(version: u32, nodes: Vec<Node>) -> Self {
        let mut fields = Map::new();
        fields.insert(VERSION_KEY.to_string(), Value::from(version));
        fields.insert(DATA_KEY.to_string(), Value::Null);
        Self { fields, nodes }
    }

    fn from_fields(mut fields: Map<String, Value>) -> serde_json::Result<Self> {
        let version_ok = fields
            .get(VERSION_KEY)
            .and_then(Value::as_u64)
            .is_some_and(|v| u32::try_from(v).is_ok());
        if !version_ok {
            return Err(invalid("kit is missing an integer \"Ver\""));
        }
        let nodes = take_children(&mut fields)?
            .ok_or_else(|| invalid("kit is missing a \"Data\" array"))?;
        Ok(Self { fields, nodes })
    }

    pub fn version(&self) -> u32 {
        self.fields
            .get(VERSION_KEY)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or_default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// A top-level key other than `Data`.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        if key == DATA_KEY {
            return None;
        }
        self.fields.get(key)
    }

    /// Same top-level keys, new version and nodes.
    pub(crate) fn with_nodes(&self, version: u32, nodes: Vec<Node>) -> Document {
        let mut fields = self.fields.clone();
        if self.version() != version {
            fields.insert(VERSION_KEY.to_string(), Value::from(version));
        }
        Document { fields, nodes }
    }

    pub fn from_json_str(src: &str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| KitError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| KitError::json(path, e))
    }

    /// Pretty JSON with the given indentation and a single trailing newline.
    pub fn to_json_bytes(&self, indent: Indent) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }

    pub fn to_json_string(&self, indent: Indent) -> serde_json::Result<String> {
        let bytes = self.to_json_bytes(indent)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn save(&self, path: &Path, indent: Indent) -> Result<()> {
        let bytes = self
            .to_json_bytes(indent)
            .map_err(|e| KitError::json(path, e))?;
        fs::write(path, bytes).map_err(|e| KitError::io(path, e))
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_fields(&self.fields, Some(self.nodes.as_slice()), serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Document::from_fields(fields).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Ver": 11,
        "Data": [
            {
                "Type": "Outfit",
                "Data": [
                    { "Type": "Shirt", "Item": "Shirt:BP_Shirt_Under", "Skin": "White" },
                    { "Type": "Pants", "Item": "Pants:BP_Pants_Cargo", "Skin": "Tan", "Data": [] }
                ]
            }
        ]
    }"#;

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn parses_known_fields_and_passthrough() {
        let doc = Document::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.version(), 11);
        let outfit = &doc.nodes()[0];
        assert_eq!(outfit.kind(), "Outfit");
        assert_eq!(outfit.item(), None);

        let shirt = &outfit.children()[0];
        assert_eq!(shirt.item(), Some("Shirt:BP_Shirt_Under"));
        assert_eq!(shirt.attribute("Skin"), Some(&Value::from("White")));
        assert!(!shirt.has_children());
    }

    #[test]
    fn absent_and_empty_data_survive_round_trip() {
        let doc = Document::from_json_str(SAMPLE).unwrap();
        let out = doc.to_json_string(Indent::Spaces).unwrap();
        let reparsed: Value = serde_json::from_str(&out).unwrap();

        let shirt = &reparsed["Data"][0]["Data"][0];
        let pants = &reparsed["Data"][0]["Data"][1];
        assert!(shirt.get("Data").is_none());
        assert_eq!(pants["Data"], Value::Array(vec![]));
    }

    #[test]
    fn null_item_and_data_are_written_back() {
        let src = r#"{"Ver":11,"Data":[{"Type":"Head","Item":null,"Data":null}]}"#;
        let doc = Document::from_json_str(src).unwrap();
        let head = &doc.nodes()[0];
        assert_eq!(head.item(), None);
        assert!(!head.has_children());

        let out: Value = serde_json::from_str(&doc.to_json_string(Indent::Tab).unwrap()).unwrap();
        let expected: Value = serde_json::from_str(src).unwrap();
        assert_eq!(out, expected);
        assert_eq!(keys(&out["Data"][0]), ["Type", "Item", "Data"]);
    }

    #[test]
    fn source_key_order_is_kept() {
        let src = r#"{
            "Data": [
                {
                    "Data": [ { "Skin": "Tan", "Item": "Shirt:BP_Shirt_ButtonUp", "Type": "Shirt" } ],
                    "Type": "Outfit"
                }
            ],
            "Ver": 11
        }"#;
        let doc = Document::from_json_str(src).unwrap();
        let out: Value = serde_json::from_str(&doc.to_json_string(Indent::Tab).unwrap()).unwrap();

        assert_eq!(keys(&out), ["Data", "Ver"]);
        assert_eq!(keys(&out["Data"][0]), ["Data", "Type"]);
        assert_eq!(keys(&out["Data"][0]["Data"][0]), ["Skin", "Item", "Type"]);
    }

    #[test]
    fn passthrough_attributes_keep_source_order() {
        let src = r#"{"Ver":11,"Data":[{"Type":"Head","Zeta":1,"Alpha":2,"Mid":3}]}"#;
        let doc = Document::from_json_str(src).unwrap();
        let keys: Vec<&str> = doc.nodes()[0].attributes().map(|(key, _)| key).collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn output_uses_requested_indent_and_trailing_newline() {
        let doc = Document::new(11, vec![Node::new("Head").with_item("Head:BP_Rebel_Head_02")]);

        let tabbed = doc.to_json_string(Indent::Tab).unwrap();
        assert!(tabbed.ends_with("}\n"));
        assert!(!tabbed.ends_with("\n\n"));
        assert!(tabbed.contains("\n\t\"Ver\": 11"));

        let spaced = doc.to_json_string(Indent::Spaces).unwrap();
        assert!(spaced.contains("\n    \"Ver\": 11"));
    }

    #[test]
    fn missing_type_is_an_error() {
        let src = r#"{"Ver":11,"Data":[{"Item":"Head:BP_Rebel_Head_01"}]}"#;
        assert!(Document::from_json_str(src).is_err());
    }

    #[test]
    fn missing_version_or_data_is_an_error() {
        assert!(Document::from_json_str(r#"{"Data":[]}"#).is_err());
        assert!(Document::from_json_str(r#"{"Ver":11}"#).is_err());
    }

    #[test]
    fn set_attribute_overwrites_in_place() {
        let mut node = Node::new("Shirt")
            .with_attribute("Skin", "White")
            .with_attribute("Extra", true);
        node.set_attribute("Skin", "Green");

        let keys: Vec<&str> = node.attributes().map(|(key, _)| key).collect();
        assert_eq!(keys, ["Skin", "Extra"]);
        assert_eq!(node.attribute("Skin"), Some(&Value::from("Green")));
    }
}
