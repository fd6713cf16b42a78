//! Address-annotated bank description tree.
//!
//! A small closed set of node kinds: sections group items, items place a
//! struct at an address, structs hold fields, array fields hold elements and
//! comments annotate a struct. The tree knows nothing about its text
//! encoding; [`xml`] renders it as XML and `serde` renders it as JSON.

pub mod xml;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use xml::{to_xml_string, write_xml};

/// Ordered attribute list. Insertion order is the output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.push((name.into(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Array length declaration for an array field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayLen {
    /// Length taken from a named count elsewhere in the bank.
    Var(String),
    /// Fixed length.
    Fixed(usize),
}

/// A pointer's target: the struct kind it points at and the index of the
/// target within its section (-1 for a null pointer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerTarget {
    pub ptrto: String,
    pub index: i32,
}

/// One node of the bank description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Section(Section),
    Item(Item),
    Struct(StructNode),
    Field(Field),
    Element(Element),
    Comment { text: String },
}

impl Node {
    pub fn comment(text: impl Into<String>) -> Self {
        Node::Comment { text: text.into() }
    }

    /// Tag name of the node; `None` for comments.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Section(section) => Some(section.tag.as_str()),
            Node::Item(_) => Some("item"),
            Node::Struct(_) => Some("struct"),
            Node::Field(_) => Some("field"),
            Node::Element(_) => Some("element"),
            Node::Comment { .. } => None,
        }
    }

    /// Attributes in output order.
    pub fn attributes(&self) -> Attributes {
        match self {
            Node::Section(section) => section.attrs.clone(),
            Node::Item(item) => {
                let mut attrs = Attributes::new();
                attrs.push("address", item.address);
                attrs.push("name", &item.name);
                attrs
            }
            Node::Struct(node) => {
                let mut attrs = Attributes::new();
                attrs.push("name", &node.name);
                for (key, value) in node.attrs.iter() {
                    attrs.push(key, value);
                }
                attrs
            }
            Node::Field(field) => field.attributes(),
            Node::Element(element) => element.attributes(),
            Node::Comment { .. } => Attributes::new(),
        }
    }

    /// Child nodes in output order.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Section(section) => section.children.as_slice(),
            Node::Item(item) => std::slice::from_ref(item.body.as_ref()),
            Node::Struct(node) => node.children.as_slice(),
            Node::Field(field) => field.children.as_slice(),
            Node::Element(element) => element.children.as_slice(),
            Node::Comment { .. } => &[],
        }
    }
}

/// A named container: the bank root or one of its sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Section {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.attrs.push(name, value);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }
}

/// A struct placed at a bank address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub address: u32,
    pub name: String,
    pub body: Box<Node>,
}

impl Item {
    pub fn new(address: u32, name: impl Into<String>, body: StructNode) -> Self {
        Self {
            address,
            name: name.into(),
            body: Box::new(Node::Struct(body)),
        }
    }
}

/// A struct instance: its type name, optional count attributes and fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructNode {
    pub name: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl StructNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.attrs.push(name, value);
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::comment(text));
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.children.push(Node::Field(field));
        self
    }

    /// Value of the named field, if present and scalar.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            Node::Field(field) if field.name == name => field.value.as_deref(),
            _ => None,
        })
    }
}

/// A named, typed struct member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub datatype: String,
    pub pointer: bool,
    pub ptrto: Option<String>,
    pub index: Option<i32>,
    pub array_len: Option<ArrayLen>,
    pub meaning: String,
    pub default_val: Option<String>,
    pub value: Option<String>,
    pub children: Vec<Node>,
}

impl Field {
    /// A scalar field.
    pub fn scalar(name: &str, datatype: &str, meaning: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            datatype: datatype.to_string(),
            pointer: false,
            ptrto: None,
            index: None,
            array_len: None,
            meaning: meaning.to_string(),
            default_val: None,
            value: Some(value.to_string()),
            children: Vec::new(),
        }
    }

    /// A `uint32` pointer field to `target` at `address`.
    pub fn pointer(name: &str, meaning: &str, address: u32, target: PointerTarget) -> Self {
        Self {
            pointer: true,
            ptrto: Some(target.ptrto),
            index: Some(target.index),
            ..Self::scalar(name, "uint32", meaning, address)
        }
    }

    /// An array field whose elements follow as children.
    pub fn array(name: &str, datatype: &str, meaning: &str, len: ArrayLen) -> Self {
        Self {
            array_len: Some(len),
            value: None,
            ..Self::scalar(name, datatype, meaning, "")
        }
    }

    /// A struct-typed scalar member with its body inline.
    pub fn inline(name: &str, body: StructNode, meaning: &str) -> Self {
        let datatype = body.name.clone();
        Self {
            value: None,
            children: vec![Node::Struct(body)],
            ..Self::scalar(name, &datatype, meaning, "")
        }
    }

    /// Marks the array as holding pointers to `ptrto`.
    pub fn of_pointers(mut self, ptrto: &str) -> Self {
        self.pointer = true;
        self.ptrto = Some(ptrto.to_string());
        self
    }

    /// Annotates a non-pointer value with the struct kind it refers to.
    pub fn refers_to(mut self, ptrto: &str) -> Self {
        self.ptrto = Some(ptrto.to_string());
        self
    }

    pub fn default_val(mut self, value: impl ToString) -> Self {
        self.default_val = Some(value.to_string());
        self
    }

    pub fn element(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    pub fn elements(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(elements.into_iter().map(Node::Element));
        self
    }

    fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.push("name", &self.name);
        attrs.push("datatype", &self.datatype);
        attrs.push("ispointer", u8::from(self.pointer));
        if let Some(ptrto) = &self.ptrto {
            attrs.push("ptrto", ptrto);
        }
        attrs.push("isarray", u8::from(self.array_len.is_some()));
        match &self.array_len {
            Some(ArrayLen::Var(var)) => attrs.push("arraylenvar", var),
            Some(ArrayLen::Fixed(len)) => attrs.push("arraylenfixed", len),
            None => {}
        }
        attrs.push("meaning", &self.meaning);
        if let Some(default) = &self.default_val {
            attrs.push("defaultval", default);
        }
        if let Some(value) = &self.value {
            attrs.push("value", value);
        }
        if let Some(index) = self.index {
            attrs.push("index", index);
        }
        attrs
    }
}

/// One entry of an array field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub datatype: String,
    pub pointer: Option<PointerTarget>,
    pub value: String,
    pub children: Vec<Node>,
}

impl Element {
    /// A plain value element.
    pub fn value(datatype: &str, value: impl ToString) -> Self {
        Self {
            datatype: datatype.to_string(),
            pointer: None,
            value: value.to_string(),
            children: Vec::new(),
        }
    }

    /// A `uint32` pointer element.
    pub fn pointer(address: u32, target: PointerTarget) -> Self {
        Self {
            pointer: Some(target),
            ..Self::value("uint32", address)
        }
    }

    /// A struct-typed element with its body inline.
    pub fn inline(body: StructNode) -> Self {
        let datatype = body.name.clone();
        Self {
            children: vec![Node::Struct(body)],
            ..Self::value(&datatype, 0)
        }
    }

    fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.push("datatype", &self.datatype);
        attrs.push("ispointer", u8::from(self.pointer.is_some()));
        if let Some(target) = &self.pointer {
            attrs.push("ptrto", &target.ptrto);
        }
        attrs.push("value", &self.value);
        if let Some(target) = &self.pointer {
            attrs.push("index", target.index);
        }
        attrs
    }
}

impl From<Section> for Node {
    fn from(section: Section) -> Self {
        Node::Section(section)
    }
}

impl From<Item> for Node {
    fn from(item: Item) -> Self {
        Node::Item(item)
    }
}

impl From<StructNode> for Node {
    fn from(node: StructNode) -> Self {
        Node::Struct(node)
    }
}

/// Formats a float so it always reads as one: `1.0`, not `1`.
pub fn format_float(value: f32) -> String {
    let text = value.to_string();
    if text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}
