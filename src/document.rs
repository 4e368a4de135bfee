//! A tiny append-only element tree and its XML serialization.
//!
//! The tree knows nothing about Nori. Callers are responsible for using tag
//! and attribute names the renderer understands.

use std::fmt::Write;

use scene_common::transform::WorldMatrix;
use ultraviolet::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<tag type="..."/>`, the shape of every Nori plugin element.
    pub fn typed(tag: impl Into<String>, plugin_type: impl Into<String>) -> Self {
        Self::new(tag).with_attr("type", plugin_type)
    }

    /// `<tag name="..." value="..."/>`
    pub fn entry(tag: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(tag)
            .with_attr("name", name)
            .with_attr("value", value)
    }

    /// Setting an attribute twice replaces the value but keeps its position.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(attribute) => attribute.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// First child with the given `name` attribute.
    pub fn named(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.attr("name") == Some(name))
    }

    fn write_xml(&self, out: &mut String, indent: usize) {
        let pad = "\t".repeat(indent);
        let _ = write!(out, "{pad}<{}", self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_xml_attr(value));
        }
        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            child.write_xml(out, indent + 1);
        }
        let _ = writeln!(out, "{pad}</{}>", self.tag);
    }
}

/// The output scene description, rooted at `<scene>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Element::new("scene"),
        }
    }

    pub fn push(&mut self, element: Element) {
        self.root.push_child(element);
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" ?>\n");
        self.root.write_xml(&mut out, 0);
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `%f` formatting, six decimals.
pub fn format_float(value: f32) -> String {
    format!("{:.6}", value)
}

/// Comma separated triple, used by `color` and `point` values.
pub fn format_rgb(value: [f32; 3]) -> String {
    format!("{:.6},{:.6},{:.6}", value[0], value[1], value[2])
}

pub fn format_point(value: Vec3) -> String {
    format_rgb([value.x, value.y, value.z])
}

/// Space separated triple, used by transform sub-elements such as `scale`.
pub fn format_vector(value: Vec3) -> String {
    format!("{:.6} {:.6} {:.6}", value.x, value.y, value.z)
}

/// 16 comma separated values, row-major.
pub fn format_matrix(matrix: &WorldMatrix) -> String {
    matrix
        .values()
        .map(format_float)
        .collect::<Vec<_>>()
        .join(",")
}
