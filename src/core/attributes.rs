//! Typed attribute values carried by attribute-set events.
//!
//! Values arrive as strings tagged with a type; vectors are whitespace or comma
//! separated components (`"1 2 3"`, `"0.5,0.5,0.5,1"`).

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::color_to_vec4;
use super::error::{Result, SpaceError};
use super::identity::{LinkId, NodeId};
use super::scene::SpaceScene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Boolean,
    Int,
    Float,
    Vec3,
    Vec4,
    String,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::Boolean => "boolean",
            AttributeType::Int => "int",
            AttributeType::Float => "float",
            AttributeType::Vec3 => "vec3",
            AttributeType::Vec4 => "vec4",
            AttributeType::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Boolean(bool),
    Int(i64),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    String(String),
}

impl AttributeValue {
    /// Parse `raw` as a value of type `ty`. `None` when the text does not fit the type.
    pub fn parse(ty: AttributeType, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match ty {
            AttributeType::Boolean => parse_bool(raw).map(AttributeValue::Boolean),
            AttributeType::Int => raw.parse().ok().map(AttributeValue::Int),
            AttributeType::Float => raw.parse().ok().map(AttributeValue::Float),
            AttributeType::Vec3 => {
                let c = parse_components::<3>(raw)?;
                Some(AttributeValue::Vec3(Vec3::from_array(c)))
            }
            AttributeType::Vec4 => {
                let c = parse_components::<4>(raw)?;
                Some(AttributeValue::Vec4(Vec4::from_array(c)))
            }
            AttributeType::String => Some(AttributeValue::String(raw.to_string())),
        }
    }

    pub fn ty(&self) -> AttributeType {
        match self {
            AttributeValue::Boolean(_) => AttributeType::Boolean,
            AttributeValue::Int(_) => AttributeType::Int,
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::Vec3(_) => AttributeType::Vec3,
            AttributeValue::Vec4(_) => AttributeType::Vec4,
            AttributeValue::String(_) => AttributeType::String,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_components<const N: usize>(raw: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

pub fn vec4_to_color(v: Vec4) -> Color {
    Color::srgba(v.x, v.y, v.z, v.w)
}

pub fn vec3_to_color(v: Vec3) -> Color {
    Color::srgb(v.x, v.y, v.z)
}

fn ignored(kind: &'static str, name: &str, ty: AttributeType) -> SpaceError {
    SpaceError::InvalidAttribute {
        kind,
        name: name.to_string(),
        ty: ty.to_string(),
    }
}

impl SpaceScene {
    /// Apply a typed node attribute. Unknown name/type pairs and malformed values
    /// are rejected with `InvalidAttribute` and leave the node unchanged.
    pub fn set_node_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        ty: AttributeType,
        raw: &str,
    ) -> Result<()> {
        let node = self.node_mut(id)?;
        let value = AttributeValue::parse(ty, raw).ok_or_else(|| ignored("node", name, ty))?;

        match (name, value) {
            ("space:locked", AttributeValue::Boolean(locked)) => node.locked = locked,
            ("space:position" | "particles:position", AttributeValue::Vec3(p)) => node.position = p,
            ("space:color", AttributeValue::Vec3(c)) => node.color = vec3_to_color(c),
            ("space:color", AttributeValue::Vec4(c)) => node.color = vec4_to_color(c),
            ("space:lod", AttributeValue::Float(lod)) => node.lod = lod,
            ("space:activity", AttributeValue::Float(activity)) => node.activity = activity,
            ("space:icon", AttributeValue::String(icon)) => node.icon = Some(icon),
            _ => return Err(ignored("node", name, ty)),
        }
        Ok(())
    }

    /// Read back a node attribute by name. `Ok(None)` for names the view does not expose.
    pub fn node_attribute(&self, id: NodeId, name: &str) -> Result<Option<AttributeValue>> {
        let node = self.node(id)?;
        Ok(match name {
            "position" => Some(AttributeValue::Vec3(node.position)),
            "color" => Some(AttributeValue::Vec4(color_to_vec4(node.color))),
            "locked" => Some(AttributeValue::Boolean(node.locked)),
            "activity" => Some(AttributeValue::Float(node.activity)),
            _ => None,
        })
    }

    /// Apply a typed link attribute. `space:color` paints both ends,
    /// `space:color1`/`space:color2` paint one end each.
    pub fn set_link_attribute(
        &mut self,
        id: LinkId,
        name: &str,
        ty: AttributeType,
        raw: &str,
    ) -> Result<()> {
        let link = self.link_mut(id)?;
        let value = AttributeValue::parse(ty, raw).ok_or_else(|| ignored("link", name, ty))?;

        match (name, value) {
            ("space:color", AttributeValue::Vec3(c)) => link.colors = [vec3_to_color(c); 2],
            ("space:color", AttributeValue::Vec4(c)) => link.colors = [vec4_to_color(c); 2],
            ("space:color1", AttributeValue::Vec4(c)) => link.colors[0] = vec4_to_color(c),
            ("space:color2", AttributeValue::Vec4(c)) => link.colors[1] = vec4_to_color(c),
            ("space:activity", AttributeValue::Float(activity)) => link.activity = activity,
            ("space:lod", AttributeValue::Float(lod)) => link.lod = lod,
            _ => return Err(ignored("link", name, ty)),
        }
        Ok(())
    }

    pub fn link_attribute(&self, id: LinkId, name: &str) -> Result<Option<AttributeValue>> {
        let link = self.link(id)?;
        Ok(match name {
            "activity" => Some(AttributeValue::Float(link.activity)),
            "color1" => Some(AttributeValue::Vec4(color_to_vec4(link.colors[0]))),
            "color2" => Some(AttributeValue::Vec4(color_to_vec4(link.colors[1]))),
            _ => None,
        })
    }
}
