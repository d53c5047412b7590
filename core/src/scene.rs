use std::collections::HashMap;

use ultraviolet::{
	rotor::Rotor3,
	vec::{
		Vec2,
		Vec3,
		Vec4
	}
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatPropValueID {
	Alpha,
	Bump,
	Diffuse,
	Displacement,
	Emission,
	Metallic,
	Normal,
	Reflective,
	Roughness,
	Specular,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MatPropValue {
	Float(f32),
	Text(String),
	Vector2(Vec2),
	Vector3(Vec3),
	Vector4(Vec4),
}

/// [`HashMap`] type alias for material properties
pub type MaterialPropertyMap = HashMap<MatPropValueID, MatPropValue>;

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	pub properties: MaterialPropertyMap,
	pub shader: Option<String>,
}

impl Material {
	pub fn new(name: impl Into<String>) -> Material {
		Material {
			name: name.into(),
			properties: MaterialPropertyMap::new(),
			shader: None,
		}
	}

	/// Creates a material whose only property is a flat diffuse color
	pub fn with_color(name: impl Into<String>, color: Vec4) -> Material {
		let mut mat = Material::new(name);
		mat.properties.insert(MatPropValueID::Diffuse, MatPropValue::Vector4(color));
		mat
	}

	pub fn diffuse(&self) -> Option<Vec4> {
		match self.properties.get(&MatPropValueID::Diffuse) {
			Some(MatPropValue::Vector4(c)) => Some(*c),
			Some(MatPropValue::Vector3(c)) => Some(Vec4::new(c.x, c.y, c.z, 1.0)),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpAxis {
	Y,
	Z,
}

/// A triangle referencing mesh positions by index.
///
/// `uvs` holds one coordinate per corner, in the same order as `indices`,
/// so seams do not require splitting vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
	pub indices: [usize; 3],
	pub material: Option<usize>,
	pub uvs: Option<[Vec2; 3]>,
}

impl Face {
	pub fn new(indices: [usize; 3]) -> Face {
		Face {
			indices: indices,
			material: None,
			uvs: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
	pub name: String,
	pub positions: Vec<Vec3>,
	pub faces: Vec<Face>,
}

impl Mesh {
	pub fn new(name: impl Into<String>) -> Mesh {
		Mesh {
			name: name.into(),
			positions: vec![],
			faces: vec![],
		}
	}

	pub fn has_uvs(&self) -> bool {
		!self.faces.is_empty() && self.faces.iter().all(|f| f.uvs.is_some())
	}

	pub fn has_materials(&self) -> bool {
		self.faces.iter().any(|f| f.material.is_some())
	}

	/// Returns a list of face indices holding the specified position index
	pub fn find_vertex_faces(&self, vert: usize) -> Vec<usize> {
		self.faces.iter()
			.enumerate()
			.filter(|(_, f)| f.indices.contains(&vert))
			.map(|(i, _)| i)
			.collect()
	}
}

pub fn vec4_to_rot3(v: Vec4) -> Rotor3 {
	Rotor3::from_quaternion_array([v.x, v.y, v.z, v.w])
}
