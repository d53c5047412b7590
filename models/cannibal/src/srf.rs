use bitflags::bitflags;

use ultraviolet::vec::Vec2;

use rgk_core::io_ext::ByteCursor;

use crate::chunk::{
	Chunk,
	Table
};

#[cfg(feature = "import")]
use crate::{
	chunk::NameTable,
	geo::Geometry,
	import::CpjImportError
};

pub const HEADER_SIZE: usize = 24;
pub const TEXTURE_SIZE: usize = 8;
pub const TRI_SIZE: usize = 16;
pub const UV_SIZE: usize = 8;

/// Joins a texture name and its reference name into one label
pub const REF_NAME_SEPARATOR: &str = "___";

bitflags! {
	pub struct TriFlags: u32 {
		const INACTIVE = 0x1;
		const HIDDEN = 0x2;
		/// Ignored when computing vertex normals
		const VNIGNORE = 0x4;
		const TRANSPARENT = 0x8;
		const UNLIT = 0x20;
		const TWO_SIDED = 0x40;
		const MASKING = 0x80;
		const MODULATED = 0x100;
		const ENV_MAP = 0x200;
		const NON_COLLIDE = 0x400;
		const TEX_BLEND = 0x800;
		const Z_LATER = 0x1000;
		const RESERVED = 0x10000;
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
pub enum GlazeFunc {
	None = 0,
	Specular,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	pub textures: Table,
	pub tris: Table,
	pub uvs: Table,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
	pub name: String,
	pub ref_name: Option<String>,
}

impl Texture {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, names: &NameTable, at: usize) -> Result<Texture, CpjImportError> {
		let name = names.name(cursor.read_u32_at(at)?)?;
		let ref_name = match cursor.read_u32_at(at + 4)? {
			0 => None,
			ofs => Some(names.name(ofs)?),
		};

		Ok(Texture {
			name: name,
			ref_name: ref_name,
		})
	}

	/// Material label, `name___refname` when a reference name is present
	pub fn label(&self) -> String {
		match &self.ref_name {
			Some(r) => format!("{}{}{}", self.name, REF_NAME_SEPARATOR, r),
			None => self.name.clone(),
		}
	}
}

/// Per-triangle surface attributes, kept exactly as stored
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
	pub uv_index: [u16; 3],
	pub tex_index: u8,
	pub reserved: u8,
	pub flags: u32,
	pub smooth_group: u8,
	pub alpha_level: u8,
	pub glaze_tex_index: u8,
	pub glaze_func: u8,
}

impl Triangle {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, at: usize) -> Result<Triangle, CpjImportError> {
		Ok(Triangle {
			uv_index: [
				cursor.read_u16_at(at)?,
				cursor.read_u16_at(at + 2)?,
				cursor.read_u16_at(at + 4)?,
			],
			tex_index: cursor.read_u8_at(at + 6)?,
			reserved: cursor.read_u8_at(at + 7)?,
			flags: cursor.read_u32_at(at + 8)?,
			smooth_group: cursor.read_u8_at(at + 12)?,
			alpha_level: cursor.read_u8_at(at + 13)?,
			glaze_tex_index: cursor.read_u8_at(at + 14)?,
			glaze_func: cursor.read_u8_at(at + 15)?,
		})
	}

	/// Known flag bits. Unknown bits remain available in `flags`.
	pub fn tri_flags(&self) -> TriFlags {
		TriFlags::from_bits_truncate(self.flags)
	}

	pub fn glaze(&self) -> Option<GlazeFunc> {
		match self.glaze_func {
			0 => Some(GlazeFunc::None),
			1 => Some(GlazeFunc::Specular),
			_ => None,
		}
	}
}

/// Converts a top-left origin UV to bottom-left origin
#[inline]
pub fn flip_v(uv: Vec2) -> Vec2 {
	Vec2::new(uv.x, 1.0 - uv.y)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
	pub name: String,
	pub header: Header,
	pub textures: Vec<Texture>,
	pub tris: Vec<Triangle>,
	/// UV table as stored, V not yet flipped
	pub uvs: Vec<Vec2>,
}

impl Surface {
	/// Decodes a surface chunk for `geometry`. Triangle `i` of the surface
	/// describes triangle `i` of the geometry, so the counts must agree.
	#[cfg(feature = "import")]
	pub fn read(cursor: &ByteCursor, chunk: &Chunk, geometry: &Geometry) -> Result<Surface, CpjImportError> {
		let at = chunk.data_offset();
		let header = Header {
			textures: Table::read(cursor, at)?,
			tris: Table::read(cursor, at + 8)?,
			uvs: Table::read(cursor, at + 16)?,
		};

		if header.tris.len() != geometry.tris.len() {
			return Err(CpjImportError::GeometryMismatch {
				name: chunk.name.clone(),
				geometry: geometry.tris.len(),
				surface: header.tris.len(),
			});
		}

		let block = at + HEADER_SIZE;
		let names = NameTable::new(*cursor, block);

		let mut textures = vec![];
		for i in 0..header.textures.len() {
			textures.push(Texture::read(cursor, &names, header.textures.entry(block, i, TEXTURE_SIZE))?);
		}

		let mut uvs = vec![];
		for i in 0..header.uvs.len() {
			uvs.push(cursor.read_vec2_at(header.uvs.entry(block, i, UV_SIZE))?);
		}

		let mut tris = vec![];
		for i in 0..header.tris.len() {
			let tri = Triangle::read(cursor, header.tris.entry(block, i, TRI_SIZE))?;
			for uv in tri.uv_index.iter() {
				if *uv as usize >= uvs.len() {
					return Err(CpjImportError::IndexOutOfBounds {
						table: "uv",
						index: *uv as usize,
						count: uvs.len(),
					});
				}
			}
			tris.push(tri);
		}

		Ok(Surface {
			name: chunk.name.clone(),
			header: header,
			textures: textures,
			tris: tris,
			uvs: uvs,
		})
	}

	/// Material labels in slot order
	pub fn labels(&self) -> Vec<String> {
		self.textures.iter().map(|t| t.label()).collect()
	}

	/// UVs of triangle `tri`'s corners, in the geometry's ring order
	pub fn corner_uvs(&self, tri: usize, flip: bool) -> Option<[Vec2; 3]> {
		let t = self.tris.get(tri)?;
		let mut out = [Vec2::zero(); 3];

		for (corner, index) in out.iter_mut().zip(t.uv_index.iter()) {
			let uv = *self.uvs.get(*index as usize)?;
			*corner = if flip { flip_v(uv) } else { uv };
		}

		Some(out)
	}
}
