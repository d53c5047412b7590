//! Writers for synthetic CPJ files used by the tests

use byteorder::{
	LE,
	WriteBytesExt
};

pub const TIMESTAMP: u32 = 0x5EED_0001;

/// Wraps chunks in a RIFF/CPJB file header
pub fn file(chunks: &[Vec<u8>]) -> Vec<u8> {
	let body: usize = chunks.iter().map(|c| c.len()).sum();
	let mut out = vec![];

	out.extend_from_slice(b"RIFF");
	out.write_u32::<LE>((body + 4) as u32).unwrap();
	out.extend_from_slice(b"CPJB");
	for chunk in chunks.iter() {
		out.extend_from_slice(chunk);
	}

	out
}

/// Builds a chunk from its kind-specific data. The name, if any, is stored
/// after the data and the payload is padded to an even length.
pub fn chunk(magic: &[u8; 4], version: u32, name: Option<&str>, data: &[u8]) -> Vec<u8> {
	let name_bytes = match name {
		Some(n) => {
			let mut b = n.as_bytes().to_vec();
			b.push(0);
			b
		},
		None => vec![],
	};
	let name_offset = if name.is_some() { 20 + data.len() as u32 } else { 0 };
	let length = 12 + data.len() + name_bytes.len();

	let mut out = vec![];
	out.extend_from_slice(magic);
	out.write_u32::<LE>(length as u32).unwrap();
	out.write_u32::<LE>(version).unwrap();
	out.write_u32::<LE>(TIMESTAMP).unwrap();
	out.write_u32::<LE>(name_offset).unwrap();
	out.extend_from_slice(data);
	out.extend_from_slice(&name_bytes);
	if length % 2 == 1 {
		out.push(0);
	}

	out
}

/// Data block under construction. Strings are collected separately and
/// appended after the tables by [`Block::finish`].
#[derive(Default)]
pub struct Block {
	tables: Vec<u8>,
	strings: Vec<(usize, String)>,
}

impl Block {
	pub fn offset(&self) -> u32 {
		self.tables.len() as u32
	}

	pub fn u8(&mut self, v: u8) {
		self.tables.write_u8(v).unwrap();
	}

	pub fn u16(&mut self, v: u16) {
		self.tables.write_u16::<LE>(v).unwrap();
	}

	pub fn u32(&mut self, v: u32) {
		self.tables.write_u32::<LE>(v).unwrap();
	}

	pub fn f32(&mut self, v: f32) {
		self.tables.write_f32::<LE>(v).unwrap();
	}

	/// Writes a placeholder offset that will point at `s` once finished
	pub fn name(&mut self, s: &str) {
		self.strings.push((self.tables.len(), s.to_string()));
		self.u32(0);
	}

	pub fn finish(mut self) -> Vec<u8> {
		let mut out = self.tables.clone();

		for (at, s) in self.strings.drain(..) {
			let ofs = out.len() as u32;
			out[at..at + 4].copy_from_slice(&ofs.to_le_bytes());
			out.extend_from_slice(s.as_bytes());
			out.push(0);
		}

		out
	}
}

/// Prefixes a finished block with its count/offset sub-header
pub fn with_header(tables: &[(usize, u32)], block: Vec<u8>) -> Vec<u8> {
	let mut out = vec![];
	for (count, offset) in tables.iter() {
		out.write_u32::<LE>(*count as u32).unwrap();
		out.write_u32::<LE>(*offset).unwrap();
	}
	out.extend_from_slice(&block);
	out
}

pub fn mac(name: &str, sections: &[(&str, &[&str])]) -> Vec<u8> {
	let mut block = Block::default();
	let num_commands: usize = sections.iter().map(|(_, c)| c.len()).sum();

	let ofs_sections = block.offset();
	let mut first = 0;
	for (section, commands) in sections.iter() {
		block.name(section);
		block.u32(commands.len() as u32);
		block.u32(first);
		first += commands.len() as u32;
	}

	let ofs_commands = block.offset();
	for (_, commands) in sections.iter() {
		for command in commands.iter() {
			block.name(command);
		}
	}

	let data = with_header(&[(sections.len(), ofs_sections), (num_commands, ofs_commands)],
		block.finish());
	chunk(b"MACB", 1, Some(name), &data)
}

#[derive(Clone, Debug, Default)]
pub struct GeoVert {
	pub flags: u8,
	pub group: u8,
	pub edge_links: (u16, u32),
	pub tri_links: (u16, u32),
	pub pos: [f32; 3],
}

impl GeoVert {
	pub fn at(pos: [f32; 3]) -> GeoVert {
		GeoVert {
			pos: pos,
			..GeoVert::default()
		}
	}
}

#[derive(Clone, Debug)]
pub struct GeoMount {
	pub name: &'static str,
	pub tri: u32,
	pub barys: [f32; 3],
	pub scale: [f32; 3],
	pub rotate: [f32; 4],
	pub translate: [f32; 3],
}

#[derive(Clone, Debug, Default)]
pub struct Geo {
	pub vertices: Vec<GeoVert>,
	/// head, tail, inverted edge
	pub edges: Vec<[u16; 3]>,
	pub tris: Vec<[u16; 3]>,
	pub mounts: Vec<GeoMount>,
	pub obj_links: Vec<u16>,
}

impl Geo {
	pub fn data(&self) -> Vec<u8> {
		let mut block = Block::default();

		let ofs_verts = block.offset();
		for v in self.vertices.iter() {
			block.u8(v.flags);
			block.u8(v.group);
			block.u16(0);
			block.u16(v.edge_links.0);
			block.u16(v.tri_links.0);
			block.u32(v.edge_links.1);
			block.u32(v.tri_links.1);
			for c in v.pos.iter() {
				block.f32(*c);
			}
		}

		let ofs_edges = block.offset();
		for e in self.edges.iter() {
			block.u16(e[0]);
			block.u16(e[1]);
			block.u16(e[2]);
			block.u16(2);
			block.u32(0);
		}

		let ofs_tris = block.offset();
		for t in self.tris.iter() {
			for e in t.iter() {
				block.u16(*e);
			}
			block.u16(0);
		}

		let ofs_mounts = block.offset();
		for m in self.mounts.iter() {
			block.name(m.name);
			block.u32(m.tri);
			for c in m.barys.iter().chain(m.scale.iter()).chain(m.rotate.iter()).chain(m.translate.iter()) {
				block.f32(*c);
			}
		}

		let ofs_links = block.offset();
		for l in self.obj_links.iter() {
			block.u16(*l);
		}

		with_header(&[
			(self.vertices.len(), ofs_verts),
			(self.edges.len(), ofs_edges),
			(self.tris.len(), ofs_tris),
			(self.mounts.len(), ofs_mounts),
			(self.obj_links.len(), ofs_links),
		], block.finish())
	}

	pub fn chunk(&self, name: &str) -> Vec<u8> {
		chunk(b"GEOB", 1, Some(name), &self.data())
	}
}

/// Quad in the file's y = 0 plane, split into two triangles. Each triangle
/// ring lists the edges ending at its corners.
pub fn quad() -> Geo {
	Geo {
		vertices: vec![
			GeoVert::at([0.0, 0.0, 0.0]),
			GeoVert::at([1.0, 0.0, 0.0]),
			GeoVert::at([1.0, 0.0, 1.0]),
			GeoVert::at([0.0, 0.0, 1.0]),
		],
		edges: vec![
			[2, 0, 4],
			[0, 1, 0xFFFF],
			[1, 2, 0xFFFF],
			[3, 0, 0xFFFF],
			[0, 2, 0],
			[2, 3, 0xFFFF],
		],
		tris: vec![[0, 1, 2], [3, 4, 5]],
		..Geo::default()
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SrfTri {
	pub uvs: [u16; 3],
	pub tex: u8,
	pub flags: u32,
	pub smooth: u8,
	pub alpha: u8,
	pub glaze_tex: u8,
	pub glaze_func: u8,
}

impl SrfTri {
	pub fn uvs(uvs: [u16; 3]) -> SrfTri {
		SrfTri {
			uvs: uvs,
			..SrfTri::default()
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct Srf {
	pub textures: Vec<(&'static str, Option<&'static str>)>,
	pub tris: Vec<SrfTri>,
	pub uvs: Vec<[f32; 2]>,
}

impl Srf {
	pub fn data(&self) -> Vec<u8> {
		let mut block = Block::default();

		let ofs_textures = block.offset();
		for (name, ref_name) in self.textures.iter() {
			block.name(name);
			match ref_name {
				Some(r) => block.name(r),
				None => block.u32(0),
			}
		}

		let ofs_tris = block.offset();
		for t in self.tris.iter() {
			for uv in t.uvs.iter() {
				block.u16(*uv);
			}
			block.u8(t.tex);
			block.u8(0);
			block.u32(t.flags);
			block.u8(t.smooth);
			block.u8(t.alpha);
			block.u8(t.glaze_tex);
			block.u8(t.glaze_func);
		}

		let ofs_uvs = block.offset();
		for uv in self.uvs.iter() {
			block.f32(uv[0]);
			block.f32(uv[1]);
		}

		with_header(&[
			(self.textures.len(), ofs_textures),
			(self.tris.len(), ofs_tris),
			(self.uvs.len(), ofs_uvs),
		], block.finish())
	}

	pub fn chunk(&self, name: &str) -> Vec<u8> {
		chunk(b"SRFB", 1, Some(name), &self.data())
	}
}

/// Single "skin" texture, every triangle mapped to (0,0)-(1,0)-(1,1)
pub fn skin(tris: usize) -> Srf {
	Srf {
		textures: vec![("skin", None)],
		tris: vec![SrfTri::uvs([0, 1, 2]); tris],
		uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
	}
}
