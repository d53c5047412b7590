//! Geometry chunk
//!
//! Triangles do not name their vertices. Each one lists three edges (its
//! edge ring) and corner `k` is the tail vertex of edge `ring[k]`. Edges in
//! turn name their head and tail vertices and the mirror edge running the
//! opposite way.

use ultraviolet::{
	rotor::Rotor3,
	vec::{
		Vec3,
		Vec4
	}
};

use rgk_core::{
	io_ext::ByteCursor,
	scene::vec4_to_rot3
};

use crate::chunk::{
	Chunk,
	Table
};

#[cfg(feature = "import")]
use crate::{
	chunk::NameTable,
	import::CpjImportError
};

pub const HEADER_SIZE: usize = 40;
pub const VERTEX_SIZE: usize = 28;
pub const EDGE_SIZE: usize = 12;
pub const TRI_SIZE: usize = 8;
pub const MOUNT_SIZE: usize = 60;
pub const OBJ_LINK_SIZE: usize = 2;

/// Edge index meaning "no mirror edge"
pub const NO_EDGE: u16 = 0xFFFF;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	pub vertices: Table,
	pub edges: Table,
	pub tris: Table,
	pub mounts: Table,
	pub obj_links: Table,
}

impl Header {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, at: usize) -> Result<Header, CpjImportError> {
		Ok(Header {
			vertices: Table::read(cursor, at)?,
			edges: Table::read(cursor, at + 8)?,
			tris: Table::read(cursor, at + 16)?,
			mounts: Table::read(cursor, at + 24)?,
			obj_links: Table::read(cursor, at + 32)?,
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
	pub flags: u8,
	/// Group index for vertex frame compression
	pub group_index: u8,
	pub reserved: u16,
	pub num_edge_links: u16,
	pub num_tri_links: u16,
	pub first_edge_link: u32,
	pub first_tri_link: u32,
	/// Reference position, as stored
	pub ref_position: Vec3,
}

impl Vertex {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, at: usize) -> Result<Vertex, CpjImportError> {
		Ok(Vertex {
			flags: cursor.read_u8_at(at)?,
			group_index: cursor.read_u8_at(at + 1)?,
			reserved: cursor.read_u16_at(at + 2)?,
			num_edge_links: cursor.read_u16_at(at + 4)?,
			num_tri_links: cursor.read_u16_at(at + 6)?,
			first_edge_link: cursor.read_u32_at(at + 8)?,
			first_tri_link: cursor.read_u32_at(at + 12)?,
			ref_position: cursor.read_vec3_at(at + 16)?,
		})
	}

	/// Reference position with the stored Y and Z components exchanged
	pub fn position(&self) -> Vec3 {
		swap_yz(self.ref_position)
	}
}

/// Maps a stored `(x, y, z)` to `(x, z, y)`
#[inline]
pub fn swap_yz(v: Vec3) -> Vec3 {
	Vec3::new(v.x, v.z, v.y)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	pub head_vertex: u16,
	pub tail_vertex: u16,
	pub inverted_edge: u16,
	pub num_tri_links: u16,
	pub first_tri_link: u32,
}

impl Edge {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, at: usize) -> Result<Edge, CpjImportError> {
		Ok(Edge {
			head_vertex: cursor.read_u16_at(at)?,
			tail_vertex: cursor.read_u16_at(at + 2)?,
			inverted_edge: cursor.read_u16_at(at + 4)?,
			num_tri_links: cursor.read_u16_at(at + 6)?,
			first_tri_link: cursor.read_u32_at(at + 8)?,
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
	pub edge_ring: [u16; 3],
	pub reserved: u16,
}

impl Triangle {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, at: usize) -> Result<Triangle, CpjImportError> {
		Ok(Triangle {
			edge_ring: [
				cursor.read_u16_at(at)?,
				cursor.read_u16_at(at + 2)?,
				cursor.read_u16_at(at + 4)?,
			],
			reserved: cursor.read_u16_at(at + 6)?,
		})
	}
}

/// Attachment point placed on a triangle by barycentric coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Mount {
	pub name: String,
	pub tri_index: u32,
	pub tri_barys: Vec3,
	pub base_scale: Vec3,
	/// Quaternion, vector part first
	pub base_rotate: Vec4,
	pub base_translate: Vec3,
}

impl Mount {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, names: &NameTable, at: usize) -> Result<Mount, CpjImportError> {
		Ok(Mount {
			name: names.name(cursor.read_u32_at(at)?)?,
			tri_index: cursor.read_u32_at(at + 4)?,
			tri_barys: cursor.read_vec3_at(at + 8)?,
			base_scale: cursor.read_vec3_at(at + 20)?,
			base_rotate: cursor.read_vec4_at(at + 32)?,
			base_translate: cursor.read_vec3_at(at + 48)?,
		})
	}

	pub fn rotation(&self) -> Rotor3 {
		vec4_to_rot3(self.base_rotate)
	}
}

/// Raw copy of a table the mesh does not need, kept so later tooling can
/// decode it without going back to the file
#[derive(Clone, Debug, PartialEq)]
pub struct ReservedRange {
	/// Absolute file offset of the first byte
	pub offset: usize,
	pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
	pub name: String,
	pub header: Header,
	pub vertices: Vec<Vertex>,
	pub edges: Vec<Edge>,
	pub tris: Vec<Triangle>,
	pub mounts: Vec<Mount>,
	pub obj_links: Vec<u16>,
	/// Resolved corner vertex indices, one entry per triangle in ring order
	pub faces: Vec<[usize; 3]>,
	pub reserved: Vec<ReservedRange>,
}

impl Geometry {
	#[cfg(feature = "import")]
	pub fn read(cursor: &ByteCursor, chunk: &Chunk, keep_reserved: bool) -> Result<Geometry, CpjImportError> {
		let header = Header::read(cursor, chunk.data_offset())?;
		let block = chunk.data_offset() + HEADER_SIZE;
		let names = NameTable::new(*cursor, block);

		let mut vertices = vec![];
		for i in 0..header.vertices.len() {
			vertices.push(Vertex::read(cursor, header.vertices.entry(block, i, VERTEX_SIZE))?);
		}

		let mut edges = vec![];
		for i in 0..header.edges.len() {
			let edge = Edge::read(cursor, header.edges.entry(block, i, EDGE_SIZE))?;
			check_index("vertex", edge.head_vertex as usize, vertices.len())?;
			check_index("vertex", edge.tail_vertex as usize, vertices.len())?;
			edges.push(edge);
		}

		let mut tris = vec![];
		for i in 0..header.tris.len() {
			tris.push(Triangle::read(cursor, header.tris.entry(block, i, TRI_SIZE))?);
		}

		let mut mounts = vec![];
		for i in 0..header.mounts.len() {
			mounts.push(Mount::read(cursor, &names, header.mounts.entry(block, i, MOUNT_SIZE))?);
		}

		let mut obj_links = vec![];
		for i in 0..header.obj_links.len() {
			obj_links.push(cursor.read_u16_at(header.obj_links.entry(block, i, OBJ_LINK_SIZE))?);
		}

		let faces = tris.iter()
			.map(|t| resolve_ring(&edges, t))
			.collect::<Result<Vec<_>, _>>()?;

		let mut reserved = vec![];
		if keep_reserved {
			for (table, size) in [(header.mounts, MOUNT_SIZE), (header.obj_links, OBJ_LINK_SIZE)] {
				if !table.is_empty() {
					let offset = table.entry(block, 0, size);
					reserved.push(ReservedRange {
						offset: offset,
						bytes: cursor.bytes_at(offset, table.byte_len(size))?.to_vec(),
					});
				}
			}
		}

		Ok(Geometry {
			name: chunk.name.clone(),
			header: header,
			vertices: vertices,
			edges: edges,
			tris: tris,
			mounts: mounts,
			obj_links: obj_links,
			faces: faces,
			reserved: reserved,
		})
	}

	/// Vertex positions in output axis order
	pub fn positions(&self, swap: bool) -> Vec<Vec3> {
		self.vertices.iter()
			.map(|v| if swap { v.position() } else { v.ref_position })
			.collect()
	}

	/// The edge running the opposite way along the same two vertices
	pub fn mirror(&self, edge: usize) -> Option<usize> {
		let inv = self.edges.get(edge)?.inverted_edge;
		if inv != NO_EDGE && (inv as usize) < self.edges.len() {
			Some(inv as usize)
		} else {
			None
		}
	}

	/// Edges linked to a vertex through the object link array
	pub fn vertex_edges(&self, vertex: usize) -> Option<&[u16]> {
		let v = self.vertices.get(vertex)?;
		self.links(v.first_edge_link, v.num_edge_links)
	}

	/// Triangles linked to a vertex through the object link array
	pub fn vertex_tris(&self, vertex: usize) -> Option<&[u16]> {
		let v = self.vertices.get(vertex)?;
		self.links(v.first_tri_link, v.num_tri_links)
	}

	/// Triangles linked to an edge through the object link array
	pub fn edge_tris(&self, edge: usize) -> Option<&[u16]> {
		let e = self.edges.get(edge)?;
		self.links(e.first_tri_link, e.num_tri_links)
	}

	fn links(&self, first: u32, count: u16) -> Option<&[u16]> {
		let start = first as usize;
		self.obj_links.get(start..start + count as usize)
	}
}

/// Corner `k` of a triangle is the tail vertex of edge `ring[k]`
#[cfg(feature = "import")]
pub fn resolve_ring(edges: &[Edge], tri: &Triangle) -> Result<[usize; 3], CpjImportError> {
	let mut corners = [0; 3];

	for (corner, e) in corners.iter_mut().zip(tri.edge_ring.iter()) {
		let edge = edges.get(*e as usize).ok_or(CpjImportError::IndexOutOfBounds {
			table: "edge",
			index: *e as usize,
			count: edges.len(),
		})?;
		*corner = edge.tail_vertex as usize;
	}

	Ok(corners)
}

#[cfg(feature = "import")]
fn check_index(table: &'static str, index: usize, count: usize) -> Result<(), CpjImportError> {
	if index < count {
		Ok(())
	} else {
		Err(CpjImportError::IndexOutOfBounds {
			table: table,
			index: index,
			count: count,
		})
	}
}
