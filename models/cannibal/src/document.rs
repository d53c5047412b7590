//! Assembles decoded chunks into a host-independent document.
//!
//! Chunks are framed once, then handled in four passes regardless of their
//! order in the file: actor configuration, geometry, surface, and finally
//! everything else. Only the first geometry and the first surface are used.

use tracing::{
	debug,
	info,
	warn
};

use rgk_core::{
	fourcc,
	scene::{
		Face,
		Material,
		Mesh,
		UpAxis
	}
};

use crate::{
	chunk::{
		Chunk,
		ChunkKind,
		Framer
	},
	geo::Geometry,
	import::{
		CpjImportError,
		CpjWarning
	},
	mac::{
		ActorConfig,
		Section
	},
	srf::Surface,
	ImportCfg,
	ImportFlag
};

/// A recognized chunk whose payload was skipped
#[derive(Clone, Debug, PartialEq)]
pub struct Placeholder {
	pub kind: ChunkKind,
	pub name: String,
	pub offset: usize,
	pub length: u32,
	pub timestamp: u32,
}

impl From<&Chunk> for Placeholder {
	fn from(chunk: &Chunk) -> Self {
		Placeholder {
			kind: chunk.kind,
			name: chunk.name.clone(),
			offset: chunk.offset,
			length: chunk.header.length,
			timestamp: chunk.header.timestamp,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Model {
	pub mesh: Mesh,
	pub geometry: Geometry,
	/// Surface attributes, index aligned with `geometry.tris`
	pub surface: Option<Surface>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
	pub model: Option<Model>,
	/// One material per surface texture, in slot order
	pub materials: Vec<Material>,
	/// Command sections of every actor configuration chunk, in file order
	pub sections: Vec<Section>,
	pub placeholders: Vec<Placeholder>,
	pub warnings: Vec<CpjWarning>,
	pub up: UpAxis,
}

impl Document {
	pub fn section(&self, name: &str) -> Option<&Section> {
		self.sections.iter().find(|s| s.name == name)
	}
}

/// Decodes a CPJ file held in memory using the default configuration
pub fn decode(data: &[u8]) -> Result<Document, CpjImportError> {
	decode_with(data, &ImportCfg::default())
}

pub fn decode_with(data: &[u8], cfg: &ImportCfg) -> Result<Document, CpjImportError> {
	let framer = Framer::new(data)?;
	let cursor = framer.cursor();
	let chunks = framer.chunks().collect::<Result<Vec<_>, _>>()?;

	debug!(chunks = chunks.len(), length = framer.header().length, "Framed CPJ file");

	let mut warnings = vec![];

	// Pass 1: actor configuration
	let mut sections = vec![];
	for chunk in chunks.iter().filter(|c| c.kind == ChunkKind::Mac) {
		let mac = ActorConfig::read(&cursor, chunk)?;
		debug!(chunk = %chunk.name, sections = mac.sections.len(), commands = mac.command_count(), "Decoded actor configuration");

		for section in mac.sections.iter() {
			info!(chunk = %chunk.name, section = %section.name, commands = section.commands.len(), "Command section");
		}
		sections.extend(mac.sections);
	}

	// Pass 2: geometry
	let mut geometry: Option<Geometry> = None;
	for chunk in chunks.iter().filter(|c| c.kind == ChunkKind::Geo) {
		if geometry.is_some() {
			duplicate(&mut warnings, chunk);
			continue;
		}

		let geo = Geometry::read(&cursor, chunk, cfg.flags.contains(ImportFlag::KEEP_RESERVED))?;
		debug!(
			chunk = %chunk.name,
			vertices = geo.vertices.len(),
			edges = geo.edges.len(),
			tris = geo.tris.len(),
			mounts = geo.mounts.len(),
			obj_links = geo.obj_links.len(),
			"Decoded geometry"
		);
		geometry = Some(geo);
	}

	// Pass 3: surface, matched against the geometry
	let mut surface: Option<Surface> = None;
	for chunk in chunks.iter().filter(|c| c.kind == ChunkKind::Srf) {
		let geo = match &geometry {
			Some(g) => g,
			None => {
				let w = CpjWarning::OrphanSurface {
					name: chunk.name.clone(),
				};
				warn!(chunk = %chunk.name, "{}", w);
				warnings.push(w);
				continue;
			},
		};

		if surface.is_some() {
			duplicate(&mut warnings, chunk);
			continue;
		}

		let srf = Surface::read(&cursor, chunk, geo)?;
		debug!(
			chunk = %chunk.name,
			textures = srf.textures.len(),
			tris = srf.tris.len(),
			uvs = srf.uvs.len(),
			"Decoded surface"
		);
		surface = Some(srf);
	}

	// Pass 4: placeholders and anything unknown
	let mut placeholders = vec![];
	for chunk in chunks.iter() {
		match chunk.kind {
			ChunkKind::Mac | ChunkKind::Geo | ChunkKind::Srf => {},
			ChunkKind::Unsupported { magic, version } => {
				return Err(CpjImportError::UnsupportedChunk {
					magic: magic,
					version: version,
					name: chunk.name.clone(),
				});
			},
			kind => {
				info!(chunk = %chunk.name, magic = %fourcc(kind.magic()), "{} chunk not decoded", kind.description());
				placeholders.push(Placeholder::from(chunk));
			},
		}
	}

	let materials = match &surface {
		Some(s) => s.labels().into_iter().map(|l| Material::with_color(l, cfg.material_color)).collect(),
		None => vec![],
	};

	let model = geometry.map(|g| Model {
		mesh: build_mesh(&g, surface.as_ref(), materials.len(), cfg),
		geometry: g,
		surface: surface,
	});

	Ok(Document {
		model: model,
		materials: materials,
		sections: sections,
		placeholders: placeholders,
		warnings: warnings,
		up: if cfg.flags.contains(ImportFlag::SWAP_YZ) { UpAxis::Z } else { UpAxis::Y },
	})
}

fn duplicate(warnings: &mut Vec<CpjWarning>, chunk: &Chunk) {
	let w = CpjWarning::DuplicateChunk {
		kind: chunk.kind,
		name: chunk.name.clone(),
	};
	warn!(chunk = %chunk.name, magic = %fourcc(chunk.header.magic), "{}", w);
	warnings.push(w);
}

fn build_mesh(geometry: &Geometry, surface: Option<&Surface>, num_materials: usize, cfg: &ImportCfg) -> Mesh {
	let mut mesh = Mesh::new(geometry.name.clone());
	mesh.positions = geometry.positions(cfg.flags.contains(ImportFlag::SWAP_YZ));

	let flip = cfg.flags.contains(ImportFlag::FLIP_V);
	mesh.faces = geometry.faces.iter()
		.enumerate()
		.map(|(i, indices)| {
			let mut face = Face::new(*indices);
			if let Some(srf) = surface {
				face.material = srf.tris.get(i)
					.map(|t| t.tex_index as usize)
					.filter(|m| *m < num_materials);
				face.uvs = srf.corner_uvs(i, flip);
			}
			face
		})
		.collect();

	mesh
}
