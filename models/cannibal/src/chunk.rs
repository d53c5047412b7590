use std::fmt;

use rgk_core::{
	fourcc,
	io_ext::ByteCursor,
	rtag4
};

#[cfg(feature = "import")]
use crate::import::CpjImportError;

pub const RIFF_MAGIC: u32 = rtag4!(b"RIFF");
pub const FORM_MAGIC: u32 = rtag4!(b"CPJB");

pub const FRM_MAGIC: u32 = rtag4!(b"FRMB");
pub const FRM_VERSION: u32 = 1;
pub const GEO_MAGIC: u32 = rtag4!(b"GEOB");
pub const GEO_VERSION: u32 = 1;
pub const LOD_MAGIC: u32 = rtag4!(b"LODB");
pub const LOD_VERSION: u32 = 3;
pub const MAC_MAGIC: u32 = rtag4!(b"MACB");
pub const MAC_VERSION: u32 = 1;
pub const SEQ_MAGIC: u32 = rtag4!(b"SEQB");
pub const SEQ_VERSION: u32 = 1;
pub const SKL_MAGIC: u32 = rtag4!(b"SKLB");
pub const SKL_VERSION: u32 = 1;
pub const SRF_MAGIC: u32 = rtag4!(b"SRFB");
pub const SRF_VERSION: u32 = 1;

pub const FILE_HEADER_SIZE: usize = 12;
pub const CHUNK_HEADER_SIZE: usize = 20;

/// Name reported for chunks with a zero name offset
pub const NAMELESS: &str = "nameless";

/// Distance from one chunk header to the next. Payloads are padded to an
/// even length; the padding byte is not checked.
#[inline]
pub const fn chunk_stride(length: u32) -> usize {
	length as usize + (length as usize % 2) + 8
}

/// Recognized magic/version pairs
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChunkKind {
	/// Actor configuration (commands)
	Mac,
	/// Geometry
	Geo,
	/// Surface (materials, UVs, triangle attributes)
	Srf,
	/// Level of detail
	Lod,
	/// Skeleton
	Skl,
	/// Vertex frame animation
	Frm,
	/// Sequenced animation
	Seq,
	Unsupported {
		magic: u32,
		version: u32,
	},
}

impl ChunkKind {
	pub fn classify(magic: u32, version: u32) -> ChunkKind {
		match (magic, version) {
			(MAC_MAGIC, MAC_VERSION) => ChunkKind::Mac,
			(GEO_MAGIC, GEO_VERSION) => ChunkKind::Geo,
			(SRF_MAGIC, SRF_VERSION) => ChunkKind::Srf,
			(LOD_MAGIC, LOD_VERSION) => ChunkKind::Lod,
			(SKL_MAGIC, SKL_VERSION) => ChunkKind::Skl,
			(FRM_MAGIC, FRM_VERSION) => ChunkKind::Frm,
			(SEQ_MAGIC, SEQ_VERSION) => ChunkKind::Seq,
			_ => ChunkKind::Unsupported {
				magic: magic,
				version: version,
			},
		}
	}

	pub fn magic(&self) -> u32 {
		match *self {
			ChunkKind::Mac => MAC_MAGIC,
			ChunkKind::Geo => GEO_MAGIC,
			ChunkKind::Srf => SRF_MAGIC,
			ChunkKind::Lod => LOD_MAGIC,
			ChunkKind::Skl => SKL_MAGIC,
			ChunkKind::Frm => FRM_MAGIC,
			ChunkKind::Seq => SEQ_MAGIC,
			ChunkKind::Unsupported { magic, .. } => magic,
		}
	}

	pub fn version(&self) -> u32 {
		match *self {
			ChunkKind::Mac => MAC_VERSION,
			ChunkKind::Geo => GEO_VERSION,
			ChunkKind::Srf => SRF_VERSION,
			ChunkKind::Lod => LOD_VERSION,
			ChunkKind::Skl => SKL_VERSION,
			ChunkKind::Frm => FRM_VERSION,
			ChunkKind::Seq => SEQ_VERSION,
			ChunkKind::Unsupported { version, .. } => version,
		}
	}

	/// Recognized kinds whose payload is skipped
	pub fn is_placeholder(&self) -> bool {
		matches!(self, ChunkKind::Lod | ChunkKind::Skl | ChunkKind::Frm | ChunkKind::Seq)
	}

	pub fn description(&self) -> &'static str {
		match self {
			ChunkKind::Mac => "Actor configuration",
			ChunkKind::Geo => "Geometry",
			ChunkKind::Srf => "Surface",
			ChunkKind::Lod => "Level of detail",
			ChunkKind::Skl => "Skeleton",
			ChunkKind::Frm => "Vertex frames",
			ChunkKind::Seq => "Sequenced animation",
			ChunkKind::Unsupported { .. } => "Unsupported",
		}
	}
}

impl fmt::Display for ChunkKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} v{}", fourcc(self.magic()), self.version())
	}
}

/// Count and offset pair locating a table inside a chunk's data block
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Table {
	pub count: u32,
	pub offset: u32,
}

impl Table {
	#[cfg(feature = "import")]
	pub(crate) fn read(cursor: &ByteCursor, at: usize) -> Result<Table, CpjImportError> {
		Ok(Table {
			count: cursor.read_u32_at(at)?,
			offset: cursor.read_u32_at(at.saturating_add(4))?,
		})
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.count as usize
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// Absolute offset of entry `index`, given the data block origin and the
	/// entry size. Saturates so that garbage offsets fail the bounds check
	/// instead of wrapping.
	#[inline]
	pub fn entry(&self, block: usize, index: usize, size: usize) -> usize {
		block.saturating_add(self.offset as usize).saturating_add(index.saturating_mul(size))
	}

	#[inline]
	pub fn byte_len(&self, size: usize) -> usize {
		self.len().saturating_mul(size)
	}
}

/// Resolves null-terminated strings relative to a base offset
#[derive(Clone, Copy, Debug)]
pub struct NameTable<'a> {
	cursor: ByteCursor<'a>,
	base: usize,
}

impl<'a> NameTable<'a> {
	pub fn new(cursor: ByteCursor<'a>, base: usize) -> NameTable<'a> {
		NameTable {
			cursor: cursor,
			base: base,
		}
	}

	#[cfg(feature = "import")]
	pub fn name(&self, offset: u32) -> Result<String, CpjImportError> {
		Ok(self.cursor.read_cstr_at(self.base.saturating_add(offset as usize))?)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FileHeader {
	pub riff_magic: u32,
	/// Length of the file following this field
	pub length: u32,
	pub form_magic: u32,
}

impl FileHeader {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor) -> Result<FileHeader, CpjImportError> {
		let riff = cursor.read_u32_at(0)?;
		let length = cursor.read_u32_at(4)?;
		let form = cursor.read_u32_at(8)?;

		if riff != RIFF_MAGIC || form != FORM_MAGIC {
			return Err(CpjImportError::Magic {
				riff: riff,
				form: form,
			});
		}

		let actual = cursor.len() - 8;
		if length as usize != actual {
			return Err(CpjImportError::Size {
				declared: length,
				actual: actual,
			});
		}

		Ok(FileHeader {
			riff_magic: riff,
			length: length,
			form_magic: form,
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkHeader {
	pub magic: u32,
	/// Length of the chunk following this field
	pub length: u32,
	pub version: u32,
	pub timestamp: u32,
	/// Offset of the name from the start of the chunk, zero if nameless
	pub name_offset: u32,
}

impl ChunkHeader {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, offset: usize) -> Result<ChunkHeader, CpjImportError> {
		Ok(ChunkHeader {
			magic: cursor.read_u32_at(offset)?,
			length: cursor.read_u32_at(offset + 4)?,
			version: cursor.read_u32_at(offset + 8)?,
			timestamp: cursor.read_u32_at(offset + 12)?,
			name_offset: cursor.read_u32_at(offset + 16)?,
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
	/// Absolute offset of the chunk's magic
	pub offset: usize,
	pub header: ChunkHeader,
	pub kind: ChunkKind,
	pub name: String,
}

impl Chunk {
	#[cfg(feature = "import")]
	fn read(cursor: &ByteCursor, offset: usize) -> Result<Chunk, CpjImportError> {
		let header = ChunkHeader::read(cursor, offset)?;

		// Declared payload must lie inside the file
		cursor.bytes_at(offset + 8, header.length as usize)?;

		let name = if header.name_offset > 0 {
			NameTable::new(*cursor, offset).name(header.name_offset)?
		} else {
			NAMELESS.to_string()
		};

		Ok(Chunk {
			offset: offset,
			header: header,
			kind: ChunkKind::classify(header.magic, header.version),
			name: name,
		})
	}

	/// Absolute offset of the kind-specific data following the common header
	#[inline]
	pub fn data_offset(&self) -> usize {
		self.offset + CHUNK_HEADER_SIZE
	}

	#[inline]
	pub fn next_offset(&self) -> usize {
		self.offset + chunk_stride(self.header.length)
	}
}

/// Validated view of a CPJ file, able to walk its chunks any number of times
#[derive(Clone, Copy, Debug)]
pub struct Framer<'a> {
	cursor: ByteCursor<'a>,
	header: FileHeader,
}

impl<'a> Framer<'a> {
	#[cfg(feature = "import")]
	pub fn new(data: &'a [u8]) -> Result<Framer<'a>, CpjImportError> {
		let cursor = ByteCursor::new(data);
		let header = FileHeader::read(&cursor)?;

		Ok(Framer {
			cursor: cursor,
			header: header,
		})
	}

	pub fn cursor(&self) -> ByteCursor<'a> {
		self.cursor
	}

	pub fn header(&self) -> &FileHeader {
		&self.header
	}

	pub fn chunks(&self) -> Chunks<'a> {
		Chunks {
			cursor: self.cursor,
			offset: FILE_HEADER_SIZE,
			failed: false,
		}
	}
}

/// Iterator over the chunks of a file. Stops after the first error.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
	cursor: ByteCursor<'a>,
	offset: usize,
	failed: bool,
}

#[cfg(feature = "import")]
impl<'a> Iterator for Chunks<'a> {
	type Item = Result<Chunk, CpjImportError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed || self.offset >= self.cursor.len() {
			return None;
		}

		let chunk = Chunk::read(&self.cursor, self.offset);
		match &chunk {
			Ok(c) => self.offset = c.next_offset(),
			Err(_) => self.failed = true,
		}

		Some(chunk)
	}
}
