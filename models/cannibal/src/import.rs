use std::{
	io,
	str::Utf8Error
};

use thiserror::Error;

use rgk_core::{
	fourcc,
	io_ext::CursorError
};

use crate::chunk::ChunkKind;

#[derive(Debug, Error)]
pub enum CpjImportError {
	#[error("Surface \"{name}\" has {surface} triangles but its geometry has {geometry}")]
	GeometryMismatch {
		name: String,
		geometry: usize,
		surface: usize,
	},
	#[error("{table} index {index} out of range, table holds {count}")]
	IndexOutOfBounds {
		table: &'static str,
		index: usize,
		count: usize,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Not a CPJ file: {}/{}", fourcc(*.riff), fourcc(*.form))]
	Magic {
		riff: u32,
		form: u32,
	},
	#[error("Read of {size} bytes at offset {offset} exceeds file length {len}")]
	OutOfBounds {
		offset: usize,
		size: usize,
		len: usize,
	},
	#[error("File has wrong size, header says {declared} bytes but {actual} follow")]
	Size {
		declared: u32,
		actual: usize,
	},
	#[error("String at offset {offset} is not valid UTF-8")]
	Text {
		offset: usize,
		source: Utf8Error,
		bytes: Vec<u8>,
	},
	#[error("Unknown/unsupported chunk \"{name}\": {}", ChunkKind::classify(*.magic, *.version))]
	UnsupportedChunk {
		magic: u32,
		version: u32,
		name: String,
	},
}

impl CpjImportError {
	/// True for byte reads past the end of the file as well as table indices
	/// past the end of their table
	pub fn is_out_of_bounds(&self) -> bool {
		matches!(self, CpjImportError::OutOfBounds { .. } | CpjImportError::IndexOutOfBounds { .. })
	}
}

impl From<CursorError> for CpjImportError {
	fn from(e: CursorError) -> Self {
		match e {
			CursorError::OutOfBounds { offset, size, len } => CpjImportError::OutOfBounds {
				offset: offset,
				size: size,
				len: len,
			},
			CursorError::Text { offset, source, bytes } => CpjImportError::Text {
				offset: offset,
				source: source,
				bytes: bytes,
			},
		}
	}
}

/// Recoverable conditions. Decoding continues with the data seen first.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CpjWarning {
	#[error("Only one {kind} chunk is supported, ignoring \"{name}\"")]
	DuplicateChunk {
		kind: ChunkKind,
		name: String,
	},
	#[error("Surface \"{name}\" has no geometry to attach to")]
	OrphanSurface {
		name: String,
	},
}
