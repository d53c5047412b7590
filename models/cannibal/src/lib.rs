pub mod chunk;
#[cfg(feature = "import")]
pub mod document;
pub mod geo;
#[cfg(feature = "import")]
pub mod import;
pub mod mac;
pub mod srf;

#[cfg(test)]
mod fixture;

use bitflags::bitflags;

use ultraviolet::vec::Vec4;

#[cfg(feature = "import")]
use std::{
	fs,
	path::Path
};

#[cfg(feature = "import")]
pub use crate::{
	document::{
		decode,
		decode_with,
		Document,
		Model,
		Placeholder
	},
	import::{
		CpjImportError,
		CpjWarning
	}
};

bitflags! {
	pub struct ImportFlag: u32 {
		/// Emit positions as (x, z, y)
		const SWAP_YZ = 1;
		/// Emit UVs as (u, 1 - v)
		const FLIP_V = 2;
		/// Keep the raw bytes of the mount and object link tables
		const KEEP_RESERVED = 4;
	}
}

impl Default for ImportFlag {
	fn default() -> Self {
		ImportFlag::SWAP_YZ | ImportFlag::FLIP_V | ImportFlag::KEEP_RESERVED
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportCfg {
	pub flags: ImportFlag,
	/// Diffuse color given to every material, since textures are not loaded
	pub material_color: Vec4,
}

impl Default for ImportCfg {
	fn default() -> Self {
		Self {
			flags: ImportFlag::default(),
			material_color: Vec4::new(0.8, 0.8, 0.8, 1.0),
		}
	}
}

#[cfg(feature = "import")]
pub fn read<P: AsRef<Path>>(filepath: P, cfg: &ImportCfg) -> Result<Document, CpjImportError> {
	let data = fs::read(filepath)?;
	decode_with(&data, cfg)
}
