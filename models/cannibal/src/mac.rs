use rgk_core::io_ext::ByteCursor;

use crate::chunk::{
	Chunk,
	Table
};

#[cfg(feature = "import")]
use crate::{
	chunk::NameTable,
	import::CpjImportError
};

pub const HEADER_SIZE: usize = 16;
pub const SECTION_SIZE: usize = 12;
pub const COMMAND_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	pub sections: Table,
	/// Flat table of string offsets shared by all sections
	pub commands: Table,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
	pub name: String,
	pub commands: Vec<String>,
}

/// Decoded actor configuration chunk
#[derive(Clone, Debug, PartialEq)]
pub struct ActorConfig {
	pub name: String,
	pub header: Header,
	pub sections: Vec<Section>,
}

impl ActorConfig {
	#[cfg(feature = "import")]
	pub fn read(cursor: &ByteCursor, chunk: &Chunk) -> Result<ActorConfig, CpjImportError> {
		let at = chunk.data_offset();
		let header = Header {
			sections: Table::read(cursor, at)?,
			commands: Table::read(cursor, at + 8)?,
		};

		let block = at + HEADER_SIZE;
		let names = NameTable::new(*cursor, block);

		let mut sections = vec![];
		for i in 0..header.sections.len() {
			let entry = header.sections.entry(block, i, SECTION_SIZE);
			let name = names.name(cursor.read_u32_at(entry)?)?;
			let count = cursor.read_u32_at(entry + 4)? as usize;
			let first = cursor.read_u32_at(entry + 8)? as usize;

			let mut commands = vec![];
			for j in 0..count {
				let ofs = cursor.read_u32_at(header.commands.entry(block, first.saturating_add(j), COMMAND_SIZE))?;
				commands.push(names.name(ofs)?);
			}

			sections.push(Section {
				name: name,
				commands: commands,
			});
		}

		Ok(ActorConfig {
			name: chunk.name.clone(),
			header: header,
			sections: sections,
		})
	}

	pub fn command_count(&self) -> usize {
		self.sections.iter().map(|s| s.commands.len()).sum()
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		chunk::Framer,
		fixture
	};

	use super::*;

	fn decode(data: &[u8]) -> Result<ActorConfig, CpjImportError> {
		let framer = Framer::new(data)?;
		let chunk = framer.chunks().next().unwrap()?;
		ActorConfig::read(&framer.cursor(), &chunk)
	}

	#[test]
	fn test_single_section() {
		let data = fixture::file(&[fixture::mac("actor", &[("idle", &["loop"][..])])]);
		let mac = decode(&data).unwrap();

		assert_eq!(mac.name, "actor");
		assert_eq!(mac.sections, vec![Section {
			name: "idle".to_string(),
			commands: vec!["loop".to_string()],
		}]);
	}

	#[test]
	fn test_sections_share_command_table() {
		let data = fixture::file(&[fixture::mac("actor", &[
			("autoexec", &["SetAuthor \"nobody\"", "SetDescription \"test\""][..]),
			("empty", &[][..]),
			("idle", &["loop"][..]),
		])]);
		let mac = decode(&data).unwrap();

		assert_eq!(mac.header.sections.count, 3);
		assert_eq!(mac.header.commands.count, 3);
		assert_eq!(mac.command_count(), 3);
		assert_eq!(mac.sections[0].commands[1], "SetDescription \"test\"");
		assert!(mac.sections[1].commands.is_empty());
		assert_eq!(mac.sections[2].commands, vec!["loop".to_string()]);
	}

	#[test]
	fn test_command_index_out_of_range() {
		let mut data = fixture::file(&[fixture::mac("actor", &[("idle", &["loop"][..])])]);
		// First command index of section 0: file header, chunk header, sub-header, then entry + 8
		let at = 12 + 20 + 16 + 8;
		data[at..at + 4].copy_from_slice(&0x1000_0000u32.to_le_bytes());

		assert!(decode(&data).unwrap_err().is_out_of_bounds());
	}
}
