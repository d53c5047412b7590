use byteorder::{
	ByteOrder,
	LE
};

use std::str::{
	from_utf8,
	Utf8Error
};

use thiserror::Error;

use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CursorError {
	#[error("Read of {size} bytes at offset {offset} exceeds buffer length {len}")]
	OutOfBounds {
		offset: usize,
		size: usize,
		len: usize,
	},
	#[error("String at offset {offset} is not valid UTF-8")]
	Text {
		offset: usize,
		source: Utf8Error,
		bytes: Vec<u8>,
	},
}

/// Random access little endian reader over an immutable byte buffer.
///
/// Every read takes an absolute offset and checks it against the buffer
/// length, so a cursor can be shared freely between decoders.
#[derive(Clone, Copy, Debug)]
pub struct ByteCursor<'a> {
	data: &'a [u8],
}

impl<'a> ByteCursor<'a> {
	pub fn new(data: &'a [u8]) -> ByteCursor<'a> {
		ByteCursor {
			data: data,
		}
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Borrows `size` bytes starting at `offset`
	#[inline]
	pub fn bytes_at(&self, offset: usize, size: usize) -> Result<&'a [u8], CursorError> {
		let end = offset.checked_add(size).filter(|end| *end <= self.data.len());

		match end {
			Some(end) => Ok(&self.data[offset..end]),
			None => Err(CursorError::OutOfBounds {
				offset: offset,
				size: size,
				len: self.data.len(),
			}),
		}
	}

	#[inline]
	pub fn read_u8_at(&self, offset: usize) -> Result<u8, CursorError> {
		Ok(self.bytes_at(offset, 1)?[0])
	}

	#[inline]
	pub fn read_u16_at(&self, offset: usize) -> Result<u16, CursorError> {
		Ok(LE::read_u16(self.bytes_at(offset, 2)?))
	}

	#[inline]
	pub fn read_u32_at(&self, offset: usize) -> Result<u32, CursorError> {
		Ok(LE::read_u32(self.bytes_at(offset, 4)?))
	}

	#[inline]
	pub fn read_f32_at(&self, offset: usize) -> Result<f32, CursorError> {
		Ok(LE::read_f32(self.bytes_at(offset, 4)?))
	}

	/// Reads a little endian 2D vector
	#[inline]
	pub fn read_vec2_at(&self, offset: usize) -> Result<Vec2, CursorError> {
		let mut v = [0.0; 2];
		LE::read_f32_into(self.bytes_at(offset, 8)?, &mut v);

		Ok(Vec2::new(v[0], v[1]))
	}

	/// Reads a little endian 3D vector
	#[inline]
	pub fn read_vec3_at(&self, offset: usize) -> Result<Vec3, CursorError> {
		let mut v = [0.0; 3];
		LE::read_f32_into(self.bytes_at(offset, 12)?, &mut v);

		Ok(Vec3::new(v[0], v[1], v[2]))
	}

	/// Reads a little endian 4D vector
	#[inline]
	pub fn read_vec4_at(&self, offset: usize) -> Result<Vec4, CursorError> {
		let mut v = [0.0; 4];
		LE::read_f32_into(self.bytes_at(offset, 16)?, &mut v);

		Ok(Vec4::new(v[0], v[1], v[2], v[3]))
	}

	/// Reads a null-terminated string. The end of the buffer counts as a
	/// terminator.
	pub fn read_cstr_at(&self, offset: usize) -> Result<String, CursorError> {
		if offset > self.data.len() {
			return Err(CursorError::OutOfBounds {
				offset: offset,
				size: 1,
				len: self.data.len(),
			});
		}

		let tail = &self.data[offset..];
		let raw = match tail.iter().position(|b| *b == 0) {
			Some(end) => &tail[..end],
			None => tail,
		};

		match from_utf8(raw) {
			Ok(s) => Ok(s.to_string()),
			Err(e) => Err(CursorError::Text {
				offset: offset,
				source: e,
				bytes: raw.to_vec(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::{
		Vec2,
		Vec3,
		Vec4
	};

	use super::*;

	#[test]
	fn test_read_ints() {
		let data = [0x01, 0x02, 0x03, 0x04, 0x05];
		let cursor = ByteCursor::new(&data);

		assert_eq!(cursor.read_u8_at(4), Ok(0x05));
		assert_eq!(cursor.read_u16_at(1), Ok(0x0302));
		assert_eq!(cursor.read_u32_at(1), Ok(0x05040302));
	}

	#[test]
	fn test_out_of_bounds() {
		let data = [0; 6];
		let cursor = ByteCursor::new(&data);

		assert_eq!(cursor.read_u32_at(3), Err(CursorError::OutOfBounds { offset: 3, size: 4, len: 6 }));
		assert!(cursor.read_u32_at(2).is_ok());
		assert!(cursor.read_u8_at(6).is_err());
		assert!(cursor.bytes_at(usize::MAX, 2).is_err());
	}

	#[test]
	fn test_read_cstr() {
		let data = b"skin\x00loop";
		let cursor = ByteCursor::new(&data[..]);

		assert_eq!(cursor.read_cstr_at(0), Ok("skin".to_string()));
		assert_eq!(cursor.read_cstr_at(5), Ok("loop".to_string()));
		assert_eq!(cursor.read_cstr_at(9), Ok(String::new()));
		assert!(cursor.read_cstr_at(10).is_err());
	}

	#[test]
	fn test_read_cstr_invalid() {
		let data = b"ab\xff\xfe\x00";
		let cursor = ByteCursor::new(&data[..]);

		match cursor.read_cstr_at(0) {
			Err(CursorError::Text { offset, bytes, .. }) => {
				assert_eq!(offset, 0);
				assert_eq!(bytes, vec![b'a', b'b', 0xff, 0xfe]);
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn test_read_vecs() {
		let data = [0x5c, 0x1f, 0x7f, 0x3c, 0xa4, 0xfb, 0xf0, 0x3d, 0xd4, 0xf1, 0xb6, 0x3d,
			0, 0xa0, 0xd9, 0xbd];
		let cursor = ByteCursor::new(&data);

		assert_eq!(cursor.read_vec2_at(0), Ok(Vec2::new(0.0155714415, 0.117667466)));
		assert_eq!(cursor.read_vec3_at(0), Ok(Vec3::new(0.0155714415, 0.117667466, 0.089328438)));
		assert_eq!(cursor.read_vec4_at(0), Ok(Vec4::new(0.0155714415, 0.117667466, 0.089328438, -0.106262207)));
		assert!(cursor.read_vec3_at(8).is_err());
	}
}
