use byteorder::{
	LE,
	WriteBytesExt
};

use std::io::{
	Error,
	ErrorKind,
	Result,
	Seek,
	SeekFrom,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

pub trait WriteBinExt: Write {
	/// Writes a run of zero bytes, used for reserved and name fields
	#[inline]
	fn write_zeros(&mut self, count: usize) -> Result<()> {
		self.write_all(&vec![0; count])
	}

	/// Writes a little endian 2D vector
	#[inline]
	fn write_vec2_le(&mut self, v: Vec2) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())
	}

	/// Writes a little endian 3D vector
	#[inline]
	fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())?;
		self.write_all(&v.z.to_le_bytes())
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}

/// Tagged, length-prefixed regions whose length is only known once the body
/// has been written. `begin_chunk` leaves a placeholder, `end_chunk` seeks
/// back and patches it. Chunks never nest.
pub trait ChunkExt: Write + Seek {
	/// Writes the 4-byte chunk tag and a length placeholder, returning the
	/// offset right after the placeholder
	fn begin_chunk(&mut self, tag: &[u8; 4]) -> Result<u64> {
		self.write_all(tag)?;
		self.write_u32::<LE>(0)?;
		self.stream_position()
	}

	/// Patches the length of the chunk opened at `start` with the byte count
	/// written since, then restores the stream position
	fn end_chunk(&mut self, start: u64) -> Result<()> {
		let end = self.stream_position()?;
		let length = u32::try_from(end - start)
			.map_err(|_| Error::new(ErrorKind::InvalidInput, "chunk body exceeds 32 bit length"))?;

		self.seek(SeekFrom::Start(start - 4))?;
		self.write_u32::<LE>(length)?;
		self.seek(SeekFrom::Start(end))?;

		Ok(())
	}
}

impl<W> ChunkExt for W
where
	W: Write + Seek + ?Sized,
{
}

#[cfg(test)]
mod tests {
	use byteorder::{
		LE,
		ReadBytesExt
	};

	use std::io::{
		Cursor,
		Read,
		Seek,
		SeekFrom
	};

	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	use super::*;

	#[test]
	fn test_write_vecs() {
		let mut vec2 = vec![];
		let mut vec3 = vec![];

		vec2.write_vec2_le(Vec2::new(0.0155714415, 0.117667466)).unwrap();
		vec3.write_vec3_le(Vec3::new(0.0155714415, 0.117667466, 0.089328438)).unwrap();

		assert_eq!(vec2, &[0x5c, 0x1f, 0x7f, 0x3c, 0xa4, 0xfb, 0xf0, 0x3d][..]);
		assert_eq!(vec3, &[0x5c, 0x1f, 0x7f, 0x3c, 0xa4, 0xfb, 0xf0, 0x3d, 0xd4, 0xf1, 0xb6, 0x3d][..]);
	}

	#[test]
	fn test_write_zeros() {
		let mut data = vec![];
		data.write_zeros(12).unwrap();
		assert_eq!(data, vec![0; 12]);
	}

	#[test]
	fn test_chunk_patching() {
		let mut buf = Cursor::new(vec![]);

		let first = buf.begin_chunk(b"tOne").unwrap();
		buf.write_all(b"body").unwrap();
		buf.end_chunk(first).unwrap();

		let second = buf.begin_chunk(b"tTwo").unwrap();
		buf.end_chunk(second).unwrap();

		buf.seek(SeekFrom::Start(0)).unwrap();

		let mut tag = [0; 4];
		buf.read_exact(&mut tag).unwrap();
		assert_eq!(&tag, b"tOne");
		assert_eq!(buf.read_u32::<LE>().unwrap(), 4);

		// the second tag sits immediately past the first chunk's body
		buf.seek(SeekFrom::Current(4)).unwrap();
		buf.read_exact(&mut tag).unwrap();
		assert_eq!(&tag, b"tTwo");
		assert_eq!(buf.read_u32::<LE>().unwrap(), 0);

		// position is restored after patching
		assert_eq!(buf.stream_position().unwrap(), buf.get_ref().len() as u64);
	}
}
