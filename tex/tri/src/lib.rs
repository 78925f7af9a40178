use bitflags::bitflags;

use std::io;
use thiserror::Error;

pub static MAGIC: &[u8; 8] = b"triImage";

/// Color bytes of a serialized palette: 256 RGB entries
pub const PALETTE_COLOR_BYTES: usize = 768;
/// Marker byte closing every palette entry, fully opaque by convention
pub const PALETTE_MARKER: u8 = 0xFF;

/// Pixel formats of the target rasterizer, in its native code order
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u16)]
pub enum PixelFormat {
	Rgb5650 = 0,
	Rgba5551,
	Rgba4444,
	Rgba8888,
	Indexed4,
	Indexed8,
}

bitflags! {
	/// Payload encoding of a texture record
	pub struct ImageFlags: u16 {
		const SWIZZLED = 1;
		const DEFLATE = 4;
	}
}

#[derive(Debug, Error)]
pub enum TriExportError {
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Texture width {0} is not a power of 2")]
	WidthNotPow2(u32),
	#[error("Texture is not square: {0}x{1}")]
	NotSquare(u32, u32),
	#[error("Palette has {0} color bytes, expected 768")]
	Palette(usize),
	#[error("Compressed payload of {0} bytes does not fit a 32 bit length")]
	Oversize(usize),
}

#[cfg(feature = "export")]
pub mod export {
	use byteorder::{
		LE,
		WriteBytesExt
	};

	use flate2::{
		Compression,
		write::ZlibEncoder
	};

	use std::io::Write;

	use tritools_core::{
		align_pow2,
		texture::{
			Color,
			PaletteTexture,
			quantize,
			Raster
		}
	};

	use super::*;

	/// Serializes the color table: 256 RGB entries, each closed by the opaque
	/// marker byte. Unused entries are zero-filled.
	fn write_palette<W>(out: &mut W, texture: &PaletteTexture) -> Result<(), TriExportError>
	where
		W: Write,
	{
		if texture.palette.len() * 3 > PALETTE_COLOR_BYTES {
			return Err(TriExportError::Palette(texture.palette.len() * 3));
		}

		let mut entries = texture.palette.clone();
		entries.resize(256, Color::default());

		for entry in entries.iter() {
			out.write_all(&[entry.red, entry.green, entry.blue, PALETTE_MARKER])?;
		}

		Ok(())
	}

	/// Builds the row major index buffer, zero-filling the columns between
	/// the real and the padded width
	fn padded_indices(texture: &PaletteTexture, padded_width: u32) -> Vec<u8> {
		let width = texture.width as usize;
		let padded = padded_width as usize;
		let mut out = vec![0; padded * texture.height as usize];

		for y in 0..texture.height as usize {
			out[y * padded..y * padded + width]
				.copy_from_slice(&texture.indices[y * width..(y + 1) * width]);
		}

		out
	}

	/// Writes a complete triImage record: header, palette, dimensions and the
	/// deflate-compressed index buffer.
	///
	/// `must_be_square` is demanded by the container format, whose runtime
	/// cannot repeat non-square textures; the standalone format accepts any
	/// width and pads it to the next power of two.
	pub fn write_record<W>(out: &mut W, raster: &Raster, must_be_square: bool) -> Result<(), TriExportError>
	where
		W: Write,
	{
		let texture = quantize(raster, 256);
		let padded_width = align_pow2(texture.width);

		if must_be_square {
			if texture.width != padded_width {
				return Err(TriExportError::WidthNotPow2(texture.width));
			}

			if texture.width != texture.height {
				return Err(TriExportError::NotSquare(texture.width, texture.height));
			}
		}

		out.write_all(MAGIC)?;
		out.write_u32::<LE>(1)?; // numFrames
		out.write_u32::<LE>(0)?; // reserved
		out.write_u16::<LE>(PixelFormat::Indexed8 as u16)?;
		out.write_u16::<LE>(PixelFormat::Rgba8888 as u16)?;
		out.write_u16::<LE>(ImageFlags::DEFLATE.bits())?;
		out.write_u16::<LE>(0)?; // frame index, static textures only
		out.write_u16::<LE>(0)?; // delay, animations only
		out.write_u16::<LE>(0)?; // xOffs
		out.write_u16::<LE>(0)?; // yOffs
		out.write_u16::<LE>(0)?; // reserved

		write_palette(out, &texture)?;

		out.write_u32::<LE>(texture.width)?;
		out.write_u32::<LE>(texture.height)?;
		out.write_u32::<LE>(padded_width)?;

		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(&padded_indices(&texture, padded_width))?;
		let compressed = encoder.finish()?;

		let size = u32::try_from(compressed.len())
			.map_err(|_| TriExportError::Oversize(compressed.len()))?;
		out.write_u32::<LE>(size)?;
		out.write_all(&compressed)?;

		Ok(())
	}
}

#[cfg(all(test, feature = "export"))]
mod tests {
	use byteorder::{
		LE,
		ReadBytesExt
	};

	use flate2::read::ZlibDecoder;

	use std::io::{
		Cursor,
		Read
	};

	use tritools_core::texture::{
		Color,
		Raster
	};

	use super::*;

	fn checker() -> Raster {
		Raster {
			width: 2,
			height: 2,
			pixels: vec![
				Color::new(255, 0, 0),
				Color::new(0, 0, 255),
				Color::new(0, 0, 255),
				Color::new(255, 0, 0),
			],
		}
	}

	/// Reads a record and returns (width, height, padded width, indices)
	fn parse_record(data: &[u8]) -> (u32, u32, u32, Vec<u8>) {
		let mut buf = Cursor::new(data);

		let mut magic = [0; 8];
		buf.read_exact(&mut magic).unwrap();
		assert_eq!(&magic, MAGIC);

		assert_eq!(buf.read_u32::<LE>().unwrap(), 1); // numFrames
		assert_eq!(buf.read_u32::<LE>().unwrap(), 0); // reserved
		assert_eq!(buf.read_u16::<LE>().unwrap(), PixelFormat::Indexed8 as u16);
		assert_eq!(buf.read_u16::<LE>().unwrap(), PixelFormat::Rgba8888 as u16);
		assert_eq!(buf.read_u16::<LE>().unwrap(), ImageFlags::DEFLATE.bits());

		for _ in 0..5 {
			assert_eq!(buf.read_u16::<LE>().unwrap(), 0);
		}

		let mut palette = [0; 1024];
		buf.read_exact(&mut palette).unwrap();

		// every 4th byte is the opaque marker
		for entry in palette.chunks_exact(4) {
			assert_eq!(entry[3], PALETTE_MARKER);
		}

		let width = buf.read_u32::<LE>().unwrap();
		let height = buf.read_u32::<LE>().unwrap();
		let padded_width = buf.read_u32::<LE>().unwrap();

		let size = buf.read_u32::<LE>().unwrap() as usize;
		let mut payload = vec![0; size];
		buf.read_exact(&mut payload).unwrap();
		assert_eq!(buf.position() as usize, data.len());

		let mut indices = vec![];
		ZlibDecoder::new(&payload[..]).read_to_end(&mut indices).unwrap();

		(width, height, padded_width, indices)
	}

	#[test]
	fn test_pow2_square_record() {
		let mut data = vec![];
		export::write_record(&mut data, &checker(), true).unwrap();

		let (width, height, padded_width, indices) = parse_record(&data);
		assert_eq!((width, height, padded_width), (2, 2, 2));
		assert_eq!(indices.len(), 4);
		assert_eq!(indices[0], indices[3]);
		assert_ne!(indices[0], indices[1]);
	}

	#[test]
	fn test_width_padding() {
		// 3 wide, pads to 4, right column zero-filled
		let dark = Color::new(10, 10, 10);
		let bright = Color::new(200, 200, 200);
		let raster = Raster {
			width: 3,
			height: 2,
			pixels: vec![dark, dark, bright, dark, dark, bright],
		};

		let mut data = vec![];
		export::write_record(&mut data, &raster, false).unwrap();

		let (width, height, padded_width, indices) = parse_record(&data);
		assert_eq!((width, height, padded_width), (3, 2, 4));
		assert_eq!(indices.len(), 8);

		for y in 0..2 {
			// the real column keeps its palette index, the padding is zero
			assert_ne!(indices[y * 4 + 2], 0);
			assert_eq!(indices[y * 4 + 3], 0);
		}
	}

	#[test]
	fn test_square_validation() {
		let wide = Raster {
			width: 3,
			height: 3,
			pixels: vec![Color::default(); 9],
		};
		assert!(matches!(export::write_record(&mut vec![], &wide, false), Ok(())));
		assert!(matches!(export::write_record(&mut vec![], &wide, true),
			Err(TriExportError::WidthNotPow2(3))));

		let tall = Raster {
			width: 4,
			height: 2,
			pixels: vec![Color::default(); 8],
		};
		assert!(matches!(export::write_record(&mut vec![], &tall, true),
			Err(TriExportError::NotSquare(4, 2))));
	}
}
