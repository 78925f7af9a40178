use bitflags::bitflags;

use std::io;
use thiserror::Error;

use tritools_textures_tri::TriExportError;

pub static MAGIC: &[u8; 8] = b"triModel";

pub const IMAGE_CHUNK: &[u8; 4] = b"tImg";
pub const MESH_CHUNK: &[u8; 4] = b"tMhH";
pub const MODEL_CHUNK: &[u8; 4] = b"tMH ";
pub const EOF_CHUNK: &[u8; 4] = b"tEOF";

/// Record name field the runtime ignores, zero-filled
pub const NAME_BYTES: usize = 12;
/// Filename field of the embedded texture chunk, zero-filled
pub const IMAGE_NAME_BYTES: usize = 64;
/// Position plus rotation block of a placement record
pub const TRANSFORM_BYTES: usize = 32;

/// Per vertex byte count: U, V, packed color, normal, position
pub const VERTEX_STRIDE: u16 = 36;
/// Packed vertex color: full white, fully opaque. Vertex coloring is unused,
/// the runtime modulates the texture against this constant.
pub const VERTEX_COLOR: u32 = 0xFFFF_FFFF;

bitflags! {
	/// Attribute selectors of the runtime's vertex descriptor word.
	/// All attributes are stored as 32 bit floats except the packed color.
	pub struct VertexFormat: u32 {
		const TEXTURE_32BITF = 0b11;
		const COLOR_8888 = 0b111 << 2;
		const NORMAL_32BITF = 0b11 << 5;
		const POSITION_32BITF = 0b11 << 7;
	}
}

bitflags! {
	/// Payload encoding of a mesh record
	pub struct MeshFlags: u16 {
		const DEFLATE = 1;
		const TRIANGLES = 2;
	}
}

#[derive(Debug, Error)]
pub enum TrimExportError {
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error(transparent)]
	Texture(#[from] TriExportError),
	#[error("{0} vertices do not fit a 16 bit count")]
	VertexCount(usize),
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

	use std::io::{
		Seek,
		Write,
		self
	};

	use tritools_core::{
		io_ext::{
			ChunkExt,
			WriteBinExt
		},
		texture::Raster
	};

	use tritools_models_wavefront::obj::ObjModel;
	use tritools_textures_tri::export::write_record;

	use super::*;

	/// Expands faces into flat per-corner records, in face order. The target
	/// draw mode is non-indexed, so shared corners are fully materialized:
	/// output vertex `3i + k` is corner `k` of face `i`.
	fn flatten(model: &ObjModel) -> io::Result<Vec<u8>> {
		let mut out = Vec::with_capacity(model.faces.len() * 3 * VERTEX_STRIDE as usize);

		for face in model.faces.iter() {
			for corner in face.iter() {
				out.write_vec2_le(model.texcoords[corner.texcoord])?;
				out.write_u32::<LE>(VERTEX_COLOR)?;
				out.write_vec3_le(model.normals[corner.normal])?;
				out.write_vec3_le(model.positions[corner.position])?;
			}
		}

		Ok(out)
	}

	fn write_texture_chunk<W>(out: &mut W, raster: &Raster) -> Result<(), TrimExportError>
	where
		W: Write + Seek,
	{
		let start = out.begin_chunk(IMAGE_CHUNK)?;

		out.write_zeros(IMAGE_NAME_BYTES)?;
		write_record(out, raster, true)?;

		out.end_chunk(start)?;
		Ok(())
	}

	fn write_mesh_chunk<W>(out: &mut W, model: &ObjModel) -> Result<(), TrimExportError>
	where
		W: Write + Seek,
	{
		let num_verts = u16::try_from(model.faces.len() * 3)
			.map_err(|_| TrimExportError::VertexCount(model.faces.len() * 3))?;

		let start = out.begin_chunk(MESH_CHUNK)?;

		out.write_zeros(NAME_BYTES)?;
		out.write_u32::<LE>((VertexFormat::TEXTURE_32BITF | VertexFormat::COLOR_8888 |
			VertexFormat::NORMAL_32BITF | VertexFormat::POSITION_32BITF).bits())?;
		out.write_u16::<LE>(num_verts)?;
		out.write_u16::<LE>((MeshFlags::DEFLATE | MeshFlags::TRIANGLES).bits())?;
		out.write_u16::<LE>(VERTEX_STRIDE)?;
		out.write_u16::<LE>(0)?; // texID, single texture per mesh

		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(&flatten(model)?)?;
		let compressed = encoder.finish()?;

		let size = u32::try_from(compressed.len())
			.map_err(|_| TrimExportError::Oversize(compressed.len()))?;
		out.write_u32::<LE>(size)?;
		out.write_all(&compressed)?;

		out.end_chunk(start)?;
		Ok(())
	}

	/// Static placement record: one part, mesh slot 0 textured from slot 0,
	/// identity transforms
	fn write_model_chunk<W>(out: &mut W) -> Result<(), TrimExportError>
	where
		W: Write + Seek,
	{
		let start = out.begin_chunk(MODEL_CHUNK)?;

		out.write_zeros(NAME_BYTES)?;
		out.write_u16::<LE>(1)?; // numParts
		out.write_u16::<LE>(0)?; // flags
		out.write_zeros(TRANSFORM_BYTES)?;

		out.write_zeros(NAME_BYTES)?;
		out.write_u16::<LE>(0)?; // meshID
		out.write_u16::<LE>(0)?; // texID
		out.write_zeros(TRANSFORM_BYTES)?;

		out.end_chunk(start)?;
		Ok(())
	}

	/// Empty terminator chunk, so the consumer never has to rely on stream EOF
	fn write_eof_chunk<W>(out: &mut W) -> Result<(), TrimExportError>
	where
		W: Write + Seek,
	{
		let start = out.begin_chunk(EOF_CHUNK)?;
		out.end_chunk(start)?;
		Ok(())
	}

	/// Writes a complete triModel container: file header, then the texture,
	/// mesh, model and terminator chunks in that order.
	///
	/// The sink needs [`Seek`] because chunk lengths are patched in after
	/// their bodies are written. A failed export leaves a truncated,
	/// non-conformant file behind; callers must discard it.
	pub fn write_container<W>(out: &mut W, raster: &Raster, model: &ObjModel) -> Result<(), TrimExportError>
	where
		W: Write + Seek,
	{
		out.write_all(MAGIC)?;
		out.write_u16::<LE>(1)?; // numMeshes
		out.write_u16::<LE>(1)?; // numModels
		out.write_u16::<LE>(1)?; // numTexs
		out.write_u16::<LE>(0)?; // reserved

		write_texture_chunk(out, raster)?;
		write_mesh_chunk(out, model)?;
		write_model_chunk(out)?;
		write_eof_chunk(out)?;

		Ok(())
	}
}
