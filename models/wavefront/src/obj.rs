use thiserror::Error;

use ultraviolet::vec::{
	Vec2,
	Vec3
};

/// One corner of a triangular face: 0-based, validated indices into the
/// position, texture coordinate and normal arrays
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
	pub position: usize,
	pub texcoord: usize,
	pub normal: usize,
}

/// Triangular face element
pub type Face = [Corner; 3];

/// Triangulated subset of a Wavefront OBJ document. Texture coordinates are
/// stored with V flipped (`1 - v`), matching the top-down texture space of
/// the target rasterizer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjModel {
	pub positions: Vec<Vec3>,
	pub texcoords: Vec<Vec2>,
	pub normals: Vec<Vec3>,
	pub faces: Vec<Face>,
}

/// Directive the importer does not understand, reported but not fatal
#[derive(Clone, Debug, PartialEq)]
pub struct Skipped {
	pub line: usize,
	pub text: String,
}

/// Outcome of a successful import
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Import {
	pub model: ObjModel,
	pub skipped: Vec<Skipped>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ObjImportError {
	#[error("Geometric vertex @ line {line} does not have exactly 3 parameters:\n    {text}")]
	Position {
		line: usize,
		text: String,
	},
	#[error("Texture coordinate @ line {line} does not have exactly 2 parameters:\n    {text}")]
	Texcoord {
		line: usize,
		text: String,
	},
	#[error("Vertex normal @ line {line} does not have exactly 3 parameters:\n    {text}")]
	Normal {
		line: usize,
		text: String,
	},
	#[error("Face element @ line {line} is not a triangle of index triples:\n    {text}")]
	Face {
		line: usize,
		text: String,
	},
	#[error("Face element @ line {line} references an attribute that does not exist:\n    {text}")]
	Index {
		line: usize,
		text: String,
	},
}

#[cfg(feature = "import")]
pub mod import {
	use nom::{
		character::complete::{
			char,
			u32 as index
		},
		combinator::all_consuming,
		IResult,
		multi::count,
		sequence::tuple
	};

	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	use tritools_core::nom_ext::{
		vec2ws,
		vec3ws,
		ws
	};

	use super::*;

	/// Parses a `position/texcoord/normal` corner triple of 1-based indices
	fn corner(input: &str) -> IResult<&str, [u32; 3]> {
		let (input, t) = tuple((index, char('/'), index, char('/'), index))(input)?;

		Ok((input, [t.0, t.2, t.4]))
	}

	/// Parses a face element of exactly 3 corners, consuming the whole line
	fn corners(input: &str) -> IResult<&str, Vec<[u32; 3]>> {
		all_consuming(count(ws(corner), 3))(input)
	}

	fn vec2_line(input: &str) -> IResult<&str, Vec2> {
		all_consuming(vec2ws)(input)
	}

	fn vec3_line(input: &str) -> IResult<&str, Vec3> {
		all_consuming(vec3ws)(input)
	}

	/// Converts a 1-based directive index into a 0-based array index
	fn resolve(index: u32, len: usize, line: usize, text: &str) -> Result<usize, ObjImportError> {
		let index = index as usize;

		if index == 0 || index > len {
			return Err(ObjImportError::Index {
				line: line,
				text: text.to_string(),
			});
		}

		Ok(index - 1)
	}

	/// Imports the triangulated OBJ subset from text. Unknown directives are
	/// collected in [`Import::skipped`]; any malformed `v`/`vt`/`vn`/`f`
	/// directive aborts the import with the offending line.
	pub fn obj(src: &str) -> Result<Import, ObjImportError> {
		let mut import = Import::default();
		let mut pending = vec![];

		for (num, line) in src.lines().enumerate() {
			let num = num + 1;
			let line = line.trim();

			if line.is_empty() || line.starts_with('#') {
				continue;
			}

			let (directive, params) = match line.split_once(char::is_whitespace) {
				Some(split) => split,
				_ => (line, ""),
			};

			match directive {
				"v" => match vec3_line(params) {
					Ok((_, pos)) => import.model.positions.push(pos),
					_ => return Err(ObjImportError::Position {
						line: num,
						text: line.to_string(),
					}),
				},
				"vt" => match vec2_line(params) {
					// V runs bottom-up in OBJ, top-down in the target
					Ok((_, uv)) => import.model.texcoords.push(Vec2::new(uv.x, 1.0 - uv.y)),
					_ => return Err(ObjImportError::Texcoord {
						line: num,
						text: line.to_string(),
					}),
				},
				"vn" => match vec3_line(params) {
					Ok((_, normal)) => import.model.normals.push(normal),
					_ => return Err(ObjImportError::Normal {
						line: num,
						text: line.to_string(),
					}),
				},
				"f" => match corners(params) {
					Ok((_, triple)) => pending.push((triple, num, line.to_string())),
					_ => return Err(ObjImportError::Face {
						line: num,
						text: line.to_string(),
					}),
				},
				_ => import.skipped.push(Skipped {
					line: num,
					text: line.to_string(),
				}),
			}
		}

		// indices can only be checked once all attribute arrays are complete
		for (triple, num, text) in pending.iter() {
			let mut face = [Corner { position: 0, texcoord: 0, normal: 0 }; 3];

			for (i, raw) in triple.iter().enumerate() {
				face[i] = Corner {
					position: resolve(raw[0], import.model.positions.len(), *num, text)?,
					texcoord: resolve(raw[1], import.model.texcoords.len(), *num, text)?,
					normal: resolve(raw[2], import.model.normals.len(), *num, text)?,
				};
			}

			import.model.faces.push(face);
		}

		Ok(import)
	}
}
