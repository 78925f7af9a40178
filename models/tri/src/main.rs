use std::{
	env,
	fs::{
		read_to_string,
		File
	},
	io::{
		BufWriter,
		Write
	},
	process::exit
};

use tritools_core::texture::Raster;
use tritools_models_tri::export::write_container;
use tritools_models_wavefront::obj::import;

fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 4 {
		println!("Usage: {} inputtexture.png inputmesh.obj output.trim", args[0]);
		exit(1);
	}

	println!("Reading texture from {}...", args[1]);

	let image = match image::open(&args[1]) {
		Ok(image) => image.to_rgb8(),
		Err(err) => {
			println!("  ERROR: could not read {}: {}", args[1], err);
			exit(1);
		}
	};

	let raster = match Raster::from_rgb8(image.width(), image.height(), image.as_raw()) {
		Some(raster) => raster,
		_ => {
			println!("  ERROR: {} did not decode to an RGB raster", args[1]);
			exit(1);
		}
	};

	println!("Reading mesh from {}...", args[2]);

	let src = match read_to_string(&args[2]) {
		Ok(src) => src,
		Err(err) => {
			println!("  ERROR: could not read {}: {}", args[2], err);
			exit(1);
		}
	};

	let import = match import::obj(&src) {
		Ok(import) => import,
		Err(err) => {
			println!("  ERROR: {}", err);
			exit(1);
		}
	};

	for skip in import.skipped.iter() {
		println!("  Warning: Unknown command @ line {}:\n    {}", skip.line, skip.text);
	}

	let model = import.model;
	println!("  Mesh import successful:\n    {} geometric vertices\n    {} texture coordinates\n    {} vertex normals\n    {} triangle face elements",
		model.positions.len(), model.texcoords.len(), model.normals.len(), model.faces.len());

	let file = match File::create(&args[3]) {
		Ok(file) => file,
		Err(err) => {
			println!("  ERROR: could not create {}: {}", args[3], err);
			exit(1);
		}
	};

	println!("Writing {}...", args[3]);

	let mut out = BufWriter::new(file);

	let written = write_container(&mut out, &raster, &model)
		.and_then(|_| out.flush().map_err(Into::into));

	if let Err(err) = written {
		println!("  ERROR: {}", err);
		exit(1);
	}

	println!("Done!");
}
