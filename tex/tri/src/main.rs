use std::{
	env,
	fs::File,
	io::{
		BufWriter,
		Write
	},
	process::exit
};

use tritools_core::{
	align_pow2,
	texture::Raster
};

use tritools_textures_tri::export::write_record;

fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 3 {
		println!("Usage: {} inputtexture.png output.tri", args[0]);
		exit(1);
	}

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

	println!("Converting {}...", args[1]);
	println!("  Loaded texture: {}x{} pixels", raster.width, raster.height);

	let padded = align_pow2(raster.width);
	if padded != raster.width {
		println!("  Width expanded to {} pixels", padded);
	}

	let file = match File::create(&args[2]) {
		Ok(file) => file,
		Err(err) => {
			println!("  ERROR: could not create {}: {}", args[2], err);
			exit(1);
		}
	};

	let mut out = BufWriter::new(file);

	let written = write_record(&mut out, &raster, false).and_then(|_| out.flush().map_err(Into::into));
	if let Err(err) = written {
		println!("  ERROR: {}", err);
		exit(1);
	}

	println!("\nDone!");
}
