use std::collections::{
	BTreeMap,
	HashMap
};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Color {
	pub red: u8,
	pub green: u8,
	pub blue: u8,
}

impl Color {
	pub const fn new(red: u8, green: u8, blue: u8) -> Color {
		Color {
			red: red,
			green: green,
			blue: blue,
		}
	}

	/// Returns the value of the numbered channel, in R/G/B order
	fn channel(&self, index: usize) -> u8 {
		match index {
			0 => self.red,
			1 => self.green,
			_ => self.blue,
		}
	}

	/// Returns a textual hex representation in the form of `#rrggbb`
	pub fn hex_rgb(&self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
	}
}

/// True color image, as handed over by an external image decoder
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
	pub width: u32,
	pub height: u32,
	pub pixels: Vec<Color>,
}

impl Raster {
	/// Builds a raster from a packed RGB8 buffer. Returns [`None`] if the
	/// buffer does not hold exactly `width * height` pixels.
	pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Option<Raster> {
		if data.len() != (width as usize) * (height as usize) * 3 {
			return None;
		}

		Some(Raster {
			width: width,
			height: height,
			pixels: data.chunks_exact(3).map(|px| Color::new(px[0], px[1], px[2])).collect(),
		})
	}
}

/// Image represented as 8 bit indices into a color table
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteTexture {
	pub palette: Vec<Color>,
	pub indices: Vec<u8>,
	pub width: u32,
	pub height: u32,
}

impl PaletteTexture {
	/// Uses the palette and indices to rebuild the pixel array
	pub fn pixels(&self) -> Vec<Color> {
		self.indices.iter().map(|i| self.palette[*i as usize]).collect()
	}
}

/// Reduces a raster to at most `max_colors` palette entries with median cut
/// over the unique color histogram. Deterministic: equal inputs produce equal
/// palettes.
pub fn quantize(raster: &Raster, max_colors: usize) -> PaletteTexture {
	let mut histogram = BTreeMap::new();

	for px in raster.pixels.iter() {
		*histogram.entry(*px).or_insert(0u32) += 1;
	}

	let mut buckets: Vec<Vec<(Color, u32)>> = vec![histogram.into_iter().collect()];

	while buckets.len() < max_colors {
		// split the bucket with the widest channel spread
		let mut widest: Option<(usize, usize, u8)> = None;

		for (i, bucket) in buckets.iter().enumerate() {
			if bucket.len() < 2 {
				continue;
			}

			let (channel, spread) = widest_channel(bucket);

			match widest {
				Some((_, _, best)) if best >= spread => {}
				_ => widest = Some((i, channel, spread)),
			}
		}

		let (i, channel, _) = match widest {
			Some(w) => w,
			_ => break,
		};

		let (lower, upper) = split_bucket(buckets.swap_remove(i), channel);
		buckets.push(lower);
		buckets.push(upper);
	}

	let mut palette = vec![];
	let mut lookup = HashMap::new();

	for bucket in buckets.iter() {
		let index = palette.len() as u8;
		palette.push(mean_color(bucket));

		for (color, _) in bucket.iter() {
			lookup.insert(*color, index);
		}
	}

	PaletteTexture {
		indices: raster.pixels.iter().map(|px| lookup[px]).collect(),
		palette: palette,
		width: raster.width,
		height: raster.height,
	}
}

/// Returns the channel with the largest value spread across the bucket
fn widest_channel(bucket: &[(Color, u32)]) -> (usize, u8) {
	let mut widest = (0, 0);

	for channel in 0..3 {
		let mut min = u8::MAX;
		let mut max = u8::MIN;

		for (color, _) in bucket.iter() {
			min = min.min(color.channel(channel));
			max = max.max(color.channel(channel));
		}

		if max - min > widest.1 {
			widest = (channel, max - min);
		}
	}

	widest
}

/// Splits a bucket at the weighted median of the given channel.
/// Both halves are guaranteed non-empty.
fn split_bucket(mut bucket: Vec<(Color, u32)>, channel: usize) -> (Vec<(Color, u32)>, Vec<(Color, u32)>) {
	bucket.sort_by_key(|(color, _)| (color.channel(channel), *color));

	let total: u64 = bucket.iter().map(|(_, count)| u64::from(*count)).sum();
	let mut acc = 0;
	let mut split = bucket.len() - 1;

	for (i, (_, count)) in bucket.iter().enumerate() {
		acc += u64::from(*count);

		if acc * 2 >= total && i + 1 < bucket.len() {
			split = i + 1;
			break;
		}
	}

	let upper = bucket.split_off(split.max(1));
	(bucket, upper)
}

/// Count-weighted channel mean of a bucket
fn mean_color(bucket: &[(Color, u32)]) -> Color {
	let mut sums = [0u64; 3];
	let mut total = 0u64;

	for (color, count) in bucket.iter() {
		let count = u64::from(*count);
		sums[0] += u64::from(color.red) * count;
		sums[1] += u64::from(color.green) * count;
		sums[2] += u64::from(color.blue) * count;
		total += count;
	}

	if total == 0 {
		return Color::default();
	}

	Color::new((sums[0] / total) as u8, (sums[1] / total) as u8, (sums[2] / total) as u8)
}

#[cfg(test)]
mod tests {
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

	#[test]
	fn test_quantize_preserves_few_colors() {
		let texture = quantize(&checker(), 256);

		assert_eq!(texture.palette.len(), 2);
		assert_eq!(texture.pixels(), checker().pixels);
		assert_eq!(texture.indices[0], texture.indices[3]);
		assert_ne!(texture.indices[0], texture.indices[1]);
	}

	#[test]
	fn test_quantize_clamps_palette() {
		// 1024 distinct colors
		let pixels: Vec<Color> = (0u32..1024)
			.map(|i| Color::new((i / 4) as u8, (i % 256) as u8, (i / 7) as u8))
			.collect();

		let raster = Raster {
			width: 32,
			height: 32,
			pixels: pixels,
		};

		let texture = quantize(&raster, 256);
		assert!(texture.palette.len() <= 256);
		assert_eq!(texture.indices.len(), 1024);
	}

	#[test]
	fn test_quantize_is_deterministic() {
		let raster = Raster {
			width: 4,
			height: 1,
			pixels: vec![
				Color::new(10, 20, 30),
				Color::new(200, 100, 50),
				Color::new(10, 20, 30),
				Color::new(0, 0, 0),
			],
		};

		assert_eq!(quantize(&raster, 2), quantize(&raster, 2));
	}

	#[test]
	fn test_raster_from_rgb8() {
		assert_eq!(Raster::from_rgb8(2, 1, &[1, 2, 3, 4, 5, 6]),
			Some(Raster {
				width: 2,
				height: 1,
				pixels: vec![Color::new(1, 2, 3), Color::new(4, 5, 6)],
			}));
		assert_eq!(Raster::from_rgb8(2, 2, &[0; 6]), None);
	}

	#[test]
	fn test_hex_rgb() {
		assert_eq!(Color::new(255, 8, 0).hex_rgb(), "#ff0800");
	}
}
