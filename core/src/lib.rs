#[cfg(feature = "nom_ext")]
pub mod nom_ext;

pub mod io_ext;
pub mod texture;

/// Rounds a raster dimension up to the next power of two.
/// Dimensions that already are a power of two are returned unchanged.
pub const fn align_pow2(n: u32) -> u32 {
	let mut aligned = 1;

	while aligned < n {
		aligned <<= 1;
	}

	aligned
}

#[cfg(test)]
mod tests {
	use super::align_pow2;

	#[test]
	fn test_align_pow2() {
		assert_eq!(align_pow2(0), 1);
		assert_eq!(align_pow2(1), 1);
		assert_eq!(align_pow2(2), 2);
		assert_eq!(align_pow2(3), 4);
		assert_eq!(align_pow2(129), 256);
		assert_eq!(align_pow2(256), 256);
	}
}
