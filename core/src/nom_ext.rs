use nom::{
	character::complete::multispace0,
	error::ParseError,
	IResult,
	multi::count,
	number::complete::float,
	Parser,
	sequence::delimited
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

/// Parses a [`Vec2`] of whitespace-delimited floats
pub fn vec2ws<'a, E>(input: &'a str) -> IResult<&'a str, Vec2, E>
where
	E: ParseError<&'a str>
{
	let (input, f2vec) = count(ws(float), 2)(input)?;

	Ok((input, Vec2::new(f2vec[0], f2vec[1])))
}

/// Parses a [`Vec3`] of whitespace-delimited floats
pub fn vec3ws<'a, E>(input: &'a str) -> IResult<&'a str, Vec3, E>
where
	E: ParseError<&'a str>
{
	let (input, f3vec) = count(ws(float), 3)(input)?;

	Ok((input, Vec3::new(f3vec[0], f3vec[1], f3vec[2])))
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
///
/// From https://github.com/Geal/nom/blob/master/doc/nom_recipes.md with minor edits
pub fn ws<'a, F, O, E>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
	E: ParseError<&'a str>,
	F: Parser<&'a str, O, E>,
{
	delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
	use nom::error::Error;

	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	#[test]
	fn test_vec2ws() {
		assert_eq!(super::vec2ws::<'_, Error<&str>>("0.25 -1.5"), Ok(("", Vec2::new(0.25, -1.5))));
	}

	#[test]
	fn test_vec3ws() {
		assert_eq!(super::vec3ws::<'_, Error<&str>>("0.1 2.3  4.5"), Ok(("", Vec3::new(0.1, 2.3, 4.5))));
	}
}
