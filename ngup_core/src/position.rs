use serde::Serialize;

/// A zero-based line and character pair. `character` counts Unicode scalar
/// values from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct LineCharacter {
	pub line: usize,
	pub character: usize,
}

impl LineCharacter {
	pub fn new(line: usize, character: usize) -> Self {
		Self { line, character }
	}
}

impl std::fmt::Display for LineCharacter {
	/// Renders one-based, the way editors and compilers print locations.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line + 1, self.character + 1)
	}
}

/// Maps byte offsets of a source text to line and character positions.
///
/// Line starts are computed once; each lookup is a binary search.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
	source: &'a str,
	line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
	pub fn new(source: &'a str) -> Self {
		let mut line_starts = vec![0];
		line_starts.extend(
			source
				.bytes()
				.enumerate()
				.filter(|(_, byte)| *byte == b'\n')
				.map(|(index, _)| index + 1),
		);

		Self {
			source,
			line_starts,
		}
	}

	pub fn line_count(&self) -> usize {
		self.line_starts.len()
	}

	/// Offsets past the end of the source clamp to the end. Offsets inside a
	/// multi-byte character resolve to that character.
	pub fn position(&self, offset: usize) -> LineCharacter {
		let offset = offset.min(self.source.len());
		let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
		let line_start = self.line_starts[line];
		let character = self.source[line_start..]
			.char_indices()
			.take_while(|(index, _)| line_start + index < offset)
			.count();

		LineCharacter { line, character }
	}
}
