//! Position-preserving edits over one authoritative copy of a source text.
//!
//! The original text is never mutated. It is covered by an ordered run of
//! chunks, each addressing a `[start, end)` range of the original plus two
//! insertion buffers: `left` renders before the chunk's content and `right`
//! after it. Every edit is addressed by an offset into the ORIGINAL text, so
//! edits can be recorded in any order without re-deriving positions.
//!
//! At a boundary `x` between chunk `a = [.., x)` and chunk `b = [x, ..)` the
//! render order is `a.content`, `a.right`, `b.left`, `b.content`. That gives
//! the two insertion flavours:
//!
//! - [`PatchBuffer::insert_left`] appends to `a.right`.
//! - [`PatchBuffer::insert_right`] prepends to `b.left`.
//!
//! So text inserted "left" at an offset always precedes text inserted
//! "right" at the same offset.

use crate::NgupError;
use crate::NgupResult;

/// A contiguous slice of the original text and the insertions queued at its
/// two edges. A `None` buffer marks an edge that lies inside a removed range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk {
	start: usize,
	end: usize,
	removed: bool,
	left: Option<String>,
	right: Option<String>,
}

impl Chunk {
	fn new(start: usize, end: usize) -> Self {
		Self {
			start,
			end,
			removed: false,
			left: Some(String::new()),
			right: Some(String::new()),
		}
	}

	/// Cut this chunk at `offset`, returning the upper half. The lower half
	/// keeps the left buffer, the upper half takes over the right buffer. The
	/// new shared edge is interior to a removal if the content was removed.
	fn split(&mut self, offset: usize) -> Chunk {
		let edge = (!self.removed).then(String::new);
		let upper = Chunk {
			start: offset,
			end: self.end,
			removed: self.removed,
			left: edge.clone(),
			right: self.right.take(),
		};

		self.end = offset;
		self.right = edge;
		upper
	}

	fn render_into(&self, original: &str, output: &mut String) {
		if let Some(left) = &self.left {
			output.push_str(left);
		}
		if !self.removed {
			output.push_str(&original[self.start..self.end]);
		}
		if let Some(right) = &self.right {
			output.push_str(right);
		}
	}
}

/// Accumulates removals and insertions against the original text and renders
/// the patched text on demand.
#[derive(Debug, Clone)]
pub struct PatchBuffer {
	original: String,
	/// Ordered, gap-free and non-overlapping cover of `original`.
	chunks: Vec<Chunk>,
}

impl PatchBuffer {
	pub fn new(original: impl Into<String>) -> Self {
		let original = original.into();
		let chunks = vec![Chunk::new(0, original.len())];

		Self { original, chunks }
	}

	pub fn original(&self) -> &str {
		&self.original
	}

	/// Number of chunks in the chain. Only useful for inspecting how edits
	/// fragment the text.
	pub fn chunk_count(&self) -> usize {
		self.chunks.len()
	}

	/// Insert `text` at `offset` so that it renders before anything inserted
	/// with [`PatchBuffer::insert_right`] at the same offset. Repeated calls
	/// at one offset render in call order.
	pub fn insert_left(&mut self, offset: usize, text: &str) -> NgupResult<()> {
		let (before, _) = self.boundary(offset)?;
		tracing::trace!(offset, text, "insert left");

		match &mut self.chunks[before].right {
			Some(buffer) => buffer.push_str(text),
			None => tracing::warn!(offset, text, "dropping insertion inside a removed range"),
		}

		Ok(())
	}

	/// Insert `text` at `offset` so that it renders after anything inserted
	/// with [`PatchBuffer::insert_left`] at the same offset. Repeated calls at
	/// one offset render in reverse call order.
	pub fn insert_right(&mut self, offset: usize, text: &str) -> NgupResult<()> {
		let (_, after) = self.boundary(offset)?;
		tracing::trace!(offset, text, "insert right");

		match &mut self.chunks[after].left {
			Some(buffer) => buffer.insert_str(0, text),
			None => tracing::warn!(offset, text, "dropping insertion inside a removed range"),
		}

		Ok(())
	}

	/// Remove `length` bytes of original text starting at `offset`.
	///
	/// Insertions queued exactly at either boundary survive: text inserted
	/// right at `offset` and text inserted left at `offset + length`.
	/// Insertions strictly inside the range are discarded, as are any later
	/// insertions addressed strictly inside it.
	pub fn remove(&mut self, offset: usize, length: usize) -> NgupResult<()> {
		let end = offset.checked_add(length).ok_or(NgupError::OffsetOutOfBounds {
			offset: usize::MAX,
			length: self.original.len(),
		})?;
		self.check_bounds(offset)?;
		self.check_bounds(end)?;

		if length == 0 {
			return Ok(());
		}

		tracing::trace!(offset, length, "remove");
		let (_, first) = self.boundary(offset)?;
		let (last, _) = self.boundary(end)?;

		for index in first..=last {
			let chunk = &mut self.chunks[index];
			chunk.removed = true;
			if index != first {
				chunk.left = None;
			}
			if index != last {
				chunk.right = None;
			}
		}

		Ok(())
	}

	/// Concatenate every chunk in order.
	pub fn render(&self) -> String {
		let mut output = String::with_capacity(self.original.len());
		for chunk in &self.chunks {
			chunk.render_into(&self.original, &mut output);
		}
		output
	}

	fn check_bounds(&self, offset: usize) -> NgupResult<()> {
		if offset > self.original.len() {
			return Err(NgupError::OffsetOutOfBounds {
				offset,
				length: self.original.len(),
			});
		}
		if !self.original.is_char_boundary(offset) {
			return Err(NgupError::OffsetNotCharBoundary { offset });
		}

		Ok(())
	}

	/// Resolve the pair of chunk indices `(before, after)` where `before`
	/// ends at `offset` and `after` starts at it, splitting a chunk when the
	/// offset is not already a boundary. Indices are only valid until the
	/// next call, since a split shifts every later chunk.
	fn boundary(&mut self, offset: usize) -> NgupResult<(usize, usize)> {
		self.check_bounds(offset)?;

		let index = self.chunks.partition_point(|chunk| chunk.end < offset);
		if self.chunks[index].end == offset && index + 1 < self.chunks.len() {
			return Ok((index, index + 1));
		}

		let upper = self.chunks[index].split(offset);
		self.chunks.insert(index + 1, upper);
		Ok((index, index + 1))
	}
}

impl std::fmt::Display for PatchBuffer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.render())
	}
}
