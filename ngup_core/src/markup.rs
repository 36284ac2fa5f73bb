//! A span-preserving scanner for HTML template fragments.
//!
//! This is not a conforming HTML parser. It recovers just enough structure
//! for the rewriter: elements with their attributes and text nodes, each
//! carrying byte offsets into the scanned source. Text and attribute values
//! are kept raw (entities are not decoded) so offsets computed inside them
//! map straight back onto the source.

/// A `[start, end)` byte range of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
	pub start: usize,
	pub end: usize,
}

impl Span {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

/// A single attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	/// ASCII-lowercased name.
	pub name: String,
	/// Raw value without the surrounding quotes.
	pub value: String,
	/// From the first byte of the name through the closing quote (or the last
	/// byte of an unquoted value).
	pub span: Span,
	pub quoted: bool,
}

impl Attribute {
	/// Byte offset of the first character of the value.
	pub fn value_start(&self) -> usize {
		if self.quoted {
			self.span.end - 1 - self.value.len()
		} else {
			self.span.end - self.value.len()
		}
	}

	/// False for valueless attributes such as `<input disabled>`.
	pub fn has_value(&self) -> bool {
		self.quoted || !self.value.is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	/// ASCII-lowercased tag name.
	pub tag_name: String,
	/// Byte offset of the opening `<`.
	pub start: usize,
	pub attributes: Vec<Attribute>,
	pub children: Vec<Node>,
}

impl Element {
	pub fn attribute(&self, name: &str) -> Option<&Attribute> {
		self.attributes
			.iter()
			.find(|attribute| attribute.name == name)
	}

	/// Byte offset just past the tag name.
	pub fn tag_name_end(&self) -> usize {
		self.start + 1 + self.tag_name.len()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
	pub content: String,
	/// Byte offset of the first character of `content`.
	pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Element(Element),
	Text(TextNode),
}

/// Elements that never have children or end tags.
pub const VOID_ELEMENTS: [&str; 14] = [
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
	"track", "wbr",
];

/// Elements whose body is raw text rather than markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

pub fn is_void_element(tag_name: &str) -> bool {
	VOID_ELEMENTS.contains(&tag_name)
}

/// Scan `source` into a forest of nodes.
pub fn parse_fragment(source: &str) -> Vec<Node> {
	MarkupScanner::new(source).scan()
}

struct MarkupScanner<'a> {
	source: &'a str,
	bytes: &'a [u8],
	cursor: usize,
	/// Start of the text run not yet flushed into a node.
	text_start: usize,
	open: Vec<Element>,
	roots: Vec<Node>,
}

impl<'a> MarkupScanner<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			bytes: source.as_bytes(),
			cursor: 0,
			text_start: 0,
			open: vec![],
			roots: vec![],
		}
	}

	fn scan(mut self) -> Vec<Node> {
		while let Some(found) = self.source[self.cursor..].find('<') {
			let lt = self.cursor + found;
			let next = self.bytes.get(lt + 1).copied();

			match next {
				Some(b'!') if self.source[lt..].starts_with("<!--") => {
					self.flush_text(lt);
					self.cursor = self.skip_past(lt + 4, "-->");
				}
				Some(b'!' | b'?') => {
					self.flush_text(lt);
					self.cursor = self.skip_past(lt + 2, ">");
				}
				Some(b'/') if self.bytes.get(lt + 2).is_some_and(u8::is_ascii_alphabetic) => {
					self.flush_text(lt);
					self.end_tag(lt);
				}
				Some(byte) if byte.is_ascii_alphabetic() => {
					self.flush_text(lt);
					self.start_tag(lt);
				}
				_ => {
					// A lone `<` is text.
					self.cursor = lt + 1;
					continue;
				}
			}

			self.text_start = self.cursor;
		}

		self.flush_text(self.source.len());
		while let Some(element) = self.open.pop() {
			self.append(Node::Element(element));
		}

		self.roots
	}

	fn flush_text(&mut self, end: usize) {
		if end > self.text_start {
			let node = TextNode {
				content: self.source[self.text_start..end].to_string(),
				start: self.text_start,
			};
			self.append(Node::Text(node));
		}
		self.text_start = end;
	}

	fn append(&mut self, node: Node) {
		match self.open.last_mut() {
			Some(parent) => parent.children.push(node),
			None => self.roots.push(node),
		}
	}

	/// Offset just past the next occurrence of `needle` at or after `from`,
	/// or the end of the source.
	fn skip_past(&self, from: usize, needle: &str) -> usize {
		let from = from.min(self.source.len());
		self.source[from..]
			.find(needle)
			.map_or(self.source.len(), |index| from + index + needle.len())
	}

	fn read_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'a str {
		let start = self.cursor;
		while self.bytes.get(self.cursor).is_some_and(|byte| predicate(*byte)) {
			self.cursor += 1;
		}
		&self.source[start..self.cursor]
	}

	fn skip_whitespace(&mut self) {
		self.read_while(|byte| byte.is_ascii_whitespace());
	}

	fn end_tag(&mut self, lt: usize) {
		self.cursor = lt + 2;
		let name = self
			.read_while(|byte| !byte.is_ascii_whitespace() && byte != b'>' && byte != b'/')
			.to_ascii_lowercase();
		self.cursor = self.skip_past(self.cursor, ">");

		let Some(depth) = self.open.iter().rposition(|element| element.tag_name == name) else {
			tracing::trace!(tag = %name, offset = lt, "ignoring stray end tag");
			return;
		};

		while self.open.len() > depth {
			if let Some(element) = self.open.pop() {
				self.append(Node::Element(element));
			}
		}
	}

	fn start_tag(&mut self, lt: usize) {
		self.cursor = lt + 1;
		let tag_name = self
			.read_while(|byte| !byte.is_ascii_whitespace() && byte != b'>' && byte != b'/')
			.to_ascii_lowercase();
		let mut element = Element {
			tag_name,
			start: lt,
			attributes: vec![],
			children: vec![],
		};

		let mut self_closing = false;
		loop {
			self.skip_whitespace();
			match self.bytes.get(self.cursor) {
				None => break,
				Some(b'>') => {
					self.cursor += 1;
					break;
				}
				Some(b'/') if self.bytes.get(self.cursor + 1) == Some(&b'>') => {
					self.cursor += 2;
					self_closing = true;
					break;
				}
				Some(b'/') => self.cursor += 1,
				Some(_) => {
					let attribute = self.attribute();
					if element.attribute(&attribute.name).is_none() {
						element.attributes.push(attribute);
					}
				}
			}
		}

		if self_closing || is_void_element(&element.tag_name) {
			self.append(Node::Element(element));
			return;
		}

		if RAW_TEXT_ELEMENTS.contains(&element.tag_name.as_str()) {
			let closing = format!("</{}", element.tag_name);
			let body = self.source[self.cursor..].to_ascii_lowercase();
			self.cursor = body
				.find(&closing)
				.map_or(self.source.len(), |index| self.cursor + index);
		}

		self.open.push(element);
	}

	fn attribute(&mut self) -> Attribute {
		let start = self.cursor;
		// A leading `=` belongs to the name.
		self.cursor += self.source[start..].chars().next().map_or(1, char::len_utf8);
		self.read_while(|byte| !byte.is_ascii_whitespace() && !matches!(byte, b'/' | b'>' | b'='));
		let name = self.source[start..self.cursor].to_ascii_lowercase();
		let name_end = self.cursor;

		self.skip_whitespace();
		if self.bytes.get(self.cursor) != Some(&b'=') {
			self.cursor = name_end;
			return Attribute {
				name,
				value: String::new(),
				span: Span::new(start, name_end),
				quoted: false,
			};
		}

		self.cursor += 1;
		self.skip_whitespace();

		match self.bytes.get(self.cursor).copied() {
			Some(quote @ (b'"' | b'\'')) => {
				let value_start = self.cursor + 1;
				match self.source[value_start..].find(char::from(quote)) {
					Some(index) => {
						let value_end = value_start + index;
						self.cursor = value_end + 1;
						Attribute {
							name,
							value: self.source[value_start..value_end].to_string(),
							span: Span::new(start, self.cursor),
							quoted: true,
						}
					}
					None => {
						self.cursor = self.source.len();
						Attribute {
							name,
							value: self.source[value_start..].to_string(),
							span: Span::new(start, self.cursor),
							quoted: false,
						}
					}
				}
			}
			_ => {
				let value = self.read_while(|byte| !byte.is_ascii_whitespace() && byte != b'>');
				Attribute {
					name,
					value: value.to_string(),
					span: Span::new(start, self.cursor),
					quoted: false,
				}
			}
		}
	}
}
