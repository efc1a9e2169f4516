use std::fmt;

/// Absence marker used wherever one side of a comparison has no value.
pub(crate) const NIL_TEXT: &str = "<nil>";

/// Category of a reported divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
	/// Leaf values differ, or exactly one side has the field/record at all.
	Value,
	/// List length, map size, or unknown-field byte length differs.
	Length,
	/// Map key present on one side only.
	MissingKey,
	/// Schema identities differ; the comparison is not meaningful.
	Descriptor,
}

impl fmt::Display for MismatchKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			Self::Value => "value mismatch",
			Self::Length => "length mismatch",
			Self::MissingKey => "missing key",
			Self::Descriptor => "descriptors don't match",
		};
		f.write_str(text)
	}
}

/// First point of divergence between two compared messages.
///
/// Built bottom-up: each comparison frame prepends its own path segment as the
/// recursion unwinds, so the deepest mismatch carries the full dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
	/// Path segments from the root: field names, `[index]`, `[key]`.
	pub path: Vec<String>,
	/// Divergence category.
	pub kind: MismatchKind,
	/// Rendered value on the expected side.
	pub expected: String,
	/// Rendered value on the actual side.
	pub actual: String,
}

impl Diff {
	/// Start a diff of the given kind with an empty path and absent values.
	pub(crate) fn new(kind: MismatchKind) -> Self {
		Self {
			path: Vec::new(),
			kind,
			expected: NIL_TEXT.to_owned(),
			actual: NIL_TEXT.to_owned(),
		}
	}

	/// Attach rendered expected/actual texts.
	pub(crate) fn values(mut self, expected: String, actual: String) -> Self {
		self.expected = expected;
		self.actual = actual;
		self
	}

	/// Swap expected and actual texts, for the reverse-pass report.
	pub(crate) fn swap(mut self) -> Self {
		std::mem::swap(&mut self.expected, &mut self.actual);
		self
	}

	/// Prepend one path segment.
	pub(crate) fn segment(mut self, segment: impl Into<String>) -> Self {
		self.path.insert(0, segment.into());
		self
	}

	/// Dotted path text; empty for a root-level divergence.
	pub fn path_string(&self) -> String {
		self.path.join(".")
	}
}

impl fmt::Display for Diff {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}\n+ {}\n- {}", self.path_string(), self.kind, self.expected, self.actual)
	}
}

#[cfg(test)]
mod tests {
	use super::{Diff, MismatchKind};

	#[test]
	fn display_uses_three_line_wire_shape() {
		let diff = Diff::new(MismatchKind::Value)
			.values("\"foo\"".to_owned(), "\"bar\"".to_owned())
			.segment("[1]")
			.segment("repeated_type");

		assert_eq!(diff.path_string(), "repeated_type.[1]");
		assert_eq!(diff.to_string(), "repeated_type.[1]: value mismatch\n+ \"foo\"\n- \"bar\"");
	}

	#[test]
	fn root_level_diff_has_empty_path() {
		let diff = Diff::new(MismatchKind::Length).values("3".to_owned(), "1".to_owned());
		assert_eq!(diff.to_string(), ": length mismatch\n+ 3\n- 1");
	}

	#[test]
	fn unset_values_render_as_nil() {
		let diff = Diff::new(MismatchKind::MissingKey).segment("[X]").segment("map_type");
		assert_eq!(diff.to_string(), "map_type.[X]: missing key\n+ <nil>\n- <nil>");
	}
}
