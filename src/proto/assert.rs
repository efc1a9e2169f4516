use crate::proto::equal::equal;
use crate::proto::message::MessageView;

/// Panic with the rendered diff when two messages are not structurally equal.
///
/// Thin test glue over [`equal`]; the panic carries the caller's location.
#[track_caller]
pub fn assert_equal(expected: Option<&dyn MessageView>, actual: Option<&dyn MessageView>) {
	if let Some(diff) = equal(expected, actual) {
		panic!("messages differ\n{diff}");
	}
}
