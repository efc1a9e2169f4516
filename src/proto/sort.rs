use std::cmp::Ordering;
use std::collections::HashMap;

use crate::proto::value::{MapKey, Value};

/// Total display order over map keys: lexical strings, `false < true`,
/// signed integers numerically, unsigned integers numerically as unsigned.
/// Used by the formatter only; map equality never consults an order.
pub(crate) fn compare_keys(left: &MapKey, right: &MapKey) -> Ordering {
	match (left, right) {
		(MapKey::String(a), MapKey::String(b)) => a.cmp(b),
		(MapKey::Bool(a), MapKey::Bool(b)) => a.cmp(b),
		(MapKey::I64(a), MapKey::I64(b)) => a.cmp(b),
		(MapKey::U64(a), MapKey::U64(b)) => a.cmp(b),
		_ => rank(left).cmp(&rank(right)),
	}
}

/// Map entries in display order.
pub(crate) fn sorted_entries(map: &HashMap<MapKey, Value>) -> Vec<(&MapKey, &Value)> {
	let mut entries: Vec<_> = map.iter().collect();
	entries.sort_by(|(left, _), (right, _)| compare_keys(left, right));
	entries
}

// Well-formed maps hold a single key tag; mixed tags only order stably.
fn rank(key: &MapKey) -> u8 {
	match key {
		MapKey::Bool(_) => 0,
		MapKey::I64(_) => 1,
		MapKey::U64(_) => 2,
		MapKey::String(_) => 3,
	}
}
