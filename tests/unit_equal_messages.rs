#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;

use protodiff::proto::{
	Diff, DynamicMessage, EnumDescriptor, FieldDescriptor, MapKey, MessageDescriptor, MessageView, MismatchKind, ScalarKind, Value, ValueKind, equal,
	format_message,
};

const FULL_TEXT: &str = "<str_val:\"foo\" int_val:1 bool_val:true double_val:1.1 bytes_val:[1 2] \
	repeated_type:[<id:\"1\"> <id:\"2\"> <nil>] map_type:map[A:<id:\"AA\"> B:<id:\"BB\"> C:<nil>] \
	enum_type:NOT_OK oneof_string:\"1\" timestamp_type:<seconds:1598814300> duration_type:<seconds:1> \
	any_type:<type_url:\"mytype/v1\" value:[5]> repeated_type_simple:[9 10 11] \
	map_type_simple:map[A:20 B:30 C:40] nested_message:<inner:<id:\"123\">>>";

struct Fixture {
	inner: Arc<MessageDescriptor>,
	stamp: Arc<MessageDescriptor>,
	span: Arc<MessageDescriptor>,
	packet: Arc<MessageDescriptor>,
	holder: Arc<MessageDescriptor>,
	outer: Arc<MessageDescriptor>,
}

fn fixture() -> Fixture {
	let inner = MessageDescriptor::new(
		"Inner",
		vec![FieldDescriptor::singular(1, "id", ValueKind::Scalar(ScalarKind::String))],
		&[],
	)
	.expect("descriptor builds");
	let stamp = MessageDescriptor::new(
		"Stamp",
		vec![
			FieldDescriptor::singular(1, "seconds", ValueKind::Scalar(ScalarKind::Int64)),
			FieldDescriptor::singular(2, "nanos", ValueKind::Scalar(ScalarKind::Int32)),
		],
		&[],
	)
	.expect("descriptor builds");
	let span = MessageDescriptor::new(
		"Span",
		vec![
			FieldDescriptor::singular(1, "seconds", ValueKind::Scalar(ScalarKind::Int64)),
			FieldDescriptor::singular(2, "nanos", ValueKind::Scalar(ScalarKind::Int32)),
		],
		&[],
	)
	.expect("descriptor builds");
	let packet = MessageDescriptor::new(
		"Packet",
		vec![
			FieldDescriptor::singular(1, "type_url", ValueKind::Scalar(ScalarKind::String)),
			FieldDescriptor::singular(2, "value", ValueKind::Scalar(ScalarKind::Bytes)),
		],
		&[],
	)
	.expect("descriptor builds");
	let holder = MessageDescriptor::new(
		"Holder",
		vec![FieldDescriptor::singular(1, "inner", ValueKind::Message(inner.clone()))],
		&[],
	)
	.expect("descriptor builds");
	let status = EnumDescriptor::new("Status", &[("OK", 0), ("NOT_OK", 1)]);

	let outer = MessageDescriptor::new(
		"Outer",
		vec![
			FieldDescriptor::singular(1, "str_val", ValueKind::Scalar(ScalarKind::String)),
			FieldDescriptor::singular(2, "int_val", ValueKind::Scalar(ScalarKind::Int64)),
			FieldDescriptor::singular(3, "bool_val", ValueKind::Scalar(ScalarKind::Bool)),
			FieldDescriptor::singular(4, "double_val", ValueKind::Scalar(ScalarKind::Double)),
			FieldDescriptor::singular(5, "bytes_val", ValueKind::Scalar(ScalarKind::Bytes)),
			FieldDescriptor::repeated(6, "repeated_type", ValueKind::Message(inner.clone())),
			FieldDescriptor::map(7, "map_type", ScalarKind::String, ValueKind::Message(inner.clone())),
			FieldDescriptor::singular(8, "enum_type", ValueKind::Scalar(ScalarKind::Enum(status))),
			FieldDescriptor::singular(9, "oneof_string", ValueKind::Scalar(ScalarKind::String)).in_oneof(0),
			FieldDescriptor::singular(10, "oneof_message", ValueKind::Message(inner.clone())).in_oneof(0),
			FieldDescriptor::singular(11, "timestamp_type", ValueKind::Message(stamp.clone())),
			FieldDescriptor::singular(12, "duration_type", ValueKind::Message(span.clone())),
			FieldDescriptor::singular(13, "any_type", ValueKind::Message(packet.clone())),
			FieldDescriptor::repeated(14, "repeated_type_simple", ValueKind::Scalar(ScalarKind::Int32)),
			FieldDescriptor::map(15, "map_type_simple", ScalarKind::String, ValueKind::Scalar(ScalarKind::Int32)),
			FieldDescriptor::singular(16, "nested_message", ValueKind::Message(holder.clone())),
		],
		&["oneof_type"],
	)
	.expect("descriptor builds");

	Fixture {
		inner,
		stamp,
		span,
		packet,
		holder,
		outer,
	}
}

fn inner_value(fx: &Fixture, id: &str) -> Value {
	let mut message = DynamicMessage::new(fx.inner.clone());
	message.set("id", Value::String(id.into())).expect("set succeeds");
	message.into_value()
}

fn stamp_value(fx: &Fixture, seconds: i64, nanos: Option<i64>) -> Value {
	let mut message = DynamicMessage::new(fx.stamp.clone());
	message.set("seconds", Value::I64(seconds)).expect("set succeeds");
	if let Some(nanos) = nanos {
		message.set("nanos", Value::I64(nanos)).expect("set succeeds");
	}
	message.into_value()
}

fn span_value(fx: &Fixture, seconds: i64, nanos: Option<i64>) -> Value {
	let mut message = DynamicMessage::new(fx.span.clone());
	message.set("seconds", Value::I64(seconds)).expect("set succeeds");
	if let Some(nanos) = nanos {
		message.set("nanos", Value::I64(nanos)).expect("set succeeds");
	}
	message.into_value()
}

fn key(text: &str) -> MapKey {
	MapKey::String(text.into())
}

fn make_input(fx: &Fixture, mutate: impl FnOnce(&mut DynamicMessage, &Fixture)) -> DynamicMessage {
	let mut message = DynamicMessage::new(fx.outer.clone());
	message.set("str_val", Value::String("foo".into())).expect("set succeeds");
	message.set("int_val", Value::I64(1)).expect("set succeeds");
	message.set("bool_val", Value::Bool(true)).expect("set succeeds");
	message.set("double_val", Value::F64(1.1)).expect("set succeeds");
	message.set("bytes_val", Value::Bytes(vec![1, 2])).expect("set succeeds");
	message
		.set(
			"repeated_type",
			Value::List(vec![inner_value(fx, "1"), inner_value(fx, "2"), Value::Message(None)]),
		)
		.expect("set succeeds");
	message
		.set(
			"map_type",
			Value::Map(HashMap::from([
				(key("A"), inner_value(fx, "AA")),
				(key("B"), inner_value(fx, "BB")),
				(key("C"), Value::Message(None)),
			])),
		)
		.expect("set succeeds");
	message.set("enum_type", Value::Enum(1)).expect("set succeeds");
	message.set("oneof_string", Value::String("1".into())).expect("set succeeds");
	message.set("timestamp_type", stamp_value(fx, 1598814300, None)).expect("set succeeds");
	message.set("duration_type", span_value(fx, 1, None)).expect("set succeeds");

	let mut packet = DynamicMessage::new(fx.packet.clone());
	packet.set("type_url", Value::String("mytype/v1".into())).expect("set succeeds");
	packet.set("value", Value::Bytes(vec![5])).expect("set succeeds");
	message.set("any_type", packet.into_value()).expect("set succeeds");

	message
		.set("repeated_type_simple", Value::List(vec![Value::I64(9), Value::I64(10), Value::I64(11)]))
		.expect("set succeeds");
	message
		.set(
			"map_type_simple",
			Value::Map(HashMap::from([
				(key("A"), Value::I64(20)),
				(key("B"), Value::I64(30)),
				(key("C"), Value::I64(40)),
			])),
		)
		.expect("set succeeds");

	let mut holder = DynamicMessage::new(fx.holder.clone());
	holder.set("inner", inner_value(fx, "123")).expect("set succeeds");
	message.set("nested_message", holder.into_value()).expect("set succeeds");

	mutate(&mut message, fx);
	message
}

fn diff(path: &[&str], kind: MismatchKind, expected: &str, actual: &str) -> Diff {
	Diff {
		path: path.iter().map(|segment| (*segment).to_owned()).collect(),
		kind,
		expected: expected.to_owned(),
		actual: actual.to_owned(),
	}
}

fn check(expected: &DynamicMessage, actual: Option<&DynamicMessage>, want: Option<Diff>) {
	let actual_view = actual.map(|message| message as &dyn MessageView);
	assert_eq!(equal(Some(expected), actual_view), want, "forward comparison");

	let inverse_want = want.map(|item| Diff {
		path: item.path.clone(),
		kind: item.kind,
		expected: item.actual.clone(),
		actual: item.expected.clone(),
	});
	assert_eq!(equal(actual_view, Some(expected)), inverse_want, "inverse comparison");
}

#[test]
fn identical_messages_compare_equal() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |_, _| {});
	check(&expected, Some(&actual), None);
}

#[test]
fn full_fixture_renders_canonically() {
	let fx = fixture();
	let message = make_input(&fx, |_, _| {});
	assert_eq!(format_message(&message), FULL_TEXT);
}

#[test]
fn absent_actual_reports_root_value_mismatch() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	check(&expected, None, Some(diff(&["Outer"], MismatchKind::Value, FULL_TEXT, "<nil>")));
}

#[test]
fn string_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, _| {
		message.set("str_val", Value::String("invalid".into())).expect("set succeeds");
	});
	check(
		&expected,
		Some(&actual),
		Some(diff(&["str_val"], MismatchKind::Value, "\"foo\"", "\"invalid\"")),
	);
}

#[test]
fn int_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, _| {
		message.set("int_val", Value::I64(42)).expect("set succeeds");
	});
	check(&expected, Some(&actual), Some(diff(&["int_val"], MismatchKind::Value, "1", "42")));
}

#[test]
fn bool_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, _| {
		message.clear("bool_val").expect("clear succeeds");
	});
	check(&expected, Some(&actual), Some(diff(&["bool_val"], MismatchKind::Value, "true", "false")));
}

#[test]
fn double_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, _| {
		message.set("double_val", Value::F64(42.1)).expect("set succeeds");
	});
	check(&expected, Some(&actual), Some(diff(&["double_val"], MismatchKind::Value, "1.1", "42.1")));
}

#[test]
fn bytes_divergences() {
	let cases: Vec<(Option<Vec<u8>>, &str)> = vec![
		(None, "[]"),
		(Some(vec![6]), "[6]"),
		(Some(vec![6, 8]), "[6 8]"),
	];

	for (mutation, want_actual) in cases {
		let fx = fixture();
		let expected = make_input(&fx, |_, _| {});
		let actual = make_input(&fx, |message, _| match &mutation {
			None => message.clear("bytes_val").expect("clear succeeds"),
			Some(bytes) => message.set("bytes_val", Value::Bytes(bytes.clone())).expect("set succeeds"),
		});
		check(
			&expected,
			Some(&actual),
			Some(diff(&["bytes_val"], MismatchKind::Value, "[1 2]", want_actual)),
		);
	}
}

#[test]
fn repeated_message_missing_field() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, _| {
		message.clear("repeated_type").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&actual),
		Some(diff(
			&["repeated_type"],
			MismatchKind::Value,
			"[<id:\"1\"> <id:\"2\"> <nil>]",
			"<nil>",
		)),
	);
}

#[test]
fn repeated_message_length_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, fx| {
		message.set("repeated_type", Value::List(vec![inner_value(fx, "0")])).expect("set succeeds");
	});
	check(&expected, Some(&actual), Some(diff(&["repeated_type"], MismatchKind::Length, "3", "1")));
}

#[test]
fn repeated_message_element_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, fx| {
		message
			.set(
				"repeated_type",
				Value::List(vec![inner_value(fx, "1"), inner_value(fx, "3"), Value::Message(None)]),
			)
			.expect("set succeeds");
	});
	check(
		&expected,
		Some(&actual),
		Some(diff(&["repeated_type", "[1]", "id"], MismatchKind::Value, "\"2\"", "\"3\"")),
	);
}

#[test]
fn repeated_message_nil_element_divergence() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});
	let actual = make_input(&fx, |message, fx| {
		message
			.set(
				"repeated_type",
				Value::List(vec![inner_value(fx, "1"), Value::Message(None), Value::Message(None)]),
			)
			.expect("set succeeds");
	});
	check(
		&expected,
		Some(&actual),
		Some(diff(&["repeated_type", "[1]"], MismatchKind::Value, "<id:\"2\">", "<nil>")),
	);
}

#[test]
fn repeated_scalar_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("repeated_type_simple").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(&["repeated_type_simple"], MismatchKind::Value, "[9 10 11]", "<nil>")),
	);

	let shorter = make_input(&fx, |message, _| {
		message.set("repeated_type_simple", Value::List(vec![Value::I64(1)])).expect("set succeeds");
	});
	check(&expected, Some(&shorter), Some(diff(&["repeated_type_simple"], MismatchKind::Length, "3", "1")));

	let changed = make_input(&fx, |message, _| {
		message
			.set("repeated_type_simple", Value::List(vec![Value::I64(9), Value::I64(10), Value::I64(1)]))
			.expect("set succeeds");
	});
	check(
		&expected,
		Some(&changed),
		Some(diff(&["repeated_type_simple", "[2]"], MismatchKind::Value, "11", "1")),
	);
}

#[test]
fn map_message_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("map_type").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(
			&["map_type"],
			MismatchKind::Value,
			"map[A:<id:\"AA\"> B:<id:\"BB\"> C:<nil>]",
			"<nil>",
		)),
	);

	let grown = make_input(&fx, |message, fx| {
		message
			.set(
				"map_type",
				Value::Map(HashMap::from([
					(key("A"), inner_value(fx, "AA")),
					(key("B"), inner_value(fx, "BB")),
					(key("C"), Value::Message(None)),
					(key("X"), Value::Message(None)),
				])),
			)
			.expect("set succeeds");
	});
	check(&expected, Some(&grown), Some(diff(&["map_type"], MismatchKind::Length, "3", "4")));

	let changed = make_input(&fx, |message, fx| {
		message
			.set(
				"map_type",
				Value::Map(HashMap::from([
					(key("A"), inner_value(fx, "AA")),
					(key("B"), inner_value(fx, "XYZ")),
					(key("C"), Value::Message(None)),
				])),
			)
			.expect("set succeeds");
	});
	check(
		&expected,
		Some(&changed),
		Some(diff(&["map_type", "[B]", "id"], MismatchKind::Value, "\"BB\"", "\"XYZ\"")),
	);

	let nil_entry = make_input(&fx, |message, fx| {
		message
			.set(
				"map_type",
				Value::Map(HashMap::from([
					(key("A"), inner_value(fx, "AA")),
					(key("B"), Value::Message(None)),
					(key("C"), Value::Message(None)),
				])),
			)
			.expect("set succeeds");
	});
	check(
		&expected,
		Some(&nil_entry),
		Some(diff(&["map_type", "[B]"], MismatchKind::Value, "<id:\"BB\">", "<nil>")),
	);
}

#[test]
fn map_scalar_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("map_type_simple").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(&["map_type_simple"], MismatchKind::Value, "map[A:20 B:30 C:40]", "<nil>")),
	);

	let grown = make_input(&fx, |message, _| {
		message
			.set(
				"map_type_simple",
				Value::Map(HashMap::from([
					(key("A"), Value::I64(20)),
					(key("B"), Value::I64(30)),
					(key("C"), Value::I64(40)),
					(key("X"), Value::I64(0)),
				])),
			)
			.expect("set succeeds");
	});
	check(&expected, Some(&grown), Some(diff(&["map_type_simple"], MismatchKind::Length, "3", "4")));

	let changed = make_input(&fx, |message, _| {
		message
			.set(
				"map_type_simple",
				Value::Map(HashMap::from([
					(key("A"), Value::I64(20)),
					(key("B"), Value::I64(99)),
					(key("C"), Value::I64(40)),
				])),
			)
			.expect("set succeeds");
	});
	check(
		&expected,
		Some(&changed),
		Some(diff(&["map_type_simple", "[B]"], MismatchKind::Value, "30", "99")),
	);
}

#[test]
fn oneof_divergences() {
	let fx = fixture();

	let expected_string = make_input(&fx, |message, _| {
		message.set("oneof_string", Value::String("XYZ".into())).expect("set succeeds");
	});
	let none_set = make_input(&fx, |message, _| {
		message.clear("oneof_string").expect("clear succeeds");
	});
	check(
		&expected_string,
		Some(&none_set),
		Some(diff(&["oneof_string"], MismatchKind::Value, "\"XYZ\"", "\"\"")),
	);

	let expected_message = make_input(&fx, |message, fx| {
		message.set("oneof_message", inner_value(fx, "XYZ")).expect("set succeeds");
	});
	check(
		&expected_message,
		Some(&none_set),
		Some(diff(&["oneof_message"], MismatchKind::Value, "<id:\"XYZ\">", "<nil>")),
	);

	let other_string = make_input(&fx, |message, _| {
		message.set("oneof_string", Value::String("123".into())).expect("set succeeds");
	});
	check(
		&expected_string,
		Some(&other_string),
		Some(diff(&["oneof_string"], MismatchKind::Value, "\"XYZ\"", "\"123\"")),
	);

	let other_message = make_input(&fx, |message, fx| {
		message.set("oneof_message", inner_value(fx, "123")).expect("set succeeds");
	});
	check(
		&expected_message,
		Some(&other_message),
		Some(diff(&["oneof_message", "id"], MismatchKind::Value, "\"XYZ\"", "\"123\"")),
	);
}

#[test]
fn timestamp_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("timestamp_type").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(&["timestamp_type"], MismatchKind::Value, "<seconds:1598814300>", "<nil>")),
	);

	let later = make_input(&fx, |message, fx| {
		message.set("timestamp_type", stamp_value(fx, 1598814310, None)).expect("set succeeds");
	});
	check(
		&expected,
		Some(&later),
		Some(diff(
			&["timestamp_type", "seconds"],
			MismatchKind::Value,
			"1598814300",
			"1598814310",
		)),
	);

	let with_nanos = make_input(&fx, |message, fx| {
		message.set("timestamp_type", stamp_value(fx, 1598814300, Some(10))).expect("set succeeds");
	});
	check(
		&expected,
		Some(&with_nanos),
		Some(diff(&["timestamp_type", "nanos"], MismatchKind::Value, "0", "10")),
	);
}

#[test]
fn duration_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("duration_type").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(&["duration_type"], MismatchKind::Value, "<seconds:1>", "<nil>")),
	);

	let longer = make_input(&fx, |message, fx| {
		message.set("duration_type", span_value(fx, 2, None)).expect("set succeeds");
	});
	check(
		&expected,
		Some(&longer),
		Some(diff(&["duration_type", "seconds"], MismatchKind::Value, "1", "2")),
	);

	let with_nanos = make_input(&fx, |message, fx| {
		message.set("duration_type", span_value(fx, 1, Some(5000000))).expect("set succeeds");
	});
	check(
		&expected,
		Some(&with_nanos),
		Some(diff(&["duration_type", "nanos"], MismatchKind::Value, "0", "5000000")),
	);
}

#[test]
fn any_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("any_type").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(
			&["any_type"],
			MismatchKind::Value,
			"<type_url:\"mytype/v1\" value:[5]>",
			"<nil>",
		)),
	);

	let renamed = make_input(&fx, |message, fx| {
		let mut packet = DynamicMessage::new(fx.packet.clone());
		packet.set("type_url", Value::String("foo".into())).expect("set succeeds");
		packet.set("value", Value::Bytes(vec![5])).expect("set succeeds");
		message.set("any_type", packet.into_value()).expect("set succeeds");
	});
	check(
		&expected,
		Some(&renamed),
		Some(diff(&["any_type", "type_url"], MismatchKind::Value, "\"mytype/v1\"", "\"foo\"")),
	);
}

#[test]
fn nested_message_divergences() {
	let fx = fixture();
	let expected = make_input(&fx, |_, _| {});

	let cleared = make_input(&fx, |message, _| {
		message.clear("nested_message").expect("clear succeeds");
	});
	check(
		&expected,
		Some(&cleared),
		Some(diff(&["nested_message"], MismatchKind::Value, "<inner:<id:\"123\">>", "<nil>")),
	);

	let changed = make_input(&fx, |message, fx| {
		let mut holder = DynamicMessage::new(fx.holder.clone());
		holder.set("inner", inner_value(fx, "foo")).expect("set succeeds");
		message.set("nested_message", holder.into_value()).expect("set succeeds");
	});
	check(
		&expected,
		Some(&changed),
		Some(diff(
			&["nested_message", "inner", "id"],
			MismatchKind::Value,
			"\"123\"",
			"\"foo\"",
		)),
	);
}
