//! Storage round-trips for mixed field values
//!
//! Every value here takes the full path: typed construction, packing,
//! storage into a row field, decode back through the session.

use loamdb::{
    Decimal128, Mixed, MixedKind, ModelType, ObjectId, PackedValue, Schema, Session, Timestamp,
};
use uuid::Uuid;

fn session_with_person() -> Session {
    Session::typed(Schema::with_models([ModelType::new("Person")]))
}

#[test]
fn string_survives_a_handle_roundtrip() {
    let session = session_with_person();
    let person = session.create_object("Person").unwrap();

    session
        .set_mixed(&person, "greeting", &Mixed::from("hello"))
        .unwrap();

    let read_back = session.get_mixed(&person, "greeting").unwrap();
    assert_eq!(read_back.kind(), MixedKind::String);
    assert_eq!(read_back.get::<String>().unwrap(), "hello");
}

#[test]
fn every_kind_reports_itself_after_decoding() {
    let session = session_with_person();
    let person = session.create_object("Person").unwrap();
    let friend = session.create_object("Person").unwrap();

    let values = [
        Mixed::null(),
        Mixed::from(true),
        Mixed::from(-40i64),
        Mixed::from(2.5f32),
        Mixed::from(-2.5f64),
        Mixed::from("text"),
        Mixed::from(vec![0u8, 255]),
        Mixed::from(Timestamp::from_millis(1_700_000_000_000)),
        Mixed::from(Decimal128::from_i64(99)),
        Mixed::from(ObjectId::new()),
        Mixed::from(Uuid::new_v4()),
        Mixed::from(friend),
    ];

    for value in &values {
        session.set_mixed(&person, "field", value).unwrap();
        let read_back = session.get_mixed(&person, "field").unwrap();
        assert_eq!(read_back.kind(), value.kind());
        assert_eq!(&read_back, value);
    }
}

#[test]
fn typed_payloads_come_back_intact() {
    let session = session_with_person();
    let person = session.create_object("Person").unwrap();

    let ts = Timestamp::from_micros(-123_456);
    session.set_mixed(&person, "born", &Mixed::from(ts)).unwrap();
    assert_eq!(
        session
            .get_mixed(&person, "born")
            .unwrap()
            .get::<Timestamp>()
            .unwrap(),
        ts
    );

    let id = Uuid::new_v4();
    session.set_mixed(&person, "tag", &Mixed::from(id)).unwrap();
    assert_eq!(
        session
            .get_mixed(&person, "tag")
            .unwrap()
            .get::<Uuid>()
            .unwrap(),
        id
    );

    session
        .set_mixed(&person, "age", &Mixed::from(7i8))
        .unwrap();
    // narrow write, wide read: the integer kind is 64-bit throughout
    assert_eq!(
        session
            .get_mixed(&person, "age")
            .unwrap()
            .get::<i64>()
            .unwrap(),
        7
    );
}

#[test]
fn null_constructed_two_ways_is_one_value() {
    let session = session_with_person();
    let person = session.create_object("Person").unwrap();

    session
        .set_mixed(&person, "maybe", &Mixed::null())
        .unwrap();
    let decoded = session.get_mixed(&person, "maybe").unwrap();

    let explicit = Mixed::null();
    assert!(decoded.is_null());
    assert_eq!(decoded, explicit);
    assert_eq!(explicit, decoded);
    assert_eq!(decoded.get::<Option<i64>>().unwrap(), None);
}

#[test]
fn absent_option_stores_as_null() {
    let session = session_with_person();
    let person = session.create_object("Person").unwrap();

    let missing: Option<String> = None;
    session
        .set_mixed(&person, "nickname", &Mixed::from(missing))
        .unwrap();
    assert!(session.get_mixed(&person, "nickname").unwrap().is_null());
}

#[test]
fn corrupt_tag_is_refused_at_construction() {
    let session = session_with_person();
    let packed = PackedValue::from_encoded(vec![0xEE, 0, 1]).unwrap();
    let err = Mixed::from_packed(&session, packed).unwrap_err();
    assert!(matches!(err, loamdb::Error::UnrecognizedTag { tag: 0xEE }));
}
