//! Coerced comparison over packed representations
//!
//! Coerced equality ignores which session (or no session at all)
//! produced a value; the algebraic properties below must hold over the
//! whole payload space, so they are property tests.

use loamdb::{Decimal128, Mixed, ModelType, ObjectId, PackedValue, Schema, Session, Timestamp};
use proptest::prelude::*;
use uuid::Uuid;

fn mixed_strategy() -> impl Strategy<Value = Mixed> {
    prop_oneof![
        Just(Mixed::null()),
        any::<bool>().prop_map(Mixed::from),
        any::<i64>().prop_map(Mixed::from),
        any::<f32>().prop_map(Mixed::from),
        any::<f64>().prop_map(Mixed::from),
        ".{0,24}".prop_map(|s: String| Mixed::from(s)),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Mixed::from),
        any::<i64>().prop_map(|v| Mixed::from(Timestamp::from_micros(v))),
        any::<i64>().prop_map(|v| Mixed::from(Decimal128::from_i64(v))),
        any::<[u8; 12]>().prop_map(|b| Mixed::from(ObjectId::from_bytes(b))),
        any::<[u8; 16]>().prop_map(|b| Mixed::from(Uuid::from_bytes(b))),
    ]
}

proptest! {
    #[test]
    fn coerced_equality_is_reflexive(value in mixed_strategy()) {
        prop_assert!(value.coerced_equals(&value).unwrap());
    }

    #[test]
    fn coerced_equality_is_symmetric(a in mixed_strategy(), b in mixed_strategy()) {
        prop_assert_eq!(
            a.coerced_equals(&b).unwrap(),
            b.coerced_equals(&a).unwrap()
        );
    }

    #[test]
    fn sessions_do_not_matter_for_coerced_equality(n in any::<i32>()) {
        // the same number, packed narrow in one session and read wide
        // from another, plus a session-free in-memory value
        let left_session = Session::typed(Schema::with_models([ModelType::new("Person")]));
        let right_session = Session::typed(Schema::with_models([ModelType::new("Person")]));

        let left = Mixed::from_packed(&left_session, PackedValue::from_i64(n as i64)).unwrap();
        let right = Mixed::from_packed(&right_session, PackedValue::from_f64(n as f64)).unwrap();
        let unmanaged = Mixed::from(i64::from(n));

        prop_assert!(left.coerced_equals(&right).unwrap());
        prop_assert!(right.coerced_equals(&left).unwrap());
        prop_assert!(unmanaged.coerced_equals(&left).unwrap());
        prop_assert!(unmanaged.coerced_equals(&right).unwrap());
    }

    #[test]
    fn integers_coerce_across_every_numeric_kind(n in -1000i64..1000) {
        let int = Mixed::from(n);
        let float = Mixed::from(n as f32);
        let double = Mixed::from(n as f64);
        let decimal = Mixed::from(Decimal128::from_i64(n));

        prop_assert!(int.coerced_equals(&float).unwrap());
        prop_assert!(int.coerced_equals(&double).unwrap());
        prop_assert!(int.coerced_equals(&decimal).unwrap());
        prop_assert!(float.coerced_equals(&decimal).unwrap());
        prop_assert!(!int.coerced_equals(&Mixed::from(n + 1)).unwrap());
    }
}

#[test]
fn coerced_equality_does_not_cross_kind_families() {
    let number = Mixed::from(12i64);
    let text = Mixed::from("12");
    let boolean = Mixed::from(true);

    assert!(!number.coerced_equals(&text).unwrap());
    assert!(!text.coerced_equals(&number).unwrap());
    assert!(!boolean.coerced_equals(&Mixed::from(1i64)).unwrap());
    assert!(!Mixed::null().coerced_equals(&Mixed::from(0i64)).unwrap());
}
