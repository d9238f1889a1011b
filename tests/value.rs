#[cfg(test)]
mod tests {
    use std::{cmp::Ordering, collections::BTreeMap};
    use trove::{Record, Row, RowId, Value};
    use uuid::Uuid;

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(-3_i8), Value::Int64(-3));
        assert_eq!(Value::from(u32::MAX), Value::Int64(u32::MAX as i64));
        assert_eq!(Value::from(1.5_f32), Value::Float64(1.5));
        assert_eq!(Value::from("hello"), Value::Varchar("hello".into()));
        assert_eq!(Value::from(&"hello".to_string()), Value::Varchar("hello".into()));
        assert_eq!(Value::from(&[1_u8, 2][..]), Value::Blob([1, 2].into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::Int64(7));
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Int64(1), Value::Int64(2)])
        );
        let uuid = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").unwrap();
        assert_eq!(
            Value::from(uuid),
            Value::Varchar("5e915574-bb30-4430-98cf-c5854f61fbbd".into())
        );
        assert!(Value::default().is_null());
        assert_eq!(Value::Float64(0.0).kind(), "Float64");
    }

    #[test]
    fn value_compare() {
        assert_eq!(Value::Null.compare(&Value::Int64(-100)), Ordering::Less);
        assert_eq!(Value::Int64(2).compare(&Value::Float64(1.5)), Ordering::Greater);
        assert_eq!(Value::Float64(2.0).compare(&Value::Int64(2)), Ordering::Equal);
        assert_eq!(
            Value::Varchar("abc".into()).compare(&Value::Varchar("abd".into())),
            Ordering::Less
        );
        assert_eq!(
            Value::Varchar("1".into()).compare(&Value::Int64(9)),
            Ordering::Greater
        );
        assert_eq!(
            Value::from(vec![1, 2]).compare(&Value::from(vec![1, 2, 0])),
            Ordering::Less
        );
        assert_eq!(
            Value::Boolean(false).compare(&Value::Boolean(true)),
            Ordering::Less
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Varchar("a \"b\"".into()).to_string(), r#""a \"b\"""#);
        assert_eq!(Value::Blob([0xde, 0xad].into()).to_string(), "X'DEAD'");
        let map = BTreeMap::from([
            ("b".to_string(), Value::Int64(2)),
            ("a".to_string(), Value::from(vec![true])),
        ]);
        assert_eq!(Value::Map(map).to_string(), r#"{"a": [true], "b": 2}"#);
        assert_eq!(RowId(12).to_string(), "#12");
    }

    #[test]
    fn value_json() {
        let value = Value::Map(BTreeMap::from([
            ("name".to_string(), Value::from("Ada")),
            ("scores".to_string(), Value::from(vec![1.5, 2.0])),
            ("admin".to_string(), Value::Boolean(false)),
            ("nothing".to_string(), Value::Null),
        ]));
        let json = value.to_json();
        assert_eq!(
            json.to_string(),
            r#"{"admin":false,"name":"Ada","nothing":null,"scores":[1.5,2.0]}"#
        );
        assert_eq!(Value::from_json(json), value);
        assert_eq!(
            Value::Blob([1, 2].into()).to_json_bytes().unwrap(),
            b"[1,2]".to_vec()
        );
    }

    #[test]
    fn row_lookup() {
        let row = Row::from(Record::from([
            ("id".to_string(), Value::Int64(1)),
            ("title".to_string(), Value::from("Dune")),
        ]));
        assert_eq!(row.names(), ["id", "title"]);
        assert_eq!(row.get("title"), Some(&Value::from("Dune")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.values().len(), 2);
    }
}
