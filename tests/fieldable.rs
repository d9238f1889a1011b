#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};
    use std::{
        collections::{BTreeMap, HashMap},
        str::FromStr,
    };
    use time::macros::datetime;
    use trove::{Fieldable, Json, Value, impl_fieldable_raw};
    use uuid::Uuid;

    #[test]
    fn integers() {
        assert_eq!(42_u8.encode().unwrap(), Value::Int64(42));
        assert_eq!(i16::decode(Value::Int64(-7)).unwrap(), -7);
        assert_eq!(u64::decode(Value::Boolean(true)).unwrap(), 1);
        assert_eq!(i32::decode(Value::Float64(12.0)).unwrap(), 12);
        assert_eq!(i64::decode(Value::Varchar(" 99 ".into())).unwrap(), 99);
        assert!(i32::decode(Value::Float64(12.5)).is_err());
        assert!(u8::decode(Value::Int64(256)).is_err());
        assert!(u32::decode(Value::Int64(-1)).is_err());
        assert!(i64::decode(Value::Varchar("ninety".into())).is_err());
        assert!(i64::decode(Value::Null).is_err());
        assert!(u64::MAX.encode().is_err());
        assert_eq!(10_usize.encode().unwrap(), Value::Int64(10));
    }

    #[test]
    fn scalars() {
        assert_eq!(bool::decode(Value::Int64(0)).unwrap(), false);
        assert_eq!(bool::decode(Value::Varchar("true".into())).unwrap(), true);
        assert!(bool::decode(Value::Varchar("yes".into())).is_err());
        assert_eq!(f64::decode(Value::Int64(3)).unwrap(), 3.0);
        assert_eq!(f32::decode(Value::Float64(0.25)).unwrap(), 0.25);
        assert_eq!(String::decode(Value::Int64(5)).unwrap(), "5");
        assert_eq!(
            String::decode(Value::Blob(b"bytes".to_vec().into())).unwrap(),
            "bytes"
        );
        assert!(String::decode(Value::Blob([0xff, 0xfe].into())).is_err());
        let blob: Box<[u8]> = [1, 2, 3].into();
        assert_eq!(blob.encode().unwrap(), Value::Blob([1, 2, 3].into()));
    }

    #[test]
    fn identities_and_numbers() {
        let uuid = Uuid::parse_str("a1a1a1a1-a1a1-a1a1-a1a1-a1a1a1a1a1a1").unwrap();
        assert_eq!(Uuid::decode(uuid.encode().unwrap()).unwrap(), uuid);
        assert_eq!(
            Uuid::decode(Value::Blob(uuid.as_bytes().to_vec().into())).unwrap(),
            uuid
        );
        assert!(Uuid::decode(Value::Varchar("not-a-uuid".into())).is_err());

        let decimal = Decimal::from_str("12345.678").unwrap();
        assert_eq!(decimal.encode().unwrap(), Value::Varchar("12345.678".into()));
        assert_eq!(Decimal::decode(Value::Varchar("12345.678".into())).unwrap(), decimal);
        assert_eq!(Decimal::decode(Value::Int64(-4)).unwrap(), Decimal::from(-4));

        let instant = datetime!(2024-02-29 12:30:15.5 UTC);
        assert_eq!(instant.encode().unwrap(), Value::Float64(1709209815.5));
        assert_eq!(
            time::OffsetDateTime::decode(Value::Float64(1709209815.5)).unwrap(),
            instant
        );
        assert_eq!(
            time::OffsetDateTime::decode(Value::Int64(0)).unwrap(),
            datetime!(1970-01-01 0:00 UTC)
        );
    }

    #[test]
    fn optionals() {
        assert_eq!(None::<String>.encode().unwrap(), Value::Null);
        assert_eq!(Some(3_i32).encode().unwrap(), Value::Int64(3));
        assert_eq!(Option::<i32>::decode(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::decode(Value::Int64(8)).unwrap(), Some(8));
        assert!(Option::<i32>::decode(Value::Varchar("x".into())).is_err());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Address {
        street: String,
        number: u16,
    }

    #[test]
    fn json_blobs() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let encoded = tags.encode().unwrap();
        assert_eq!(encoded, Value::Blob(br#"["a","b"]"#.to_vec().into()));
        assert_eq!(Vec::<String>::decode(encoded).unwrap(), tags);
        assert_eq!(
            Vec::<i32>::decode(Value::Varchar("[1, 2, 3]".into())).unwrap(),
            [1, 2, 3]
        );
        assert_eq!(
            Vec::<i32>::decode(Value::List(vec![Value::Int64(4)])).unwrap(),
            [4]
        );
        assert!(Vec::<i32>::decode(Value::Int64(4)).is_err());
        assert!(Vec::<i32>::decode(Value::Varchar("[1,".into())).is_err());

        let scores = BTreeMap::from([("math".to_string(), 9), ("art".to_string(), 7)]);
        assert_eq!(
            scores.encode().unwrap(),
            Value::Blob(br#"{"art":7,"math":9}"#.to_vec().into())
        );
        let lookup = HashMap::from([(1_u32, true)]);
        assert_eq!(
            HashMap::<u32, bool>::decode(lookup.encode().unwrap()).unwrap(),
            lookup
        );

        let address = Json(Address {
            street: "Baker Street".into(),
            number: 221,
        });
        assert_eq!(address.number, 221);
        assert_eq!(
            address.encode().unwrap(),
            Value::Blob(br#"{"street":"Baker Street","number":221}"#.to_vec().into())
        );
        assert_eq!(
            Json::<Address>::decode(address.encode().unwrap()).unwrap(),
            address
        );
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Low,
        High,
    }
    impl From<Level> for String {
        fn from(value: Level) -> Self {
            match value {
                Level::Low => "low".into(),
                Level::High => "high".into(),
            }
        }
    }
    impl TryFrom<String> for Level {
        type Error = ();
        fn try_from(value: String) -> Result<Self, Self::Error> {
            match value.as_str() {
                "low" => Ok(Level::Low),
                "high" => Ok(Level::High),
                _ => Err(()),
            }
        }
    }
    impl_fieldable_raw!(Level => String);

    #[test]
    fn raw_enums() {
        assert_eq!(Level::High.encode().unwrap(), Value::Varchar("high".into()));
        assert_eq!(Level::decode(Value::Varchar("low".into())).unwrap(), Level::Low);
        assert!(Level::decode(Value::Varchar("medium".into())).is_err());
        assert!(Level::decode(Value::Null).is_err());
    }
}
