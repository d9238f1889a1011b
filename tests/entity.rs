#[cfg(test)]
mod tests {
    use trove::{
        Attachment, Base, Change, Column, Entity, EntityId, Field, Record, Result, Row, RowId,
        StoreError, StoredRow, Value, columns,
    };
    use uuid::Uuid;

    #[derive(Debug)]
    struct Tag {
        base: Base,
        id: Field<Uuid>,
        label: Field<String>,
        weight: Field<u32>,
        hidden: Field<bool>,
    }

    impl Default for Tag {
        fn default() -> Self {
            Self {
                base: Base::default(),
                id: Field::new("id", Uuid::nil()),
                label: Field::new("label", String::new()),
                weight: Field::new("weight", 1),
                hidden: Field::new("hidden", false),
            }
        }
    }

    impl Entity for Tag {
        type Id = Uuid;
        type Input = (Uuid, &'static str, u32);

        const NAME: &'static str = "Tag";
        const COLUMNS: &'static [Column<Self>] = columns![Tag: id, label, weight, hidden];

        fn base(&self) -> &Base {
            &self.base
        }
        fn id(&mut self) -> Uuid {
            *self.id.read(&self.base)
        }
        fn awake(&mut self, (id, label, weight): Self::Input) -> Result<()> {
            self.id.write(id, &self.base);
            self.label.write(label.into(), &self.base);
            self.weight.write(weight, &self.base);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Counter {
        base: Base,
        id: Field<u16>,
    }

    impl Default for Counter {
        fn default() -> Self {
            Self {
                base: Base::default(),
                id: Field::new("id", 0),
            }
        }
    }

    impl Entity for Counter {
        type Id = u16;
        type Input = u16;

        const NAME: &'static str = "Counter";
        const COLUMNS: &'static [Column<Self>] = columns![Counter: id];

        fn base(&self) -> &Base {
            &self.base
        }
        fn id(&mut self) -> u16 {
            *self.id.read(&self.base)
        }
        fn awake(&mut self, id: u16) -> Result<()> {
            self.id.write(id, &self.base);
            Ok(())
        }
    }

    const ID: &str = "7d3c8b0e-3f44-4a53-9f0c-2d2f2b6c9a10";

    fn stored(row_id: i64, label: Value) -> Attachment {
        Attachment::new(StoredRow {
            row_id: RowId(row_id),
            row: Row::from(Record::from([
                ("id".to_string(), Value::Varchar(ID.into())),
                ("label".to_string(), label),
                ("weight".to_string(), Value::Int64(5)),
                ("hidden".to_string(), Value::Boolean(true)),
            ])),
        })
    }

    #[test]
    fn identifiers() {
        assert_eq!(0_i32.canonical(), "");
        assert!(0_u64.is_empty());
        assert_eq!(42_i64.canonical(), "42");
        assert!(String::new().is_empty());
        assert_eq!("abc".to_string().canonical(), "abc");
        assert!(!Uuid::nil().is_empty());
        assert_eq!(
            Uuid::parse_str(&ID.to_uppercase()).unwrap().canonical(),
            ID
        );
        let mut counter = Counter::default();
        assert!(counter.is_empty());
        let error = counter
            .changeset()
            .expect_err("A zero identifier has no changeset");
        assert_eq!(
            StoreError::kind_of(&error),
            Some(&StoreError::InvalidIdentifier {
                entity: "Counter".into()
            })
        );
    }

    #[test]
    fn changeset_and_settle() {
        let id = Uuid::parse_str(ID).unwrap();
        let mut tag = Tag::from_input((id, "rust", 1)).expect("Failed to build the tag");
        assert!(tag.is_dirty());
        assert!(!tag.weight.is_dirty(), "Writing the default is no change");
        let changeset = tag.changeset().expect("Failed to build the changeset");
        assert_eq!(changeset.entity, "Tag");
        assert_eq!(changeset.id_key, "id");
        assert_eq!(changeset.id, ID);
        assert_eq!(changeset.id_value, Value::Varchar(ID.into()));
        assert_eq!(changeset.row_id, None);
        assert_eq!(changeset.row_key, None);
        assert_eq!(
            changeset.values,
            [
                ("id", Value::Varchar(ID.into())),
                ("label", Value::Varchar("rust".into())),
            ]
        );
        tag.settle(&changeset);
        assert!(!tag.id.is_dirty());
        assert!(!tag.label.is_dirty());
        assert!(!tag.is_dirty());
        assert_eq!(
            tag.describe().to_string(),
            format!(
                "Tag {{ id: \"{}\", label: \"rust\", weight: 1, hidden: false }}",
                ID
            )
        );
    }

    #[test]
    fn lazy_attachment() {
        let mut tag = Tag::default();
        assert!(!tag.is_attached());
        assert!(tag.attach(stored(3, Value::Varchar("loaded".into()))));
        assert!(!tag.attach(stored(4, Value::Varchar("ignored".into()))));
        assert_eq!(tag.row_id(), Some(RowId(3)));
        assert_eq!(
            tag.describe().to_string(),
            "Tag #3 { id: <unloaded>, label: <unloaded>, weight: <unloaded>, hidden: <unloaded> }"
        );
        assert_eq!(tag.label.read(&tag.base), "loaded");
        assert!(tag.label.is_loaded());
        assert!(!tag.weight.is_loaded());
        assert_eq!(*tag.weight.read(&tag.base), 5);
        assert_eq!(tag.id(), Uuid::parse_str(ID).unwrap());

        // Pending writes are never overwritten by the row
        let mut other = Tag::default();
        other.attach(stored(3, Value::Varchar("loaded".into())));
        other.hidden.write(false, &other.base);
        assert!(other.hidden.is_dirty());
        assert_eq!(*other.hidden.read(&other.base), false);
        let changeset = other.changeset().expect("Failed to build the changeset");
        assert_eq!(changeset.row_id, Some(RowId(3)));
        assert_eq!(changeset.row_key, Some(Value::Varchar(ID.into())));
        assert_eq!(changeset.values, [("hidden", Value::Boolean(false))]);

        // Undecodable columns keep the default
        let mut broken = Tag::default();
        broken.attach(stored(5, Value::Blob([0xff].into())));
        assert_eq!(broken.label.read(&broken.base), "");
        assert!(!broken.label.is_loaded());
        assert_eq!(
            broken.describe().to_string(),
            "Tag #5 { id: <unloaded>, label: <unloaded>, weight: <unloaded>, hidden: <unloaded> }"
        );
    }

    #[test]
    fn observers() {
        let mut tag = Tag::default();
        tag.attach(stored(8, Value::Varchar("first".into())));
        let mut changes = tag.base.subscribe();
        let label = tag.label.watch(&tag.base);
        assert_eq!(*label.borrow(), "first");
        tag.label.write("first".into(), &tag.base);
        assert!(changes.try_recv().is_err());
        assert!(!label.has_changed().unwrap());
        tag.label.write("second".into(), &tag.base);
        tag.weight.write(9, &tag.base);
        assert_eq!(changes.try_recv().unwrap(), Change { key: "label" });
        assert_eq!(changes.try_recv().unwrap(), Change { key: "weight" });
        assert!(label.has_changed().unwrap());
        assert_eq!(*label.borrow(), "second");
    }
}
