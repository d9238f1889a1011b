#[cfg(test)]
mod tests {
    use std::{cmp::Ordering, path::PathBuf};
    use trove::{
        Attachment, Base, Column, ColumnKind, Config, Entity, Field, Location, Model, Orderby,
        Pager, Record, Recovery, Result, Row, RowId, StoreError, StoredRow, Value, Where, columns,
    };

    #[derive(Debug)]
    struct Score {
        base: Base,
        id: Field<i32>,
        player: Field<String>,
        points: Field<f64>,
    }

    impl Default for Score {
        fn default() -> Self {
            Self {
                base: Base::default(),
                id: Field::new("id", 0),
                player: Field::new("player", String::new()),
                points: Field::new("points", 0.0),
            }
        }
    }

    impl Entity for Score {
        type Id = i32;
        type Input = (i32, &'static str, f64);

        const NAME: &'static str = "Score";
        const COLUMNS: &'static [Column<Self>] = columns![Score: id, player, points];

        fn base(&self) -> &Base {
            &self.base
        }
        fn id(&mut self) -> i32 {
            *self.id.read(&self.base)
        }
        fn awake(&mut self, (id, player, points): Self::Input) -> Result<()> {
            self.id.write(id, &self.base);
            self.player.write(player.into(), &self.base);
            self.points.write(points, &self.base);
            Ok(())
        }
    }

    fn attached(id: i64, player: &str, points: f64) -> Score {
        let score = Score::default();
        score.attach(Attachment::new(StoredRow {
            row_id: RowId(id),
            row: Row::from(Record::from([
                ("id".to_string(), Value::Int64(id)),
                ("player".to_string(), Value::from(player)),
                ("points".to_string(), Value::Float64(points)),
            ])),
        }));
        score
    }

    #[test]
    fn where_clause() {
        let filter = Where::with("\"points\" > ? AND \"player\" <> ?")
            .arg(10)
            .arg("bot");
        assert_eq!(filter.format(), "\"points\" > ? AND \"player\" <> ?");
        assert_eq!(filter.args(), [Value::Int64(10), Value::from("bot")]);
        assert_eq!(
            filter.to_string(),
            "\"points\" > ? AND \"player\" <> ? [10, \"bot\"]"
        );
        let filter = Where::id_equals("weird\"key", "x");
        assert_eq!(filter.format(), "\"weird\"\"key\" = ?");
        assert_eq!(Where::with("1 = 1").to_string(), "1 = 1");
        let filter = Where::row_identity(RowId(7), "id", "abc");
        assert_eq!(filter.format(), "rowid = ? AND \"id\" IS ?");
        assert_eq!(filter.args(), [Value::Int64(7), Value::from("abc")]);
    }

    #[test]
    fn pager() {
        let pager = Pager::new(3, 20);
        assert_eq!(pager.offset(), 60);
        assert_eq!(pager.limit(), 20);
        assert_eq!(Pager::new(0, 5).offset(), 0);
        assert_eq!(Pager::new(u64::MAX, 2).offset(), u64::MAX);
    }

    #[test]
    fn orderby() {
        let orderby = Orderby::descending("points").then("player", true);
        assert_eq!(orderby.to_string(), "points DESC, player ASC");
        assert_eq!(
            orderby.pairs(),
            [("points".to_string(), false), ("player".to_string(), true)]
        );
        assert_eq!(
            orderby.compare(
                &[Value::Float64(5.0), Value::from("a")],
                &[Value::Int64(5), Value::from("b")]
            ),
            Ordering::Less
        );
        assert_eq!(
            orderby.compare(&[Value::Null], &[Value::Int64(1)]),
            Ordering::Greater
        );

        let scores = vec![
            attached(1, "carl", 12.0),
            attached(2, "anna", 30.5),
            attached(3, "bert", 12.0),
            Score::from_input((4, "dora", 30.5)).unwrap(),
        ];
        let mut sorted = orderby.sort(scores).expect("Failed to sort the scores");
        let players = sorted
            .iter_mut()
            .map(|s| s.player.read(&s.base).clone())
            .collect::<Vec<_>>();
        assert_eq!(players, ["anna", "dora", "bert", "carl"]);
        assert!(sorted.iter().all(|s| s.points.is_loaded()));

        let unsorted = vec![attached(1, "carl", 12.0), attached(2, "anna", 30.5)];
        let mut same = Orderby::default()
            .sort(unsorted)
            .expect("An empty orderby keeps the order");
        assert_eq!(same[0].id(), 1);
        let error = Orderby::ascending("height")
            .sort(vec![attached(1, "carl", 12.0)])
            .expect_err("Unknown keys cannot be sorted");
        assert!(error.to_string().contains("height"));
    }

    #[test]
    fn model() {
        let model: Model = serde_json::from_str(
            r#"{
                "name": "arcade",
                "entities": [
                    { "name": "Score", "columns": [
                        { "name": "id", "type": "integer" },
                        { "name": "points", "type": "float" }
                    ] },
                    { "name": "Empty" }
                ]
            }"#,
        )
        .expect("Failed to parse the model");
        assert_eq!(
            model,
            Model::new("arcade")
                .with_entity("Score")
                .with_column("id", ColumnKind::Integer)
                .with_column("points", ColumnKind::Float)
                .with_entity("Empty")
        );
        let score = model.entity("Score").expect("Score is declared");
        assert_eq!(
            score.column("points").map(|c| c.kind),
            Some(ColumnKind::Float)
        );
        let error = model.entity("Level").expect_err("Level is not declared");
        assert_eq!(
            StoreError::kind_of(&error),
            Some(&StoreError::EntityNotFound {
                entity: "Level".into()
            })
        );
        let error = Model::load("/nonexistent/models", "arcade").expect_err("No such model");
        assert!(StoreError::is(&error, |e| matches!(
            e,
            StoreError::ModelNotFound { .. }
        )));
    }

    #[test]
    fn config() {
        let config = Config::new("arcade");
        assert_eq!(config.recovery, Recovery::Fail);
        assert_eq!(config.thread_name(), "trove-arcade");
        let config = config
            .with_model_dir("models")
            .with_directory("/var/lib/arcade")
            .with_recovery(Recovery::Recreate);
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/var/lib/arcade/arcade.db"))
        );
        let config = config.in_memory();
        assert_eq!(config.location, Location::Memory);
        assert_eq!(config.database_path(), None);
    }
}
