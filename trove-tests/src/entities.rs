use trove::{
    Base, ColumnKind, Entity, Field, Model, Result, columns, impl_fieldable_raw, sync::watch,
};

pub const MODEL: &str = "trove_tests";

/// Model declaring every entity of the suite.
pub fn model() -> Model {
    Model::new(MODEL)
        .with_entity("User")
        .with_column("id", ColumnKind::Text)
        .with_column("name", ColumnKind::Text)
        .with_column("age", ColumnKind::Integer)
        .with_column("tags", ColumnKind::Blob)
        .with_column("email", ColumnKind::Text)
        .with_entity("Book")
        .with_column("id", ColumnKind::Integer)
        .with_column("title", ColumnKind::Text)
        .with_column("genre", ColumnKind::Integer)
        .with_column("rating", ColumnKind::Float)
}

#[derive(Debug)]
pub struct User {
    base: Base,
    pub id: Field<String>,
    pub name: Field<String>,
    pub age: Field<i64>,
    pub tags: Field<Vec<String>>,
    pub email: Field<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub tags: Vec<String>,
    pub email: Option<String>,
}

impl UserInput {
    pub fn new(id: &str, name: &str, age: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            ..Default::default()
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            base: Base::default(),
            id: Field::new("id", String::new()),
            name: Field::new("name", String::new()),
            age: Field::new("age", 0),
            tags: Field::new("tags", Vec::new()),
            email: Field::new("email", None),
        }
    }
}

impl User {
    pub fn name(&mut self) -> String {
        self.name.read(&self.base).clone()
    }
    pub fn set_name(&mut self, name: &str) {
        self.name.write(name.into(), &self.base);
    }
    pub fn age(&mut self) -> i64 {
        *self.age.read(&self.base)
    }
    pub fn set_age(&mut self, age: i64) {
        self.age.write(age, &self.base);
    }
    pub fn tags(&mut self) -> Vec<String> {
        self.tags.read(&self.base).clone()
    }
    pub fn email(&mut self) -> Option<String> {
        self.email.read(&self.base).clone()
    }
    pub fn set_email(&mut self, email: Option<&str>) {
        self.email.write(email.map(Into::into), &self.base);
    }
    pub fn watch_age(&mut self) -> watch::Receiver<i64> {
        self.age.watch(&self.base)
    }
    pub fn watch_email(&mut self) -> watch::Receiver<Option<String>> {
        self.email.watch(&self.base)
    }
}

impl Entity for User {
    type Id = String;
    type Input = UserInput;

    const NAME: &'static str = "User";
    const COLUMNS: &'static [trove::Column<Self>] = columns![User: id, name, age, tags, email];

    fn base(&self) -> &Base {
        &self.base
    }

    fn id(&mut self) -> String {
        self.id.read(&self.base).clone()
    }

    fn awake(&mut self, input: UserInput) -> Result<()> {
        self.id.write(input.id, &self.base);
        self.name.write(input.name, &self.base);
        self.age.write(input.age, &self.base);
        self.tags.write(input.tags, &self.base);
        self.email.write(input.email, &self.base);
        Ok(())
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    #[default]
    Unknown = 0,
    Fantasy = 1,
    Science = 2,
    History = 3,
}

impl From<Genre> for i64 {
    fn from(value: Genre) -> Self {
        value as i64
    }
}

impl TryFrom<i64> for Genre {
    type Error = ();
    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            0 => Genre::Unknown,
            1 => Genre::Fantasy,
            2 => Genre::Science,
            3 => Genre::History,
            _ => return Err(()),
        })
    }
}

impl_fieldable_raw!(Genre => i64);

#[derive(Debug)]
pub struct Book {
    base: Base,
    pub id: Field<i64>,
    pub title: Field<String>,
    pub genre: Field<Genre>,
    pub rating: Field<f64>,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            base: Base::default(),
            id: Field::new("id", 0),
            title: Field::new("title", String::new()),
            genre: Field::new("genre", Genre::Unknown),
            rating: Field::new("rating", 0.0),
        }
    }
}

impl Book {
    pub fn title(&mut self) -> String {
        self.title.read(&self.base).clone()
    }
    pub fn set_title(&mut self, title: &str) {
        self.title.write(title.into(), &self.base);
    }
    pub fn genre(&mut self) -> Genre {
        *self.genre.read(&self.base)
    }
    pub fn rating(&mut self) -> f64 {
        *self.rating.read(&self.base)
    }
}

impl Entity for Book {
    type Id = i64;
    type Input = (i64, String, Genre, f64);

    const NAME: &'static str = "Book";
    const COLUMNS: &'static [trove::Column<Self>] = columns![Book: id, title, genre, rating];

    fn base(&self) -> &Base {
        &self.base
    }

    fn id(&mut self) -> i64 {
        *self.id.read(&self.base)
    }

    fn awake(&mut self, (id, title, genre, rating): Self::Input) -> Result<()> {
        self.id.write(id, &self.base);
        self.title.write(title, &self.base);
        self.genre.write(genre, &self.base);
        self.rating.write(rating, &self.base);
        Ok(())
    }
}

pub fn book(id: i64, title: &str, genre: Genre, rating: f64) -> (i64, String, Genre, f64) {
    (id, title.into(), genre, rating)
}
