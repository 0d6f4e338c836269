//! Payload schemas: named, ordered sets of typed fields.
//!
//! A [`Schema`] is built once at startup and never mutated afterwards; share
//! it between handlers and requests as an `Arc<Schema>`.
//!
//! ```rust
//! use vetted::schema::{FieldType, Schema};
//!
//! let user = Schema::new("User")
//!     .field("name", FieldType::String)
//!     .field("age", FieldType::Integer)
//!     .optional("nickname", FieldType::String);
//!
//! assert_eq!(user.fields().len(), 3);
//! assert!(!user.get("nickname").unwrap().required);
//! ```

/// The primitive type a field's value must have (or be coercible to).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    /// `YYYY-MM-DD HH:MM[:SS]`, the same with a `T` separator, RFC 3339,
    /// or epoch seconds (milliseconds past 2e10).
    Timestamp,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    /// Declares a required field.
    pub fn field(self, name: &str, ty: FieldType) -> Self {
        self.declare(Field { name: name.to_owned(), ty, required: true })
    }

    /// Declares a field that may be absent or `null`.
    pub fn optional(self, name: &str, ty: FieldType) -> Self {
        self.declare(Field { name: name.to_owned(), ty, required: false })
    }

    // Redeclaring a name replaces the earlier field but keeps its position.
    fn declare(mut self, field: Field) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn fields(&self) -> &[Field] { &self.fields }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_declaration_order() {
        let s = Schema::new("UserResponse")
            .field("id", FieldType::String)
            .field("name", FieldType::String)
            .field("timestamp", FieldType::Timestamp);

        let names: Vec<&str> = s.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "timestamp"]);
        assert_eq!(s.name(), "UserResponse");
    }

    #[test]
    fn redeclared_field_replaces_in_place() {
        let s = Schema::new("User")
            .field("age", FieldType::String)
            .field("name", FieldType::String)
            .optional("age", FieldType::Integer);

        assert_eq!(s.fields().len(), 2);
        assert_eq!(s.fields()[0], Field { name: "age".into(), ty: FieldType::Integer, required: false });
    }
}
