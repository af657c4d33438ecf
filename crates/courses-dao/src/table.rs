//! Table attribute descriptors and the validated schema of one table.

use courses_core::{CoursesError, CoursesResult};
use std::borrow::Cow;
use std::fmt;

/// Role a column plays in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Surrogate key assigned by the store.
    Identity,
    /// Plain data column.
    Data,
    /// Foreign key into another table.
    Reference,
}

/// Immutable (name, role) descriptor for one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableAttr {
    name: Cow<'static, str>,
    role: ColumnRole,
}

impl TableAttr {
    /// Creates a descriptor with an arbitrary name and role.
    pub fn new(name: impl Into<Cow<'static, str>>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    /// Identity column descriptor.
    #[must_use]
    pub const fn identity(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            role: ColumnRole::Identity,
        }
    }

    /// Data column descriptor.
    #[must_use]
    pub const fn data(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            role: ColumnRole::Data,
        }
    }

    /// Foreign-key column descriptor.
    #[must_use]
    pub const fn reference(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            role: ColumnRole::Reference,
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column role.
    #[must_use]
    pub const fn role(&self) -> ColumnRole {
        self.role
    }
}

impl fmt::Display for TableAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A table name plus its ordered attributes, one of which is the identity.
///
/// Attribute order is the column order used for statement generation and
/// parameter binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    attributes: Vec<TableAttr>,
    identity: usize,
}

impl TableSchema {
    /// Validates and builds a schema.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the table or an attribute name is
    /// not a plain SQL identifier or is a reserved word, the attribute list
    /// is empty or repeats a name, or `identity` is not among the attributes.
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<TableAttr>,
        identity: &TableAttr,
    ) -> CoursesResult<Self> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(CoursesError::configuration(format!(
                "table name '{name}' is not a plain SQL identifier"
            )));
        }
        if attributes.is_empty() {
            return Err(CoursesError::configuration(format!(
                "table '{name}' has no attributes"
            )));
        }

        for (index, attr) in attributes.iter().enumerate() {
            if !is_identifier(attr.name()) {
                return Err(CoursesError::configuration(format!(
                    "attribute '{attr}' of table '{name}' is not a plain SQL identifier"
                )));
            }
            if attributes[..index].iter().any(|a| a.name() == attr.name()) {
                return Err(CoursesError::configuration(format!(
                    "attribute '{attr}' appears more than once in table '{name}'"
                )));
            }
        }

        let identity = attributes
            .iter()
            .position(|a| a.name() == identity.name())
            .ok_or_else(|| {
                CoursesError::configuration(format!(
                    "identity '{identity}' is not an attribute of table '{name}'"
                ))
            })?;

        Ok(Self {
            name,
            attributes,
            identity,
        })
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attributes in column order.
    #[must_use]
    pub fn attributes(&self) -> &[TableAttr] {
        &self.attributes
    }

    /// The identity attribute.
    #[must_use]
    pub fn identity(&self) -> &TableAttr {
        &self.attributes[self.identity]
    }

    /// Column index of the identity attribute.
    #[must_use]
    pub const fn identity_index(&self) -> usize {
        self.identity
    }

    /// Column index of the named attribute.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    /// Whether the table has an attribute with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Non-identity attributes whose mask entry says "present".
    ///
    /// `absent_mask` holds one flag per attribute in column order, `true`
    /// meaning the entity has no value for that attribute.
    ///
    /// # Errors
    ///
    /// Returns a data-mapping error if the mask length differs from the
    /// attribute count.
    pub fn present_attributes(&self, absent_mask: &[bool]) -> CoursesResult<Vec<&TableAttr>> {
        if absent_mask.len() != self.attributes.len() {
            return Err(CoursesError::data_mapping(format!(
                "absent mask for table '{}' has {} entries, expected {}",
                self.name,
                absent_mask.len(),
                self.attributes.len()
            )));
        }

        Ok(self
            .attributes
            .iter()
            .zip(absent_mask)
            .enumerate()
            .filter(|(index, (_, absent))| *index != self.identity && !**absent)
            .map(|(_, (attr, _))| attr)
            .collect())
    }
}

/// Keywords SQLite refuses as bare column or table names.
const RESERVED_WORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "AS", "BETWEEN", "BY", "CASE", "CHECK", "COLLATE", "COLUMN",
    "COMMIT", "CONSTRAINT", "CREATE", "DEFAULT", "DEFERRABLE", "DELETE", "DISTINCT", "DROP",
    "ELSE", "ESCAPE", "EXCEPT", "EXISTS", "FOREIGN", "FROM", "GROUP", "HAVING", "IN", "INDEX",
    "INSERT", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "LIMIT", "NOT", "NOTNULL", "NULL",
    "ON", "OR", "ORDER", "PRIMARY", "REFERENCES", "SELECT", "SET", "TABLE", "THEN", "TO",
    "TRANSACTION", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN", "WHERE",
];

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding reserved words.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    well_formed
        && !RESERVED_WORDS
            .iter()
            .any(|word| word.eq_ignore_ascii_case(name))
}
