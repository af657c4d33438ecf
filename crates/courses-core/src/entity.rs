//! Entity contract shared by every persisted domain type.

/// Surrogate key type assigned by the store on first insert.
pub type EntityId = i64;

/// A domain record identified by an optional surrogate key.
///
/// The key is absent until the entity has been persisted; the store assigns it.
pub trait Identifiable {
    /// Returns the identity key, or `None` before first persistence.
    fn id(&self) -> Option<EntityId>;

    /// Replaces the identity key.
    fn set_id(&mut self, id: Option<EntityId>);

    /// Returns true if the entity carries an identity key.
    fn has_id(&self) -> bool {
        self.id().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: Option<EntityId>,
    }

    impl Identifiable for Row {
        fn id(&self) -> Option<EntityId> {
            self.id
        }

        fn set_id(&mut self, id: Option<EntityId>) {
            self.id = id;
        }
    }

    #[test]
    fn test_has_id_follows_key() {
        let mut row = Row { id: None };
        assert!(!row.has_id());

        row.set_id(Some(42));
        assert!(row.has_id());
        assert_eq!(row.id(), Some(42));

        row.set_id(None);
        assert!(!row.has_id());
    }
}
