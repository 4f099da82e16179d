use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a trip member.
///
/// Inside the engine a person is only a graph-node key; the identifier is
/// what simplified transactions refer back to.
///
/// # Examples
///
/// ```
/// use debt_simplifier::core::person::PersonId;
///
/// let alice = PersonId::random();
/// let bob = PersonId::random();
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(Uuid);

impl PersonId {
    /// Create a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PersonId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A trip member with a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(PersonId::random(), name)
    }

    /// Create a person with a known identifier (useful for tests / determinism).
    pub fn with_id(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_id_equality() {
        let id = Uuid::from_u128(7);
        assert_eq!(PersonId::from_uuid(id), PersonId::from(id));
        assert_ne!(PersonId::from_uuid(id), PersonId::from_uuid(Uuid::from_u128(8)));
    }

    #[test]
    fn test_person_display() {
        let p = Person::new("Alice");
        assert_eq!(format!("{}", p), "Alice");
    }

    #[test]
    fn test_person_id_ordering() {
        let a = PersonId::from_uuid(Uuid::from_u128(1));
        let b = PersonId::from_uuid(Uuid::from_u128(2));
        assert!(a < b);
    }
}
