//! Entity trait: things the remote platform identifies by id.

/// An object whose identity survives changes to its fields.
///
/// Two catalog entities with identical fields but different remote ids are
/// different entities.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
