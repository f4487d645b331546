/// Policy for mapping singular protobuf fields to schema qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresencePolicy {
    /// Every singular field may be absent (`zero_or_one`).
    AllOptional,
    /// Presence-aware mapping (default):
    ///
    /// Fields that track presence (messages, proto2 optionals, proto3
    /// `optional`, oneof members) are `zero_or_one`. Implicit-presence proto3
    /// scalars always carry a value and are `one`.
    #[default]
    PresenceAware,
}
