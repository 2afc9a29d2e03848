use bitflags::bitflags;

bitflags! {
    /// Static traits of an action type that gate admissibility before any
    /// parameter is looked at.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionFlags: u16 {
        /// Admissible while the simulation is paused.
        const ALLOW_WHILE_PAUSED         = 1 << 0;
        /// Executed on the issuing participant only; never replicated.
        const CLIENT_ONLY                = 1 << 1;
        /// Admissible only in editor screens or with the sandbox cheat.
        const EDITOR_ONLY                = 1 << 2;
        /// Only the session authority may issue it in a networked session.
        const REQUIRES_NETWORK_AUTHORITY = 1 << 3;
        /// Not written to action logs.
        const IGNORE_FOR_REPLAYS         = 1 << 4;
    }
}

bitflags! {
    /// Capabilities granted to a permission group.
    ///
    /// Every action type requires exactly one of these from a non-host issuer
    /// in a networked session.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Permission: u32 {
        const TOGGLE_PAUSE    = 1 << 0;
        const MODIFY_GROUPS   = 1 << 1;
        const PARK_PROPERTIES = 1 << 2;
        const CHEAT           = 1 << 3;
    }
}

bitflags! {
    /// Per-instance flags carried in the command header.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CommandFlags: u32 {
        /// Preview placement; validated only, never applied or replicated.
        const GHOST  = 1 << 0;
        /// Reconstructed from an action log rather than issued live.
        const REPLAY = 1 << 1;
    }
}
