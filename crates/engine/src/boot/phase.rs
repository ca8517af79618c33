use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootPhase {
    Uninitialized,
    SystemsReady,
    AssetsLoading,
    AssetsReady,
    Running,
    Errored,
}

impl BootPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            BootPhase::Uninitialized => "uninitialized",
            BootPhase::SystemsReady => "systems-ready",
            BootPhase::AssetsLoading => "assets-loading",
            BootPhase::AssetsReady => "assets-ready",
            BootPhase::Running => "running",
            BootPhase::Errored => "errored",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, BootPhase::Errored)
    }

    /// Forward steps one at a time; `Errored` from anything that is not
    /// already errored.
    pub(crate) const fn can_enter(self, next: BootPhase) -> bool {
        matches!(
            (self, next),
            (BootPhase::Uninitialized, BootPhase::SystemsReady)
                | (BootPhase::SystemsReady, BootPhase::AssetsLoading)
                | (BootPhase::AssetsLoading, BootPhase::AssetsReady)
                | (BootPhase::AssetsReady, BootPhase::Running)
        ) || (!self.is_terminal() && matches!(next, BootPhase::Errored))
    }
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BootPhase; 6] = [
        BootPhase::Uninitialized,
        BootPhase::SystemsReady,
        BootPhase::AssetsLoading,
        BootPhase::AssetsReady,
        BootPhase::Running,
        BootPhase::Errored,
    ];

    #[test]
    fn forward_chain_is_allowed() {
        for pair in ALL[..5].windows(2) {
            assert!(pair[0].can_enter(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!BootPhase::Uninitialized.can_enter(BootPhase::AssetsLoading));
        assert!(!BootPhase::Running.can_enter(BootPhase::SystemsReady));
        assert!(!BootPhase::AssetsReady.can_enter(BootPhase::AssetsLoading));
    }

    #[test]
    fn errored_reachable_from_every_non_terminal_phase_and_is_terminal() {
        for phase in &ALL[..5] {
            assert!(phase.can_enter(BootPhase::Errored));
        }
        for phase in ALL {
            assert!(!BootPhase::Errored.can_enter(phase));
        }
    }
}
