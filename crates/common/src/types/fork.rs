use serde::{Deserialize, Serialize};

/// Hard forks the interpreter can be configured for, in activation order.
///
/// - `Tangerine` activates the EIP-150 gas repricings and the 63/64 call
///   gas cap.
/// - `SpuriousDragon` activates EIP-158/161 empty-account rules, the
///   EIP-160 EXP repricing and the EIP-170 code size limit.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Fork {
    Frontier,
    #[default]
    Homestead,
    Tangerine,
    SpuriousDragon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forks_are_ordered_by_activation() {
        assert!(Fork::Frontier < Fork::Homestead);
        assert!(Fork::Homestead < Fork::Tangerine);
        assert!(Fork::Tangerine < Fork::SpuriousDragon);
    }
}
