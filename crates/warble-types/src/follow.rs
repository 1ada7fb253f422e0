/// Handshake state stored on a follower edge.
///
/// The discriminants are the literal column values in the `follower` table.
/// `Accepted` (the final state) is 0 and sorts before `Requested` (the
/// initial state); nothing may order by these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Accepted = 0,
    Requested = 1,
    Approved = 2,
}

impl TokenStatus {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(TokenStatus::Accepted),
            1 => Some(TokenStatus::Requested),
            2 => Some(TokenStatus::Approved),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_discriminants_are_stable() {
        assert_eq!(TokenStatus::Accepted.as_i64(), 0);
        assert_eq!(TokenStatus::Requested.as_i64(), 1);
        assert_eq!(TokenStatus::Approved.as_i64(), 2);
    }

    #[test]
    fn from_i64_round_trips() {
        for status in [
            TokenStatus::Accepted,
            TokenStatus::Requested,
            TokenStatus::Approved,
        ] {
            assert_eq!(TokenStatus::from_i64(status.as_i64()), Some(status));
        }
        assert_eq!(TokenStatus::from_i64(3), None);
        assert_eq!(TokenStatus::from_i64(-1), None);
    }
}
