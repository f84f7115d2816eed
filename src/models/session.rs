use crate::utils::constants::SESSION_DURATION_MS;

/// Sesión local: identidad + instante de login.
/// Propiedad exclusiva del SessionStore; nadie más la muta.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub identity: String,
    pub established_at_ms: i64,
}

impl Session {
    /// Válida sii la identidad no está vacía y no han pasado 24h
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.identity.is_empty() && now_ms - self.established_at_ms < SESSION_DURATION_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_valid() {
        let s = Session { identity: "a@x.com".into(), established_at_ms: 1_000 };
        assert!(s.is_valid_at(2_000));
    }

    #[test]
    fn expired_session_is_invalid() {
        let s = Session { identity: "a@x.com".into(), established_at_ms: 0 };
        assert!(!s.is_valid_at(SESSION_DURATION_MS));
    }

    #[test]
    fn empty_identity_is_invalid() {
        let s = Session { identity: String::new(), established_at_ms: 1_000 };
        assert!(!s.is_valid_at(2_000));
    }
}
