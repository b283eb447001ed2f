/// Accept/reject check guarding administrative operations.
pub trait AdminGate: Send + Sync {
    fn authorize(&self, proof: Option<&str>) -> bool;
}

/// Gate that accepts a proof equal to a configured shared secret.
pub struct SharedSecretGate {
    secret: String,
}

impl SharedSecretGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl AdminGate for SharedSecretGate {
    fn authorize(&self, proof: Option<&str>) -> bool {
        let Some(proof) = proof else {
            return false;
        };
        if self.secret.is_empty() || proof.len() != self.secret.len() {
            return false;
        }
        proof
            .bytes()
            .zip(self.secret.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Gate that rejects everything; used when no admin secret is configured.
pub struct DenyAll;

impl AdminGate for DenyAll {
    fn authorize(&self, _proof: Option<&str>) -> bool {
        false
    }
}
