//! Commitment registry binding.

use crate::ledger::IssueRequest;

/// Builds issue calls against a deployed commitment registry.
///
/// Deliberately thin: it produces a request value and leaves pricing,
/// sequencing, signing and broadcast to the ledger client.
#[derive(Debug, Clone)]
pub struct RegistryBinding {
    address: String,
}

impl RegistryBinding {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Request invoking `issue(commitment)` on the registry.
    pub fn build_issue_request(&self, commitment: [u8; 32]) -> IssueRequest {
        IssueRequest {
            contract: self.address.clone(),
            commitment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_address_and_commitment() {
        let registry = RegistryBinding::new("0xfeed");
        let request = registry.build_issue_request([3u8; 32]);
        assert_eq!(request.contract, "0xfeed");
        assert_eq!(request.commitment, [3u8; 32]);
        assert_eq!(registry.address(), "0xfeed");
    }
}
