use alloy::primitives::Address;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("malformed cauldron address for {name}: {address}")]
    MalformedAddress { name: String, address: String },

    #[error("duplicate cauldron address {address} ({existing} and {name})")]
    DuplicateAddress {
        address: Address,
        existing: String,
        name: String,
    },

    #[error("cauldron at {0} has an empty name")]
    EmptyName(Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cauldron {
    pub address: Address,
    pub name: String,
}

/// Immutable address -> display name table of monitored cauldrons.
///
/// Addresses are parsed into [`Address`] on the way in, so lookups ignore the hex
/// casing the log source happens to use. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    entries: Vec<Cauldron>,
    index: HashMap<Address, usize>,
}

impl ContractRegistry {
    pub fn from_entries<I, A, N>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (A, N)>,
        A: AsRef<str>,
        N: Into<String>,
    {
        let mut registry = Self::default();
        for (raw, name) in entries {
            let name = name.into();
            let raw = raw.as_ref().trim();
            let address = Address::from_str(raw).map_err(|_| RegistryError::MalformedAddress {
                name: name.clone(),
                address: raw.to_string(),
            })?;
            registry.insert(address, name)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, address: Address, name: String) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName(address));
        }
        if let Some(&existing) = self.index.get(&address) {
            return Err(RegistryError::DuplicateAddress {
                address,
                existing: self.entries[existing].name.clone(),
                name,
            });
        }
        self.index.insert(address, self.entries.len());
        self.entries.push(Cauldron { address, name });
        Ok(())
    }

    pub fn lookup(&self, address: &Address) -> Option<&str> {
        self.index
            .get(address)
            .map(|&i| self.entries[i].name.as_str())
    }

    /// Same as [`lookup`](Self::lookup) for a hex string; unparseable input is absent.
    pub fn lookup_str(&self, address: &str) -> Option<&str> {
        Address::from_str(address.trim())
            .ok()
            .and_then(|address| self.lookup(&address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cauldron> {
        self.entries.iter()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.entries.iter().map(|c| c.address).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const YVWETH: &str = "0x920D9BD936Da4eAFb5E25c6bDC9f6CB528953F9f";
    const FTM: &str = "0x05500e2Ee779329698DF35760bEdcAAC046e7C27";

    #[test]
    fn lookup_ignores_address_casing() {
        let registry = ContractRegistry::from_entries([(YVWETH, "yvWETH")]).unwrap();

        assert_eq!(registry.lookup_str(YVWETH), Some("yvWETH"));
        assert_eq!(registry.lookup_str(&YVWETH.to_lowercase()), Some("yvWETH"));
        assert_eq!(
            registry.lookup_str("0x920D9BD936DA4EAFB5E25C6BDC9F6CB528953F9F"),
            Some("yvWETH")
        );
        assert_eq!(
            registry.lookup(&address!("920d9bd936da4eafb5e25c6bdc9f6cb528953f9f")),
            Some("yvWETH")
        );
        assert_eq!(registry.lookup_str("not an address"), None);
    }

    #[test]
    fn keeps_insertion_order() {
        let registry =
            ContractRegistry::from_entries([(FTM, "FTM"), (YVWETH, "yvWETH")]).unwrap();
        let names: Vec<_> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["FTM", "yvWETH"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_duplicates_differing_only_in_case() {
        let err = ContractRegistry::from_entries([
            (YVWETH.to_string(), "yvWETH"),
            (YVWETH.to_lowercase(), "yvWETH v2"),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAddress { .. }));
    }

    #[test]
    fn rejects_malformed_addresses_and_names() {
        let err = ContractRegistry::from_entries([("0x1234", "short")]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::MalformedAddress {
                name: "short".into(),
                address: "0x1234".into()
            }
        );

        let err = ContractRegistry::from_entries([(FTM, " ")]).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyName(_)));
    }
}
