use crate::error::{CoreError, CoreResult};
use crate::hashing::algorithm::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlgorithmStatus {
    NORMAL,
    NOT_TRUSTED,
    NOT_IMPLEMENTED,
}

/// Status lookup for hash algorithm identifiers as they appear in File References.
pub trait HashAlgorithmRegistry {
    fn status(&self, algorithm_id: &str) -> AlgorithmStatus;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryTable {
    registry_version: String,
    algorithms: Vec<RegistryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryEntry {
    id: String,
    status: AlgorithmStatus,
}

/// Embedded status table plus configured overrides.
#[derive(Debug, Clone)]
pub struct DefaultAlgorithmRegistry {
    statuses: BTreeMap<HashAlgorithm, AlgorithmStatus>,
}

impl DefaultAlgorithmRegistry {
    pub fn v1() -> CoreResult<Self> {
        let json = include_str!("algorithm_status_v1.json");
        let table: RegistryTable = serde_json::from_str(json)?;
        if table.registry_version != "hash_algorithm_registry_v1" {
            return Err(CoreError::InvalidInput(
                "embedded registry is not hash_algorithm_registry_v1".to_string(),
            ));
        }
        let mut statuses = BTreeMap::new();
        for entry in table.algorithms {
            let alg = HashAlgorithm::from_id(&entry.id).ok_or_else(|| {
                CoreError::InvalidInput(format!("embedded registry lists unknown {}", entry.id))
            })?;
            statuses.insert(alg, entry.status);
        }
        Ok(Self { statuses })
    }

    /// Applies configured overrides. Identifiers the runtime cannot compute
    /// are rejected, since no override can make them usable.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, AlgorithmStatus>) -> CoreResult<Self> {
        for (id, status) in overrides {
            let alg = HashAlgorithm::from_id(id).ok_or_else(|| {
                CoreError::UnsupportedAlgorithm(format!("cannot configure status of {}", id))
            })?;
            self.statuses.insert(alg, *status);
        }
        Ok(self)
    }
}

impl HashAlgorithmRegistry for DefaultAlgorithmRegistry {
    fn status(&self, algorithm_id: &str) -> AlgorithmStatus {
        match HashAlgorithm::from_id(algorithm_id) {
            Some(alg) => self
                .statuses
                .get(&alg)
                .copied()
                .unwrap_or(AlgorithmStatus::NOT_IMPLEMENTED),
            None => AlgorithmStatus::NOT_IMPLEMENTED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_marks_sha1_untrusted() {
        let r = DefaultAlgorithmRegistry::v1().unwrap();
        assert_eq!(r.status("SHA-1"), AlgorithmStatus::NOT_TRUSTED);
        assert_eq!(r.status("sha-256"), AlgorithmStatus::NORMAL);
        assert_eq!(r.status("WHIRLPOOL"), AlgorithmStatus::NOT_IMPLEMENTED);
    }

    #[test]
    fn overrides_apply_to_computable_algorithms_only() {
        let mut o = BTreeMap::new();
        o.insert("SHA-224".to_string(), AlgorithmStatus::NOT_TRUSTED);
        let r = DefaultAlgorithmRegistry::v1().unwrap().with_overrides(&o).unwrap();
        assert_eq!(r.status("SHA-224"), AlgorithmStatus::NOT_TRUSTED);

        let mut bad = BTreeMap::new();
        bad.insert("MD2".to_string(), AlgorithmStatus::NORMAL);
        assert!(DefaultAlgorithmRegistry::v1()
            .unwrap()
            .with_overrides(&bad)
            .is_err());
    }
}
