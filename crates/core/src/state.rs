//! Typed view of the container state payload
//!
//! The runtime writes the container state as JSON on the hook's stdin. Hooks
//! receive the raw bytes untouched; this module only decodes them for
//! diagnostics and for tools that need the container identity.

use serde::Deserialize;
use thiserror::Error;

/// Minimum length of a systemd-machined machine id before hex encoding
const MACHINE_ID_MIN_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid container state payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("container state has an empty {field}")]
    Invalid { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerState {
    pub id: String,

    /// Pid of the container's init process, as seen from the host
    pub init_process_pid: u32,

    pub config: StateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateConfig {
    pub rootfs: String,

    pub cgroups: CgroupState,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CgroupState {
    pub name: String,
}

impl ContainerState {
    /// Decode and validate a payload. Unknown fields are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, StateError> {
        let state: ContainerState = serde_json::from_slice(bytes)?;
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> Result<(), StateError> {
        if self.id.is_empty() {
            return Err(StateError::Invalid { field: "id" });
        }
        if self.config.rootfs.is_empty() {
            return Err(StateError::Invalid {
                field: "config.rootfs",
            });
        }
        if self.config.cgroups.name.is_empty() {
            return Err(StateError::Invalid {
                field: "config.cgroups.name",
            });
        }
        Ok(())
    }

    /// Name the container is registered under (its cgroup name)
    pub fn machine_name(&self) -> &str {
        &self.config.cgroups.name
    }

    /// Hex-encoded machine id: the container id right-padded with `'0'` to
    /// 32 characters, then hex-encoded byte by byte.
    pub fn machine_id(&self) -> String {
        let mut id = self.id.clone();
        while id.len() < MACHINE_ID_MIN_LEN {
            id.push('0');
        }
        hex::encode(id.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "id": "abc",
            "init_process_pid": 4242,
            "status": "running",
            "config": {
                "rootfs": "/var/lib/docker/abc/rootfs",
                "no_pivot_root": false,
                "cgroups": { "name": "abc", "parent": "docker" }
            }
        })
    }

    #[test]
    fn test_decode() {
        let state = ContainerState::decode(sample().to_string().as_bytes()).unwrap();
        assert_eq!(state.id, "abc");
        assert_eq!(state.init_process_pid, 4242);
        assert_eq!(state.config.rootfs, "/var/lib/docker/abc/rootfs");
        assert_eq!(state.machine_name(), "abc");
    }

    #[test]
    fn test_decode_missing_field() {
        let mut value = sample();
        value["config"].as_object_mut().unwrap().remove("cgroups");
        let err = ContainerState::decode(value.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, StateError::Decode(_)));
    }

    #[test]
    fn test_decode_mistyped_field() {
        let mut value = sample();
        value["init_process_pid"] = json!("4242");
        assert!(matches!(
            ContainerState::decode(value.to_string().as_bytes()),
            Err(StateError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_not_json() {
        assert!(ContainerState::decode(b"\x00\x01not json").is_err());
    }

    #[test]
    fn test_empty_id_is_invalid() {
        let mut value = sample();
        value["id"] = json!("");
        let err = ContainerState::decode(value.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, StateError::Invalid { field: "id" }));
    }

    #[test]
    fn test_machine_id_pads_short_ids() {
        let state = ContainerState::decode(sample().to_string().as_bytes()).unwrap();
        let expected = hex::encode(format!("abc{}", "0".repeat(29)));
        assert_eq!(state.machine_id(), expected);
        assert_eq!(state.machine_id().len(), 64);
    }

    #[test]
    fn test_machine_id_keeps_long_ids() {
        let mut value = sample();
        let id = "f".repeat(64);
        value["id"] = json!(id);
        let state = ContainerState::decode(value.to_string().as_bytes()).unwrap();
        assert_eq!(state.machine_id(), hex::encode(&id));
    }
}
