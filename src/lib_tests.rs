// Tests for lib.rs core types
//
// Tests cover: error display, exit codes carried by failures, Clone,
// conversions from io and config errors, and the re-exported records.

use super::*;

// ==================== RAID ERROR TESTS ====================

#[test]
fn test_tool_unavailable_display() {
    let err = RaidError::ToolUnavailable("no version banner".to_string());
    assert!(err.to_string().contains("unavailable"));
    assert!(err.to_string().contains("no version banner"));
}

#[test]
fn test_query_failed_display() {
    let err = RaidError::QueryFailed {
        command: "-AdpAllInfo -a0 -NoLog".to_string(),
        code: 1,
    };
    let message = err.to_string();
    assert!(message.contains("-AdpAllInfo -a0 -NoLog"));
    assert!(message.contains("exit code 1"));
}

#[test]
fn test_mutation_failed_display() {
    let err = RaidError::MutationFailed {
        step: "RebuildRate".to_string(),
        code: 3,
    };
    assert!(err.to_string().contains("RebuildRate"));
}

#[test]
fn test_capacity_exceeded_display() {
    let err = RaidError::CapacityExceeded {
        needed: 600,
        capacity: 512,
    };
    let message = err.to_string();
    assert!(message.contains("600"));
    assert!(message.contains("512"));
}

#[test]
fn test_exit_code_only_on_tool_failures() {
    let query = RaidError::QueryFailed {
        command: "-help".to_string(),
        code: 2,
    };
    let mutation = RaidError::MutationFailed {
        step: "CfgLdDel".to_string(),
        code: 84,
    };
    assert_eq!(query.exit_code(), Some(2));
    assert_eq!(mutation.exit_code(), Some(84));
    assert_eq!(RaidError::ConsistencyError("x".into()).exit_code(), None);
    assert_eq!(RaidError::ExecutionFailed("x".into()).exit_code(), None);
}

#[test]
fn test_error_clone_preserves_variant() {
    let err = RaidError::MutationFailed {
        step: "name".to_string(),
        code: 1,
    };
    match err.clone() {
        RaidError::MutationFailed { step, code } => {
            assert_eq!(step, "name");
            assert_eq!(code, 1);
        }
        other => panic!("Clone changed variant: {:?}", other),
    }
}

#[test]
fn test_io_error_clone_keeps_kind() {
    let err: RaidError = std::io::Error::new(std::io::ErrorKind::NotFound, "MegaCli64").into();
    let cloned = err.clone();
    match cloned {
        RaidError::Io(e) => {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            assert!(e.to_string().contains("MegaCli64"));
        }
        other => panic!("Expected Io, got {:?}", other),
    }
}

#[test]
fn test_config_error_conversion() {
    let err: RaidError = ::config::ConfigError::Message("bad value".to_string()).into();
    assert!(matches!(err, RaidError::Config(ref m) if m.contains("bad value")));
}

#[test]
fn test_raid_result_propagates() {
    fn inner() -> RaidResult<u32> {
        Err(RaidError::ConsistencyError("uneven lists".to_string()))
    }
    fn outer() -> RaidResult<u32> {
        let value = inner()?;
        Ok(value + 1)
    }
    assert!(matches!(outer(), Err(RaidError::ConsistencyError(_))));
}

// ==================== RE-EXPORT TESTS ====================

#[test]
fn test_records_serialize() {
    let adapter = Adapter {
        product_name: "PERC H710P Mini".to_string(),
        ..Adapter::new(0)
    };
    let json = serde_json::to_string(&adapter).unwrap();
    assert!(json.contains("\"product_name\":\"PERC H710P Mini\""));

    let props = LogicalDriveProperties {
        write_policy: WritePolicy::WriteBack,
        ..LogicalDriveProperties::new(0, 1)
    };
    let json = serde_json::to_string(&props).unwrap();
    assert!(json.contains("\"write_policy\":\"WriteBack\""));
    let back: LogicalDriveProperties = serde_json::from_str(&json).unwrap();
    assert_eq!(back, props);
}

#[test]
fn test_tool_config_default() {
    let config = ToolConfig::default();
    assert_eq!(config.binary, "MegaCli64");
    assert!(config.extra_args.is_empty());
    assert_eq!(config.max_attr_len, 100);
    assert_eq!(config.max_pd_list_len, 512);
}
