//! 配置校验模块
//!
//! 校验规则：
//! - 字段级约束 (expected_fps > 0, 阈值非负, 端口名非空) 由 `Validate` derive 负责
//! - 会话路径非空 (可选路径给出时也不能为空)
//! - sink 名称非空且唯一

use std::collections::HashSet;

use contracts::{ContractError, QcBlueprint};
use ::validator::{Validate, ValidationErrors};

/// 校验 QcBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &QcBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(field_error)?;
    validate_session_paths(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 将 derive 校验错误转换为 ContractError
fn field_error(errors: ValidationErrors) -> ContractError {
    let field = errors
        .errors()
        .keys()
        .next()
        .map(|key| key.to_string())
        .unwrap_or_else(|| "blueprint".to_string());
    ContractError::config_validation(field, errors.to_string())
}

/// 校验会话输入路径
fn validate_session_paths(blueprint: &QcBlueprint) -> Result<(), ContractError> {
    let session = &blueprint.session;

    if session.render_sync_path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "session.render_sync_path",
            "render sync path cannot be empty",
        ));
    }

    if session
        .digital_input_path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err(ContractError::config_validation(
            "session.digital_input_path",
            "digital input path cannot be empty when given",
        ));
    }

    if session
        .end_session_path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err(ContractError::config_validation(
            "session.end_session_path",
            "end session path cannot be empty when given",
        ));
    }

    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &QcBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ArtifactConfig, ConfigVersion, RenderingQcConfig, SessionConfig, SinkConfig, SinkType,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn minimal_blueprint() -> QcBlueprint {
        QcBlueprint {
            version: ConfigVersion::V1,
            session: SessionConfig {
                render_sync_path: PathBuf::from("render.csv"),
                digital_input_path: Some(PathBuf::from("di.csv")),
                end_session_path: None,
                photodiode_port: "DIPort0".into(),
                time_column: "Seconds".into(),
                expected_fps: 60.0,
            },
            rendering: RenderingQcConfig::default(),
            artifacts: ArtifactConfig::default(),
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 8,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_valid_blueprint() {
        assert!(validate(&minimal_blueprint()).is_ok());
    }

    #[test]
    fn test_non_positive_fps() {
        let mut bp = minimal_blueprint();
        bp.session.expected_fps = 0.0;
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
        assert!(err.to_string().contains("session"));
    }

    #[test]
    fn test_negative_latency_tolerance() {
        let mut bp = minimal_blueprint();
        bp.rendering.max_latency_s = Some(-0.01);
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_empty_port_name() {
        let mut bp = minimal_blueprint();
        bp.session.photodiode_port = String::new();
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_empty_render_sync_path() {
        let mut bp = minimal_blueprint();
        bp.session.render_sync_path = PathBuf::new();
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("render_sync_path"));
    }

    #[test]
    fn test_empty_end_session_path() {
        let mut bp = minimal_blueprint();
        bp.session.end_session_path = Some(PathBuf::new());
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("end_session_path"));
    }

    #[test]
    fn test_duplicate_sink_names() {
        let mut bp = minimal_blueprint();
        let dup = bp.sinks[0].clone();
        bp.sinks.push(dup);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        assert!(validate(&bp).is_err());
    }
}
