use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyComponentId,
    DuplicateComponent,
    UnknownDependency,
    SelfDependency,
    UnknownComponent,
    InvalidPolicy,
    DefinitionParseError,
    DefinitionNotFound,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyComponentId => "E1001",
            Self::DuplicateComponent => "E1002",
            Self::UnknownDependency => "E1003",
            Self::SelfDependency => "E1004",
            Self::UnknownComponent => "E2001",
            Self::InvalidPolicy => "E3001",
            Self::DefinitionParseError => "E4001",
            Self::DefinitionNotFound => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyComponentId => "Component id is empty",
            Self::DuplicateComponent => "Component defined twice",
            Self::UnknownDependency => "Dependency on undefined component",
            Self::SelfDependency => "Component depends on itself",
            Self::UnknownComponent => "Component not found",
            Self::InvalidPolicy => "Invalid health policy",
            Self::DefinitionParseError => "Graph definition parse error",
            Self::DefinitionNotFound => "Graph definition not found",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyComponentId => Some("Give every component a non-empty id."),
            Self::DuplicateComponent => Some("Rename or remove the duplicate component entry."),
            Self::UnknownDependency => {
                Some("Define the referenced component or drop it from depends_on.")
            }
            Self::SelfDependency => Some("Remove the component's own id from its depends_on list."),
            Self::UnknownComponent => Some("Run `tangle check` to list defined components."),
            Self::InvalidPolicy => Some(
                "Keep thresholds within [0, 1] with degraded_threshold <= healthy_threshold.",
            ),
            Self::DefinitionParseError => Some("Fix syntax in the graph definition file and retry."),
            Self::DefinitionNotFound => {
                Some("Pass --graph <path> or create tangle.toml in the current directory.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Construction-time failure raised by [`crate::engine::EngineBuilder::build`].
///
/// Fatal: no engine is produced, so no query can run against a graph that
/// failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphDefinitionError {
    #[error("component id must not be empty")]
    EmptyId,

    #[error("component '{0}' is defined more than once")]
    DuplicateId(String),

    #[error("component '{component}' depends on undefined component '{dependency}'")]
    UnknownDependency {
        component: String,
        dependency: String,
    },

    #[error("component '{0}' depends on itself")]
    SelfDependency(String),
}

impl GraphDefinitionError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyId => ErrorCode::EmptyComponentId,
            Self::DuplicateId(_) => ErrorCode::DuplicateComponent,
            Self::UnknownDependency { .. } => ErrorCode::UnknownDependency,
            Self::SelfDependency(_) => ErrorCode::SelfDependency,
        }
    }
}

/// Failure of a query against a built engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("component '{0}' is not defined")]
    UnknownComponent(String),
}

impl QueryError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownComponent(_) => ErrorCode::UnknownComponent,
        }
    }
}

/// Rejected [`crate::policy::HealthPolicy`] thresholds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("degraded_threshold ({degraded}) exceeds healthy_threshold ({healthy})")]
    Inverted { healthy: f64, degraded: f64 },
}

impl PolicyError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidPolicy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::EmptyComponentId,
            ErrorCode::DuplicateComponent,
            ErrorCode::UnknownDependency,
            ErrorCode::SelfDependency,
            ErrorCode::UnknownComponent,
            ErrorCode::InvalidPolicy,
            ErrorCode::DefinitionParseError,
            ErrorCode::DefinitionNotFound,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::UnknownDependency.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn definition_errors_name_the_offender() {
        let err = GraphDefinitionError::UnknownDependency {
            component: "leaf".to_string(),
            dependency: "ghost".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "component 'leaf' depends on undefined component 'ghost'"
        );
        assert_eq!(err.error_code(), ErrorCode::UnknownDependency);
    }
}
