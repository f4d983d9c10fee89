pub mod cascade;
pub mod check;
pub mod cycles;
pub mod health;
pub mod recovery;
pub mod report;
pub mod validate;
pub mod verify;

use std::path::Path;

use tangle_core::{Engine, ErrorCode, QueryError};
use tracing::debug;

use crate::definition;
use crate::output::{CliError, OutputMode, render_error};

/// Load and build the engine for `graph_path`, rendering any failure.
pub fn load_engine(graph_path: &Path, output: OutputMode) -> anyhow::Result<Engine> {
    if !graph_path.is_file() {
        let message = format!("graph definition not found: {}", graph_path.display());
        render_error(
            output,
            &CliError::from_code(ErrorCode::DefinitionNotFound, &message),
        )?;
        anyhow::bail!(message);
    }

    let definition = match definition::load_definition(graph_path) {
        Ok(definition) => definition,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::DefinitionParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };

    let mut builder = Engine::builder();
    if let Err(err) = builder.policy(definition.policy) {
        render_error(output, &CliError::from(&err))?;
        return Err(err.into());
    }
    for spec in definition.into_specs(&definition::base_dir(graph_path)) {
        builder.define_component(spec);
    }

    match builder.build() {
        Ok(engine) => {
            debug!(graph = %graph_path.display(), hash = engine.content_hash(), "graph loaded");
            Ok(engine)
        }
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}

/// Unwrap a query result, rendering an unknown-component failure.
pub fn query<T>(output: OutputMode, result: Result<T, QueryError>) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}
