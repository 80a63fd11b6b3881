//! Secondary-transform (babel) configuration loading

use serde_json::{Map, Value};
use tracing::debug;
use tsj_fs::{ConfigStore, NormalizedPath};

use crate::engine::{EngineAdapter, TransformEngine};
use crate::options::ConfigReference;
use crate::{Error, Result};

/// Resolve the secondary transform configuration.
///
/// The base record carries `cwd`; file or inline content is merged over it
/// and the result goes through the engine's selected entry point. `None`
/// when no reference was configured.
pub fn load_secondary_config(
    reference: Option<&ConfigReference>,
    cwd: &NormalizedPath,
    store: &ConfigStore,
    adapter: EngineAdapter,
    engine: &dyn TransformEngine,
) -> Result<Option<Value>> {
    let Some(reference) = reference else {
        return Ok(None);
    };

    let mut base = Map::new();
    base.insert("cwd".to_string(), Value::from(cwd.as_str()));

    match reference {
        ConfigReference::File(Some(path)) => {
            debug!(path = %path, "Loading secondary transform configuration");
            match store.load_value(path)? {
                Value::Object(content) => base.extend(content),
                other => {
                    return Err(Error::Engine {
                        message: format!("{path} must contain an object, found {other}"),
                    });
                }
            }
        }
        ConfigReference::File(None) => {
            debug!("Secondary transform configuration left to the engine");
        }
        ConfigReference::Inline(content) => base.extend(content.clone()),
    }

    adapter.load(engine, base).map(|options| Some(Value::Object(options)))
}
