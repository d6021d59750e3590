use std::{fs, path::Path, sync::Arc};

use graphrq_directives::{parse_with_directives, ResolveParams, Resolver, Schema, SchemaDirective};
use serde_json::{Map, Value};

use crate::{config::DirectivesConfig, Error};

const BUNDLED_SCHEMA: &str = include_str!("../schema.graphql");
const BUNDLED_SEED: &str = include_str!("../seed.json");

/// The SDL served by the server and the data its root fields read from.
#[derive(Clone, Debug)]
pub struct GraphDefinition {
    sdl: String,
    seed: Value,
    bundled: bool,
}

impl GraphDefinition {
    /// The requirements, users and tests graph shipped with the server.
    pub fn bundled() -> crate::Result<Self> {
        Ok(Self {
            sdl: BUNDLED_SCHEMA.to_string(),
            seed: serde_json::from_str(BUNDLED_SEED).map_err(Error::Seed)?,
            bundled: true,
        })
    }

    /// Loads the SDL and seed from disk, falling back to the bundled ones.
    ///
    /// A custom schema without a seed is served from an empty root object.
    pub fn load(schema: Option<&Path>, seed: Option<&Path>) -> crate::Result<Self> {
        let mut graph = Self::bundled()?;

        if let Some(path) = schema {
            graph.sdl = read(path)?;
            graph.seed = Value::Object(Map::new());
            graph.bundled = false;
        }

        if let Some(path) = seed {
            graph.seed = serde_json::from_str(&read(path)?).map_err(Error::Seed)?;
        }

        Ok(graph)
    }

    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    pub fn seed(&self) -> &Value {
        &self.seed
    }

    /// Parses the SDL and applies the configured directives.
    pub fn build(&self, config: &DirectivesConfig) -> crate::Result<Schema> {
        let mut directives = config.directives();
        let mut schema = parse_with_directives(&self.sdl, &directives)?;

        // relationship fields of the bundled graph are joined over the seed ids
        if self.bundled {
            schema = attach_resolvers(schema, &self.seed)?;
        }

        let schema = directives.transform(schema)?;
        tracing::debug!(bundled = self.bundled, "schema ready");

        Ok(schema)
    }
}

fn read(path: &Path) -> crate::Result<String> {
    fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

type SeedFn = fn(&Value, &ResolveParams) -> Value;

fn seeded(seed: &Arc<Value>, resolve: SeedFn) -> Resolver {
    let seed = seed.clone();
    Resolver::from_fn(move |params| Ok(resolve(&seed, &params)))
}

fn attach_resolvers(schema: Schema, seed: &Value) -> Result<Schema, graphrq_directives::Error> {
    let seed = Arc::new(seed.clone());

    schema
        .with_resolver("Query", "requirements", seeded(&seed, requirements))?
        .with_resolver("Query", "requirement", seeded(&seed, requirement))?
        .with_resolver("Requirement", "parent", seeded(&seed, parent))?
        .with_resolver("Requirement", "children", seeded(&seed, children))?
        .with_resolver("Requirement", "creator", seeded(&seed, creator))?
        .with_resolver("Requirement", "tests", seeded(&seed, tests))
}

fn collection<'a>(seed: &'a Value, name: &str) -> &'a [Value] {
    seed.get(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn find_by_id(items: &[Value], id: Option<&Value>) -> Value {
    match id {
        Some(Value::Null) | None => Value::Null,
        Some(id) => items
            .iter()
            .find(|item| item.get("id") == Some(id))
            .cloned()
            .unwrap_or(Value::Null),
    }
}

fn requirements(seed: &Value, params: &ResolveParams) -> Value {
    let filter = params.args.get("where").and_then(Value::as_object);

    let matching = collection(seed, "requirements")
        .iter()
        .filter(|requirement| {
            filter.into_iter().flatten().all(|(key, expected)| {
                expected.is_null() || requirement.get(key) == Some(expected)
            })
        })
        .cloned()
        .collect();

    Value::Array(matching)
}

fn requirement(seed: &Value, params: &ResolveParams) -> Value {
    find_by_id(collection(seed, "requirements"), params.args.get("id"))
}

fn parent(seed: &Value, params: &ResolveParams) -> Value {
    find_by_id(collection(seed, "requirements"), params.source.get("parentId"))
}

fn children(seed: &Value, params: &ResolveParams) -> Value {
    let Some(id) = params.source.get("id") else {
        return Value::Array(Vec::new());
    };

    let children = collection(seed, "requirements")
        .iter()
        .filter(|requirement| requirement.get("parentId") == Some(id))
        .cloned()
        .collect();

    Value::Array(children)
}

fn creator(seed: &Value, params: &ResolveParams) -> Value {
    find_by_id(collection(seed, "users"), params.source.get("creatorId"))
}

fn tests(seed: &Value, params: &ResolveParams) -> Value {
    let ids = params
        .source
        .get("testIds")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let tests = collection(seed, "tests")
        .iter()
        .filter(|test| test.get("id").is_some_and(|id| ids.contains(id)))
        .cloned()
        .collect();

    Value::Array(tests)
}
