use indexmap::IndexMap;

/// A named sample payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub value: Option<serde_json::Value>,
}

/// A named example as declared under a media type: inline, or by reference to
/// the shared registry.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedExample {
    Inline(Example),
    Ref(String),
}

/// Reusable examples declared under `components/examples`, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ExampleRegistry {
    examples: IndexMap<String, Example>,
}

impl ExampleRegistry {
    pub fn new(examples: IndexMap<String, Example>) -> Self {
        Self { examples }
    }

    pub fn get(&self, name: &str) -> Option<&Example> {
        self.examples.get(name)
    }

    /// Look up a `$ref` such as `#/components/examples/get-user-basic`.
    /// Only the segment after the last `/` is significant.
    pub fn lookup_ref(&self, ref_path: &str) -> Option<&Example> {
        self.get(example_name_from_ref(ref_path))
    }

    /// Resolve a named example to the example it denotes, if any.
    pub fn resolve<'a>(&'a self, named: &'a NamedExample) -> Option<&'a Example> {
        match named {
            NamedExample::Inline(example) => Some(example),
            NamedExample::Ref(ref_path) => self.lookup_ref(ref_path),
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// `#/components/examples/get-user-basic` → `get-user-basic`
pub fn example_name_from_ref(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}
