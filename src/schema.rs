//! Canonical structure of a generated changelog entry.
//!
//! Defined once as data. Each provider backend renders its own native
//! schema from it and the response validator checks model output against
//! it, so the three can never drift apart.

/// Shape of a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// A string restricted to a fixed set of values.
    Enum(Vec<String>),
    Array {
        items: Box<FieldKind>,
        min_items: usize,
    },
    Object(ObjectSchema),
}

/// A named property of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// An object with ordered properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
}

impl ObjectSchema {
    /// Property names in declaration order.
    pub fn property_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Names of the required properties, in declaration order.
    pub fn required_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named top-level schema handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub root: ObjectSchema,
}

impl SchemaDefinition {
    /// The changelog entry schema with `tags` restricted to `tags`.
    pub fn changelog_entry(tags: &[String]) -> Self {
        let placeholder = |name, description| Field {
            name,
            description,
            kind: FieldKind::String,
            required: false,
        };
        let text = |name, description| Field {
            name,
            description,
            kind: FieldKind::String,
            required: true,
        };

        let change = ObjectSchema {
            fields: vec![
                text("title", "The title of the change. Should be succinct."),
                text(
                    "description",
                    "End-user friendly description of the change. Should be more verbose.",
                ),
                text(
                    "impact",
                    "The impact of the change. Describe what and how the change affects the user or usage of the software.",
                ),
                Field {
                    name: "commits",
                    description: "Commit hashes associated with this change. Must have at least one value.",
                    kind: FieldKind::Array {
                        items: Box::new(FieldKind::String),
                        min_items: 1,
                    },
                    required: true,
                },
                Field {
                    name: "tags",
                    description: "Tags associated with this change. Must have at least one value.",
                    kind: FieldKind::Array {
                        items: Box::new(FieldKind::Enum(tags.to_vec())),
                        min_items: 1,
                    },
                    required: true,
                },
            ],
        };

        Self {
            name: "changelog_entry",
            description: "The changelog entry for the commit range",
            root: ObjectSchema {
                fields: vec![
                    placeholder("version", "The version number of the release. Leave as empty string."),
                    placeholder("date", "The date of the release. Leave as empty string."),
                    placeholder(
                        "from_ref",
                        "The starting commit reference for the changelog entry. Leave as empty string.",
                    ),
                    placeholder(
                        "to_ref",
                        "The ending commit reference for the changelog entry. Leave as empty string.",
                    ),
                    Field {
                        name: "changes",
                        description: "Changes derived from the provided git commits and diffs, most recent first.",
                        kind: FieldKind::Array {
                            items: Box::new(FieldKind::Object(change)),
                            min_items: 0,
                        },
                        required: true,
                    },
                ],
            },
        }
    }

    /// The tag vocabulary the schema was built with.
    pub fn tag_vocabulary(&self) -> &[String] {
        let change = self.root.field("changes").map(|f| &f.kind);
        if let Some(FieldKind::Array { items, .. }) = change {
            if let FieldKind::Object(obj) = items.as_ref() {
                if let Some(FieldKind::Array { items, .. }) = obj.field("tags").map(|f| &f.kind) {
                    if let FieldKind::Enum(values) = items.as_ref() {
                        return values;
                    }
                }
            }
        }
        &[]
    }
}
