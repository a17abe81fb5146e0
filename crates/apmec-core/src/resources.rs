//! Descriptor catalog for the resource types managed by the API.
//!
//! Each resource is configuration consumed by a single generic executor,
//! not a class: the descriptor carries the envelope key, the collection
//! path and the list post-processing flags that differ between resources.

/// Static description of one API resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Singular envelope key, e.g. "mea".
    pub name: &'static str,
    /// Registered plural collection key, e.g. "meas".
    pub plural: &'static str,
    /// Collection endpoint path, version prefix excluded.
    pub collection_path: &'static str,
    /// Truncate long `description` fields in list output.
    pub truncate_description: bool,
    /// Truncate long `error_reason` fields in list output.
    pub truncate_error_reason: bool,
    /// Resource supports create/update/delete (false for read-only).
    pub mutable: bool,
}

impl ResourceDescriptor {
    /// Path of a single instance, e.g. `/meas/<id>`.
    pub fn instance_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path, id)
    }
}

pub const MEAD: ResourceDescriptor = ResourceDescriptor {
    name: "mead",
    plural: "meads",
    collection_path: "/meads",
    truncate_description: true,
    truncate_error_reason: false,
    mutable: true,
};

pub const MEA: ResourceDescriptor = ResourceDescriptor {
    name: "mea",
    plural: "meas",
    collection_path: "/meas",
    truncate_description: false,
    truncate_error_reason: true,
    mutable: true,
};

pub const VIM: ResourceDescriptor = ResourceDescriptor {
    name: "vim",
    plural: "vims",
    collection_path: "/vims",
    truncate_description: false,
    truncate_error_reason: false,
    mutable: true,
};

pub const MESD: ResourceDescriptor = ResourceDescriptor {
    name: "mesd",
    plural: "mesds",
    collection_path: "/mesds",
    truncate_description: true,
    truncate_error_reason: false,
    mutable: true,
};

pub const MES: ResourceDescriptor = ResourceDescriptor {
    name: "mes",
    plural: "mess",
    collection_path: "/mess",
    truncate_description: false,
    truncate_error_reason: true,
    mutable: true,
};

pub const MECAD: ResourceDescriptor = ResourceDescriptor {
    name: "mecad",
    plural: "mecads",
    collection_path: "/mecads",
    truncate_description: true,
    truncate_error_reason: false,
    mutable: true,
};

pub const MECA: ResourceDescriptor = ResourceDescriptor {
    name: "meca",
    plural: "mecas",
    collection_path: "/mecas",
    truncate_description: false,
    truncate_error_reason: true,
    mutable: true,
};

pub const EVENT: ResourceDescriptor = ResourceDescriptor {
    name: "event",
    plural: "events",
    collection_path: "/events",
    truncate_description: false,
    truncate_error_reason: false,
    mutable: false,
};

pub const EXTENSION: ResourceDescriptor = ResourceDescriptor {
    name: "extension",
    plural: "extensions",
    collection_path: "/extensions",
    truncate_description: false,
    truncate_error_reason: false,
    mutable: false,
};

/// Every resource the client knows about.
pub const ALL: &[&ResourceDescriptor] = &[
    &MEAD, &MEA, &VIM, &MESD, &MES, &MECAD, &MECA, &EVENT, &EXTENSION,
];

/// Look a descriptor up by its singular name.
pub fn by_name(name: &str) -> Option<&'static ResourceDescriptor> {
    ALL.iter().copied().find(|d| d.name == name)
}
