//! Catalog of selectable Gemini models.

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// A selectable model with its display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Models offered in the model picker. The first entry is the default.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        description: "Fast and efficient model",
    },
    ModelInfo {
        id: "gemini-1.5-pro",
        name: "Gemini 1.5 Pro",
        description: "Advanced reasoning capabilities",
    },
    ModelInfo {
        id: "gemini-1.5-flash",
        name: "Gemini 1.5 Flash",
        description: "Balanced performance",
    },
];

/// Look up a catalog entry by model id.
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

/// Display name for `id`, falling back to the default model's entry.
pub fn display_name(id: &str) -> &'static str {
    find_model(id).unwrap_or(&MODELS[0]).name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_first_entry() {
        assert_eq!(MODELS[0].id, DEFAULT_MODEL);
    }

    #[test]
    fn find_model_by_id() {
        let model = find_model("gemini-1.5-pro").unwrap();
        assert_eq!(model.name, "Gemini 1.5 Pro");
        assert!(find_model("gpt-4o").is_none());
    }

    #[test]
    fn display_name_falls_back_to_default() {
        assert_eq!(display_name("gemini-1.5-flash"), "Gemini 1.5 Flash");
        assert_eq!(display_name("custom-model"), "Gemini 2.0 Flash");
    }
}
