pub mod authored;
pub mod catalog;
pub mod guidance;
pub mod session_types;

pub use authored::{AuthoredPersona, CoachPersona};
pub use catalog::{catalog, catalog_persona, CatalogPersona, PersonaStyle, DEFAULT_PERSONA_KEY};
