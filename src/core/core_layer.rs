// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "table/table_parser.rs"]
pub mod table;

#[path = "standings/standings_service.rs"]
pub mod standings;

#[path = "settings/settings_service.rs"]
pub mod settings;
