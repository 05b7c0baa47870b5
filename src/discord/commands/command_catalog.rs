// Discord commands module.
// Each feature gets its own command file.

pub mod standings;

pub mod activity;

pub mod settings;
