mod profiles;
mod settings;
