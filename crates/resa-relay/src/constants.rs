use reqwest::header::{
    HeaderName, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};

/// Environment variable holding the workflow webhook URL
pub const WEBHOOK_URL_VAR: &str = "N8N_WEBHOOK_URL";

/// Cross-origin headers written on every relay response
pub const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        ACCESS_CONTROL_ALLOW_METHODS,
        "GET,OPTIONS,PATCH,DELETE,POST,PUT",
    ),
    (
        ACCESS_CONTROL_ALLOW_HEADERS,
        "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version",
    ),
];

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MISSING_CONFIGURATION: &str = "Configuration serveur manquante";
pub const MISSING_CONFIGURATION_DETAILS: &str =
    "La clé API vers le webhook est introuvable sur le serveur.";
pub const UPSTREAM_FAILURE: &str = "Erreur du service tiers (N8N)";
pub const INTERNAL_ERROR: &str = "Erreur interne du serveur";
