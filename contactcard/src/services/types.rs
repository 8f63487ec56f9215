pub type ContactParams = card_axum::params::RestParams;
